//! Scoring Module
//!
//! Risk aggregation and the end-to-end analysis pipeline.

pub mod engine;
pub mod risk;

pub use engine::{to_csv_bytes, Analysis, ScoringEngine};
pub use risk::{ProbabilitySummary, RiskLevel, RiskMetrics, RiskThresholds};
