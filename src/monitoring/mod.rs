//! Monitoring Module
//!
//! Pipeline counters and latency tracking surfaced by the status endpoint.

mod metrics;

pub use metrics::{MetricsSummary, PipelineMetrics};
