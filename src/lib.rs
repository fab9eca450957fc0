//! Fraud Shield - Credit card fraud detection front end
//!
//! Upload a transaction CSV, score every row with a pre-trained binary
//! classifier and get back aggregate fraud-risk metrics, charts, a text
//! report and a downloadable scored table.
//!
//! # Modules
//!
//! ## Scoring Pipeline
//! - [`preprocessing`] - Upload validation and feature preparation
//! - [`model`] - Pre-trained classifier artifacts and loading
//! - [`scoring`] - End-to-end engine and risk aggregation
//! - [`report`] - Text reports and chart specifications
//!
//! ## Infrastructure
//! - [`schema`] - Canonical transaction column names
//! - [`store`] - One-time download tokens for scored results
//! - [`monitoring`] - Pipeline throughput and latency metrics
//!
//! ## Services
//! - [`server`] - HTTP server with web pages and REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Scoring pipeline
pub mod model;
pub mod preprocessing;
pub mod report;
pub mod schema;
pub mod scoring;

// Infrastructure
pub mod monitoring;
pub mod store;

// Services
pub mod cli;
pub mod server;

pub use error::{FraudShieldError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{FraudShieldError, Result};

    // Preprocessing
    pub use crate::preprocessing::{
        FeaturePreparer, PreparedFeatures, ValidationConfig, ValidationError, ValidationReport,
        Validator,
    };

    // Models
    pub use crate::model::{load_classifier, Classifier, LoadedModel, ModelArtifact, ModelConfig};

    // Scoring
    pub use crate::scoring::{
        Analysis, ProbabilitySummary, RiskLevel, RiskMetrics, RiskThresholds, ScoringEngine,
    };

    // Reports and charts
    pub use crate::report::charts::{ChartKind, ChartSet, ChartSpec};
    pub use crate::report::generate_summary_report;

    // Result downloads
    pub use crate::store::{ResultStore, StoreConfig};

    // Monitoring
    pub use crate::monitoring::{MetricsSummary, PipelineMetrics};
}
