//! End-to-end scoring pipeline
//!
//! One call takes a parsed upload through validation, feature preparation,
//! model inference and aggregation, and hands back everything the web and
//! CLI front ends need: the scored table, metrics, charts and the report.

use std::sync::Arc;
use std::time::Instant;

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::model::Classifier;
use crate::monitoring::PipelineMetrics;
use crate::preprocessing::{FeaturePreparer, ValidationConfig, ValidationReport, Validator};
use crate::report;
use crate::report::charts::{self, ChartSet};
use crate::schema;
use crate::scoring::risk::{RiskMetrics, RiskThresholds};

/// Everything produced by one analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub metrics: RiskMetrics,
    /// Per-row fraud probabilities when the model scores
    pub probabilities: Option<Vec<f64>>,
    /// Upload columns plus the prediction (and probability) columns
    pub results: DataFrame,
    pub charts: ChartSet,
    pub report: String,
    pub validation: ValidationReport,
    pub model_name: String,
}

/// Validates, prepares, scores and aggregates uploads against one model.
pub struct ScoringEngine {
    model: Arc<dyn Classifier>,
    validator: Validator,
    preparer: FeaturePreparer,
    thresholds: RiskThresholds,
    metrics: Arc<PipelineMetrics>,
}

impl ScoringEngine {
    pub fn new(model: Arc<dyn Classifier>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            model,
            validator: Validator::default(),
            preparer: FeaturePreparer::new(),
            thresholds: RiskThresholds::default(),
            metrics,
        }
    }

    /// Builder method to override validation rules
    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.validator = Validator::new(config);
        self
    }

    /// Builder method to override risk banding
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run the full pipeline, recording latency and outcome.
    pub fn analyze(&self, df: &DataFrame) -> Result<Analysis> {
        let started = Instant::now();
        let outcome = self.run(df);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            Ok(analysis) => {
                self.metrics.record_analysis(
                    analysis.metrics.total_transactions as u64,
                    analysis.metrics.fraud_count as u64,
                    elapsed_ms,
                );
                debug!(
                    "Analysis finished: {} rows, {} flagged, {:.1}ms",
                    analysis.metrics.total_transactions,
                    analysis.metrics.fraud_count,
                    elapsed_ms
                );
            }
            Err(_) => self.metrics.record_failure(),
        }

        outcome
    }

    fn run(&self, df: &DataFrame) -> Result<Analysis> {
        let validation = self.validator.validate(df)?;
        let prepared = self.preparer.prepare(df)?;
        let matrix = prepared.to_matrix()?;

        let labels = self.model.classify(&matrix)?;
        let probabilities = self.model.score(&matrix)?;

        let metrics = RiskMetrics::compute(&labels, probabilities.as_deref(), &self.thresholds);
        let results = augment_results(df, &labels, probabilities.as_deref())?;
        let chart_set = charts::build_charts(&metrics, probabilities.as_deref());
        let report_text = report::generate_summary_report(&metrics, self.model.name());

        Ok(Analysis {
            metrics,
            probabilities,
            results,
            charts: chart_set,
            report: report_text,
            validation,
            model_name: self.model.name().to_string(),
        })
    }
}

/// Append prediction (and probability) columns to the uploaded table.
fn augment_results(
    df: &DataFrame,
    labels: &[u8],
    probabilities: Option<&[f64]>,
) -> Result<DataFrame> {
    let mut results = df.clone();
    let label_text: Vec<&str> = labels.iter().map(|&l| schema::class_label(l)).collect();
    results.with_column(Series::new(schema::PREDICTION_COLUMN.into(), label_text))?;
    if let Some(scores) = probabilities {
        results.with_column(Series::new(schema::PROBABILITY_COLUMN.into(), scores))?;
    }
    Ok(results)
}

/// Serialize a scored table to CSV bytes for download or disk.
pub fn to_csv_bytes(results: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(results)?;
    Ok(buf)
}
