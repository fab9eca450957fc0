//! Chart specifications for the results page
//!
//! The server never renders pixels. It emits small declarative specs that
//! the front end hands to its plotting library, and that API clients can
//! consume directly.

use serde::{Deserialize, Serialize};

use crate::scoring::RiskMetrics;

/// Fixed bin count for the probability histogram.
pub const HISTOGRAM_BINS: usize = 20;

const LEGITIMATE_COLOR: &str = "#00ff00";
const FRAUDULENT_COLOR: &str = "#ff0000";
const HISTOGRAM_COLOR: &str = "#667eea";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Histogram,
}

/// One renderable chart: parallel label/value arrays plus styling hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
}

/// Pie chart of legitimate vs fraudulent proportions.
pub fn distribution_chart(metrics: &RiskMetrics) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Pie,
        title: "Transaction Distribution".to_string(),
        labels: vec!["Legitimate".to_string(), "Fraudulent".to_string()],
        values: vec![metrics.legitimate_count as f64, metrics.fraud_count as f64],
        colors: vec![LEGITIMATE_COLOR.to_string(), FRAUDULENT_COLOR.to_string()],
        x_title: None,
        y_title: None,
    }
}

/// Bar chart of absolute counts per class.
pub fn count_chart(metrics: &RiskMetrics) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Transaction Counts".to_string(),
        labels: vec!["Legitimate".to_string(), "Fraudulent".to_string()],
        values: vec![metrics.legitimate_count as f64, metrics.fraud_count as f64],
        colors: vec![LEGITIMATE_COLOR.to_string(), FRAUDULENT_COLOR.to_string()],
        x_title: Some("Transaction Type".to_string()),
        y_title: Some("Count".to_string()),
    }
}

/// Histogram of per-row fraud probabilities over fixed `[0, 1]` bins.
pub fn probability_histogram(probabilities: &[f64]) -> ChartSpec {
    let mut counts = vec![0u64; HISTOGRAM_BINS];
    for &p in probabilities {
        let idx = ((p.clamp(0.0, 1.0) * HISTOGRAM_BINS as f64) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }
    let width = 1.0 / HISTOGRAM_BINS as f64;
    let labels = (0..HISTOGRAM_BINS)
        .map(|i| format!("{:.2}-{:.2}", i as f64 * width, (i + 1) as f64 * width))
        .collect();

    ChartSpec {
        kind: ChartKind::Histogram,
        title: "Fraud Probability Distribution".to_string(),
        labels,
        values: counts.into_iter().map(|c| c as f64).collect(),
        colors: vec![HISTOGRAM_COLOR.to_string()],
        x_title: Some("Fraud Probability".to_string()),
        y_title: Some("Count".to_string()),
    }
}

/// The charts rendered for one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSet {
    pub distribution: ChartSpec,
    pub counts: ChartSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<ChartSpec>,
}

impl ChartSet {
    /// Chart shown in the second slot: the probability histogram when the
    /// model scored, the count bars otherwise.
    pub fn secondary(&self) -> &ChartSpec {
        self.probabilities.as_ref().unwrap_or(&self.counts)
    }
}

/// Build every chart for one analysis.
pub fn build_charts(metrics: &RiskMetrics, probabilities: Option<&[f64]>) -> ChartSet {
    ChartSet {
        distribution: distribution_chart(metrics),
        counts: count_chart(metrics),
        probabilities: probabilities.map(probability_histogram),
    }
}
