//! Aggregate fraud-risk metrics
//!
//! Turns a vector of 0/1 predictions into the headline numbers shown in
//! reports and API responses: counts, fraud rate as a percentage, and a
//! qualitative risk band with its icon.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative banding of the observed fraud rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band a fraud-rate percentage. Both cutoffs are strict, so a rate
    /// sitting exactly on a boundary stays in the lower band.
    pub fn from_rate(rate: f64, thresholds: &RiskThresholds) -> Self {
        if rate > thresholds.high {
            RiskLevel::High
        } else if rate > thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RiskLevel::Low => "✅",
            RiskLevel::Medium => "⚡",
            RiskLevel::High => "⚠️",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fraud-rate percentages above which the band escalates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Above this rate the band is at least MEDIUM
    pub medium: f64,
    /// Above this rate the band is HIGH
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 2.0,
            high: 5.0,
        }
    }
}

impl RiskThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the MEDIUM cutoff
    pub fn with_medium(mut self, rate: f64) -> Self {
        self.medium = rate;
        self
    }

    /// Builder method to set the HIGH cutoff
    pub fn with_high(mut self, rate: f64) -> Self {
        self.high = rate;
        self
    }
}

/// Spread of per-row fraud probabilities, present only when the model scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProbabilitySummary {
    pub avg_fraud_probability: f64,
    pub max_fraud_probability: f64,
    pub min_fraud_probability: f64,
}

/// Headline numbers for one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub total_transactions: usize,
    pub legitimate_count: usize,
    pub fraud_count: usize,
    /// Percentage in `[0, 100]`
    pub fraud_rate: f64,
    pub risk_level: RiskLevel,
    #[serde(flatten)]
    pub probabilities: Option<ProbabilitySummary>,
}

impl RiskMetrics {
    /// Aggregate predictions (and optional probabilities) into metrics.
    ///
    /// An empty prediction vector yields zero counts, a 0.0 rate and a LOW
    /// band rather than an error.
    pub fn compute(
        predictions: &[u8],
        probabilities: Option<&[f64]>,
        thresholds: &RiskThresholds,
    ) -> Self {
        let total_transactions = predictions.len();
        let fraud_count = predictions.iter().filter(|&&p| p == 1).count();
        let legitimate_count = total_transactions - fraud_count;
        let fraud_rate = if total_transactions == 0 {
            0.0
        } else {
            fraud_count as f64 / total_transactions as f64 * 100.0
        };
        let risk_level = RiskLevel::from_rate(fraud_rate, thresholds);
        let probabilities = probabilities
            .filter(|p| !p.is_empty())
            .map(ProbabilitySummary::from_scores);

        Self {
            total_transactions,
            legitimate_count,
            fraud_count,
            fraud_rate,
            risk_level,
            probabilities,
        }
    }
}

impl ProbabilitySummary {
    fn from_scores(scores: &[f64]) -> Self {
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        Self {
            avg_fraud_probability: avg,
            max_fraud_probability: max,
            min_fraud_probability: min,
        }
    }
}
