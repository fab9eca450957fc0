//! Report generation
//!
//! Renders the plain-text summary shown on the results page and written next
//! to the scored CSV in CLI mode. Wording and number formats are stable; the
//! text is consumed by people and by downstream ticketing scripts.

pub mod charts;

use chrono::Local;

use crate::scoring::{RiskLevel, RiskMetrics};

/// Render the plain-text analysis report.
pub fn generate_summary_report(metrics: &RiskMetrics, model_name: &str) -> String {
    let mut report = format!(
        "\nFraud Detection Report\nGenerated: {}\n\nSummary:\n\
         - Total Transactions: {}\n\
         - Legitimate Transactions: {}\n\
         - Fraudulent Transactions: {}\n\
         - Fraud Rate: {:.2}%\n\
         - Risk Level: {} {}\n\nModel Used: {}\n\nRisk Assessment:\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        thousands(metrics.total_transactions),
        thousands(metrics.legitimate_count),
        thousands(metrics.fraud_count),
        metrics.fraud_rate,
        metrics.risk_level,
        metrics.risk_level.icon(),
        model_name,
    );

    match metrics.risk_level {
        RiskLevel::High => {
            report.push_str("- HIGH RISK: Fraud rate is above 5%. Immediate attention required.\n");
            report.push_str("- Consider implementing additional security measures.\n");
            report.push_str("- Review recent system changes and access patterns.\n");
        }
        RiskLevel::Medium => {
            report.push_str("- MEDIUM RISK: Fraud rate is between 2-5%. Monitor closely.\n");
            report.push_str("- Review suspicious transactions manually.\n");
            report.push_str("- Consider increasing monitoring frequency.\n");
        }
        RiskLevel::Low => {
            report.push_str("- LOW RISK: Fraud rate is below 2%. Normal operations.\n");
            report.push_str("- Continue with current security protocols.\n");
            report.push_str("- No additional action is needed at this time.\n");
        }
    }

    if let Some(summary) = &metrics.probabilities {
        report.push_str("\nProbability Analysis:\n");
        report.push_str(&format!(
            "- Average Fraud Probability: {:.3}\n",
            summary.avg_fraud_probability
        ));
        report.push_str(&format!(
            "- Maximum Fraud Probability: {:.3}\n",
            summary.max_fraud_probability
        ));
        report.push_str(&format!(
            "- Minimum Fraud Probability: {:.3}\n",
            summary.min_fraud_probability
        ));
    }

    report
}

/// Format an integer with comma thousands separators.
pub(crate) fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
