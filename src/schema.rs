//! Expected transaction table schema
//!
//! Uploads follow the anonymized credit card transaction layout: PCA
//! components `V1`..`V28`, a raw `Amount` column, and optionally a binary
//! `Class` label (0 = legitimate, 1 = fraud).

/// Binary label column, stripped before scoring when present.
pub const LABEL_COLUMN: &str = "Class";

/// Transaction amount column.
pub const AMOUNT_COLUMN: &str = "Amount";

/// Number of canonical anonymized feature columns.
pub const CANONICAL_FEATURE_COUNT: usize = 28;

/// Column appended to the result artifact with the string-mapped prediction.
pub const PREDICTION_COLUMN: &str = "Fraud Prediction";

/// Column appended to the result artifact with the fraud-class probability.
pub const PROBABILITY_COLUMN: &str = "Fraud Probability";

/// String label for class 0.
pub const LEGITIMATE_LABEL: &str = "Legitimate";

/// String label for class 1.
pub const FRAUDULENT_LABEL: &str = "Fraudulent";

/// The 28 canonical anonymized feature names: `V1`..`V28`.
pub fn canonical_features() -> Vec<String> {
    (1..=CANONICAL_FEATURE_COUNT).map(|i| format!("V{i}")).collect()
}

/// Full model input schema: the canonical features plus `Amount`.
pub fn model_features() -> Vec<String> {
    let mut features = canonical_features();
    features.push(AMOUNT_COLUMN.to_string());
    features
}

/// Map a binary prediction to its display label.
pub fn class_label(prediction: u8) -> &'static str {
    if prediction == 1 {
        FRAUDULENT_LABEL
    } else {
        LEGITIMATE_LABEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_features() {
        let features = canonical_features();
        assert_eq!(features.len(), 28);
        assert_eq!(features[0], "V1");
        assert_eq!(features[27], "V28");
    }

    #[test]
    fn test_model_features_include_amount() {
        let features = model_features();
        assert_eq!(features.len(), 29);
        assert_eq!(features.last().map(String::as_str), Some("Amount"));
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(class_label(0), "Legitimate");
        assert_eq!(class_label(1), "Fraudulent");
    }
}
