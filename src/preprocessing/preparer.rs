//! Feature preparation for scoring
//!
//! Splits off the label column when the upload carries one, then forces every
//! remaining column to `f64`: numeric dtypes are widened, text columns are
//! parsed with unparseable values becoming null, and columns that cannot be
//! coerced at all are replaced with zeros. Nulls are filled with 0.0 so the
//! resulting table always converts cleanly into a feature matrix.

use ndarray::Array2;
use polars::prelude::*;

use crate::error::Result;
use crate::schema;

/// Prepared model input: an all-`f64`, null-free table plus the extracted
/// label column when the upload had one.
#[derive(Debug, Clone)]
pub struct PreparedFeatures {
    pub features: DataFrame,
    pub labels: Option<Series>,
}

impl PreparedFeatures {
    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_labels(&self) -> bool {
        self.labels.is_some()
    }

    pub fn num_rows(&self) -> usize {
        self.features.height()
    }

    /// Convert to a row-major feature matrix for the classifier.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let rows = self.features.height();
        let cols = self.features.width();
        let mut matrix = Array2::zeros((rows, cols));
        for (j, column) in self.features.get_columns().iter().enumerate() {
            let ca = column.as_materialized_series().f64()?;
            for (i, value) in ca.into_no_null_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        Ok(matrix)
    }
}

/// Coerces raw uploads into model-ready numeric tables.
#[derive(Debug, Clone)]
pub struct FeaturePreparer {
    label_column: String,
}

impl Default for FeaturePreparer {
    fn default() -> Self {
        Self {
            label_column: schema::LABEL_COLUMN.to_string(),
        }
    }
}

impl FeaturePreparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to override the label column name
    pub fn with_label_column(mut self, name: impl Into<String>) -> Self {
        self.label_column = name.into();
        self
    }

    /// Split off the label column and coerce everything else to `f64`.
    pub fn prepare(&self, df: &DataFrame) -> Result<PreparedFeatures> {
        let (working, labels) = match df.column(&self.label_column) {
            Ok(col) => {
                let labels = col.as_materialized_series().clone();
                (df.drop(&self.label_column)?, Some(labels))
            }
            Err(_) => (df.clone(), None),
        };

        let columns: Vec<Column> = working
            .get_columns()
            .iter()
            .map(|col| Self::coerce_column(col.as_materialized_series()).into())
            .collect();

        Ok(PreparedFeatures {
            features: DataFrame::new(columns)?,
            labels,
        })
    }

    /// Force a single column to null-free `f64`, falling back to zeros when
    /// the dtype cannot be cast at all.
    fn coerce_column(series: &Series) -> Series {
        if series.dtype() == &DataType::Float64 && series.null_count() == 0 {
            return series.clone();
        }
        match series.cast(&DataType::Float64) {
            Ok(cast) => Self::fill_zero(&cast),
            Err(_) => Series::new(series.name().clone(), vec![0.0f64; series.len()]),
        }
    }

    fn fill_zero(series: &Series) -> Series {
        match series.f64() {
            Ok(ca) => {
                let filled: Float64Chunked =
                    ca.into_iter().map(|opt| Some(opt.unwrap_or(0.0))).collect();
                filled.with_name(series.name().clone()).into_series()
            }
            Err(_) => Series::new(series.name().clone(), vec![0.0f64; series.len()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all_f64_no_nulls(df: &DataFrame) {
        for col in df.get_columns() {
            assert_eq!(col.dtype(), &DataType::Float64, "column {}", col.name());
            assert_eq!(col.null_count(), 0, "column {}", col.name());
        }
    }

    #[test]
    fn test_label_column_extracted() {
        let df = DataFrame::new(vec![
            Series::new("V1".into(), &[0.5f64, -1.2]).into(),
            Series::new("Amount".into(), &[10.0f64, 25.5]).into(),
            Series::new("Class".into(), &[0i64, 1]).into(),
        ])
        .unwrap();

        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        assert!(prepared.has_labels());
        assert_eq!(prepared.features.width(), 2);
        assert!(prepared.feature_names().iter().all(|n| n != "Class"));
        assert_all_f64_no_nulls(&prepared.features);
    }

    #[test]
    fn test_no_label_column() {
        let df = DataFrame::new(vec![Series::new("V1".into(), &[0.5f64]).into()]).unwrap();
        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        assert!(!prepared.has_labels());
        assert_eq!(prepared.features.width(), 1);
    }

    #[test]
    fn test_text_column_coerced_with_zero_default() {
        let df = DataFrame::new(vec![
            Series::new("V1".into(), &["1.5", "oops", "3"]).into(),
            Series::new("V2".into(), &[1.0f64, 2.0, 3.0]).into(),
        ])
        .unwrap();

        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        assert_all_f64_no_nulls(&prepared.features);
        let v1 = prepared.features.column("V1").unwrap();
        let values: Vec<f64> = v1
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(values, vec![1.5, 0.0, 3.0]);
    }

    #[test]
    fn test_nulls_filled_with_zero() {
        let df = DataFrame::new(vec![
            Series::new("V1".into(), &[Some(1.0f64), None, Some(3.0)]).into()
        ])
        .unwrap();

        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        assert_all_f64_no_nulls(&prepared.features);
        let values: Vec<f64> = prepared
            .features
            .column("V1")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(values, vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_integer_columns_widened() {
        let df =
            DataFrame::new(vec![Series::new("Amount".into(), &[10i64, 25, 400]).into()]).unwrap();
        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        assert_all_f64_no_nulls(&prepared.features);
    }

    #[test]
    fn test_uncastable_column_becomes_zeros() {
        let nested = Series::new(
            "tags".into(),
            &[
                Series::new("".into(), &[1i64, 2]),
                Series::new("".into(), &[3i64]),
            ],
        );
        let df = DataFrame::new(vec![
            Series::new("V1".into(), &[0.5f64, 1.5]).into(),
            nested.into(),
        ])
        .unwrap();

        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        assert_all_f64_no_nulls(&prepared.features);
        let tags: Vec<f64> = prepared
            .features
            .column("tags")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(tags, vec![0.0, 0.0]);
    }

    #[test]
    fn test_to_matrix_row_major() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), &[1.0f64, 3.0]).into(),
            Series::new("b".into(), &[2.0f64, 4.0]).into(),
        ])
        .unwrap();

        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        let matrix = prepared.to_matrix().unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[0, 1]], 2.0);
        assert_eq!(matrix[[1, 0]], 3.0);
        assert_eq!(matrix[[1, 1]], 4.0);
    }

    #[test]
    fn test_zero_row_frame() {
        let df =
            DataFrame::new(vec![Series::new("V1".into(), Vec::<f64>::new()).into()]).unwrap();
        let prepared = FeaturePreparer::new().prepare(&df).unwrap();
        assert_eq!(prepared.num_rows(), 0);
        let matrix = prepared.to_matrix().unwrap();
        assert_eq!(matrix.shape(), &[0, 1]);
    }
}
