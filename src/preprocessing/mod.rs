//! Upload preprocessing
//!
//! Two stages run before any model call:
//! - schema validation of the raw upload ([`Validator`])
//! - feature preparation: label split, numeric coercion, zero fill
//!   ([`FeaturePreparer`])

mod preparer;
mod validator;

pub use preparer::{FeaturePreparer, PreparedFeatures};
pub use validator::{ValidationConfig, ValidationError, ValidationReport, Validator};

use polars::prelude::DataType;

/// Whether a dtype counts as numeric for validation and preparation.
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
