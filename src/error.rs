use thiserror::Error;

use crate::grid::FieldId;

// Unified error type for fvmg

#[derive(Error, Debug)]
pub enum MgError {
    #[error("invalid build configuration: {0}")]
    Config(String),
    #[error("field {field:?} is not allocated on level {dim:?}")]
    MissingField { field: FieldId, dim: [usize; 3] },
    #[error("level shape mismatch: {0}")]
    Shape(String),
    #[error("fields {0:?} and {1:?} must be distinct")]
    AliasedFields(FieldId, FieldId),
    #[error("operator has not been rebuilt on this level")]
    NotRebuilt,
    #[error("boundary exchange of {field:?} failed: {reason}")]
    Exchange { field: FieldId, reason: String },
}
