//! Spec validation errors.

/// Errors raised while validating or hashing a disease spec
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("duplicate clinical item id: '{0}'")]
    DuplicateItemId(String),

    #[error("warning sign '{item_id}' overrides to '{outcome}', expected refer_immediately or emergency")]
    InvalidOverride { item_id: String, outcome: String },

    #[error("spec serialization failed: {0}")]
    Serialization(String),
}

/// Result type alias for spec validation and compilation
pub type SpecResult<T> = Result<T, SpecError>;
