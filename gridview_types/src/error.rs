//! Error types for decoding tagged values.
//!
//! None of these abort a render. Callers turn them into sentinel cells so a
//! partially undecodable row still produces output.

use thiserror::Error;

use crate::TypeTag;

/// Errors raised while interpreting a tagged value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The value's encoding could not be interpreted (malformed JSON, schema mismatch).
    #[error("Value not decoded: {0}")]
    NotDecoded(String),

    /// The type id has no entry in the registry.
    #[error("Unknown type id: {0}")]
    UnknownType(i32),

    /// The tag has no sub-column structure.
    #[error("Values of type {0} cannot be flattened")]
    NotFlattenable(TypeTag),

    /// A schema or class definition is unusable.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A structured reader failed on one field.
    #[error("Failed to read field '{field}': {reason}")]
    FieldRead {
        /// Field name.
        field: String,
        /// What went wrong.
        reason: String,
    },
}

impl DecodeError {
    /// Create a not-decoded error.
    pub fn not_decoded(msg: impl Into<String>) -> Self {
        Self::NotDecoded(msg.into())
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    /// Create a field read error.
    pub fn field_read(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldRead {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
