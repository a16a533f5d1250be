//! Error types for rendering.
//!
//! Decode problems never show up here as failures of a whole render; they are
//! turned into sentinel cells. What remains is cancellation, a broken sink and
//! configuration problems.

use thiserror::Error;

/// Errors that stop a render call.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The cancellation token fired while rows were still being pulled.
    #[error("Stream cancelled")]
    StreamCancelled,

    /// Writing to the sink failed.
    #[error("Failed to write output: {0}")]
    RenderIo(#[from] std::io::Error),

    /// The CSV writer failed.
    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The upstream row producer failed.
    #[error("Row source failed: {0}")]
    Source(String),

    /// The output configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl OutputError {
    /// Create a row source error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is a cancellation rather than a failure.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::StreamCancelled)
    }
}
