//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
///
/// # Example
///
/// ```rust,no_run
/// use treebank_sentiment::error::PipelineError;
///
/// fn handle_error(e: PipelineError) {
///     match &e {
///         PipelineError::MalformedTree(_) => {
///             // Bad input tree - reject the request
///         }
///         PipelineError::EmptyDocument => {
///             // No sentences submitted - missing-input failure path
///         }
///         PipelineError::ModelLoad(_) => {
///             // Parameter bundle missing or corrupt - fatal at startup
///         }
///         PipelineError::Download(_) => {
///             // Network issue - retry with backoff
///         }
///         PipelineError::Device(_) => {
///             // GPU unavailable - fall back to CPU
///         }
///         PipelineError::DimensionMismatch(_) | PipelineError::Unexpected(_) => {
///             // Internal error - report bug
///             eprintln!("Internal error: {e}");
///         }
///         _ => {
///             // Future error variants
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Input tree is structurally invalid (wrong child count, missing word on a leaf).
    /// The request is rejected; not retried.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// Vector sizes disagree with the model dimensionality. Indicates a
    /// parameter/tree mismatch bug; fatal for the request.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Zero sentences were submitted for aggregation.
    #[error("document contains no sentences")]
    EmptyDocument,

    /// Parameter bundle missing or corrupt. Fatal at initialization.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}
