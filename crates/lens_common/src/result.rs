//! Common result and error types for the code-intelligence layer.

/// The standard result type for operations that can fail for internal reasons.
///
/// User-facing problems (a file that does not parse, a cursor on whitespace)
/// are never reported through `Err`; they degrade to synthetic diagnostics or
/// empty results. `Err` means the layer itself is broken, for example when the
/// analysis worker has stopped.
pub type LensResult<T> = Result<T, InternalError>;

/// An internal error indicating a fault in the layer, not a problem with the sketch.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
