//! Error types for translation-unit caching.

use std::path::PathBuf;

/// Errors returned by the translation-unit caches.
///
/// A failed parse never poisons the cache: no entry is created and the next
/// request for the same file tries again.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Every attempt of the recovery ladder failed.
    #[error("failed to parse {path} after {attempts} attempts: {reason}")]
    ParseFailed {
        /// The original file.
        path: PathBuf,
        /// Number of attempts made.
        attempts: usize,
        /// Failure of the last attempt.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failed_display() {
        let err = CacheError::ParseFailed {
            path: PathBuf::from("/s/Blink.ino"),
            attempts: 5,
            reason: "no-args: scripted failure".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/s/Blink.ino"));
        assert!(msg.contains("after 5 attempts"));
        assert!(msg.contains("no-args"));
    }
}
