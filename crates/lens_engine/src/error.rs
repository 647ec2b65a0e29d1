//! Error types reported by the analysis engine.

use std::path::PathBuf;

/// Errors returned by [`AnalysisEngine`](crate::AnalysisEngine) and
/// [`TranslationUnit`](crate::TranslationUnit) operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine could not produce a translation unit.
    #[error("failed to parse {file}: {reason}")]
    ParseFailed {
        /// The main file of the request.
        file: PathBuf,
        /// Engine-specific failure description.
        reason: String,
    },

    /// An existing translation unit could not be reparsed.
    #[error("failed to reparse {file}: {reason}")]
    ReparseFailed {
        /// The unit's main file.
        file: PathBuf,
        /// Engine-specific failure description.
        reason: String,
    },

    /// The request named a main file with no matching unsaved buffer.
    #[error("no unsaved buffer for main file {0}")]
    MissingMainFile(PathBuf),

    /// The engine cannot be used at all.
    #[error("analysis engine unavailable: {0}")]
    Unavailable(String),
}
