//! Snapshots of editor buffers.

use lens_common::ContentHash;
use std::path::PathBuf;

use crate::kind::FileKind;

/// An owned copy of one open file's current text.
///
/// Snapshots are taken on the caller's thread before work is handed to the
/// analysis worker, so the worker never reads live editor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBuffer {
    /// Path of the file as the editor knows it.
    pub path: PathBuf,
    /// Full current text, including unsaved edits.
    pub code: String,
}

impl FileBuffer {
    /// Creates a snapshot.
    pub fn new(path: impl Into<PathBuf>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }

    /// Hash of the buffer text.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of_str(&self.code)
    }

    /// Classification of the buffer's path.
    pub fn kind(&self) -> FileKind {
        FileKind::of(&self.path)
    }
}
