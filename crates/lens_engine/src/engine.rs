//! The analysis engine entry point.

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::options::ParseOptions;
use crate::unit::TranslationUnit;

/// In-memory file content that overrides the file on disk for a parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsavedFile {
    /// Path under which the engine sees the content.
    pub path: PathBuf,
    /// The content.
    pub contents: String,
}

impl UnsavedFile {
    /// Creates an unsaved buffer.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Everything the engine needs to build one translation unit.
#[derive(Clone, Copy, Debug)]
pub struct ParseRequest<'a> {
    /// The file to compile as the main file.
    pub main_file: &'a Path,
    /// Compiler arguments.
    pub args: &'a [String],
    /// Unsaved buffers, the main file's among them.
    pub unsaved: &'a [UnsavedFile],
    /// Parse options.
    pub options: ParseOptions,
}

impl ParseRequest<'_> {
    /// Returns the unsaved content of the main file, if present.
    pub fn main_contents(&self) -> Option<&str> {
        self.unsaved
            .iter()
            .find(|f| f.path == self.main_file)
            .map(|f| f.contents.as_str())
    }
}

/// An external service that turns source text into queryable AST handles.
///
/// Handles are not safe to use from two threads at once; callers serialize
/// all use of an engine and its units.
pub trait AnalysisEngine: Send + Sync {
    /// Parses a new translation unit.
    fn parse(&self, request: &ParseRequest<'_>) -> Result<Box<dyn TranslationUnit>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_contents_lookup() {
        let unsaved = vec![
            UnsavedFile::new("/s/Blink.ino.hpp", "#pragma once\n"),
            UnsavedFile::new("/s/Blink.ino.cpp", "void setup(){}"),
        ];
        let req = ParseRequest {
            main_file: Path::new("/s/Blink.ino.cpp"),
            args: &[],
            unsaved: &unsaved,
            options: ParseOptions::scan(),
        };
        assert_eq!(req.main_contents(), Some("void setup(){}"));
    }
}
