//! Translation between analyzed and original file coordinates.

use std::path::{Path, PathBuf};

use crate::location::Location;
use crate::sketch::{is_analyzed_entry, is_prototype_header, original_name};

/// Describes how one original file was presented to the analysis engine.
///
/// For ordinary files the map is the identity. For a sketch entry the engine
/// sees a renamed file whose lines may be shifted by an injected include, plus
/// a generated prototype header. Every location leaving the cache goes through
/// [`to_original`](Self::to_original).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticMap {
    original: PathBuf,
    analyzed: PathBuf,
    header: Option<PathBuf>,
    line_shift: u32,
}

impl SyntheticMap {
    /// Map for a file analyzed under its own name with no rewriting.
    pub fn identity(path: &Path) -> Self {
        Self {
            original: path.to_path_buf(),
            analyzed: path.to_path_buf(),
            header: None,
            line_shift: 0,
        }
    }

    /// Map for a rewritten file.
    pub fn new(
        original: PathBuf,
        analyzed: PathBuf,
        header: Option<PathBuf>,
        line_shift: u32,
    ) -> Self {
        Self {
            original,
            analyzed,
            header,
            line_shift,
        }
    }

    /// The file as the editor knows it.
    pub fn original(&self) -> &Path {
        &self.original
    }

    /// The file name handed to the analysis engine.
    pub fn analyzed(&self) -> &Path {
        &self.analyzed
    }

    /// The generated prototype header, if one is attached.
    pub fn header(&self) -> Option<&Path> {
        self.header.as_deref()
    }

    /// Lines injected before the original first line.
    pub fn line_shift(&self) -> u32 {
        self.line_shift
    }

    /// Converts an original-file position into the engine's coordinates.
    pub fn to_analyzed(&self, line: u32, column: u32) -> Location {
        Location::new(self.analyzed.clone(), line + self.line_shift, column)
    }

    /// Converts an engine location back to original coordinates.
    ///
    /// Returns `None` for anything inside a generated prototype header and for
    /// analyzed lines that fall inside the injected region.
    pub fn to_original(&self, loc: &Location) -> Option<Location> {
        if is_prototype_header(&loc.file) || self.header.as_deref() == Some(loc.file.as_path()) {
            return None;
        }
        if loc.file == self.analyzed && self.analyzed != self.original {
            let line = loc.line.checked_sub(self.line_shift).filter(|&l| l > 0)?;
            return Some(Location::new(self.original.clone(), line, loc.column));
        }
        if is_analyzed_entry(&loc.file) {
            return Some(Location::new(original_name(&loc.file), loc.line, loc.column));
        }
        Some(loc.clone())
    }
}
