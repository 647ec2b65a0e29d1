//! Source locations in original and analyzed file coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A point in a file as reported by the analysis engine.
///
/// Lines and columns are 1-indexed; a line of 0 means "no position".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// The file containing the point.
    pub file: PathBuf,
    /// The line number (1-indexed).
    pub line: u32,
    /// The column number (1-indexed).
    pub column: u32,
}

impl Location {
    /// Creates a location.
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Returns `true` if the location names no file.
    pub fn is_unknown(&self) -> bool {
        self.file.as_os_str().is_empty()
    }

    /// Returns `true` if the location is in `file`.
    pub fn is_in(&self, file: &Path) -> bool {
        self.file == file
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A navigation result in original file coordinates.
///
/// Never points into a generated prototype header or a synthetic analyzed
/// file name; those are translated back by
/// [`SyntheticMap`](crate::SyntheticMap) before a target is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JumpTarget {
    /// The original file.
    pub file: PathBuf,
    /// The line number (1-indexed).
    pub line: u32,
    /// The column number (1-indexed).
    pub column: u32,
}

impl From<Location> for JumpTarget {
    fn from(loc: Location) -> Self {
        Self {
            file: loc.file,
            line: loc.line,
            column: loc.column,
        }
    }
}

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// The extent of a function body, from its opening to its closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyRange {
    /// Line of the opening brace.
    pub start_line: u32,
    /// Column of the opening brace.
    pub start_column: u32,
    /// Line of the closing brace.
    pub end_line: u32,
    /// Column just past the closing brace.
    pub end_column: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let loc = Location::new("/s/Blink.ino", 10, 5);
        assert_eq!(format!("{loc}"), "/s/Blink.ino:10:5");
    }

    #[test]
    fn unknown_location() {
        assert!(Location::new("", 0, 0).is_unknown());
        assert!(!Location::new("/a.cpp", 1, 1).is_unknown());
    }

    #[test]
    fn jump_target_from_location() {
        let t = JumpTarget::from(Location::new("/s/a.cpp", 3, 7));
        assert_eq!(t.line, 3);
        assert_eq!(format!("{t}"), "/s/a.cpp:3:7");
    }

    #[test]
    fn ordering_is_file_line_column() {
        let a = Location::new("/s/a.cpp", 3, 9);
        let b = Location::new("/s/a.cpp", 4, 1);
        let c = Location::new("/s/b.cpp", 1, 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn serde_roundtrip() {
        let t = JumpTarget::from(Location::new("/s/a.cpp", 3, 7));
        let json = serde_json::to_string(&t).unwrap();
        let back: JumpTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
