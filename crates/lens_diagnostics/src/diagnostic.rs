//! Diagnostic trees in original file coordinates.

use lens_source::{display_path, Location};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::severity::Severity;

/// Message of the synthetic diagnostic reported when no translation unit
/// could be produced for a file.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse translation unit";

/// A diagnostic reported to the editor.
///
/// A leading warning or error owns zero or more child notes. Diagnostics are
/// built fresh on every extraction and handed to the caller by value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The original file the diagnostic points into.
    pub file: PathBuf,
    /// Line number (1-indexed, 0 for file-level diagnostics).
    pub line: u32,
    /// Column number (1-indexed, 0 for file-level diagnostics).
    pub column: u32,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// Attached notes.
    pub children: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Creates a diagnostic at a location.
    pub fn new(severity: Severity, location: Location, message: impl Into<String>) -> Self {
        Self {
            file: location.file,
            line: location.line,
            column: location.column,
            severity,
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Creates the file-level error reported when parsing failed entirely.
    pub fn parse_failure(file: &Path) -> Self {
        Self::new(Severity::Error, Location::new(file, 0, 0), PARSE_FAILURE_MESSAGE)
    }

    /// Like [`parse_failure`](Self::parse_failure), naming the file in the message.
    ///
    /// Used by project-wide passes where many files report into one list.
    pub fn parse_failure_in(file: &Path) -> Self {
        let message = format!("{PARSE_FAILURE_MESSAGE} ({})", display_path(file));
        Self::new(Severity::Error, Location::new(file, 0, 0), message)
    }

    /// Adds a child note to this diagnostic.
    pub fn with_child(mut self, child: Diagnostic) -> Self {
        self.children.push(child);
        self
    }

    /// The diagnostic's location.
    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line, self.column)
    }

    /// Identity used to deduplicate notes: `file:line:col:message`.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            display_path(&self.file),
            self.line,
            self.column,
            self.message
        )
    }

    /// Presentation order: severity rank, then file, line, column.
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.severity
            .rank()
            .cmp(&other.severity.rank())
            .then_with(|| self.file.cmp(&other.file))
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.column.cmp(&other.column))
    }

    /// Total order used for merged project lists: position, then message and severity.
    pub fn cmp_full(&self, other: &Self) -> Ordering {
        self.cmp_position(other)
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.severity.cmp(&other.severity))
    }
}

/// Sorts a merged list by [`Diagnostic::cmp_full`] and removes duplicates.
///
/// Two diagnostics are duplicates when position, severity and message match;
/// the first occurrence keeps its children.
pub fn sort_and_dedup(diags: &mut Vec<Diagnostic>) {
    diags.sort_by(Diagnostic::cmp_full);
    let mut seen = HashSet::new();
    diags.retain(|d| seen.insert((d.dedup_key(), d.severity)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(sev: Severity, file: &str, line: u32, msg: &str) -> Diagnostic {
        Diagnostic::new(sev, Location::new(file, line, 1), msg)
    }

    #[test]
    fn parse_failure_is_file_level_error() {
        let d = Diagnostic::parse_failure(Path::new("/s/Blink.ino"));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!((d.line, d.column), (0, 0));
        assert_eq!(d.message, "Failed to parse translation unit");
    }

    #[test]
    fn parse_failure_names_file() {
        let d = Diagnostic::parse_failure_in(Path::new("/s/led.cpp"));
        assert_eq!(d.message, "Failed to parse translation unit (/s/led.cpp)");
    }

    #[test]
    fn builder_children() {
        let d = diag(Severity::Error, "/s/a.cpp", 3, "no matching function")
            .with_child(diag(Severity::Note, "/s/a.h", 1, "candidate"));
        assert_eq!(d.children.len(), 1);
        assert_eq!(d.children[0].severity, Severity::Note);
    }

    #[test]
    fn dedup_key_format() {
        let d = diag(Severity::Note, "/s/a.h", 1, "candidate");
        assert_eq!(d.dedup_key(), "/s/a.h:1:1:candidate");
    }

    #[test]
    fn errors_sort_before_warnings() {
        let w = diag(Severity::Warning, "/s/a.cpp", 1, "w");
        let e = diag(Severity::Error, "/s/b.cpp", 9, "e");
        assert_eq!(e.cmp_position(&w), Ordering::Less);
    }

    #[test]
    fn sort_and_dedup_merges() {
        let mut list = vec![
            diag(Severity::Warning, "/s/a.cpp", 2, "unused"),
            diag(Severity::Error, "/s/b.cpp", 1, "boom"),
            diag(Severity::Warning, "/s/a.cpp", 2, "unused"),
        ];
        sort_and_dedup(&mut list);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].message, "boom");
    }

    #[test]
    fn serde_roundtrip() {
        let d = diag(Severity::Error, "/s/a.cpp", 3, "x")
            .with_child(diag(Severity::Note, "/s/a.cpp", 1, "y"));
        let json = serde_json::to_string(&d).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}
