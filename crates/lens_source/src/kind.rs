//! File classification by extension.

use std::path::Path;

/// How a file participates in analysis, derived from its extension.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FileKind {
    /// A sketch entry file (`.ino`) that must be rewritten before analysis.
    SketchEntry,
    /// A header (`.h`, `.hpp`, `.hh`), parsed in header mode.
    Header,
    /// A C or C++ implementation file (`.c`, `.cpp`, `.cc`, `.cxx`).
    Source,
    /// Anything else.
    Other,
}

impl FileKind {
    /// Classifies `path` by its final extension.
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("ino") => FileKind::SketchEntry,
            Some("h" | "hpp" | "hh") => FileKind::Header,
            Some("c" | "cpp" | "cc" | "cxx") => FileKind::Source,
            _ => FileKind::Other,
        }
    }

    /// Returns `true` for headers.
    pub fn is_header(self) -> bool {
        self == FileKind::Header
    }

    /// Returns `true` for files that form their own translation unit in a
    /// project-wide pass.
    pub fn is_project_source(self) -> bool {
        matches!(self, FileKind::SketchEntry | FileKind::Source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(FileKind::of(Path::new("/s/Blink.ino")), FileKind::SketchEntry);
        assert_eq!(FileKind::of(Path::new("/s/led.HPP")), FileKind::Header);
        assert_eq!(FileKind::of(Path::new("/s/led.cc")), FileKind::Source);
        assert_eq!(FileKind::of(Path::new("/s/Blink.ino.cpp")), FileKind::Source);
        assert_eq!(FileKind::of(Path::new("/s/README")), FileKind::Other);
    }

    #[test]
    fn project_sources() {
        assert!(FileKind::SketchEntry.is_project_source());
        assert!(FileKind::Source.is_project_source());
        assert!(!FileKind::Header.is_project_source());
        assert!(FileKind::Header.is_header());
    }
}
