//! Naming rules for synthetic analyzed files.
//!
//! A sketch entry `Blink.ino` is handed to the analysis engine as
//! `Blink.ino.cpp`, and its generated prototype header is `Blink.ino.hpp`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::kind::FileKind;

const ANALYZED_SUFFIX: &str = ".cpp";
const HEADER_SUFFIX: &str = ".hpp";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn name_ends_with(path: &Path, tail: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > tail.len() && n.to_ascii_lowercase().ends_with(tail))
}

/// Returns the identity under which `path` is analyzed.
///
/// Sketch entries gain a `.cpp` suffix; every other file keeps its identity.
pub fn analyzed_name(path: &Path) -> PathBuf {
    if FileKind::of(path) == FileKind::SketchEntry {
        with_suffix(path, ANALYZED_SUFFIX)
    } else {
        path.to_path_buf()
    }
}

/// Returns the path of the generated prototype header for a sketch entry.
pub fn prototype_header_path(path: &Path) -> PathBuf {
    with_suffix(path, HEADER_SUFFIX)
}

/// Returns the include line that pulls the prototype header into the
/// analyzed source.
pub fn include_directive(path: &Path) -> String {
    let header = prototype_header_path(path);
    let name = header
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("#include \"{name}\"")
}

/// Returns `true` for a synthetic analyzed sketch entry (`*.ino.cpp`).
pub fn is_analyzed_entry(path: &Path) -> bool {
    name_ends_with(path, ".ino.cpp")
}

/// Returns `true` for a generated prototype header (`*.ino.hpp`).
pub fn is_prototype_header(path: &Path) -> bool {
    name_ends_with(path, ".ino.hpp")
}

/// Maps a synthetic name back to the sketch entry it was derived from.
///
/// Both `Blink.ino.cpp` and `Blink.ino.hpp` map to `Blink.ino`; other paths
/// are returned unchanged.
pub fn original_name(path: &Path) -> PathBuf {
    if is_analyzed_entry(path) || is_prototype_header(path) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}
