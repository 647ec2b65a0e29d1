//! Lexical path normalization and sketch-root scoping.

use std::path::{Component, Path, PathBuf};

/// Makes `path` absolute against `base` and removes `.` and `..` components.
///
/// Normalization is purely lexical; the filesystem is never consulted, so
/// unsaved buffers that do not exist on disk still get stable keys.
pub fn normalize_absolute(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Returns `true` if `path` lies strictly inside `root`.
///
/// Both paths are compared component-wise after lexical normalization, which
/// gives the same answer as a string prefix test against `root` plus a
/// trailing separator. An empty root contains nothing.
pub fn is_in_root(root: &Path, path: &Path) -> bool {
    if root.as_os_str().is_empty() || path.as_os_str().is_empty() {
        return false;
    }
    let root = normalize_absolute(root, Path::new("/"));
    let path = normalize_absolute(path, Path::new("/"));
    path != root && path.starts_with(&root)
}

/// Renders a path with forward slashes, as used in `#line` markers and
/// dedup keys.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
