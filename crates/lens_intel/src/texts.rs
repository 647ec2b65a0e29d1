//! File text lookup for documentation fallbacks.

use lens_engine::UnsavedFile;
use lens_source::FileBuffer;
use std::borrow::Cow;
use std::path::Path;

/// Resolves the current text of a file.
///
/// Unsaved engine buffers win over editor snapshots, which win over the file
/// on disk. Engine buffers are in analyzed coordinates, so line numbers taken
/// from cursors can be used against them directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceTexts<'a> {
    unsaved: &'a [UnsavedFile],
    files: &'a [FileBuffer],
}

impl<'a> SourceTexts<'a> {
    /// Creates a lookup over engine buffers and editor snapshots.
    pub fn new(unsaved: &'a [UnsavedFile], files: &'a [FileBuffer]) -> Self {
        Self { unsaved, files }
    }

    /// Returns the text of `path`, or `None` if it cannot be found anywhere.
    pub fn text(&self, path: &Path) -> Option<Cow<'a, str>> {
        if let Some(buf) = self.unsaved.iter().find(|f| f.path == path) {
            return Some(Cow::Borrowed(buf.contents.as_str()));
        }
        if let Some(file) = self.files.iter().find(|f| f.path == path) {
            return Some(Cow::Borrowed(file.code.as_str()));
        }
        std::fs::read_to_string(path).ok().map(Cow::Owned)
    }
}
