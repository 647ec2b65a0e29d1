//! Change detection for diagnostic sets.

use lens_common::{ContentHash, HashBuilder};
use lens_source::display_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;

fn feed(builder: HashBuilder, diag: &Diagnostic) -> HashBuilder {
    let builder = builder
        .str(&display_path(&diag.file))
        .str(&diag.message)
        .u64(u64::from(diag.line))
        .u64(u64::from(diag.column))
        .u64(u64::from(diag.severity.rank()))
        .u64(diag.children.len() as u64);
    diag.children.iter().fold(builder, feed)
}

/// Content hash of an ordered diagnostic list, children included.
pub fn diagnostics_hash(diags: &[Diagnostic]) -> ContentHash {
    diags
        .iter()
        .fold(HashBuilder::new().u64(diags.len() as u64), feed)
        .finish()
}

/// Remembers the last published diagnostic hash per channel.
///
/// A channel is usually the file whose diagnostics are shown; project-wide
/// passes use their own channel. Identical sets on consecutive passes are
/// reported as unchanged so the editor is not notified twice.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    last: HashMap<PathBuf, ContentHash>,
}

impl ChangeNotifier {
    /// Creates a notifier with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `diags` for `channel` and returns `true` if they differ from
    /// the previously recorded set.
    pub fn observe(&mut self, channel: &Path, diags: &[Diagnostic]) -> bool {
        let hash = diagnostics_hash(diags);
        match self.last.insert(channel.to_path_buf(), hash) {
            Some(previous) => previous != hash,
            None => true,
        }
    }

    /// Forgets all history so the next set is always reported.
    pub fn clear(&mut self) {
        self.last.clear();
    }
}
