//! Project-wide diagnostics aggregation.

use lens_common::{ContentHash, HashBuilder};
use lens_diagnostics::{sort_and_dedup, Diagnostic};
use lens_engine::UnsavedFile;
use lens_source::sketch::analyzed_name;
use lens_source::{display_path, FileBuffer};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::builder::UnitBuilder;
use crate::unit_cache::{args_hash, CacheStats, CachedUnit, UnitAction};

/// A project source file's unit and the inputs it was built from.
#[derive(Debug)]
pub struct ProjectUnit {
    unit: Option<CachedUnit>,
    content_hash: Option<ContentHash>,
    args_hash: ContentHash,
    analyzed: PathBuf,
    headers_signature: ContentHash,
    diagnostics: Vec<Diagnostic>,
}

impl ProjectUnit {
    fn pending(analyzed: PathBuf) -> Self {
        Self {
            unit: None,
            content_hash: None,
            args_hash: ContentHash::default(),
            analyzed,
            headers_signature: ContentHash::default(),
            diagnostics: Vec::new(),
        }
    }

    /// The live unit; `None` when the last build failed.
    pub fn unit(&self) -> Option<&CachedUnit> {
        self.unit.as_ref()
    }

    /// Hash of the content last analyzed.
    pub fn content_hash(&self) -> Option<ContentHash> {
        self.content_hash
    }

    /// Hash of the arguments the unit was requested with.
    pub fn args_hash(&self) -> ContentHash {
        self.args_hash
    }

    /// Signature of the open headers the unit was analyzed against.
    pub fn headers_signature(&self) -> ContentHash {
        self.headers_signature
    }

    /// Diagnostics of the last analysis.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Signature over every open header: path and content hash, sorted by path.
pub fn headers_signature(headers: &[(PathBuf, &FileBuffer)]) -> ContentHash {
    let mut sorted: Vec<_> = headers.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
        .into_iter()
        .fold(HashBuilder::new(), |b, (path, file)| {
            b.str(&display_path(path)).hash(file.content_hash())
        })
        .finish()
}

/// Units for project-wide diagnostics.
///
/// Kept apart from [`UnitCache`](crate::UnitCache) because an entry goes stale
/// when any open header changes, not just its own file. A change of
/// arguments or analyzed name forces a rebuild, since a reparse cannot apply
/// either.
#[derive(Debug, Default)]
pub struct ProjectCache {
    units: HashMap<PathBuf, ProjectUnit>,
    stats: CacheStats,
}

impl ProjectCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings every project source in `files` up to date and returns the
    /// union of their diagnostics, sorted and deduplicated.
    ///
    /// Headers in `files` are attached to every unit as unsaved buffers.
    /// Entries for files missing from `files` are released.
    pub fn refresh(&mut self, builder: &mut UnitBuilder, files: &[FileBuffer]) -> Vec<Diagnostic> {
        let root = builder.sketch_root().to_path_buf();
        let headers: Vec<(PathBuf, &FileBuffer)> = files
            .iter()
            .filter(|f| f.kind().is_header())
            .map(|f| (builder.key(&f.path), f))
            .collect();
        let signature = headers_signature(&headers);
        let header_buffers: Vec<UnsavedFile> = headers
            .iter()
            .map(|(path, f)| UnsavedFile::new(path.clone(), f.code.clone()))
            .collect();

        let mut live = HashSet::new();
        for file in files.iter().filter(|f| f.kind().is_project_source()) {
            let key = builder.key(&file.path);
            if !live.insert(key.clone()) {
                continue;
            }
            let hash = file.content_hash();
            let args = args_hash(&builder.arguments(&key));
            let analyzed = analyzed_name(&key);

            let entry = self
                .units
                .entry(key.clone())
                .or_insert_with(|| ProjectUnit::pending(analyzed.clone()));
            let stale = entry.content_hash != Some(hash) || entry.headers_signature != signature;
            let args_changed = entry.args_hash != args || entry.analyzed != analyzed;

            let action = if !stale && !args_changed {
                UnitAction::Reused
            } else {
                let reparsed = match entry.unit.as_mut() {
                    Some(unit) if !args_changed => match builder.reparse(unit, &file.code, &header_buffers) {
                        Ok(()) => true,
                        Err(err) => {
                            tracing::debug!(path = %key.display(), error = %err, "project reparse failed, recreating");
                            false
                        }
                    },
                    _ => false,
                };
                if reparsed {
                    UnitAction::Reparsed
                } else {
                    entry.unit = None;
                    match builder.build(&key, &file.code, &header_buffers) {
                        Ok(unit) => entry.unit = Some(unit),
                        Err(_) => self.stats.failed += 1,
                    }
                    UnitAction::Created
                }
            };

            if action != UnitAction::Reused {
                entry.content_hash = Some(hash);
                entry.args_hash = args;
                entry.analyzed = analyzed;
                entry.headers_signature = signature;
                entry.diagnostics = match &entry.unit {
                    Some(unit) => unit.diagnostics(&root),
                    None => vec![Diagnostic::parse_failure_in(&key)],
                };
            }
            self.stats.record(action);
            tracing::trace!(path = %key.display(), action = ?action, "project unit refreshed");
        }

        let before = self.units.len();
        self.units.retain(|key, _| live.contains(key));
        let evicted = before - self.units.len();
        if evicted > 0 {
            tracing::debug!(evicted, "released project units for closed files");
        }

        let mut all: Vec<Diagnostic> = self
            .units
            .values()
            .flat_map(|u| u.diagnostics.iter().cloned())
            .collect();
        sort_and_dedup(&mut all);
        all
    }

    /// Returns the entry for a normalized key.
    pub fn get(&self, key: &Path) -> Option<&ProjectUnit> {
        self.units.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Releases every entry.
    pub fn clear(&mut self) {
        self.units.clear();
        self.stats.invalidations += 1;
    }

    /// Decision counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
