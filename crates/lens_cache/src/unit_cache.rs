//! The single-file translation-unit cache.

use lens_common::{ContentHash, HashBuilder};
use lens_diagnostics::{Diagnostic, DiagnosticCollector};
use lens_engine::{EngineError, TranslationUnit, UnsavedFile};
use lens_source::SyntheticMap;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::UnitBuilder;
use crate::error::CacheError;

/// A live translation unit and the state it was built from.
///
/// Dropping the entry releases the engine handle.
pub struct CachedUnit {
    key: PathBuf,
    content_hash: ContentHash,
    map: SyntheticMap,
    unit: Box<dyn TranslationUnit>,
    unsaved: Vec<UnsavedFile>,
    args: Vec<String>,
    recovery: usize,
}

impl CachedUnit {
    pub(crate) fn new(
        key: PathBuf,
        content_hash: ContentHash,
        map: SyntheticMap,
        unit: Box<dyn TranslationUnit>,
        unsaved: Vec<UnsavedFile>,
        args: Vec<String>,
        recovery: usize,
    ) -> Self {
        Self {
            key,
            content_hash,
            map,
            unit,
            unsaved,
            args,
            recovery,
        }
    }

    /// Normalized absolute path of the original file.
    pub fn key(&self) -> &Path {
        &self.key
    }

    /// Hash of the original content the unit was last (re)parsed with.
    pub fn content_hash(&self) -> ContentHash {
        self.content_hash
    }

    /// File name the engine sees as the main file.
    pub fn analyzed_name(&self) -> &Path {
        self.map.analyzed()
    }

    /// Lines injected before the original first line.
    pub fn line_shift(&self) -> u32 {
        self.map.line_shift()
    }

    /// Mapping from analyzed back to original coordinates.
    pub fn map(&self) -> &SyntheticMap {
        &self.map
    }

    /// The engine handle.
    pub fn unit(&self) -> &dyn TranslationUnit {
        self.unit.as_ref()
    }

    /// Buffers of the last (re)parse.
    pub fn unsaved(&self) -> &[UnsavedFile] {
        &self.unsaved
    }

    /// Arguments the unit was created with.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Hash of [`args`](Self::args).
    pub fn args_hash(&self) -> ContentHash {
        args_hash(&self.args)
    }

    /// Index of the recovery attempt that produced the unit; 0 for a clean parse.
    pub fn recovery(&self) -> usize {
        self.recovery
    }

    /// Collects the unit's diagnostics scoped to `sketch_root`.
    pub fn diagnostics(&self, sketch_root: &Path) -> Vec<Diagnostic> {
        DiagnosticCollector::new(sketch_root, &self.map).collect(&self.unit.diagnostics())
    }

    pub(crate) fn reparse_with(
        &mut self,
        unsaved: Vec<UnsavedFile>,
        map: SyntheticMap,
        content_hash: ContentHash,
    ) -> Result<(), EngineError> {
        self.unit.reparse(&unsaved)?;
        self.unsaved = unsaved;
        self.map = map;
        self.content_hash = content_hash;
        Ok(())
    }
}

impl fmt::Debug for CachedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedUnit")
            .field("key", &self.key)
            .field("content_hash", &self.content_hash)
            .field("map", &self.map)
            .field("recovery", &self.recovery)
            .finish_non_exhaustive()
    }
}

/// Hash identifying an argument list.
pub(crate) fn args_hash(args: &[String]) -> ContentHash {
    args.iter()
        .fold(HashBuilder::new().u64(args.len() as u64), |b, a| b.str(a))
        .finish()
}

/// What a resolve call did to the cache.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnitAction {
    /// A new unit was parsed.
    Created,
    /// The existing unit was reparsed with new content.
    Reparsed,
    /// The existing unit was returned untouched.
    Reused,
}

/// Counters of cache decisions since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Units parsed from scratch.
    pub created: usize,
    /// Units reparsed in place.
    pub reparsed: usize,
    /// Units returned untouched.
    pub reused: usize,
    /// Requests for which no unit could be produced.
    pub failed: usize,
    /// Full invalidations.
    pub invalidations: usize,
}

impl CacheStats {
    pub(crate) fn record(&mut self, action: UnitAction) {
        match action {
            UnitAction::Created => self.created += 1,
            UnitAction::Reparsed => self.reparsed += 1,
            UnitAction::Reused => self.reused += 1,
        }
    }
}

/// At most one live translation unit per original file.
#[derive(Debug, Default)]
pub struct UnitCache {
    units: HashMap<PathBuf, CachedUnit>,
    stats: CacheStats,
}

impl UnitCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an up-to-date unit for `path` with content `code`.
    ///
    /// Identical content returns the cached unit without touching the engine.
    /// Changed content reparses in place; if the reparse fails the entry is
    /// dropped and rebuilt. A file seen for the first time is built through
    /// the recovery ladder. When no unit can be produced no entry is kept.
    pub fn resolve(
        &mut self,
        builder: &mut UnitBuilder,
        path: &Path,
        code: &str,
    ) -> Result<(&CachedUnit, UnitAction), CacheError> {
        self.resolve_inner(builder, path, code, true)
    }

    /// Like [`resolve`](Self::resolve), but returns an existing unit as is even
    /// if the content changed. Used by latency-sensitive requests.
    pub fn resolve_no_reparse(
        &mut self,
        builder: &mut UnitBuilder,
        path: &Path,
        code: &str,
    ) -> Result<(&CachedUnit, UnitAction), CacheError> {
        self.resolve_inner(builder, path, code, false)
    }

    fn resolve_inner(
        &mut self,
        builder: &mut UnitBuilder,
        path: &Path,
        code: &str,
        reparse: bool,
    ) -> Result<(&CachedUnit, UnitAction), CacheError> {
        let key = builder.key(path);
        let hash = ContentHash::of_str(code);

        let (entry, action) = match self.units.entry(key) {
            Entry::Vacant(slot) => match builder.build(slot.key(), code, &[]) {
                Ok(fresh) => (slot.insert(fresh), UnitAction::Created),
                Err(err) => {
                    self.stats.failed += 1;
                    return Err(err);
                }
            },
            Entry::Occupied(slot) if !reparse || slot.get().content_hash == hash => {
                (slot.into_mut(), UnitAction::Reused)
            }
            Entry::Occupied(mut slot) => match builder.reparse(slot.get_mut(), code, &[]) {
                Ok(()) => (slot.into_mut(), UnitAction::Reparsed),
                Err(err) => {
                    tracing::debug!(path = %slot.key().display(), error = %err, "reparse failed, recreating");
                    match builder.build(slot.key(), code, &[]) {
                        Ok(fresh) => {
                            slot.insert(fresh);
                            (slot.into_mut(), UnitAction::Created)
                        }
                        Err(err) => {
                            slot.remove();
                            self.stats.failed += 1;
                            return Err(err);
                        }
                    }
                }
            },
        };

        self.stats.record(action);
        tracing::debug!(
            path = %entry.key().display(),
            analyzed = %entry.analyzed_name().display(),
            action = ?action,
            "resolved translation unit"
        );
        Ok((entry, action))
    }

    /// Returns the cached unit for a normalized key.
    pub fn get(&self, key: &Path) -> Option<&CachedUnit> {
        self.units.get(key)
    }

    /// Drops the unit for a normalized key.
    pub fn remove(&mut self, key: &Path) -> bool {
        self.units.remove(key).is_some()
    }

    /// Iterates over all cached units.
    pub fn iter(&self) -> impl Iterator<Item = &CachedUnit> {
        self.units.values()
    }

    /// Number of cached units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no unit is cached.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Releases every unit; the next request for any file recreates it.
    pub fn invalidate_all(&mut self) {
        let released = self.units.len();
        self.units.clear();
        self.stats.invalidations += 1;
        tracing::debug!(released, "translation unit cache invalidated");
    }

    /// Decision counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
