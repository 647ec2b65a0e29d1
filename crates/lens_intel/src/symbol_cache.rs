//! Short-lived cache of per-file symbol lists.

use lens_common::ContentHash;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::symbols::SymbolRecord;

#[derive(Debug)]
struct Entry {
    content_hash: ContentHash,
    built_at: Instant,
    symbols: Vec<SymbolRecord>,
}

/// Symbol lists keyed by file.
///
/// A list is reused when the content is unchanged, and also when it changed
/// but the list is younger than the grace period. This bounds how often the
/// symbol tree is rebuilt while the user types.
#[derive(Debug)]
pub struct SymbolCache {
    grace: Duration,
    entries: HashMap<PathBuf, Entry>,
}

impl SymbolCache {
    /// Creates an empty cache with the given grace period.
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            entries: HashMap::new(),
        }
    }

    /// The cached list for `key`, if it may still be used at `now`.
    pub fn lookup(&self, key: &Path, content_hash: ContentHash, now: Instant) -> Option<&[SymbolRecord]> {
        let entry = self.entries.get(key)?;
        if entry.content_hash == content_hash {
            tracing::debug!(path = %key.display(), "symbol cache hit");
            return Some(&entry.symbols);
        }
        if now.saturating_duration_since(entry.built_at) < self.grace {
            tracing::debug!(path = %key.display(), "symbol cache stale but recent");
            return Some(&entry.symbols);
        }
        None
    }

    /// Stores a freshly built list.
    pub fn store(&mut self, key: PathBuf, content_hash: ContentHash, now: Instant, symbols: Vec<SymbolRecord>) {
        self.entries.insert(
            key,
            Entry {
                content_hash,
                built_at: now,
                symbols,
            },
        );
    }

    /// Number of cached lists.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every list.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKind;

    fn record(name: &str) -> SymbolRecord {
        SymbolRecord {
            name: name.to_string(),
            display_name: name.to_string(),
            file: PathBuf::from("/s/a.cpp"),
            line: 1,
            column: 1,
            kind: SymbolKind::Variable,
            parameters: Vec::new(),
            body: None,
            usr: String::new(),
        }
    }

    #[test]
    fn exact_hash_always_hits() {
        let mut cache = SymbolCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        let key = Path::new("/s/a.cpp");
        cache.store(key.to_path_buf(), ContentHash::of_str("a"), t0, vec![record("a")]);
        let later = t0 + Duration::from_secs(60);
        assert_eq!(cache.lookup(key, ContentHash::of_str("a"), later).map(<[_]>::len), Some(1));
    }

    #[test]
    fn stale_within_grace() {
        let mut cache = SymbolCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        let key = Path::new("/s/a.cpp");
        cache.store(key.to_path_buf(), ContentHash::of_str("a"), t0, vec![record("a")]);
        let changed = ContentHash::of_str("b");
        assert!(cache.lookup(key, changed, t0 + Duration::from_secs(5)).is_some());
        assert!(cache.lookup(key, changed, t0 + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn unknown_key_misses() {
        let cache = SymbolCache::new(Duration::from_secs(10));
        assert!(cache.is_empty());
        assert!(cache
            .lookup(Path::new("/s/a.cpp"), ContentHash::of_str("a"), Instant::now())
            .is_none());
    }
}
