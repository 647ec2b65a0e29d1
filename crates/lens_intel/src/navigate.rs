//! Go-to-definition and occurrence search.

use lens_cache::CachedUnit;
use lens_engine::{Cursor, Walk};
use lens_source::sketch::is_prototype_header;
use lens_source::{is_in_root, FileKind, JumpTarget};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::sibling::SiblingFinder;

/// Where to look for occurrences.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceScope {
    /// Only the unit of the active file.
    #[default]
    CurrentFile,
    /// The active unit plus the units of every other open file.
    Project,
}

/// The definition of the symbol at an original-file position.
///
/// From a header, the implementation in a sibling source file wins. A
/// reference that resolves into the generated prototype header jumps to the
/// definition instead; otherwise the referenced declaration is the target.
pub fn find_definition(
    entry: &CachedUnit,
    line: u32,
    column: u32,
    sibling: &SiblingFinder<'_>,
) -> Option<JumpTarget> {
    let unit = entry.unit();
    let at = unit.cursor_at(&entry.map().to_analyzed(line, column))?;
    let reference = unit.referenced(&at);
    let definition = unit.definition(&at);

    if FileKind::of(&at.location.file).is_header() {
        if let Some(symbol) = reference.as_ref().or(definition.as_ref()) {
            if let Some(loc) = sibling.definition_of(symbol) {
                return Some(loc.into());
            }
        }
    }

    let reference_in_header = reference
        .as_ref()
        .is_some_and(|r| is_prototype_header(&r.location.file));
    let target = match (reference, definition) {
        (_, Some(def)) if reference_in_header => def,
        (Some(r), _) => r,
        (None, Some(def)) => def,
        (None, None) => return None,
    };
    if target.location.is_unknown() {
        return None;
    }
    entry.map().to_original(&target.location).map(JumpTarget::from)
}

/// The entity whose occurrences are searched.
#[derive(Clone, Debug)]
pub struct OccurrenceTarget {
    usr: String,
    canonical: Cursor,
    origin: PathBuf,
}

impl OccurrenceTarget {
    /// The entity at an original-file position: its definition if known,
    /// else the referenced declaration, else the node itself.
    pub fn at(entry: &CachedUnit, line: u32, column: u32) -> Option<Self> {
        let unit = entry.unit();
        let at = unit.cursor_at(&entry.map().to_analyzed(line, column))?;
        let target = unit
            .definition(&at)
            .or_else(|| unit.referenced(&at))
            .unwrap_or(at);
        let canonical = unit.canonical(&target);
        Some(Self {
            usr: canonical.usr.clone(),
            canonical,
            origin: entry.key().to_path_buf(),
        })
    }

    /// Cross-unit identity string; empty for local entities.
    pub fn usr(&self) -> &str {
        &self.usr
    }
}

/// Accumulates occurrences of one entity over several units.
///
/// Locations are deduplicated by file, line and column, so a declaration
/// seen from several units is reported once.
#[derive(Debug)]
pub struct Occurrences {
    target: OccurrenceTarget,
    root: Option<PathBuf>,
    seen: HashSet<JumpTarget>,
}

impl Occurrences {
    /// Starts a search. With a `root`, locations outside it are skipped.
    pub fn new(target: OccurrenceTarget, root: Option<&Path>) -> Self {
        Self {
            target,
            root: root.map(Path::to_path_buf),
            seen: HashSet::new(),
        }
    }

    /// Adds the occurrences found in `entry`.
    ///
    /// Nodes match by the identity string of their canonical declaration.
    /// Entities without one can only be matched inside the unit the search
    /// started from.
    pub fn scan(&mut self, entry: &CachedUnit) {
        let unit = entry.unit();
        let map = entry.map();
        let same_unit = entry.key() == self.target.origin;
        let before = self.seen.len();
        unit.walk(&mut |node, _| {
            let candidate = unit.referenced(node).unwrap_or_else(|| node.clone());
            let candidate = unit.canonical(&candidate);
            let matches = (!self.target.usr.is_empty() && candidate.usr == self.target.usr)
                || (same_unit && candidate.same_node(&self.target.canonical));
            if !matches || node.location.is_unknown() {
                return Walk::Recurse;
            }
            let Some(loc) = map.to_original(&node.location) else {
                return Walk::Recurse;
            };
            if self.root.as_deref().is_some_and(|root| !is_in_root(root, &loc.file)) {
                return Walk::Recurse;
            }
            self.seen.insert(JumpTarget::from(loc));
            Walk::Recurse
        });
        tracing::trace!(
            file = %entry.key().display(),
            found = self.seen.len() - before,
            "scanned unit for occurrences"
        );
    }

    /// The occurrences found, sorted by file, line and column.
    pub fn finish(self) -> Vec<JumpTarget> {
        let mut out: Vec<JumpTarget> = self.seen.into_iter().collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texts::SourceTexts;
    use lens_cache::{ArgumentProfile, StaticArguments, UnitBuilder, UnitCache};
    use lens_engine::testing::FakeEngine;
    use lens_source::FileBuffer;
    use std::sync::Arc;

    fn builder(engine: &FakeEngine) -> UnitBuilder {
        UnitBuilder::new(
            Arc::new(engine.clone()),
            Arc::new(StaticArguments::default()),
            ArgumentProfile::default(),
            "/s",
        )
    }

    fn jt(file: &str, line: u32, column: u32) -> JumpTarget {
        JumpTarget {
            file: PathBuf::from(file),
            line,
            column,
        }
    }

    const SKETCH: &str = "\n\nvoid blink() {\n}\n\nvoid loop() {\n  blink();\n  blink();\n}\n";

    #[test]
    fn definition_skips_prototype_header() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache.resolve(&mut b, Path::new("/s/Blink.ino"), SKETCH).unwrap();
        let sibling = SiblingFinder::new(&b, SourceTexts::default());
        let target = find_definition(entry, 7, 3, &sibling).unwrap();
        assert_eq!(target, jt("/s/Blink.ino", 3, 6));
    }

    #[test]
    fn definition_in_sibling_source() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache
            .resolve(&mut b, Path::new("/s/led.h"), "void on();\n")
            .unwrap();
        let files = [FileBuffer::new("/s/led.cpp", "\nvoid on() {\n}\n")];
        let sibling = SiblingFinder::new(&b, SourceTexts::new(&[], &files));
        assert_eq!(find_definition(entry, 1, 6, &sibling), Some(jt("/s/led.cpp", 2, 6)));
    }

    #[test]
    fn no_definition_off_symbol() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache.resolve(&mut b, Path::new("/s/Blink.ino"), SKETCH).unwrap();
        let sibling = SiblingFinder::new(&b, SourceTexts::default());
        assert!(find_definition(entry, 2, 1, &sibling).is_none());
    }

    #[test]
    fn occurrences_in_current_file() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache.resolve(&mut b, Path::new("/s/Blink.ino"), SKETCH).unwrap();
        let target = OccurrenceTarget::at(entry, 3, 7).unwrap();
        assert_eq!(target.usr(), "c:@F@blink");
        let mut search = Occurrences::new(target, None);
        search.scan(entry);
        assert_eq!(
            search.finish(),
            vec![
                jt("/s/Blink.ino", 3, 6),
                jt("/s/Blink.ino", 7, 3),
                jt("/s/Blink.ino", 8, 3)
            ]
        );
    }

    #[test]
    fn occurrences_across_units_deduplicated() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let a = "int shared;\n\nvoid a() {\n  shared = 1;\n}\n";
        let other = "extern int shared;\n\nvoid b() {\n  shared = 2;\n}\n";

        let target = {
            let (entry, _) = cache.resolve(&mut b, Path::new("/s/a.cpp"), a).unwrap();
            OccurrenceTarget::at(entry, 4, 3).unwrap()
        };
        let mut search = Occurrences::new(target, Some(Path::new("/s")));
        for (path, code) in [("/s/a.cpp", a), ("/s/b.cpp", other), ("/s/a.cpp", a)] {
            let (entry, _) = cache.resolve(&mut b, Path::new(path), code).unwrap();
            search.scan(entry);
        }
        assert_eq!(
            search.finish(),
            vec![
                jt("/s/a.cpp", 1, 5),
                jt("/s/a.cpp", 4, 3),
                jt("/s/b.cpp", 1, 12),
                jt("/s/b.cpp", 4, 3)
            ]
        );
    }

    #[test]
    fn root_filter_drops_outside_locations() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache
            .resolve(&mut b, Path::new("/lib/x.cpp"), "int v;\nvoid f() {\n  v = 1;\n}\n")
            .unwrap();
        let target = OccurrenceTarget::at(entry, 3, 3).unwrap();
        let mut search = Occurrences::new(target, Some(Path::new("/s")));
        search.scan(entry);
        assert!(search.finish().is_empty());
    }
}
