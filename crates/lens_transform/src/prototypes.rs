//! Prototype header generation.

use lens_common::ContentHash;
use lens_engine::AnalysisEngine;
use lens_source::display_path;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::scan::{function_definitions, FunctionDefinition};

/// Renders the prototype header for a sketch entry from its definitions.
///
/// Each unique prototype is preceded by a `#line` marker naming the original
/// file, so diagnostics raised against a prototype report at the definition.
/// Returns an empty string when there is nothing to declare.
pub fn prototype_header(path: &Path, defs: &[FunctionDefinition]) -> String {
    let origin = display_path(path);
    let mut seen = HashSet::new();
    let mut out = String::new();
    for def in defs {
        if def.prototype.is_empty() || !seen.insert(def.prototype.as_str()) {
            continue;
        }
        if out.is_empty() {
            out.push_str("#pragma once\n");
        }
        out.push_str(&format!("#line {} \"{}\"\n{};\n", def.line, origin, def.prototype));
    }
    out
}

/// Parses a sketch entry and renders its prototype header.
///
/// Returns an empty string if the file fails to parse or declares no
/// functions; callers then attach no header.
pub fn generate_prototype_header(
    engine: &dyn AnalysisEngine,
    path: &Path,
    code: &str,
    args: &[String],
) -> String {
    function_definitions(engine, path, code, args)
        .map(|defs| prototype_header(path, &defs))
        .unwrap_or_default()
}

/// Generated headers keyed by declaration layout.
///
/// The key is [`DeclarationSkeleton::layout`](lens_common::DeclarationSkeleton::layout),
/// so edits inside function bodies hit the cache while moving a definition to
/// another line regenerates the `#line` markers.
#[derive(Debug, Default)]
pub struct PrototypeCache {
    headers: HashMap<ContentHash, String>,
}

impl PrototypeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached header for a layout.
    pub fn get(&self, layout: ContentHash) -> Option<&str> {
        self.headers.get(&layout).map(String::as_str)
    }

    /// Records the header for a layout.
    pub fn insert(&mut self, layout: ContentHash, header: String) {
        self.headers.insert(layout, header);
    }

    /// Number of cached headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Drops every cached header.
    pub fn clear(&mut self) {
        self.headers.clear();
    }
}
