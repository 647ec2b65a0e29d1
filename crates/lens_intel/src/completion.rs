//! Code completion post-processing.

use lens_cache::CachedUnit;
use lens_engine::{CursorKind, UnsavedFile};
use lens_source::sketch::original_name;
use lens_source::{is_in_root, LineIndex, SyntheticMap};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::symbols::collect_symbols;

/// One completion shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    /// Text to insert.
    pub text: String,
    /// Text shown in the list.
    pub label: String,
    /// Result type; empty when not applicable.
    pub result_type: String,
    /// Kind of the declaration behind the item.
    pub kind: CursorKind,
    /// Engine priority; lower is better.
    pub priority: u32,
    /// Declaring file, when known.
    pub file: Option<PathBuf>,
    /// Whether the item is declared inside the sketch.
    pub from_sketch: bool,
    /// Number of further overloads folded into this item.
    pub overloads: usize,
}

/// The identifier fragment left of a 1-indexed position.
pub fn completion_prefix(code: &str, line: u32, column: u32) -> &str {
    let index = LineIndex::new(code);
    let (Some(start), Some(end)) = (index.offset(line, 1), index.offset(line, column)) else {
        return "";
    };
    let Some(before) = code.get(start..end) else {
        return "";
    };
    let fragment = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map_or(before.len(), |(i, _)| i);
    &before[fragment..]
}

/// Raw completions at an original-file position.
///
/// `entry` may be older than the editor content: the engine is asked with the
/// current buffers `unsaved`, at the position shifted by their `map`. Items
/// declared by symbols of this unit inside `sketch_root`, or by any file
/// inside it, are marked as coming from the sketch.
pub fn complete(
    entry: &CachedUnit,
    unsaved: &[UnsavedFile],
    map: &SyntheticMap,
    line: u32,
    column: u32,
    sketch_root: &Path,
) -> Vec<CompletionItem> {
    let unit = entry.unit();
    let at = map.to_analyzed(line, column);

    let mut local: HashMap<String, PathBuf> = HashMap::new();
    for symbol in collect_symbols(entry, None) {
        if is_in_root(sketch_root, &symbol.file) {
            local.entry(symbol.name).or_insert(symbol.file);
        }
    }

    let items: Vec<CompletionItem> = unit
        .complete_at(&at, unsaved)
        .into_iter()
        .filter(|c| !c.text.is_empty())
        .map(|c| {
            let declared = c.file.as_deref().map(original_name);
            let (from_sketch, file) = match local.get(&c.text) {
                Some(file) => (true, Some(file.clone())),
                None => {
                    let inside = declared.as_deref().is_some_and(|f| is_in_root(sketch_root, f));
                    (inside, declared)
                }
            };
            CompletionItem {
                text: c.text,
                label: c.label,
                result_type: c.result_type,
                kind: c.kind,
                priority: c.priority,
                file,
                from_sketch,
                overloads: 0,
            }
        })
        .collect();
    tracing::debug!(file = %entry.key().display(), line, column, count = items.len(), "engine completions");
    items
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn contains_ignore_case(text: &str, needle: &str) -> bool {
    needle.is_empty()
        || text
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

fn is_macro_like(text: &str) -> bool {
    let mut alpha = false;
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            if c.is_ascii_lowercase() {
                return false;
            }
            alpha = true;
        }
    }
    alpha && text.contains('_')
}

/// Filters, ranks and folds completions for a typed prefix.
///
/// With an empty prefix only sketch items survive. Otherwise an item must
/// start with the prefix (in any case) or contain it. Items with the same
/// text collapse into the best-ranked one, labelled with the overload count.
/// At most `limit` items are returned.
pub fn filter_and_sort(prefix: &str, items: Vec<CompletionItem>, limit: usize) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = items
        .into_iter()
        .filter(|c| {
            if prefix.is_empty() {
                c.from_sketch
            } else {
                starts_with_ignore_case(&c.text, prefix) || contains_ignore_case(&c.text, prefix)
            }
        })
        .collect();

    items.sort_by_cached_key(|c| {
        let underscores = c.text.matches('_').count();
        (
            Reverse(c.text == prefix),
            Reverse(c.text.starts_with(prefix)),
            Reverse(starts_with_ignore_case(&c.text, prefix)),
            Reverse(c.from_sketch),
            c.kind.completion_score(),
            c.priority,
            is_macro_like(&c.text),
            underscores,
            c.text.len(),
            c.text.clone(),
        )
    });

    let mut folded: Vec<CompletionItem> = Vec::with_capacity(items.len());
    let mut position: HashMap<String, usize> = HashMap::new();
    for item in items {
        match position.get(&item.text) {
            Some(&i) => folded[i].overloads += 1,
            None => {
                position.insert(item.text.clone(), folded.len());
                folded.push(item);
            }
        }
    }
    for item in folded.iter_mut().filter(|c| c.overloads > 0) {
        item.label = format!("{}(...) - {} overloads", item.text, item.overloads + 1);
    }

    folded.truncate(limit);
    folded
}
