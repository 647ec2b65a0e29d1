//! Injection of the prototype-header include into a sketch entry.

use lens_common::{declaration_skeleton, ContentHash};
use lens_engine::AnalysisEngine;
use lens_source::sketch::include_directive;
use lens_source::{display_path, FileKind};
use std::collections::HashMap;
use std::path::Path;

use crate::scan::{function_definitions, FunctionDefinition};

/// Source text as handed to the analysis engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformedSource {
    /// The rewritten text.
    pub text: String,
    /// Lines inserted before the original first line.
    pub line_shift: u32,
    /// Whether an include was injected.
    pub injected: bool,
}

impl TransformedSource {
    fn unchanged(code: &str) -> Self {
        Self {
            text: code.to_string(),
            line_shift: 0,
            injected: false,
        }
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn replace_line(lines: &[&str], index: usize, replacement: &str) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i != index {
                line.to_string()
            } else if line.ends_with('\r') {
                format!("{replacement}\r")
            } else {
                replacement.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remembered injection points keyed by declaration-skeleton signature.
///
/// Only blank-line replacements are remembered. A remembered point is reused
/// as long as the line there is still blank.
#[derive(Debug, Default)]
pub struct InsertionMemo {
    points: HashMap<ContentHash, usize>,
}

impl InsertionMemo {
    /// Creates an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites `code` using a remembered injection point, if one applies.
    pub fn replay(&self, signature: ContentHash, path: &Path, code: &str) -> Option<TransformedSource> {
        let &index = self.points.get(&signature)?;
        let lines: Vec<&str> = code.split('\n').collect();
        if !lines.get(index).is_some_and(|l| is_blank(l)) {
            return None;
        }
        Some(TransformedSource {
            text: replace_line(&lines, index, &include_directive(path)),
            line_shift: 0,
            injected: true,
        })
    }

    /// Rewrites `code` ahead of its first definition and remembers the point.
    ///
    /// The nearest blank line above the first definition is replaced by the
    /// include. Without one, the include is inserted as a new line directly
    /// before the definition and the line shift becomes 1.
    pub fn inject(
        &mut self,
        signature: ContentHash,
        path: &Path,
        code: &str,
        defs: &[FunctionDefinition],
    ) -> TransformedSource {
        let Some(first) = defs.iter().map(|d| d.line).min() else {
            return TransformedSource::unchanged(code);
        };
        let include = include_directive(path);
        let mut lines: Vec<&str> = code.split('\n').collect();
        let first_index = (first as usize).saturating_sub(1).min(lines.len());

        if let Some(index) = (0..first_index).rev().find(|&i| is_blank(lines[i])) {
            self.points.insert(signature, index);
            return TransformedSource {
                text: replace_line(&lines, index, &include),
                line_shift: 0,
                injected: true,
            };
        }

        lines.insert(first_index, &include);
        TransformedSource {
            text: lines.join("\n"),
            line_shift: 1,
            injected: true,
        }
    }

    /// Number of remembered points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Forgets every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Rewrites a sketch entry so that it includes its prototype header.
///
/// Files that are not sketch entries are returned unchanged without touching
/// the engine. A sketch entry whose declaration skeleton was seen before is
/// rewritten from the memo; otherwise it is parsed once to find its first
/// function definition. Files that fail to parse or define no functions are
/// returned unchanged.
pub fn transformed_source(
    engine: &dyn AnalysisEngine,
    path: &Path,
    code: &str,
    args: &[String],
    memo: &mut InsertionMemo,
) -> TransformedSource {
    if FileKind::of(path) != FileKind::SketchEntry {
        return TransformedSource::unchanged(code);
    }
    let signature = declaration_skeleton(&display_path(path), code).signature;
    if let Some(hit) = memo.replay(signature, path, code) {
        return hit;
    }
    match function_definitions(engine, path, code, args) {
        Some(defs) => memo.inject(signature, path, code, &defs),
        None => TransformedSource::unchanged(code),
    }
}
