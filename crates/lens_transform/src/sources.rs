//! Assembly of the unsaved buffers for one analyzed file.

use lens_common::declaration_skeleton;
use lens_engine::{AnalysisEngine, UnsavedFile};
use lens_source::sketch::{analyzed_name, prototype_header_path};
use lens_source::{display_path, FileKind, SyntheticMap};
use std::cell::OnceCell;
use std::path::Path;

use crate::inject::InsertionMemo;
use crate::prototypes::{prototype_header, PrototypeCache};
use crate::scan::function_definitions;

/// The buffers the engine sees for one original file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticSources {
    /// The main file, under its analyzed name.
    pub main: UnsavedFile,
    /// The generated prototype header, if one is attached.
    pub header: Option<UnsavedFile>,
    /// Mapping from analyzed back to original coordinates.
    pub map: SyntheticMap,
}

impl SyntheticSources {
    fn plain(path: &Path, code: &str) -> Self {
        Self {
            main: UnsavedFile::new(path, code),
            header: None,
            map: SyntheticMap::identity(path),
        }
    }

    /// All buffers, header first.
    pub fn unsaved(&self) -> Vec<UnsavedFile> {
        self.header
            .iter()
            .cloned()
            .chain(std::iter::once(self.main.clone()))
            .collect()
    }

    /// The analyzed main file name.
    pub fn main_file(&self) -> &Path {
        &self.main.path
    }
}

/// Owns the transformation caches and builds [`SyntheticSources`].
#[derive(Debug, Default)]
pub struct Transformer {
    memo: InsertionMemo,
    headers: PrototypeCache,
}

impl Transformer {
    /// Creates a transformer with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the engine-facing buffers for `path`.
    ///
    /// Sketch entries are renamed, get a prototype header and an include of
    /// it. The entry is parsed at most once per call, and not at all when
    /// both the header and the injection point are cached.
    pub fn sources(
        &mut self,
        engine: &dyn AnalysisEngine,
        path: &Path,
        code: &str,
        args: &[String],
    ) -> SyntheticSources {
        if FileKind::of(path) != FileKind::SketchEntry {
            return SyntheticSources::plain(path, code);
        }

        let analyzed = analyzed_name(path);
        let skeleton = declaration_skeleton(&display_path(path), code);
        let scanned = OnceCell::new();
        let scan = || scanned.get_or_init(|| function_definitions(engine, path, code, args));

        let layout = skeleton.layout();
        let header = match self.headers.get(layout) {
            Some(cached) => cached.to_string(),
            None => {
                let generated = scan()
                    .as_deref()
                    .map(|defs| prototype_header(path, defs))
                    .unwrap_or_default();
                tracing::debug!(path = %path.display(), bytes = generated.len(), "generated prototype header");
                self.headers.insert(layout, generated.clone());
                generated
            }
        };

        if header.is_empty() {
            return SyntheticSources {
                main: UnsavedFile::new(analyzed.clone(), code),
                header: None,
                map: SyntheticMap::new(path.to_path_buf(), analyzed, None, 0),
            };
        }

        let transformed = match self.memo.replay(skeleton.signature, path, code) {
            Some(hit) => hit,
            None => {
                let defs = scan().as_deref().unwrap_or_default();
                self.memo.inject(skeleton.signature, path, code, defs)
            }
        };

        let header_path = prototype_header_path(path);
        SyntheticSources {
            main: UnsavedFile::new(analyzed.clone(), transformed.text),
            header: transformed
                .injected
                .then(|| UnsavedFile::new(header_path.clone(), header)),
            map: SyntheticMap::new(
                path.to_path_buf(),
                analyzed,
                transformed.injected.then_some(header_path),
                transformed.line_shift,
            ),
        }
    }

    /// Drops the insertion memo and the prototype-header cache.
    pub fn clear(&mut self) {
        self.memo.clear();
        self.headers.clear();
    }

    /// Number of cached prototype headers.
    pub fn cached_headers(&self) -> usize {
        self.headers.len()
    }
}
