//! Construction and reparsing of cached translation units.

use lens_common::ContentHash;
use lens_diagnostics::{render_all, DiagnosticCollector};
use lens_engine::{AnalysisEngine, EngineError, ParseOptions, ParseRequest, TranslationUnit, UnsavedFile};
use lens_source::normalize_absolute;
use lens_source::sketch::analyzed_name;
use lens_transform::{SyntheticSources, Transformer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::arguments::{compile_arguments, ArgumentProfile, ArgumentProvider};
use crate::error::CacheError;
use crate::ladder::recovery_ladder;
use crate::unit_cache::CachedUnit;

/// Builds translation units for both caches.
///
/// Owns the engine, the argument sources and the synthetic-source caches, so
/// that the single-file and project caches share prototype headers and
/// insertion points.
pub struct UnitBuilder {
    engine: Arc<dyn AnalysisEngine>,
    provider: Arc<dyn ArgumentProvider>,
    profile: ArgumentProfile,
    sketch_root: PathBuf,
    transformer: Transformer,
}

impl UnitBuilder {
    /// Creates a builder for files under `sketch_root`.
    pub fn new(
        engine: Arc<dyn AnalysisEngine>,
        provider: Arc<dyn ArgumentProvider>,
        profile: ArgumentProfile,
        sketch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            provider,
            profile,
            sketch_root: sketch_root.into(),
            transformer: Transformer::new(),
        }
    }

    /// The sketch root; relative paths are resolved against it.
    pub fn sketch_root(&self) -> &Path {
        &self.sketch_root
    }

    /// Cache key of `path`: absolute against the sketch root, dots removed.
    pub fn key(&self, path: &Path) -> PathBuf {
        normalize_absolute(path, &self.sketch_root)
    }

    /// Provider arguments for an original file, before per-file extras.
    pub fn base_arguments(&self, path: &Path) -> Vec<String> {
        self.provider.arguments(&[path.to_path_buf()])
    }

    /// Full argument list a new unit for `path` starts from.
    pub fn arguments(&self, path: &Path) -> Vec<String> {
        compile_arguments(&self.base_arguments(path), &analyzed_name(path), &self.profile)
    }

    /// Engine-facing buffers for `path`.
    pub fn sources(&mut self, path: &Path, code: &str) -> SyntheticSources {
        let base = self.base_arguments(path);
        self.transformer.sources(self.engine.as_ref(), path, code, &base)
    }

    /// Creates a unit for `key`, walking the recovery ladder on failure.
    ///
    /// `extra` buffers are attached after the file's own buffers.
    pub fn build(&mut self, key: &Path, code: &str, extra: &[UnsavedFile]) -> Result<CachedUnit, CacheError> {
        let base = self.base_arguments(key);
        let sources = self.transformer.sources(self.engine.as_ref(), key, code, &base);
        let args = compile_arguments(&base, sources.main_file(), &self.profile);
        let mut unsaved = sources.unsaved();
        unsaved.extend_from_slice(extra);

        let attempts = recovery_ladder(&args, sources.main_file(), &self.profile.core_include);
        let mut failures = Vec::new();
        for (index, attempt) in attempts.iter().enumerate() {
            let request = ParseRequest {
                main_file: sources.main_file(),
                args: &attempt.args,
                unsaved: &unsaved,
                options: attempt.options,
            };
            match self.engine.parse(&request) {
                Ok(unit) => {
                    if !failures.is_empty() {
                        let diags = DiagnosticCollector::new(&self.sketch_root, &sources.map)
                            .collect(&unit.diagnostics());
                        tracing::warn!(
                            path = %key.display(),
                            attempt = attempt.label,
                            "parse recovered after {} failed attempts\n{}",
                            failures.len(),
                            render_all(&diags)
                        );
                    }
                    return Ok(CachedUnit::new(
                        key.to_path_buf(),
                        ContentHash::of_str(code),
                        sources.map,
                        unit,
                        unsaved,
                        attempt.args.clone(),
                        index,
                    ));
                }
                Err(err) => {
                    tracing::debug!(path = %key.display(), attempt = attempt.label, error = %err, "parse attempt failed");
                    failures.push(format!("{}: {err}", attempt.label));
                }
            }
        }

        tracing::warn!(
            path = %key.display(),
            "all parse attempts failed\n{}",
            failures.join("\n")
        );
        Err(CacheError::ParseFailed {
            path: key.to_path_buf(),
            attempts: failures.len(),
            reason: failures.pop().unwrap_or_default(),
        })
    }

    /// Reparses `entry` in place with new content.
    ///
    /// The unit keeps the arguments it was created with. On failure the entry
    /// is left untouched and must be recreated by the caller.
    pub fn reparse(
        &mut self,
        entry: &mut CachedUnit,
        code: &str,
        extra: &[UnsavedFile],
    ) -> Result<(), EngineError> {
        let sources = self.sources(entry.key(), code);
        if sources.main_file() != entry.analyzed_name() {
            return Err(EngineError::ReparseFailed {
                file: entry.analyzed_name().to_path_buf(),
                reason: format!("analyzed name changed to {}", sources.main_file().display()),
            });
        }
        let mut unsaved = sources.unsaved();
        unsaved.extend_from_slice(extra);
        entry.reparse_with(unsaved, sources.map, ContentHash::of_str(code))
    }

    /// Parses a plain source file outside both caches.
    ///
    /// Used for one-off lookups in files that are not open, such as the
    /// implementation file next to a header. The handle is released when the
    /// caller drops it.
    pub fn parse_detached(&self, path: &Path, code: &str) -> Result<Box<dyn TranslationUnit>, EngineError> {
        let mut args = vec!["-x".to_string(), "c++".to_string()];
        args.extend(self.base_arguments(path));
        let unsaved = [UnsavedFile::new(path, code)];
        self.engine.parse(&ParseRequest {
            main_file: path,
            args: &args,
            unsaved: &unsaved,
            options: ParseOptions::scan(),
        })
    }

    /// Drops the synthetic-source caches.
    pub fn clear(&mut self) {
        self.transformer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::StaticArguments;
    use lens_diagnostics::Severity;
    use lens_engine::testing::FakeEngine;

    fn builder(engine: &FakeEngine) -> UnitBuilder {
        UnitBuilder::new(
            Arc::new(engine.clone()),
            Arc::new(StaticArguments::new(["-DX"])),
            ArgumentProfile::default(),
            "/s",
        )
    }

    #[test]
    fn builds_sketch_entry_with_header() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let entry = b.build(Path::new("/s/Blink.ino"), "\nvoid setup() {}\n", &[]).unwrap();
        assert_eq!(entry.analyzed_name(), Path::new("/s/Blink.ino.cpp"));
        assert_eq!(entry.unsaved().len(), 2);
        let last = engine.recorded().pop().unwrap();
        assert_eq!(last.main_file, PathBuf::from("/s/Blink.ino.cpp"));
        assert_eq!(last.args, vec!["-DX", "-include", "Arduino.h"]);
        assert_eq!(last.options, ParseOptions::editing());
    }

    #[test]
    fn ladder_stops_at_first_success() {
        let engine = FakeEngine::new().failing_when(|req| {
            req.options
                .contains(ParseOptions::LIMIT_SKIP_FUNCTION_BODIES_TO_PREAMBLE)
        });
        let mut b = builder(&engine);
        let entry = b.build(Path::new("/s/led.cpp"), "int x;\n", &[]).unwrap();
        assert_eq!(entry.recovery(), 1);
        assert_eq!(engine.parse_count(), 2);
    }

    #[test]
    fn core_include_dropped_for_sketch() {
        let engine = FakeEngine::new().failing_when(|req| {
            req.main_file.ends_with("Blink.ino.cpp") && req.args.iter().any(|a| a == "-include")
        });
        let mut b = builder(&engine);
        let entry = b.build(Path::new("/s/Blink.ino"), "int x;\n", &[]).unwrap();
        assert_eq!(entry.args(), ["-DX"]);
    }

    #[test]
    fn all_attempts_fail() {
        let engine = FakeEngine::new().failing_when(|_| true);
        let mut b = builder(&engine);
        let err = b.build(Path::new("/s/led.cpp"), "int x;\n", &[]).unwrap_err();
        let CacheError::ParseFailed { attempts, reason, .. } = err;
        assert_eq!(attempts, 3);
        assert!(reason.starts_with("no-args"));
    }

    #[test]
    fn extra_buffers_attached() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let extra = [UnsavedFile::new("/s/led.h", "#error header broken\n")];
        let entry = b.build(Path::new("/s/led.cpp"), "int x;\n", &extra).unwrap();
        let raw = entry.unit().diagnostics();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].severity, Severity::Error);
    }

    #[test]
    fn reparse_updates_hash() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut entry = b.build(Path::new("/s/led.cpp"), "int x;\n", &[]).unwrap();
        b.reparse(&mut entry, "int y;\n", &[]).unwrap();
        assert_eq!(entry.content_hash(), ContentHash::of_str("int y;\n"));
        assert_eq!(engine.reparse_count(), 1);
    }

    #[test]
    fn detached_parse_is_not_cached() {
        let engine = FakeEngine::new();
        let b = builder(&engine);
        let unit = b.parse_detached(Path::new("/s/led.cpp"), "void on() {}\n").unwrap();
        assert_eq!(unit.top_level().len(), 1);
        let last = engine.recorded().pop().unwrap();
        assert_eq!(last.args, vec!["-x", "c++", "-DX"]);
        assert_eq!(last.options, ParseOptions::scan());
    }
}
