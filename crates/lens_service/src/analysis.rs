//! The single-threaded analysis core owned by the service worker.

use lens_cache::{ArgumentProfile, ArgumentProvider, CachedUnit, ProjectCache, UnitBuilder, UnitCache};
use lens_common::ContentHash;
use lens_config::LensConfig;
use lens_diagnostics::{ChangeNotifier, Diagnostic};
use lens_engine::AnalysisEngine;
use lens_intel::{
    collect_symbols, complete, completion_prefix, enclosing_container, filter_and_sort,
    find_definition, hover_at, CompletionItem, ContainerInfo, HoverInfo, OccurrenceScope, OccurrenceTarget, Occurrences, SiblingFinder,
    SourceTexts, SymbolCache, SymbolRecord,
};
use lens_source::{is_in_root, FileBuffer, FileKind, JumpTarget};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::token::RequestToken;

/// Settings the core is created with.
#[derive(Clone, Debug)]
pub struct CoreSettings {
    /// Directory of the sketch.
    pub sketch_root: PathBuf,
    /// Forced include and warning flags.
    pub profile: ArgumentProfile,
    /// Arguments appended to the provider's.
    pub compiler_args: Vec<String>,
    /// How long a symbol list survives content changes.
    pub symbol_grace: Duration,
    /// Maximum number of completions returned.
    pub completion_limit: usize,
}

impl CoreSettings {
    /// Default settings for a sketch in `sketch_root`.
    pub fn new(sketch_root: impl Into<PathBuf>) -> Self {
        Self {
            sketch_root: sketch_root.into(),
            profile: ArgumentProfile::default(),
            compiler_args: Vec::new(),
            symbol_grace: Duration::from_secs(10),
            completion_limit: 256,
        }
    }

    /// Settings taken from a loaded `lens.toml`.
    pub fn from_config(config: &LensConfig) -> Self {
        Self {
            sketch_root: config.sketch.root.clone(),
            profile: ArgumentProfile {
                core_include: config.analysis.core_include.clone(),
                warning_flags: config.analysis.warning_flags.clone(),
            },
            compiler_args: config.analysis.compiler_args.clone(),
            symbol_grace: config.analysis.symbol_grace(),
            completion_limit: config.analysis.completion_limit,
        }
    }
}

struct ConfiguredArguments {
    provider: Arc<dyn ArgumentProvider>,
    extra: Vec<String>,
}

impl ArgumentProvider for ConfiguredArguments {
    fn arguments(&self, files: &[PathBuf]) -> Vec<String> {
        let mut args = self.provider.arguments(files);
        args.extend(self.extra.iter().cloned());
        args
    }
}

/// Result of a diagnostics pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticsPass {
    /// The file the pass was for, or the sketch root for project passes.
    pub channel: PathBuf,
    /// Diagnostics in original coordinates, scoped to the sketch.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the set differs from the previous pass on the same channel.
    pub changed: bool,
}

fn resolved<'c>(
    units: &'c mut UnitCache,
    builder: &mut UnitBuilder,
    path: &Path,
    code: &str,
) -> Option<&'c CachedUnit> {
    match units.resolve(builder, path, code) {
        Ok((entry, _)) => Some(entry),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "no translation unit");
            None
        }
    }
}

/// Owns every cache and the engine handles behind them.
///
/// All operations take `&mut self`; the service serializes access by running
/// the core on one worker thread.
pub struct AnalysisCore {
    builder: UnitBuilder,
    units: UnitCache,
    project: ProjectCache,
    symbols: SymbolCache,
    notifier: ChangeNotifier,
    completion_limit: usize,
}

impl AnalysisCore {
    /// Creates a core with empty caches.
    pub fn new(
        engine: Arc<dyn AnalysisEngine>,
        provider: Arc<dyn ArgumentProvider>,
        settings: CoreSettings,
    ) -> Self {
        let provider: Arc<dyn ArgumentProvider> = if settings.compiler_args.is_empty() {
            provider
        } else {
            Arc::new(ConfiguredArguments {
                provider,
                extra: settings.compiler_args,
            })
        };
        Self {
            builder: UnitBuilder::new(engine, provider, settings.profile, settings.sketch_root),
            units: UnitCache::new(),
            project: ProjectCache::new(),
            symbols: SymbolCache::new(settings.symbol_grace),
            notifier: ChangeNotifier::new(),
            completion_limit: settings.completion_limit,
        }
    }

    /// The sketch root.
    pub fn sketch_root(&self) -> &Path {
        self.builder.sketch_root()
    }

    /// The single-file cache.
    pub fn units(&self) -> &UnitCache {
        &self.units
    }

    /// Diagnostics of one file.
    ///
    /// A file that cannot be parsed reports a single error at line 0.
    pub fn parse_diagnostics(&mut self, path: &Path, code: &str) -> DiagnosticsPass {
        let key = self.builder.key(path);
        let diagnostics = match resolved(&mut self.units, &mut self.builder, path, code) {
            Some(entry) => entry.diagnostics(self.builder.sketch_root()),
            None if is_in_root(self.builder.sketch_root(), &key) => vec![Diagnostic::parse_failure(&key)],
            None => Vec::new(),
        };
        let changed = self.notifier.observe(&key, &diagnostics);
        DiagnosticsPass {
            channel: key,
            diagnostics,
            changed,
        }
    }

    /// Completions at a position, without waiting for a reparse.
    pub fn get_completions(&mut self, path: &Path, code: &str, line: u32, column: u32) -> Vec<CompletionItem> {
        let key = self.builder.key(path);
        let entry = match self.units.resolve_no_reparse(&mut self.builder, path, code) {
            Ok((entry, _)) => entry,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no translation unit for completion");
                return Vec::new();
            }
        };
        let current = self.builder.sources(&key, code);
        let raw = complete(
            entry,
            &current.unsaved(),
            &current.map,
            line,
            column,
            self.builder.sketch_root(),
        );
        filter_and_sort(completion_prefix(code, line, column), raw, self.completion_limit)
    }

    /// Hover information at a position.
    pub fn hover(
        &mut self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        snapshot: &[FileBuffer],
    ) -> Option<HoverInfo> {
        let entry = resolved(&mut self.units, &mut self.builder, path, code)?;
        let texts = SourceTexts::new(entry.unsaved(), snapshot);
        let sibling = SiblingFinder::new(&self.builder, texts);
        hover_at(entry, line, column, &texts, &sibling)
    }

    /// Definition of the symbol at a position.
    pub fn find_definition(
        &mut self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        snapshot: &[FileBuffer],
    ) -> Option<JumpTarget> {
        let entry = resolved(&mut self.units, &mut self.builder, path, code)?;
        let sibling = SiblingFinder::new(&self.builder, SourceTexts::new(entry.unsaved(), snapshot));
        find_definition(entry, line, column, &sibling)
    }

    /// Occurrences of the symbol at a position.
    ///
    /// Project scope also resolves every other open file and keeps only
    /// locations inside the sketch. The search stops early once `token` is
    /// no longer live.
    #[allow(clippy::too_many_arguments)]
    pub fn find_occurrences(
        &mut self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        scope: OccurrenceScope,
        snapshot: &[FileBuffer],
        token: &RequestToken,
    ) -> Vec<JumpTarget> {
        let key = self.builder.key(path);
        let root = self.builder.sketch_root().to_path_buf();
        let mut search = {
            let Some(entry) = resolved(&mut self.units, &mut self.builder, path, code) else {
                return Vec::new();
            };
            let Some(target) = OccurrenceTarget::at(entry, line, column) else {
                return Vec::new();
            };
            let filter = (scope == OccurrenceScope::Project).then_some(root.as_path());
            let mut search = Occurrences::new(target, filter);
            search.scan(entry);
            search
        };

        if scope == OccurrenceScope::Project {
            for file in snapshot.iter().filter(|f| f.kind() != FileKind::Other) {
                if !token.is_live() {
                    tracing::debug!(generation = token.generation(), "occurrence search abandoned");
                    break;
                }
                if self.builder.key(&file.path) == key {
                    continue;
                }
                if let Some(entry) = resolved(&mut self.units, &mut self.builder, &file.path, &file.code) {
                    search.scan(entry);
                }
            }
        }
        search.finish()
    }

    /// All symbols declared by the file's unit.
    ///
    /// A list built for the same content is reused, and so is a list for
    /// different content that is younger than the grace period.
    pub fn get_all_symbols(&mut self, path: &Path, code: &str, now: Instant) -> Vec<SymbolRecord> {
        let key = self.builder.key(path);
        let hash = ContentHash::of_str(code);
        if let Some(symbols) = self.symbols.lookup(&key, hash, now) {
            return symbols.to_vec();
        }
        let Some(entry) = resolved(&mut self.units, &mut self.builder, path, code) else {
            return Vec::new();
        };
        let symbols = collect_symbols(entry, None);
        self.symbols.store(key, hash, now, symbols.clone());
        symbols
    }

    /// The class, struct, union, enum or namespace enclosing a position,
    /// with its direct members.
    pub fn container_symbols(&mut self, path: &Path, code: &str, line: u32, column: u32) -> Option<ContainerInfo> {
        let entry = resolved(&mut self.units, &mut self.builder, path, code)?;
        enclosing_container(entry, line, column)
    }

    /// Runs a project-wide diagnostics pass over an open-file snapshot.
    pub fn refresh_project_diagnostics(&mut self, snapshot: &[FileBuffer]) -> DiagnosticsPass {
        let diagnostics = self.project.refresh(&mut self.builder, snapshot);
        let channel = self.builder.sketch_root().to_path_buf();
        let changed = self.notifier.observe(&channel, &diagnostics);
        DiagnosticsPass {
            channel,
            diagnostics,
            changed,
        }
    }

    /// Releases every unit and forgets every derived result.
    pub fn invalidate_all(&mut self) {
        self.units.invalidate_all();
        self.project.clear();
        self.symbols.clear();
        self.notifier.clear();
        self.builder.clear();
        tracing::debug!("analysis caches invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_cache::StaticArguments;
    use lens_diagnostics::{RawDiagnostic, Severity};
    use lens_engine::testing::FakeEngine;
    use lens_source::sketch::{analyzed_name, prototype_header_path};
    use lens_source::Location;

    fn core(engine: &FakeEngine) -> AnalysisCore {
        AnalysisCore::new(
            Arc::new(engine.clone()),
            Arc::new(StaticArguments::default()),
            CoreSettings::new("/s"),
        )
    }

    const BLINK: &str = "int ledState;\n\nvoid toggle() {\n  ledState = !ledState;\n}\n\nvoid loop() {\n  toggle();\n}\n";

    #[test]
    fn identical_content_parses_once() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        core.parse_diagnostics(Path::new("/s/Blink.ino"), BLINK);
        let calls = engine.call_count();
        core.parse_diagnostics(Path::new("/s/Blink.ino"), BLINK);
        assert_eq!(engine.call_count(), calls);
    }

    #[test]
    fn diagnostics_in_original_coordinates() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let code = "void setup() {\n}\n\n#error no board selected\n";
        let pass = core.parse_diagnostics(Path::new("/s/Blink.ino"), code);
        assert_eq!(pass.diagnostics.len(), 1);
        let diag = &pass.diagnostics[0];
        assert_eq!(diag.file, PathBuf::from("/s/Blink.ino"));
        assert_eq!(diag.line, 4);
        assert_eq!(diag.message, "no board selected");
        assert!(pass.changed);
    }

    #[test]
    fn prototype_header_diagnostics_dropped() {
        let header = prototype_header_path(Path::new("/s/Blink.ino"));
        let engine = FakeEngine::new()
            .with_diagnostic(RawDiagnostic::at(Severity::Error, Location::new(header, 1, 6), "redeclared"))
            .with_diagnostic(RawDiagnostic::at(
                Severity::Error,
                Location::new(analyzed_name(Path::new("/s/Blink.ino")), 1, 1),
                "in injected include",
            ));
        let mut core = core(&engine);
        let pass = core.parse_diagnostics(Path::new("/s/Blink.ino"), "void setup() {\n}\n");
        assert!(pass.diagnostics.is_empty());
    }

    #[test]
    fn outside_root_never_reported() {
        let engine = FakeEngine::new().with_diagnostic(RawDiagnostic::at(
            Severity::Warning,
            Location::new("/core/Arduino.h", 10, 1),
            "deprecated",
        ));
        let mut core = core(&engine);
        let pass = core.parse_diagnostics(Path::new("/s/led.cpp"), "int x;\n");
        assert!(pass.diagnostics.is_empty());
    }

    #[test]
    fn unparseable_file_reports_failure() {
        let engine = FakeEngine::new().failing_when(|_| true);
        let mut core = core(&engine);
        let pass = core.parse_diagnostics(Path::new("/s/led.cpp"), "int x;\n");
        assert_eq!(pass.diagnostics, vec![Diagnostic::parse_failure(Path::new("/s/led.cpp"))]);
        assert_eq!(pass.diagnostics[0].line, 0);
    }

    #[test]
    fn unrelated_edit_keeps_diagnostics_quiet() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let first = core.parse_diagnostics(Path::new("/s/led.cpp"), "#warning check pins\nint a;\n");
        assert!(first.changed);
        let second = core.parse_diagnostics(Path::new("/s/led.cpp"), "#warning check pins\nint ab;\n");
        assert_eq!(first.diagnostics, second.diagnostics);
        assert!(!second.changed);
    }

    #[test]
    fn definition_round_trips_to_sketch() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let target = core
            .find_definition(Path::new("/s/Blink.ino"), BLINK, 8, 3, &[])
            .unwrap();
        assert_eq!(target.file, PathBuf::from("/s/Blink.ino"));
        assert_eq!((target.line, target.column), (3, 6));
    }

    #[test]
    fn hover_over_call() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let info = core.hover(Path::new("/s/Blink.ino"), BLINK, 8, 4, &[]).unwrap();
        assert_eq!(info.name, "toggle");
        assert!(info.full_comment.starts_with("Declaration:\n"));
    }

    #[test]
    fn completions_use_limit() {
        let engine = FakeEngine::new();
        let mut settings = CoreSettings::new("/s");
        settings.completion_limit = 1;
        let mut core = AnalysisCore::new(Arc::new(engine), Arc::new(StaticArguments::default()), settings);
        let code = "int ledA;\nint ledB;\n\nvoid loop() {\n  le\n}\n";
        let items = core.get_completions(Path::new("/s/Blink.ino"), code, 5, 5);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "ledA");
    }

    #[test]
    fn completions_skip_reparse() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        core.parse_diagnostics(Path::new("/s/led.cpp"), "int level;\n");
        core.get_completions(Path::new("/s/led.cpp"), "int level;\nint l\n", 2, 6);
        assert_eq!(engine.reparse_count(), 0);
    }

    #[test]
    fn project_occurrences_span_open_files() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let a = "int shared;\n\nvoid a() {\n  shared = 1;\n}\n";
        let b = "extern int shared;\n\nvoid b() {\n  shared = 2;\n}\n";
        let snapshot = [
            FileBuffer::new("/s/a.cpp", a),
            FileBuffer::new("/s/b.cpp", b),
            FileBuffer::new("/s/notes.txt", "shared"),
        ];
        let token = RequestToken::detached();
        let local = core.find_occurrences(
            Path::new("/s/a.cpp"),
            a,
            4,
            3,
            OccurrenceScope::CurrentFile,
            &snapshot,
            &token,
        );
        assert_eq!(local.len(), 2);
        let all = core.find_occurrences(
            Path::new("/s/a.cpp"),
            a,
            4,
            3,
            OccurrenceScope::Project,
            &snapshot,
            &token,
        );
        let files: Vec<&Path> = all.iter().map(|t| t.file.as_path()).collect();
        assert_eq!(
            files,
            vec![
                Path::new("/s/a.cpp"),
                Path::new("/s/a.cpp"),
                Path::new("/s/b.cpp"),
                Path::new("/s/b.cpp")
            ]
        );
    }

    #[test]
    fn symbols_reused_within_grace() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let t0 = Instant::now();
        let first = core.get_all_symbols(Path::new("/s/led.cpp"), "int a;\n", t0);
        assert_eq!(first.len(), 1);
        let calls = engine.call_count();
        let stale = core.get_all_symbols(Path::new("/s/led.cpp"), "int a;\nint b;\n", t0 + Duration::from_secs(1));
        assert_eq!(stale, first);
        assert_eq!(engine.call_count(), calls);
        let fresh = core.get_all_symbols(Path::new("/s/led.cpp"), "int a;\nint b;\n", t0 + Duration::from_secs(11));
        assert_eq!(fresh.len(), 2);
    }

    #[test]
    fn container_of_method_body() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let code = "class Led {\n  int pin;\n  void on() {\n    pin = 1;\n  }\n};\n";
        let info = core.container_symbols(Path::new("/s/led.cpp"), code, 4, 5).unwrap();
        assert_eq!(info.name, "Led");
        assert_eq!(info.file, PathBuf::from("/s/led.cpp"));
        let names: Vec<&str> = info.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["on", "pin"]);
        assert_eq!(core.container_symbols(Path::new("/s/led.cpp"), code, 7, 1), None);
    }

    #[test]
    fn line_marker_diagnostic_reported_in_sketch() {
        let header = prototype_header_path(Path::new("/s/Blink.ino"));
        let engine = FakeEngine::new().with_diagnostic(
            RawDiagnostic::at(Severity::Error, Location::new(header, 2, 6), "conflicting types for 'toggle'")
                .with_presumed(Location::new("/s/Blink.ino", 3, 6)),
        );
        let mut core = core(&engine);
        let pass = core.parse_diagnostics(Path::new("/s/Blink.ino"), BLINK);
        assert_eq!(pass.diagnostics.len(), 1);
        let diag = &pass.diagnostics[0];
        assert_eq!(diag.file, PathBuf::from("/s/Blink.ino"));
        assert_eq!((diag.line, diag.column), (3, 6));
    }

    #[test]
    fn invalidate_forces_recreate() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        core.parse_diagnostics(Path::new("/s/led.cpp"), "int a;\n");
        core.invalidate_all();
        assert!(core.units().is_empty());
        let parses = engine.parse_count();
        let pass = core.parse_diagnostics(Path::new("/s/led.cpp"), "int a;\n");
        assert_eq!(engine.parse_count(), parses + 1);
        assert!(pass.changed);
    }

    #[test]
    fn project_pass_notifies_on_change_only() {
        let engine = FakeEngine::new();
        let mut core = core(&engine);
        let snapshot = vec![FileBuffer::new("/s/a.cpp", "#error missing\n")];
        let first = core.refresh_project_diagnostics(&snapshot);
        assert_eq!(first.channel, PathBuf::from("/s"));
        assert_eq!(first.diagnostics.len(), 1);
        assert!(first.changed);
        assert!(!core.refresh_project_diagnostics(&snapshot).changed);
    }

    #[test]
    fn configured_arguments_appended() {
        let engine = FakeEngine::new();
        let mut settings = CoreSettings::new("/s");
        settings.compiler_args = vec!["-DLENS".to_string()];
        let mut core = AnalysisCore::new(
            Arc::new(engine.clone()),
            Arc::new(StaticArguments::new(["-DBOARD"])),
            settings,
        );
        core.parse_diagnostics(Path::new("/s/led.cpp"), "int a;\n");
        let recorded = engine.recorded();
        let last = recorded.last().unwrap();
        assert!(last.args.starts_with(&["-DBOARD".to_string(), "-DLENS".to_string()]));
    }

    #[test]
    fn settings_from_config() {
        let config = lens_config::load_config_from_str(
            "[sketch]\nroot = \"/s\"\n[analysis]\nwarning_flags = [\"-Wall\"]\ncompletion_limit = 20\n",
        )
        .unwrap();
        let settings = CoreSettings::from_config(&config);
        assert_eq!(settings.sketch_root, PathBuf::from("/s"));
        assert_eq!(settings.profile.core_include, "Arduino.h");
        assert_eq!(settings.profile.warning_flags, vec!["-Wall"]);
        assert_eq!(settings.completion_limit, 20);
        assert_eq!(settings.symbol_grace, Duration::from_secs(10));
    }
}
