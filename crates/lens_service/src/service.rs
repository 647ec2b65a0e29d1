//! The asynchronous request facade.
//!
//! One worker thread owns the [`AnalysisCore`]. Requests travel over a bounded
//! channel and run one at a time, so engine handles are never shared between
//! threads. Results of asynchronous requests are handed to a second thread
//! that runs the callbacks; the worker never runs caller code, so a callback
//! may issue further requests. Open-file snapshots are captured on the
//! caller's thread before a request is queued.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use lens_cache::ArgumentProvider;
use lens_common::{InternalError, LensResult};
use lens_config::{LensConfig, ServiceConfig};
use lens_diagnostics::Diagnostic;
use lens_engine::AnalysisEngine;
use lens_intel::{CompletionItem, ContainerInfo, HoverInfo, OccurrenceScope, SymbolRecord};
use lens_source::{FileBuffer, JumpTarget};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::analysis::{AnalysisCore, CoreSettings, DiagnosticsPass};
use crate::token::{GenerationClock, RequestToken};

/// Supplies copies of every open editor buffer.
pub trait FileSnapshotProvider: Send + Sync {
    /// Current text of all open files.
    fn open_files(&self) -> Vec<FileBuffer>;
}

impl FileSnapshotProvider for Mutex<Vec<FileBuffer>> {
    fn open_files(&self) -> Vec<FileBuffer> {
        self.lock().clone()
    }
}

/// Notifications pushed by the worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceEvent {
    /// The diagnostics of one file changed.
    DiagnosticsChanged {
        /// The original file.
        file: PathBuf,
        /// Its full current diagnostic set.
        diagnostics: Vec<Diagnostic>,
    },
    /// The project-wide diagnostic set changed.
    ProjectDiagnostics {
        /// The union over all project sources.
        diagnostics: Vec<Diagnostic>,
    },
}

/// Kinds of request; each has its own generation clock.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RequestKind {
    /// Single-file diagnostics.
    Diagnostics,
    /// Code completion.
    Completions,
    /// Hover information.
    Hover,
    /// Go to definition.
    Definition,
    /// Occurrence search.
    Occurrences,
    /// Symbol listing.
    Symbols,
    /// Members of the enclosing container.
    Containers,
    /// Project-wide diagnostics.
    ProjectDiagnostics,
}

impl RequestKind {
    const COUNT: usize = 8;

    fn index(self) -> usize {
        self as usize
    }
}

type Job = Box<dyn FnOnce(&mut AnalysisCore) + Send>;

enum Message {
    Run(Job),
    Stop,
}

enum Delivery {
    Callback(Box<dyn FnOnce() + Send>),
    Stop,
}

struct Threads {
    worker: JoinHandle<()>,
    delivery: JoinHandle<()>,
}

/// Handle to the analysis worker.
///
/// Every public operation exists twice: `request_*` queues the work and hands
/// the result to a callback on the delivery thread, the plain form blocks
/// until the result is available. Callbacks of superseded or cancelled
/// requests are not called; liveness is checked again right before delivery.
pub struct AnalysisService {
    requests: Sender<Message>,
    deliveries: Sender<Delivery>,
    events_tx: Sender<ServiceEvent>,
    events_rx: Receiver<ServiceEvent>,
    snapshots: Arc<dyn FileSnapshotProvider>,
    clocks: [GenerationClock; RequestKind::COUNT],
    cancel: Arc<AtomicBool>,
    threads: Mutex<Option<Threads>>,
}

impl AnalysisService {
    /// Starts the worker and delivery threads with `core`.
    pub fn spawn(
        core: AnalysisCore,
        snapshots: Arc<dyn FileSnapshotProvider>,
        config: &ServiceConfig,
    ) -> LensResult<Self> {
        let (requests, inbox) = channel::bounded::<Message>(config.queue_capacity.max(1));
        let (deliveries, outbox) = channel::unbounded::<Delivery>();
        let (events_tx, events_rx) = channel::unbounded();
        let delivery = std::thread::Builder::new()
            .name("lens-delivery".to_string())
            .spawn(move || run_delivery(outbox))
            .map_err(|e| InternalError::new(format!("failed to start delivery thread: {e}")))?;
        let worker = std::thread::Builder::new()
            .name("lens-analysis".to_string())
            .spawn(move || run_worker(core, inbox))
            .map_err(|e| InternalError::new(format!("failed to start analysis worker: {e}")))?;
        tracing::debug!(queue_capacity = config.queue_capacity, "analysis service started");
        Ok(Self {
            requests,
            deliveries,
            events_tx,
            events_rx,
            snapshots,
            clocks: Default::default(),
            cancel: Arc::new(AtomicBool::new(false)),
            threads: Mutex::new(Some(Threads { worker, delivery })),
        })
    }

    /// Builds the core from a loaded `lens.toml` and starts the service with
    /// its `[service]` settings.
    pub fn from_config(
        config: &LensConfig,
        engine: Arc<dyn AnalysisEngine>,
        provider: Arc<dyn ArgumentProvider>,
        snapshots: Arc<dyn FileSnapshotProvider>,
    ) -> LensResult<Self> {
        let core = AnalysisCore::new(engine, provider, CoreSettings::from_config(config));
        Self::spawn(core, snapshots, &config.service)
    }

    /// Requests that may wait for the worker before callers block.
    pub fn queue_capacity(&self) -> usize {
        self.requests.capacity().unwrap_or(usize::MAX)
    }

    /// Receiver of worker notifications. All clones share one queue.
    pub fn events(&self) -> Receiver<ServiceEvent> {
        self.events_rx.clone()
    }

    /// Raises the global cancel flag: no pending or future callback runs.
    pub fn cancel_all(&self) {
        self.cancel.store(true, Ordering::Release);
        tracing::debug!("all asynchronous requests cancelled");
    }

    /// Stops the worker after the requests already queued, then the delivery
    /// thread after the callbacks already handed over, and waits for both.
    pub fn shutdown(&self) {
        let Some(threads) = self.threads.lock().take() else {
            return;
        };
        if self.requests.send(Message::Stop).is_err() {
            tracing::debug!("analysis worker already gone");
        }
        join("analysis worker", threads.worker);
        if self.deliveries.send(Delivery::Stop).is_err() {
            tracing::debug!("delivery thread already gone");
        }
        join("delivery thread", threads.delivery);
    }

    fn token(&self, kind: RequestKind) -> RequestToken {
        RequestToken::issue(&self.clocks[kind.index()], &self.cancel)
    }

    fn submit(&self, job: Job) -> LensResult<()> {
        match self.requests.try_send(Message::Run(job)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(message)) => {
                tracing::warn!("analysis request queue full, waiting");
                self.requests.send(message).map_err(|_| worker_gone())
            }
            Err(TrySendError::Disconnected(_)) => Err(worker_gone()),
        }
    }

    fn dispatch<T, W, C>(&self, kind: RequestKind, work: W, callback: C) -> LensResult<()>
    where
        T: Send + 'static,
        W: FnOnce(&mut AnalysisCore, &RequestToken) -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let token = self.token(kind);
        let deliveries = self.deliveries.clone();
        tracing::trace!(kind = ?kind, generation = token.generation(), "request dispatched");
        self.submit(Box::new(move |core: &mut AnalysisCore| {
            if !token.is_live() {
                tracing::trace!(kind = ?kind, generation = token.generation(), "request skipped");
                return;
            }
            let result = work(core, &token);
            if !token.is_live() {
                tracing::trace!(kind = ?kind, generation = token.generation(), "result discarded");
                return;
            }
            let delivery = Delivery::Callback(Box::new(move || {
                if token.is_cancelled() {
                    tracing::trace!(kind = ?kind, "delivery cancelled");
                } else if token.is_superseded() {
                    tracing::trace!(kind = ?kind, generation = token.generation(), "delivery superseded");
                } else {
                    callback(result);
                }
            }));
            if deliveries.send(delivery).is_err() {
                tracing::debug!(kind = ?kind, "delivery thread gone, result dropped");
            }
        }))
    }

    fn call<T, W>(&self, work: W) -> LensResult<T>
    where
        T: Send + 'static,
        W: FnOnce(&mut AnalysisCore) -> T + Send + 'static,
    {
        let (reply, result) = channel::bounded(1);
        self.submit(Box::new(move |core: &mut AnalysisCore| {
            let _ = reply.send(work(core));
        }))?;
        result.recv().map_err(|_| worker_gone())
    }

    fn diagnostics_job(
        &self,
        path: &Path,
        code: &str,
    ) -> impl FnOnce(&mut AnalysisCore) -> Vec<Diagnostic> + Send + 'static {
        let events = self.events_tx.clone();
        let path = path.to_path_buf();
        let code = code.to_string();
        move |core: &mut AnalysisCore| {
            let pass = core.parse_diagnostics(&path, &code);
            publish(&events, pass, false)
        }
    }

    /// Queues a diagnostics pass for one file.
    pub fn request_diagnostics(
        &self,
        path: &Path,
        code: &str,
        callback: impl FnOnce(Vec<Diagnostic>) + Send + 'static,
    ) -> LensResult<()> {
        let job = self.diagnostics_job(path, code);
        self.dispatch(RequestKind::Diagnostics, move |core, _| job(core), callback)
    }

    /// Diagnostics of one file.
    pub fn parse_diagnostics(&self, path: &Path, code: &str) -> LensResult<Vec<Diagnostic>> {
        self.call(self.diagnostics_job(path, code))
    }

    /// Queues a completion request.
    pub fn request_completions(
        &self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        callback: impl FnOnce(Vec<CompletionItem>) + Send + 'static,
    ) -> LensResult<()> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        self.dispatch(
            RequestKind::Completions,
            move |core, _| core.get_completions(&path, &code, line, column),
            callback,
        )
    }

    /// Completions at a position.
    pub fn get_completions(&self, path: &Path, code: &str, line: u32, column: u32) -> LensResult<Vec<CompletionItem>> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        self.call(move |core| core.get_completions(&path, &code, line, column))
    }

    /// Queues a hover request.
    pub fn request_hover(
        &self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        callback: impl FnOnce(Option<HoverInfo>) + Send + 'static,
    ) -> LensResult<()> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        let snapshot = self.snapshots.open_files();
        self.dispatch(
            RequestKind::Hover,
            move |core, _| core.hover(&path, &code, line, column, &snapshot),
            callback,
        )
    }

    /// Hover information at a position.
    pub fn hover(&self, path: &Path, code: &str, line: u32, column: u32) -> LensResult<Option<HoverInfo>> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        let snapshot = self.snapshots.open_files();
        self.call(move |core| core.hover(&path, &code, line, column, &snapshot))
    }

    /// Queues a go-to-definition request.
    pub fn request_definition(
        &self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        callback: impl FnOnce(Option<JumpTarget>) + Send + 'static,
    ) -> LensResult<()> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        let snapshot = self.snapshots.open_files();
        self.dispatch(
            RequestKind::Definition,
            move |core, _| core.find_definition(&path, &code, line, column, &snapshot),
            callback,
        )
    }

    /// Definition of the symbol at a position.
    pub fn find_definition(&self, path: &Path, code: &str, line: u32, column: u32) -> LensResult<Option<JumpTarget>> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        let snapshot = self.snapshots.open_files();
        self.call(move |core| core.find_definition(&path, &code, line, column, &snapshot))
    }

    /// Queues an occurrence search.
    pub fn request_occurrences(
        &self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        scope: OccurrenceScope,
        callback: impl FnOnce(Vec<JumpTarget>) + Send + 'static,
    ) -> LensResult<()> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        let snapshot = self.snapshots.open_files();
        self.dispatch(
            RequestKind::Occurrences,
            move |core, token| core.find_occurrences(&path, &code, line, column, scope, &snapshot, token),
            callback,
        )
    }

    /// Occurrences of the symbol at a position.
    pub fn find_occurrences(
        &self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        scope: OccurrenceScope,
    ) -> LensResult<Vec<JumpTarget>> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        let snapshot = self.snapshots.open_files();
        self.call(move |core| {
            core.find_occurrences(&path, &code, line, column, scope, &snapshot, &RequestToken::detached())
        })
    }

    /// Queues a symbol listing.
    pub fn request_symbols(
        &self,
        path: &Path,
        code: &str,
        callback: impl FnOnce(Vec<SymbolRecord>) + Send + 'static,
    ) -> LensResult<()> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        self.dispatch(
            RequestKind::Symbols,
            move |core, _| core.get_all_symbols(&path, &code, Instant::now()),
            callback,
        )
    }

    /// All symbols of a file.
    pub fn get_all_symbols(&self, path: &Path, code: &str) -> LensResult<Vec<SymbolRecord>> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        self.call(move |core| core.get_all_symbols(&path, &code, Instant::now()))
    }

    /// Queues a lookup of the container enclosing a position.
    pub fn request_container_symbols(
        &self,
        path: &Path,
        code: &str,
        line: u32,
        column: u32,
        callback: impl FnOnce(Option<ContainerInfo>) + Send + 'static,
    ) -> LensResult<()> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        self.dispatch(
            RequestKind::Containers,
            move |core, _| core.container_symbols(&path, &code, line, column),
            callback,
        )
    }

    /// The container enclosing a position, with its direct members.
    pub fn container_symbols(&self, path: &Path, code: &str, line: u32, column: u32) -> LensResult<Option<ContainerInfo>> {
        let (path, code) = (path.to_path_buf(), code.to_string());
        self.call(move |core| core.container_symbols(&path, &code, line, column))
    }

    fn project_job(&self) -> impl FnOnce(&mut AnalysisCore) -> Vec<Diagnostic> + Send + 'static {
        let events = self.events_tx.clone();
        let snapshot = self.snapshots.open_files();
        move |core: &mut AnalysisCore| {
            let pass = core.refresh_project_diagnostics(&snapshot);
            publish(&events, pass, true)
        }
    }

    /// Queues a project-wide diagnostics pass over the open files.
    pub fn request_project_diagnostics(
        &self,
        callback: impl FnOnce(Vec<Diagnostic>) + Send + 'static,
    ) -> LensResult<()> {
        let job = self.project_job();
        self.dispatch(RequestKind::ProjectDiagnostics, move |core, _| job(core), callback)
    }

    /// Runs a project-wide diagnostics pass over the open files.
    pub fn refresh_project_diagnostics(&self) -> LensResult<Vec<Diagnostic>> {
        self.call(self.project_job())
    }

    /// Drops every cache. Requests already queued run against empty caches.
    pub fn invalidate_all(&self) -> LensResult<()> {
        self.call(AnalysisCore::invalidate_all)
    }
}

impl Drop for AnalysisService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_gone() -> InternalError {
    InternalError::new("analysis worker stopped")
}

fn join(name: &str, handle: JoinHandle<()>) {
    // Dropping the last handle from a callback ends up here on the delivery thread.
    if handle.thread().id() == std::thread::current().id() {
        tracing::debug!(thread = name, "not joining the current thread");
        return;
    }
    if handle.join().is_err() {
        tracing::warn!(thread = name, "thread panicked");
    }
}

fn run_delivery(outbox: Receiver<Delivery>) {
    for delivery in outbox {
        match delivery {
            Delivery::Callback(callback) => callback(),
            Delivery::Stop => break,
        }
    }
    tracing::debug!("delivery thread stopped");
}

fn run_worker(mut core: AnalysisCore, inbox: Receiver<Message>) {
    tracing::debug!(root = %core.sketch_root().display(), "analysis worker started");
    for message in inbox {
        match message {
            Message::Run(job) => job(&mut core),
            Message::Stop => break,
        }
    }
    tracing::debug!("analysis worker stopped");
}

fn publish(events: &Sender<ServiceEvent>, pass: DiagnosticsPass, project: bool) -> Vec<Diagnostic> {
    if pass.changed {
        let event = if project {
            ServiceEvent::ProjectDiagnostics {
                diagnostics: pass.diagnostics.clone(),
            }
        } else {
            ServiceEvent::DiagnosticsChanged {
                file: pass.channel,
                diagnostics: pass.diagnostics.clone(),
            }
        };
        if events.send(event).is_err() {
            tracing::debug!("event receiver gone, notification dropped");
        }
    }
    pass.diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_cache::StaticArguments;
    use lens_engine::testing::FakeEngine;
    use std::time::Duration;

    fn service(engine: &FakeEngine, files: Vec<FileBuffer>) -> AnalysisService {
        let core = AnalysisCore::new(
            Arc::new(engine.clone()),
            Arc::new(StaticArguments::default()),
            CoreSettings::new("/s"),
        );
        AnalysisService::spawn(core, Arc::new(Mutex::new(files)), &ServiceConfig { queue_capacity: 4 }).unwrap()
    }

    const BLINK: &str = "\nvoid toggle() {\n}\n\nvoid loop() {\n  toggle();\n}\n";

    #[test]
    fn blocking_round_trip() {
        let engine = FakeEngine::new();
        let svc = service(&engine, Vec::new());
        let target = svc
            .find_definition(Path::new("/s/Blink.ino"), BLINK, 6, 3)
            .unwrap()
            .unwrap();
        assert_eq!(target.file, PathBuf::from("/s/Blink.ino"));
        assert_eq!(target.line, 2);
        let symbols = svc.get_all_symbols(Path::new("/s/Blink.ino"), BLINK).unwrap();
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["loop", "toggle"]);
    }

    #[test]
    fn diagnostics_event_only_on_change() {
        let engine = FakeEngine::new();
        let svc = service(&engine, Vec::new());
        let events = svc.events();
        let code = "#error pick a board\nint a;\n";
        let diags = svc.parse_diagnostics(Path::new("/s/a.cpp"), code).unwrap();
        assert_eq!(diags.len(), 1);
        svc.parse_diagnostics(Path::new("/s/a.cpp"), "#error pick a board\nint b;\n")
            .unwrap();
        let received: Vec<ServiceEvent> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![ServiceEvent::DiagnosticsChanged {
                file: PathBuf::from("/s/a.cpp"),
                diagnostics: diags,
            }]
        );
    }

    #[test]
    fn project_event_uses_snapshot() {
        let engine = FakeEngine::new();
        let files = vec![
            FileBuffer::new("/s/a.cpp", "#warning slow loop\n"),
            FileBuffer::new("/s/led.h", "void on();\n"),
        ];
        let svc = service(&engine, files);
        let events = svc.events();
        let diags = svc.refresh_project_diagnostics().unwrap();
        assert_eq!(diags.len(), 1);
        svc.refresh_project_diagnostics().unwrap();
        assert_eq!(events.try_iter().count(), 1);
    }

    #[test]
    fn callback_receives_result() {
        let engine = FakeEngine::new();
        let svc = service(&engine, Vec::new());
        let (tx, rx) = channel::unbounded();
        svc.request_hover(Path::new("/s/Blink.ino"), BLINK, 6, 4, move |info| {
            let _ = tx.send(info.map(|i| i.name));
        })
        .unwrap();
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("toggle"));
    }

    #[test]
    fn superseded_request_not_delivered() {
        let engine = FakeEngine::new();
        let svc = service(&engine, Vec::new());
        let (gate_tx, gate_rx) = channel::bounded::<()>(0);
        let (out_tx, out_rx) = channel::unbounded();

        let blocker = out_tx.clone();
        svc.request_symbols(Path::new("/s/a.cpp"), "int a;\n", move |_| {
            let _ = gate_rx.recv();
            let _ = blocker.send("symbols");
        })
        .unwrap();
        let first = out_tx.clone();
        svc.request_completions(Path::new("/s/a.cpp"), "int a;\n", 1, 6, move |_| {
            let _ = first.send("first");
        })
        .unwrap();
        let second = out_tx;
        svc.request_completions(Path::new("/s/a.cpp"), "int a;\n", 1, 6, move |_| {
            let _ = second.send("second");
        })
        .unwrap();

        // The worker keeps serving while a callback is blocked.
        svc.invalidate_all().unwrap();
        gate_tx.send(()).unwrap();

        let delivered: Vec<&str> = (0..2)
            .filter_map(|_| out_rx.recv_timeout(Duration::from_secs(5)).ok())
            .collect();
        assert_eq!(delivered, vec!["symbols", "second"]);
        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn callback_may_call_back_into_service() {
        let engine = FakeEngine::new();
        let svc = Arc::new(service(&engine, Vec::new()));
        let code = "#error stop\nint a;\n";
        let (tx, rx) = channel::bounded(1);
        let inner = Arc::clone(&svc);
        svc.request_symbols(Path::new("/s/a.cpp"), code, move |symbols| {
            let diagnostics = inner.parse_diagnostics(Path::new("/s/a.cpp"), code);
            drop(inner);
            let _ = tx.send((symbols.len(), diagnostics.ok().map(|d| d.len())));
        })
        .unwrap();
        let (symbols, diagnostics) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(symbols, 1);
        assert_eq!(diagnostics, Some(1));
    }

    #[test]
    fn container_request_lists_members() {
        let engine = FakeEngine::new();
        let svc = service(&engine, Vec::new());
        let code = "struct Pin {\n  int number;\n  int mode;\n};\n";
        let info = svc
            .container_symbols(Path::new("/s/pin.cpp"), code, 2, 3)
            .unwrap()
            .unwrap();
        assert_eq!(info.name, "Pin");
        let (tx, rx) = channel::unbounded();
        svc.request_container_symbols(Path::new("/s/pin.cpp"), code, 3, 3, move |found| {
            let _ = tx.send(found);
        })
        .unwrap();
        let found = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(found, Some(info));
    }

    #[test]
    fn configured_capacity_bounds_queue() {
        let config = lens_config::load_config_from_str("[sketch]\nroot = \"/s\"\n[service]\nqueue_capacity = 2\n")
            .unwrap();
        let svc = AnalysisService::from_config(
            &config,
            Arc::new(FakeEngine::new()),
            Arc::new(StaticArguments::default()),
            Arc::new(Mutex::new(Vec::<FileBuffer>::new())),
        )
        .unwrap();
        assert_eq!(svc.queue_capacity(), 2);

        let (started_tx, started_rx) = channel::bounded::<()>(0);
        let (gate_tx, gate_rx) = channel::bounded::<()>(0);
        svc.submit(Box::new(move |_: &mut AnalysisCore| {
            let _ = started_tx.send(());
            let _ = gate_rx.recv();
        }))
        .unwrap();
        started_rx.recv().unwrap();
        for _ in 0..2 {
            svc.submit(Box::new(|_: &mut AnalysisCore| {})).unwrap();
        }
        assert!(svc.requests.is_full());
        gate_tx.send(()).unwrap();
        svc.invalidate_all().unwrap();
    }

    #[test]
    fn cancel_all_silences_callbacks() {
        let engine = FakeEngine::new();
        let svc = service(&engine, Vec::new());
        svc.cancel_all();
        let (tx, rx) = channel::unbounded();
        svc.request_diagnostics(Path::new("/s/a.cpp"), "int a;\n", move |d| {
            let _ = tx.send(d);
        })
        .unwrap();
        assert!(svc.parse_diagnostics(Path::new("/s/a.cpp"), "int a;\n").unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stopped_worker_is_an_error() {
        let engine = FakeEngine::new();
        let svc = service(&engine, Vec::new());
        svc.shutdown();
        let err = svc.get_all_symbols(Path::new("/s/a.cpp"), "int a;\n").unwrap_err();
        assert_eq!(err.message, "analysis worker stopped");
        svc.shutdown();
    }
}
