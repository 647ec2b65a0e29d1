//! Asynchronous code-intelligence service for Arduino sketches.
//!
//! [`AnalysisCore`] owns the translation-unit caches and answers requests
//! synchronously. [`AnalysisService`] runs a core on a dedicated worker thread
//! and exposes every operation both as a callback-based request and as a
//! blocking call. Requests of one kind supersede each other through
//! generation counters; a global flag cancels all pending deliveries.

#![warn(missing_docs)]

pub mod analysis;
pub mod service;
pub mod token;
pub mod trace;

pub use analysis::{AnalysisCore, CoreSettings, DiagnosticsPass};
pub use service::{AnalysisService, FileSnapshotProvider, RequestKind, ServiceEvent};
pub use token::{GenerationClock, RequestToken};
pub use trace::init_tracing;
