//! Generation counters and per-request tokens.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic generation counter shared by all requests of one kind.
///
/// Issuing a request advances the clock, which supersedes every request of
/// the same kind issued before it.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
    current: Arc<AtomicU64>,
}

impl GenerationClock {
    /// Creates a clock at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock and returns the new generation.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// The latest generation handed out.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Captured at dispatch time and checked by the worker before engine work and
/// before delivering a result.
#[derive(Debug, Clone)]
pub struct RequestToken {
    generation: u64,
    clock: GenerationClock,
    cancel: Arc<AtomicBool>,
}

impl RequestToken {
    /// Issues a token for a new request, superseding older ones on `clock`.
    pub fn issue(clock: &GenerationClock, cancel: &Arc<AtomicBool>) -> Self {
        Self {
            generation: clock.advance(),
            clock: clock.clone(),
            cancel: Arc::clone(cancel),
        }
    }

    /// A token that is never superseded or cancelled.
    pub fn detached() -> Self {
        Self::issue(&GenerationClock::new(), &Arc::new(AtomicBool::new(false)))
    }

    /// Generation the request was issued with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` once a newer request of the same kind was issued.
    pub fn is_superseded(&self) -> bool {
        self.clock.current() != self.generation
    }

    /// Returns `true` once the global cancel flag is raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Neither superseded nor cancelled.
    pub fn is_live(&self) -> bool {
        !self.is_cancelled() && !self.is_superseded()
    }
}
