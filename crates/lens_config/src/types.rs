//! Configuration types deserialized from `lens.toml`.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The top-level workspace configuration parsed from `lens.toml`.
#[derive(Debug, Deserialize)]
pub struct LensConfig {
    /// The sketch being analyzed.
    pub sketch: SketchConfig,
    /// Compiler flags and result tuning.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Request queue settings.
    #[serde(default)]
    pub service: ServiceConfig,
}

/// The `[sketch]` section.
#[derive(Debug, Deserialize)]
pub struct SketchConfig {
    /// Directory holding the sketch. Diagnostics outside it are dropped.
    pub root: PathBuf,
}

/// The `[analysis]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Arguments handed to the analysis engine in addition to the board's.
    pub compiler_args: Vec<String>,
    /// Warning flags appended after all other arguments.
    pub warning_flags: Vec<String>,
    /// Header force-included into every sketch entry file.
    pub core_include: String,
    /// How long a symbol list may be reused after its file changed.
    pub symbol_grace_ms: u64,
    /// Maximum number of completions returned.
    pub completion_limit: usize,
}

impl AnalysisConfig {
    /// [`symbol_grace_ms`](Self::symbol_grace_ms) as a duration.
    pub fn symbol_grace(&self) -> Duration {
        Duration::from_millis(self.symbol_grace_ms)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            compiler_args: Vec::new(),
            warning_flags: Vec::new(),
            core_include: "Arduino.h".to_string(),
            symbol_grace_ms: 10_000,
            completion_limit: 256,
        }
    }
}

/// The `[service]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Requests that may wait for the analysis worker before callers block.
    pub queue_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { queue_capacity: 64 }
    }
}
