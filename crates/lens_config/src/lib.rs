//! Parsing and validation of `lens.toml` workspace configuration files.
//!
//! This crate reads the configuration of a sketch workspace and produces a
//! strongly-typed [`LensConfig`]: the sketch root, the extra compiler flags and
//! the tuning knobs of the analysis service.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
