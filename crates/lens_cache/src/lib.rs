//! Translation-unit caching.
//!
//! [`UnitCache`] keeps at most one live translation unit per original file and
//! decides on every request whether to reuse, reparse or recreate it.
//! [`ProjectCache`] keeps a second set of units for project-wide diagnostics,
//! keyed additionally by the compiler arguments and the content of every open
//! header. Both build their units through a shared [`UnitBuilder`], which owns
//! the synthetic-source caches and applies the parse recovery ladder.

#![warn(missing_docs)]

pub mod arguments;
pub mod builder;
pub mod error;
pub mod ladder;
pub mod project;
pub mod unit_cache;

pub use arguments::{compile_arguments, ArgumentProfile, ArgumentProvider, StaticArguments};
pub use builder::UnitBuilder;
pub use error::CacheError;
pub use ladder::{recovery_ladder, Attempt};
pub use project::{ProjectCache, ProjectUnit};
pub use unit_cache::{CacheStats, CachedUnit, UnitAction, UnitCache};
