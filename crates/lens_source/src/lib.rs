//! Source identity, sketch naming, and location mapping.
//!
//! This crate provides path normalization and sketch-root scoping, the naming
//! rules for synthetic analyzed files, the [`SyntheticMap`] that translates
//! analyzed locations back to original file coordinates, file buffer snapshots,
//! and small text utilities used when building hover documentation.

#![warn(missing_docs)]

pub mod buffer;
pub mod kind;
pub mod line_index;
pub mod location;
pub mod path;
pub mod sketch;
pub mod synthetic;
pub mod text;

pub use buffer::FileBuffer;
pub use kind::FileKind;
pub use line_index::LineIndex;
pub use location::{BodyRange, JumpTarget, Location};
pub use path::{display_path, is_in_root, normalize_absolute};
pub use synthetic::SyntheticMap;
