//! Synthetic source transformation for sketch entries.
//!
//! A sketch entry is not a compilable unit on its own: functions may be used
//! before they are declared. This crate generates a prototype header with one
//! forward declaration per function definition, rewrites the entry so that it
//! includes the header, and assembles the unsaved buffers the analysis engine
//! sees for one file.

#![warn(missing_docs)]

pub mod inject;
pub mod prototypes;
pub mod scan;
pub mod sources;

pub use inject::{transformed_source, InsertionMemo, TransformedSource};
pub use prototypes::{generate_prototype_header, prototype_header, PrototypeCache};
pub use scan::{function_definitions, FunctionDefinition};
pub use sources::{SyntheticSources, Transformer};
