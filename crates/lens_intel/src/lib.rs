//! Code intelligence over cached translation units.
//!
//! Every extractor reads a [`CachedUnit`](lens_cache::CachedUnit) and reports
//! locations in original file coordinates: results inside a generated
//! prototype header or the injected include line are dropped, and the
//! synthetic analyzed name is translated back to the sketch entry.

#![warn(missing_docs)]

pub mod completion;
pub mod hover;
pub mod navigate;
pub mod sibling;
pub mod symbol_cache;
pub mod symbols;
pub mod texts;

pub use completion::{complete, completion_prefix, filter_and_sort, CompletionItem};
pub use hover::{hover_at, inject_parameter_names, HoverInfo};
pub use navigate::{find_definition, OccurrenceScope, OccurrenceTarget, Occurrences};
pub use sibling::{find_function, sibling_sources, FunctionKey, SiblingFinder};
pub use symbol_cache::SymbolCache;
pub use symbols::{collect_symbols, enclosing_container, ContainerInfo, SymbolKind, SymbolRecord};
pub use texts::SourceTexts;
