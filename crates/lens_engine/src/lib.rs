//! Interface to the external AST/analysis service.
//!
//! The analysis engine parses source text plus compiler arguments into an
//! opaque [`TranslationUnit`] handle that can be reparsed with new unsaved
//! content and queried for diagnostics, cursors and completions. The cache
//! owns every handle; no handle escapes the cache component.

#![warn(missing_docs)]

pub mod completion;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod options;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod unit;

pub use completion::CompletionCandidate;
pub use cursor::{Cursor, CursorId, CursorKind, ParameterInfo};
pub use engine::{AnalysisEngine, ParseRequest, UnsavedFile};
pub use error::EngineError;
pub use options::ParseOptions;
pub use unit::{TranslationUnit, Walk};
