//! Diagnostic collection, location correction, and change detection.
//!
//! The analysis engine reports [`RawDiagnostic`]s with several candidate
//! locations each. The [`DiagnosticCollector`] turns them into a sorted list of
//! [`Diagnostic`] trees scoped to the sketch, translated out of synthetic file
//! coordinates. [`ChangeNotifier`] suppresses repeat notifications for
//! diagnostic sets that did not change.

#![warn(missing_docs)]

pub mod collect;
pub mod diagnostic;
pub mod notify;
pub mod raw;
pub mod render;
pub mod severity;

pub use collect::DiagnosticCollector;
pub use diagnostic::{sort_and_dedup, Diagnostic, PARSE_FAILURE_MESSAGE};
pub use notify::{diagnostics_hash, ChangeNotifier};
pub use raw::RawDiagnostic;
pub use render::{render_all, render_tree};
pub use severity::Severity;
