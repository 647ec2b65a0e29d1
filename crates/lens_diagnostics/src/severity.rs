//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Ignored`) to most severe (`Fatal`), matching the
/// derived `PartialOrd`/`Ord` implementation based on declaration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Suppressed by the engine's configuration.
    Ignored,
    /// Additional context attached to another diagnostic.
    Note,
    /// A potential issue that does not stop compilation.
    Warning,
    /// A definite problem.
    Error,
    /// A problem that stopped the engine from continuing.
    Fatal,
}

impl Severity {
    /// Sort rank used when presenting diagnostics: errors first, then warnings.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Error | Severity::Fatal => 0,
            Severity::Warning => 1,
            Severity::Ignored | Severity::Note => 2,
        }
    }

    /// Returns `true` for severities shown as top-level diagnostics.
    pub fn is_reportable(self) -> bool {
        matches!(self, Severity::Warning | Severity::Error | Severity::Fatal)
    }

    /// Capitalized label used in rendered output.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Ignored => "Ignored",
            Severity::Note => "Note",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ignored => write!(f, "ignored"),
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}
