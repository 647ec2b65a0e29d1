//! Raw completion results.

use std::path::PathBuf;

use crate::cursor::CursorKind;

/// One completion result as produced by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionCandidate {
    /// Text to insert.
    pub text: String,
    /// Label with signature, e.g. `digitalWrite(uint8_t pin, uint8_t val)`.
    pub label: String,
    /// Result type; empty when not applicable.
    pub result_type: String,
    /// Kind of the declaration behind the result.
    pub kind: CursorKind,
    /// Engine priority; lower is better.
    pub priority: u32,
    /// File declaring the result, when known.
    pub file: Option<PathBuf>,
}

impl CompletionCandidate {
    /// Creates a candidate whose label equals its text.
    pub fn new(text: impl Into<String>, kind: CursorKind) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            text,
            result_type: String::new(),
            kind,
            priority: 50,
            file: None,
        }
    }

    /// Sets the declaring file.
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the label and result type.
    pub fn with_signature(mut self, label: impl Into<String>, result_type: impl Into<String>) -> Self {
        self.label = label.into();
        self.result_type = result_type.into();
        self
    }
}
