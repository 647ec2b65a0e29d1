//! Diagnostics as reported by the analysis engine.

use lens_source::Location;

use crate::severity::Severity;

/// A diagnostic straight from the analysis engine, before scoping and
/// location correction.
///
/// The engine resolves each diagnostic position three ways: where the text
/// was spelled, where a macro containing it was expanded, and the presumed
/// location honoring `#line` markers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDiagnostic {
    /// Reported severity.
    pub severity: Severity,
    /// Message text.
    pub message: String,
    /// Spelling location.
    pub spelling: Location,
    /// Expansion location.
    pub expansion: Location,
    /// Presumed location.
    pub presumed: Location,
    /// Structural child diagnostics (usually notes).
    pub children: Vec<RawDiagnostic>,
}

impl RawDiagnostic {
    /// Creates a diagnostic whose three locations coincide.
    pub fn at(severity: Severity, location: Location, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            spelling: location.clone(),
            expansion: location.clone(),
            presumed: location,
            children: Vec::new(),
        }
    }

    /// Overrides the expansion location.
    pub fn with_expansion(mut self, location: Location) -> Self {
        self.expansion = location;
        self
    }

    /// Overrides the presumed location.
    pub fn with_presumed(mut self, location: Location) -> Self {
        self.presumed = location;
        self
    }

    /// Adds a structural child.
    pub fn with_child(mut self, child: RawDiagnostic) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_coincide() {
        let d = RawDiagnostic::at(Severity::Error, Location::new("/s/a.cpp", 2, 4), "x");
        assert_eq!(d.spelling, d.expansion);
        assert_eq!(d.expansion, d.presumed);
    }

    #[test]
    fn overrides() {
        let d = RawDiagnostic::at(Severity::Error, Location::new("/usr/x.h", 2, 4), "x")
            .with_expansion(Location::new("/s/a.cpp", 9, 1))
            .with_presumed(Location::new("/s/a.ino", 7, 1));
        assert_eq!(d.spelling.file.to_str(), Some("/usr/x.h"));
        assert_eq!(d.expansion.line, 9);
        assert_eq!(d.presumed.line, 7);
    }
}
