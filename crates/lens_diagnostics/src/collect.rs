//! Conversion of engine diagnostics into sketch-scoped diagnostic trees.

use lens_source::sketch::is_prototype_header;
use lens_source::{is_in_root, Location, SyntheticMap};
use std::collections::HashSet;
use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::raw::RawDiagnostic;
use crate::severity::Severity;

/// Builds the diagnostic list for one translation unit.
///
/// The collector walks the engine's diagnostics in file order. Notes and
/// ignored diagnostics never appear at the top level; they are attached to the
/// preceding warning or error instead. Diagnostics outside the sketch root or
/// without a file are dropped, and locations in the synthetic analyzed file
/// are translated back through the unit's [`SyntheticMap`].
pub struct DiagnosticCollector<'a> {
    sketch_root: &'a Path,
    map: &'a SyntheticMap,
}

impl<'a> DiagnosticCollector<'a> {
    /// Creates a collector for a unit analyzed through `map`.
    pub fn new(sketch_root: &'a Path, map: &'a SyntheticMap) -> Self {
        Self { sketch_root, map }
    }

    fn in_sketch(&self, loc: &Location) -> bool {
        !loc.is_unknown() && is_in_root(self.sketch_root, &loc.file)
    }

    /// Picks the location to report for a diagnostic.
    ///
    /// Expansion, spelling and presumed locations are tried in that order for
    /// one inside the sketch; failing that, the first known of spelling,
    /// expansion and presumed is used. Locations in a generated prototype
    /// header lose to any other candidate inside the sketch, so a `#line`
    /// marker there reports at the definition in the sketch entry.
    pub fn preferred_location<'r>(&self, raw: &'r RawDiagnostic) -> &'r Location {
        let candidates = [&raw.expansion, &raw.spelling, &raw.presumed];
        candidates
            .into_iter()
            .find(|loc| self.in_sketch(loc) && !is_prototype_header(&loc.file))
            .or_else(|| candidates.into_iter().find(|loc| self.in_sketch(loc)))
            .or_else(|| {
                [&raw.spelling, &raw.expansion, &raw.presumed]
                    .into_iter()
                    .find(|loc| !loc.is_unknown())
            })
            .unwrap_or(&raw.spelling)
    }

    fn convert_note(&self, raw: &RawDiagnostic) -> Option<Diagnostic> {
        let loc = self.preferred_location(raw);
        let loc = if loc.is_unknown() {
            loc.clone()
        } else {
            self.map.to_original(loc)?
        };
        Some(Diagnostic::new(raw.severity, loc, raw.message.clone()))
    }

    /// Collects, filters and sorts the diagnostics of one unit.
    pub fn collect(&self, raw: &[RawDiagnostic]) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < raw.len() {
            let current = &raw[i];
            i += 1;
            if matches!(current.severity, Severity::Note | Severity::Ignored) {
                continue;
            }

            let mut seen = HashSet::new();
            let mut children = Vec::new();
            let structural = current
                .children
                .iter()
                .filter(|c| c.severity == Severity::Note);
            let mut following = Vec::new();
            while let Some(next) = raw.get(i).filter(|n| n.severity == Severity::Note) {
                following.push(next);
                i += 1;
            }
            for note in structural.chain(following) {
                if let Some(child) = self.convert_note(note) {
                    if seen.insert(child.dedup_key()) {
                        children.push(child);
                    }
                }
            }

            let loc = self.preferred_location(current);
            if loc.is_unknown() || !self.in_sketch(loc) || !current.severity.is_reportable() {
                continue;
            }
            let Some(loc) = self.map.to_original(loc) else {
                tracing::trace!(message = %current.message, "diagnostic inside injected region dropped");
                continue;
            };

            let mut diag = Diagnostic::new(current.severity, loc, current.message.clone());
            diag.children = children;
            out.push(diag);
        }

        out.sort_by(Diagnostic::cmp_position);
        out
    }
}
