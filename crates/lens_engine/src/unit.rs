//! Translation unit handles.

use lens_diagnostics::RawDiagnostic;
use lens_source::Location;
use std::path::Path;

use crate::completion::CompletionCandidate;
use crate::cursor::Cursor;
use crate::engine::UnsavedFile;
use crate::error::EngineError;

/// Visitor decision for [`TranslationUnit::walk`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Walk {
    /// Visit the current node's children next.
    Recurse,
    /// Skip the children and continue with the next sibling.
    Continue,
    /// Stop the walk.
    Break,
}

/// A live AST handle owned by the cache.
///
/// Dropping the handle releases the engine's resources for it.
pub trait TranslationUnit: Send {
    /// The main file the unit was parsed for.
    fn main_file(&self) -> &Path;

    /// Re-parses the unit in place with new unsaved content.
    ///
    /// Compiler arguments are fixed for the handle's lifetime.
    fn reparse(&mut self, unsaved: &[UnsavedFile]) -> Result<(), EngineError>;

    /// Diagnostics of the last (re)parse, in engine order.
    fn diagnostics(&self) -> Vec<RawDiagnostic>;

    /// Top-level nodes of the unit, includes first.
    fn top_level(&self) -> Vec<Cursor>;

    /// Direct children of a node.
    fn children(&self, parent: &Cursor) -> Vec<Cursor>;

    /// The innermost named node at a location.
    fn cursor_at(&self, location: &Location) -> Option<Cursor>;

    /// The declaration a node refers to; declarations refer to themselves.
    fn referenced(&self, cursor: &Cursor) -> Option<Cursor>;

    /// The definition of the entity a node declares or refers to.
    fn definition(&self, cursor: &Cursor) -> Option<Cursor>;

    /// The canonical (first) declaration of the entity a node declares.
    fn canonical(&self, cursor: &Cursor) -> Cursor;

    /// Code completion results at a location of the main file.
    fn complete_at(&self, location: &Location, unsaved: &[UnsavedFile]) -> Vec<CompletionCandidate>;

    /// Depth-first pre-order traversal.
    ///
    /// The visitor receives each node and its parent and decides whether to
    /// descend. Context is passed by capture in the visitor closure.
    fn walk(&self, visitor: &mut dyn FnMut(&Cursor, Option<&Cursor>) -> Walk) {
        fn visit(
            unit: &(impl TranslationUnit + ?Sized),
            nodes: Vec<Cursor>,
            parent: Option<&Cursor>,
            visitor: &mut dyn FnMut(&Cursor, Option<&Cursor>) -> Walk,
        ) -> bool {
            for node in nodes {
                match visitor(&node, parent) {
                    Walk::Break => return false,
                    Walk::Continue => {}
                    Walk::Recurse => {
                        if !visit(unit, unit.children(&node), Some(&node), visitor) {
                            return false;
                        }
                    }
                }
            }
            true
        }
        visit(self, self.top_level(), None, visitor);
    }
}
