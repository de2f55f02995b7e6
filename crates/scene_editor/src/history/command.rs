//! The reversible edit abstraction

use std::fmt;

use crate::events::StructuralChange;
use crate::scene::{SceneError, SceneGraph};

/// Lifecycle of a recorded command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    /// Created, not yet applied
    Pending,
    /// Applied to the graph
    Executed,
    /// Reversed by an undo
    Undone,
}

/// One structural edit that can be applied and reversed.
///
/// Commands refer to entities by id. The only thing a command owns is a
/// subtree that is detached from the graph because of it.
pub trait Command: fmt::Debug {
    /// Apply the edit (first time or redo)
    fn execute(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError>;

    /// Reverse the edit. On error the graph and the command are unchanged.
    fn undo(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError>;

    /// Short human readable description, e.g. for an Edit menu
    fn label(&self) -> String;
}
