//! Single selection

use crate::scene::{EntityId, SceneGraph};

/// The one selected entity of an editor, or none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<EntityId>,
}

impl Selection {
    /// Selected entity
    pub const fn get(&self) -> Option<EntityId> {
        self.current
    }

    /// Select `entity`, or clear when it is not in `graph`.
    ///
    /// Returns whether the selection changed.
    pub fn set(&mut self, graph: &SceneGraph, entity: Option<EntityId>) -> bool {
        let next = entity.filter(|id| graph.contains(*id));
        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Drop the selection if its entity left the graph.
    ///
    /// Returns whether it was cleared.
    pub fn revalidate(&mut self, graph: &SceneGraph) -> bool {
        match self.current {
            Some(id) if !graph.contains(id) => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Clear the selection, returning whether something was selected
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }
}
