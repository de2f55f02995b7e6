//! Attach a new or duplicated subtree

use super::command::Command;
use crate::events::StructuralChange;
use crate::scene::{EntityId, SceneError, SceneGraph, Subtree};

/// Attaches a detached subtree. Undo detaches it again and keeps it for a
/// redo, so redo brings back the very same ids.
#[derive(Debug)]
pub struct AddCommand {
    entity: EntityId,
    parent: Option<EntityId>,
    /// Sibling index, known once the subtree has been attached
    index: Option<usize>,
    /// Source of a duplicate
    source: Option<EntityId>,
    detached: Option<Subtree>,
}

impl AddCommand {
    /// Append `tree` under `parent` (root level for `None`)
    pub fn new(tree: Subtree, parent: Option<EntityId>) -> Self {
        Self {
            entity: tree.id(),
            parent,
            index: None,
            source: None,
            detached: Some(tree),
        }
    }

    /// Attach `copy`, a deep clone of `source`
    pub fn duplicate_of(source: EntityId, copy: Subtree, parent: Option<EntityId>) -> Self {
        Self {
            source: Some(source),
            ..Self::new(copy, parent)
        }
    }

    /// Root of the attached subtree
    pub const fn entity(&self) -> EntityId {
        self.entity
    }
}

impl Command for AddCommand {
    fn execute(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError> {
        let Some(tree) = self.detached.as_ref() else {
            return Err(SceneError::DuplicateIdentity(self.entity));
        };
        graph.validate_restore(tree, self.parent)?;

        let tree = self.detached.take().ok_or(SceneError::NotFound(self.entity))?;
        graph.restore(tree, self.parent, self.index)?;
        self.index = Some(graph.placement(self.entity)?.index);

        Ok(match self.source {
            Some(source) => StructuralChange::Duplicated {
                source,
                copy: self.entity,
                parent: self.parent,
            },
            None => StructuralChange::Added {
                entity: self.entity,
                parent: self.parent,
            },
        })
    }

    fn undo(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError> {
        let placement = graph.placement(self.entity)?;
        let tree = graph.remove(self.entity)?;
        self.index = Some(placement.index);
        self.detached = Some(tree);
        Ok(StructuralChange::Removed {
            entity: self.entity,
            parent: placement.parent,
        })
    }

    fn label(&self) -> String {
        match self.source {
            Some(source) => format!("Duplicate entity {source}"),
            None => format!("Add entity {}", self.entity),
        }
    }
}
