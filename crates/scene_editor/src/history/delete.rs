//! Delete an entity and its subtree

use super::command::Command;
use crate::events::StructuralChange;
use crate::scene::{EntityId, Placement, SceneError, SceneGraph, Subtree};

/// Removes an entity with its subtree. Undo puts it back at the same parent
/// and sibling index.
#[derive(Debug)]
pub struct DeleteCommand {
    entity: EntityId,
    placement: Option<Placement>,
    /// Held only while the delete is in effect
    detached: Option<Subtree>,
}

impl DeleteCommand {
    /// Delete `entity` when executed
    pub const fn new(entity: EntityId) -> Self {
        Self {
            entity,
            placement: None,
            detached: None,
        }
    }

    /// The deleted entity
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// The detached subtree, present while the delete is in effect
    pub const fn detached(&self) -> Option<&Subtree> {
        self.detached.as_ref()
    }
}

impl Command for DeleteCommand {
    fn execute(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError> {
        let placement = graph.placement(self.entity)?;
        let tree = graph.remove(self.entity)?;
        self.placement = Some(placement);
        self.detached = Some(tree);
        Ok(StructuralChange::Removed {
            entity: self.entity,
            parent: placement.parent,
        })
    }

    fn undo(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError> {
        let (Some(placement), Some(tree)) = (self.placement, self.detached.as_ref()) else {
            return Err(SceneError::NotFound(self.entity));
        };
        graph.validate_restore(tree, placement.parent)?;

        let tree = self.detached.take().ok_or(SceneError::NotFound(self.entity))?;
        graph.restore(tree, placement.parent, Some(placement.index))?;
        Ok(StructuralChange::Added {
            entity: self.entity,
            parent: placement.parent,
        })
    }

    fn label(&self) -> String {
        format!("Delete entity {}", self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;

    fn sample() -> (SceneGraph, EntityId, EntityId, EntityId) {
        let mut graph = SceneGraph::new();
        let a = graph.create_entity("A").with_transform(Transform::from_xyz(5.0, 0.0, 0.0));
        let a = graph.add_root(a).unwrap();
        let b = graph.create_entity("B").with_transform(Transform::from_xyz(1.0, 0.0, 0.0));
        let b = graph.add_child(a, b).unwrap();
        let b2 = graph.create_entity("B2");
        let b2 = graph.add_child(a, b2).unwrap();
        (graph, a, b, b2)
    }

    #[test]
    fn test_execute_detaches_and_holds_subtree() {
        let (mut graph, a, b, _) = sample();
        let mut command = DeleteCommand::new(b);

        let change = command.execute(&mut graph).unwrap();

        assert_eq!(change, StructuralChange::Removed { entity: b, parent: Some(a) });
        assert!(!graph.contains(b));
        assert_eq!(command.detached().map(Subtree::id), Some(b));
    }

    #[test]
    fn test_undo_restores_index_and_transform() {
        let (mut graph, a, b, b2) = sample();
        let mut command = DeleteCommand::new(b);
        command.execute(&mut graph).unwrap();

        let change = command.undo(&mut graph).unwrap();

        assert_eq!(change, StructuralChange::Added { entity: b, parent: Some(a) });
        assert_eq!(graph.placement(b).unwrap(), Placement { parent: Some(a), index: 0 });
        assert_eq!(graph.placement(b2).unwrap().index, 1);
        assert_eq!(graph.find(b).unwrap().transform(), &Transform::from_xyz(1.0, 0.0, 0.0));
        assert!(command.detached().is_none());
    }

    #[test]
    fn test_failed_undo_keeps_subtree() {
        let (mut graph, a, b, _) = sample();
        let mut command = DeleteCommand::new(b);
        command.execute(&mut graph).unwrap();
        graph.remove(a).unwrap();

        assert_eq!(command.undo(&mut graph), Err(SceneError::NotFound(a)));
        assert!(command.detached().is_some());
    }

    #[test]
    fn test_execute_unknown_entity() {
        let (mut graph, ..) = sample();
        let ghost = EntityId::new(404);
        let mut command = DeleteCommand::new(ghost);
        assert_eq!(command.execute(&mut graph), Err(SceneError::NotFound(ghost)));
        assert!(command.detached().is_none());
    }
}
