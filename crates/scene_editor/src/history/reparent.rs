//! World-preserving move between parents

use super::command::Command;
use crate::events::StructuralChange;
use crate::foundation::math::Transform;
use crate::scene::{EntityId, Placement, SceneError, SceneGraph};

/// Moves an entity under a new parent. Undo restores the prior parent,
/// sibling index and local transform exactly.
#[derive(Debug)]
pub struct ReparentCommand {
    entity: EntityId,
    target: Option<EntityId>,
    prior: Option<(Placement, Transform)>,
}

impl ReparentCommand {
    /// Move `entity` under `target` (root level for `None`)
    pub const fn new(entity: EntityId, target: Option<EntityId>) -> Self {
        Self {
            entity,
            target,
            prior: None,
        }
    }
}

impl Command for ReparentCommand {
    fn execute(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError> {
        let local = graph.find(self.entity)?.transform().clone();
        let before = graph.reparent(self.entity, self.target)?;
        self.prior = Some((before, local));
        Ok(StructuralChange::Reparented {
            entity: self.entity,
            from: before.parent,
            to: self.target,
        })
    }

    fn undo(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, SceneError> {
        let Some((placement, local)) = self.prior.clone() else {
            return Err(SceneError::NotFound(self.entity));
        };
        graph.restore_placement(self.entity, placement, local)?;
        Ok(StructuralChange::Reparented {
            entity: self.entity,
            from: self.target,
            to: placement.parent,
        })
    }

    fn label(&self) -> String {
        format!("Move entity {}", self.entity)
    }
}
