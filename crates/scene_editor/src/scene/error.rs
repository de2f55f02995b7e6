//! Scene graph errors

use thiserror::Error;

use super::entity::EntityId;

/// Reasons a structural edit is refused.
///
/// Every variant is recoverable: the graph is left exactly as it was before
/// the failed call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// An incoming entity uses an id that is already in the graph
    #[error("entity id {0} is already in use")]
    DuplicateIdentity(EntityId),

    /// The requested parent is the entity itself or one of its descendants
    #[error("cannot parent entity {entity} under {parent}: it would become its own ancestor")]
    CyclicParent {
        /// Entity being moved or inserted
        entity: EntityId,
        /// Requested parent
        parent: EntityId,
    },

    /// No entity with this id is in the graph
    #[error("entity {0} not found")]
    NotFound(EntityId),

    /// A structural edit was requested while another one was still running
    #[error("structural edit requested while another edit is in progress")]
    ReentrantMutation,
}
