//! Scene graph
//!
//! The hierarchical model the editor operates on:
//!
//! ```text
//! SceneGraph ── owns ──> Node (Entity + child keys) ── owns ──> children...
//!      ^                      |
//!      └──── parent key ──────┘   (generational key, non-owning)
//! ```
//!
//! - [`entity`]: ids, the allocator, entities and detached subtrees
//! - [`component`]: closed set of capability attachments
//! - [`transform`]: world position composition and reparent math
//! - [`graph`]: the forest and its structural edits
//! - [`traversal`]: restartable depth-first walks

pub mod component;
pub mod entity;
pub mod error;
pub mod graph;
pub mod transform;
pub mod traversal;

pub use component::{Component, ComponentKind, ComponentSet, ModelComponent, TerrainComponent};
pub use entity::{Entity, EntityId, IdAllocator, Subtree};
pub use error::SceneError;
pub use graph::{EntityRef, Placement, SceneGraph};
pub use traversal::{DepthFirst, Traversal};
