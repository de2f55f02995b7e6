//! Entity, identity allocation and detached subtrees

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::component::{Component, ComponentSet};
use crate::foundation::math::Transform;

/// Entity identifier
///
/// Minted by an [`IdAllocator`]; unique and never reused for the lifetime of
/// the owning editor context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id. Prefer [`IdAllocator::next_id`] for new entities.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identity source for one editor context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator whose first id is 1
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Mint the next id
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Make sure `id` is never minted in the future.
    ///
    /// Called for every id that enters a graph from outside the allocator.
    pub fn reserve(&mut self, id: EntityId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    /// The id the next call to [`next_id`](Self::next_id) will return
    pub const fn peek(&self) -> EntityId {
        EntityId(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A scene entity ("game object"): identity, name, local transform and
/// capability attachments.
///
/// Hierarchy links are not part of this type; they live in the
/// [`SceneGraph`](super::SceneGraph) so they can only change together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    /// Display name, not required to be unique
    pub name: String,
    /// Transform relative to the parent (or world for roots)
    pub transform: Transform,
    /// Capability attachments, at most one per kind
    pub components: ComponentSet,
}

impl Entity {
    /// Create an entity at the origin with no components
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::default(),
            components: ComponentSet::default(),
        }
    }

    /// Builder: set the local transform
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: attach a component, replacing one of the same kind
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.insert(component);
        self
    }

    /// Get the entity id
    pub const fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// An owned entity tree that is not part of any graph.
///
/// Returned by [`SceneGraph::remove`](super::SceneGraph::remove) and accepted
/// by the insertion operations. Children keep their order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtree {
    root: Entity,
    children: Vec<Subtree>,
}

impl Subtree {
    /// A single-node subtree
    pub fn new(root: Entity) -> Self {
        Self {
            root,
            children: Vec::new(),
        }
    }

    /// Builder: append a child subtree
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Self>) -> Self {
        self.children.push(child.into());
        self
    }

    pub(crate) fn from_parts(root: Entity, children: Vec<Self>) -> Self {
        Self { root, children }
    }

    pub(crate) fn into_parts(self) -> (Entity, Vec<Self>) {
        (self.root, self.children)
    }

    /// The root entity
    pub const fn root(&self) -> &Entity {
        &self.root
    }

    /// Id of the root entity
    pub const fn id(&self) -> EntityId {
        self.root.id
    }

    /// Direct child subtrees in order
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// All ids in the subtree, parents before children
    pub fn ids(&self) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<EntityId>) {
        out.push(self.root.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    /// Number of entities in the subtree
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    /// Always false; a subtree has at least its root
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether any entity in the subtree has this id
    pub fn contains(&self, id: EntityId) -> bool {
        self.root.id == id || self.children.iter().any(|c| c.contains(id))
    }

    /// First id that appears more than once inside this subtree
    pub fn repeated_id(&self) -> Option<EntityId> {
        let mut seen = HashSet::new();
        self.ids().into_iter().find(|id| !seen.insert(*id))
    }
}

impl From<Entity> for Subtree {
    fn from(entity: Entity) -> Self {
        Self::new(entity)
    }
}
