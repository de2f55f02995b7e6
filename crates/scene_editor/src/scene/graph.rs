//! Scene graph: the forest of entities and every structural edit on it
//!
//! Nodes live in a generational arena. Each node owns its child list; the
//! parent link is a plain arena key, so it never keeps anything alive and
//! there are no reference cycles. Both sides of a link are always written
//! together by [`SceneGraph::link`] / [`SceneGraph::unlink`].
//!
//! Every public operation validates first and mutates second, so a failed
//! call leaves the graph untouched.

use std::collections::{HashMap, HashSet};

use super::entity::{Entity, EntityId, IdAllocator, Subtree};
use super::error::SceneError;
use super::transform;
use super::traversal::Traversal;
use crate::foundation::collections::{EntityKey, HandleMap};
use crate::foundation::math::{Transform, Vec3};

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) entity: Entity,
    pub(crate) parent: Option<EntityKey>,
    pub(crate) children: Vec<EntityKey>,
}

/// Where an entity hangs: its parent (or root level) and its index among
/// its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Parent id, `None` for roots
    pub parent: Option<EntityId>,
    /// Index in the parent's child list (or the root list)
    pub index: usize,
}

/// Hierarchical scene graph owning every live entity.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HandleMap<EntityKey, Node>,
    index: HashMap<EntityId, EntityKey>,
    roots: Vec<EntityKey>,
    ids: IdAllocator,
    /// Ids of removed subtrees. They stay used until the subtree is restored.
    retired: HashSet<EntityId>,
}

impl SceneGraph {
    /// Create an empty graph with a fresh id allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph that continues from an existing allocator
    pub fn with_allocator(ids: IdAllocator) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Build a graph from root subtrees, e.g. handed over by a loader
    pub fn from_forest(forest: impl IntoIterator<Item = Subtree>) -> Result<Self, SceneError> {
        let mut graph = Self::new();
        for tree in forest {
            graph.add_root(tree)?;
        }
        Ok(graph)
    }

    /// Replace the whole forest while keeping this graph's allocator.
    ///
    /// Either every tree is accepted or the graph is left unchanged. Ids
    /// retired by earlier removals are released.
    pub fn replace_forest(&mut self, forest: impl IntoIterator<Item = Subtree>) -> Result<(), SceneError> {
        let mut fresh = Self::with_allocator(self.ids.clone());
        for tree in forest {
            fresh.add_root(tree)?;
        }
        *self = fresh;
        Ok(())
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// Mint a new entity id from this graph's allocator
    pub fn next_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// Mint an id and build a detached entity with it
    pub fn create_entity(&mut self, name: impl Into<String>) -> Entity {
        let id = self.next_id();
        Entity::new(id, name)
    }

    /// The allocator backing this graph
    pub const fn allocator(&self) -> &IdAllocator {
        &self.ids
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// No live entities
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether an entity with this id is in the graph
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up an entity
    pub fn find(&self, id: EntityId) -> Result<EntityRef<'_>, SceneError> {
        self.get(id).ok_or(SceneError::NotFound(id))
    }

    /// Look up an entity, `None` if absent
    pub fn get(&self, id: EntityId) -> Option<EntityRef<'_>> {
        self.index.get(&id).and_then(|&key| self.entity_ref(key))
    }

    /// Mutable access to an entity's own data (name, transform, components).
    ///
    /// Hierarchy links are not reachable from here.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, SceneError> {
        let key = self.key_of(id)?;
        self.nodes
            .get_mut(key)
            .map(|node| &mut node.entity)
            .ok_or(SceneError::NotFound(id))
    }

    /// Root entities in order
    pub fn roots(&self) -> impl Iterator<Item = EntityRef<'_>> + '_ {
        self.roots.iter().filter_map(|&key| self.entity_ref(key))
    }

    /// Depth-first view of the whole forest
    pub const fn traverse(&self) -> Traversal<'_> {
        Traversal::forest(self)
    }

    /// Depth-first view of one subtree, its root at depth 0
    pub fn traverse_from(&self, id: EntityId) -> Result<Traversal<'_>, SceneError> {
        Ok(Traversal::subtree(self, self.key_of(id)?))
    }

    /// Parent and sibling index of an entity
    pub fn placement(&self, id: EntityId) -> Result<Placement, SceneError> {
        let key = self.key_of(id)?;
        let parent = self.nodes[key].parent;
        let index = self
            .siblings(parent)
            .iter()
            .position(|&k| k == key)
            .unwrap_or_default();
        Ok(Placement {
            parent: parent.map(|p| self.nodes[p].entity.id()),
            index,
        })
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor_of(&self, ancestor: EntityId, id: EntityId) -> Result<bool, SceneError> {
        let ancestor = self.key_of(ancestor)?;
        let key = self.key_of(id)?;
        Ok(self.is_ancestor_key(ancestor, key))
    }

    /// World position of an entity: its local position composed with every
    /// ancestor's
    pub fn world_position(&self, id: EntityId) -> Result<Vec3, SceneError> {
        Ok(self.world_position_of(self.key_of(id)?))
    }

    /// Owned copy of the forest with the same ids, for an external serializer
    pub fn to_forest(&self) -> Vec<Subtree> {
        self.roots.iter().map(|&key| self.snapshot(key)).collect()
    }

    // ── Structural edits ─────────────────────────────────────────────

    /// Append a subtree to the root list
    pub fn add_root(&mut self, tree: impl Into<Subtree>) -> Result<EntityId, SceneError> {
        self.insert(tree, None, None)
    }

    /// Append a subtree to `parent`'s children
    pub fn add_child(&mut self, parent: EntityId, tree: impl Into<Subtree>) -> Result<EntityId, SceneError> {
        self.insert(tree, Some(parent), None)
    }

    /// Insert a subtree under `parent` (or at root level) at `index`.
    ///
    /// `index` is clamped to the sibling count; `None` appends.
    pub fn insert(
        &mut self,
        tree: impl Into<Subtree>,
        parent: Option<EntityId>,
        index: Option<usize>,
    ) -> Result<EntityId, SceneError> {
        let tree = tree.into();
        let id = tree.id();
        let parent_key = self.checked_insert(&tree, parent, false)?;

        let key = self.adopt(tree, parent_key);
        self.link(key, parent_key, index);
        log::trace!("inserted entity {id} under {parent:?}");
        Ok(id)
    }

    /// Put a subtree back that this graph handed out through
    /// [`SceneGraph::remove`], ids unchanged. Also accepts a subtree with
    /// ids that were never used here.
    ///
    /// Meant for the command history, which holds removed subtrees.
    pub(crate) fn restore(
        &mut self,
        tree: Subtree,
        parent: Option<EntityId>,
        index: Option<usize>,
    ) -> Result<EntityId, SceneError> {
        let id = tree.id();
        let parent_key = self.checked_insert(&tree, parent, true)?;
        for restored in tree.ids() {
            self.retired.remove(&restored);
        }

        let key = self.adopt(tree, parent_key);
        self.link(key, parent_key, index);
        log::trace!("restored entity {id} under {parent:?}");
        Ok(id)
    }

    /// Check whether [`SceneGraph::restore`] would accept `tree` under
    /// `parent`, without consuming it.
    pub(crate) fn validate_restore(&self, tree: &Subtree, parent: Option<EntityId>) -> Result<(), SceneError> {
        self.checked_insert(tree, parent, true).map(|_| ())
    }

    /// Whether `id` belongs to a removed subtree and cannot be inserted
    pub fn is_retired(&self, id: EntityId) -> bool {
        self.retired.contains(&id)
    }

    /// Detach an entity and its whole subtree from the graph.
    ///
    /// The subtree comes back intact. Its ids stay in use: they are never
    /// minted again and [`SceneGraph::insert`] refuses them, so only the
    /// subtree itself can come back.
    pub fn remove(&mut self, id: EntityId) -> Result<Subtree, SceneError> {
        let key = self.key_of(id)?;
        self.unlink(key);
        let tree = self.take(key).ok_or(SceneError::NotFound(id))?;
        log::trace!("removed entity {id} ({} nodes)", tree.len());
        Ok(tree)
    }

    /// Move an entity under a new parent (or to root level), appending it,
    /// and rewrite its local position so its world position does not change.
    ///
    /// Returns where the entity was before the move.
    pub fn reparent(&mut self, id: EntityId, new_parent: Option<EntityId>) -> Result<Placement, SceneError> {
        let key = self.key_of(id)?;
        let parent_key = self.checked_parent(key, id, new_parent)?;
        let before = self.placement(id)?;

        let dragged_world = self.world_position_of(key);
        self.unlink(key);
        self.link(key, parent_key, None);

        let parent_world = parent_key.map(|parent| self.world_position_of(parent));
        self.nodes[key].entity.transform.position =
            transform::reparent_preserving_world(dragged_world, parent_world);

        debug_assert!(transform::positions_match(dragged_world, self.world_position_of(key)));
        log::debug!("reparented entity {id}: {:?} -> {new_parent:?}", before.parent);
        Ok(before)
    }

    /// Put an attached entity at an exact place with an exact local
    /// transform. Used to reverse a reparent.
    pub fn restore_placement(
        &mut self,
        id: EntityId,
        placement: Placement,
        local: Transform,
    ) -> Result<(), SceneError> {
        let key = self.key_of(id)?;
        let parent_key = self.checked_parent(key, id, placement.parent)?;

        self.unlink(key);
        self.link(key, parent_key, Some(placement.index));
        self.nodes[key].entity.transform = local;
        Ok(())
    }

    /// Deep-clone an entity's subtree with freshly minted ids and append the
    /// copy under `new_parent` (or at root level).
    ///
    /// The copy keeps the source's local transforms, so it starts coincident
    /// with the source when attached to the same parent.
    pub fn duplicate(&mut self, id: EntityId, new_parent: Option<EntityId>) -> Result<EntityId, SceneError> {
        if let Some(parent) = new_parent {
            self.key_of(parent)?;
        }
        let copy = self.clone_subtree(id)?;
        let copy_id = self.insert(copy, new_parent, None)?;
        log::debug!("duplicated entity {id} as {copy_id} under {new_parent:?}");
        Ok(copy_id)
    }

    /// Detached deep clone of an entity's subtree. Every node of the clone
    /// gets a new id, parents before children.
    pub fn clone_subtree(&mut self, id: EntityId) -> Result<Subtree, SceneError> {
        let key = self.key_of(id)?;
        Ok(self.clone_with_fresh_ids(key))
    }

    // ── Internals ────────────────────────────────────────────────────

    pub(crate) fn node(&self, key: EntityKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub(crate) fn root_keys(&self) -> &[EntityKey] {
        &self.roots
    }

    fn entity_ref(&self, key: EntityKey) -> Option<EntityRef<'_>> {
        self.nodes.get(key).map(|node| EntityRef { graph: self, node })
    }

    fn key_of(&self, id: EntityId) -> Result<EntityKey, SceneError> {
        self.index.get(&id).copied().ok_or(SceneError::NotFound(id))
    }

    fn checked_parent(
        &self,
        key: EntityKey,
        id: EntityId,
        parent: Option<EntityId>,
    ) -> Result<Option<EntityKey>, SceneError> {
        let Some(parent) = parent else {
            return Ok(None);
        };
        let parent_key = self.key_of(parent)?;
        if parent_key == key || self.is_ancestor_key(key, parent_key) {
            return Err(SceneError::CyclicParent { entity: id, parent });
        }
        Ok(Some(parent_key))
    }

    fn checked_insert(
        &self,
        tree: &Subtree,
        parent: Option<EntityId>,
        allow_retired: bool,
    ) -> Result<Option<EntityKey>, SceneError> {
        let parent_key = match parent {
            Some(parent) => {
                let key = self.key_of(parent)?;
                if tree.contains(parent) {
                    return Err(SceneError::CyclicParent {
                        entity: tree.id(),
                        parent,
                    });
                }
                Some(key)
            }
            None => None,
        };

        let in_use = |id: &EntityId| self.contains(*id) || (!allow_retired && self.retired.contains(id));
        if let Some(taken) = tree.ids().into_iter().find(in_use) {
            return Err(SceneError::DuplicateIdentity(taken));
        }
        if let Some(repeated) = tree.repeated_id() {
            return Err(SceneError::DuplicateIdentity(repeated));
        }
        Ok(parent_key)
    }

    fn is_ancestor_key(&self, ancestor: EntityKey, key: EntityKey) -> bool {
        let mut current = self.nodes.get(key).and_then(|node| node.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(parent).and_then(|node| node.parent);
        }
        false
    }

    fn world_position_of(&self, key: EntityKey) -> Vec3 {
        let chain = std::iter::successors(self.nodes.get(key), |node| {
            node.parent.and_then(|parent| self.nodes.get(parent))
        });
        transform::world_position(chain.map(|node| &node.entity.transform))
    }

    fn siblings(&self, parent: Option<EntityKey>) -> &[EntityKey] {
        match parent.and_then(|p| self.nodes.get(p)) {
            Some(node) => &node.children,
            None => &self.roots,
        }
    }

    fn siblings_mut(&mut self, parent: Option<EntityKey>) -> &mut Vec<EntityKey> {
        match parent {
            Some(parent) => &mut self.nodes[parent].children,
            None => &mut self.roots,
        }
    }

    /// Attach `key` under `parent`, writing both sides of the link.
    fn link(&mut self, key: EntityKey, parent: Option<EntityKey>, index: Option<usize>) {
        let siblings = self.siblings_mut(parent);
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, key);
        self.nodes[key].parent = parent;
    }

    /// Detach `key` from its parent, clearing both sides of the link.
    fn unlink(&mut self, key: EntityKey) {
        let parent = self.nodes[key].parent.take();
        self.siblings_mut(parent).retain(|&k| k != key);
    }

    /// Move a detached subtree into the arena. Links children, not the root.
    fn adopt(&mut self, tree: Subtree, parent: Option<EntityKey>) -> EntityKey {
        let (entity, children) = tree.into_parts();
        let id = entity.id();
        self.ids.reserve(id);
        let key = self.nodes.insert(Node {
            entity,
            parent,
            children: Vec::with_capacity(children.len()),
        });
        self.index.insert(id, key);

        for child in children {
            let child_key = self.adopt(child, Some(key));
            self.nodes[key].children.push(child_key);
        }
        key
    }

    /// Take an unlinked subtree out of the arena.
    fn take(&mut self, key: EntityKey) -> Option<Subtree> {
        let node = self.nodes.remove(key)?;
        self.index.remove(&node.entity.id());
        self.retired.insert(node.entity.id());
        let children = node
            .children
            .into_iter()
            .filter_map(|child| self.take(child))
            .collect();
        Some(Subtree::from_parts(node.entity, children))
    }

    fn snapshot(&self, key: EntityKey) -> Subtree {
        let node = &self.nodes[key];
        let children = node.children.iter().map(|&child| self.snapshot(child)).collect();
        Subtree::from_parts(node.entity.clone(), children)
    }

    fn clone_with_fresh_ids(&mut self, key: EntityKey) -> Subtree {
        let (mut entity, children) = {
            let node = &self.nodes[key];
            (node.entity.clone(), node.children.clone())
        };
        entity.set_id(self.ids.next_id());
        let children = children
            .into_iter()
            .map(|child| self.clone_with_fresh_ids(child))
            .collect();
        Subtree::from_parts(entity, children)
    }
}

/// Borrowed view of a live entity together with its hierarchy links.
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'a> {
    graph: &'a SceneGraph,
    node: &'a Node,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn from_key(graph: &'a SceneGraph, key: EntityKey) -> Option<Self> {
        graph.entity_ref(key)
    }

    /// The entity data
    pub const fn entity(&self) -> &'a Entity {
        &self.node.entity
    }

    /// Entity id
    pub const fn id(&self) -> EntityId {
        self.node.entity.id()
    }

    /// Display name
    pub fn name(&self) -> &'a str {
        &self.node.entity.name
    }

    /// Local transform
    pub const fn transform(&self) -> &'a Transform {
        &self.node.entity.transform
    }

    /// Parent entity, `None` for roots
    pub fn parent(&self) -> Option<EntityRef<'a>> {
        self.node.parent.and_then(|key| self.graph.entity_ref(key))
    }

    /// Children in order
    pub fn children(&self) -> impl Iterator<Item = EntityRef<'a>> + 'a {
        let graph = self.graph;
        self.node
            .children
            .iter()
            .filter_map(move |&key| graph.entity_ref(key))
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    /// World position (see [`SceneGraph::world_position`])
    pub fn world_position(&self) -> Vec3 {
        let chain = std::iter::successors(Some(self.node), |node| {
            node.parent.and_then(|parent| self.graph.nodes.get(parent))
        });
        transform::world_position(chain.map(|node| &node.entity.transform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::component::{Component, TerrainComponent};
    use approx::assert_relative_eq;

    /// A(5,0,0) root with child B(1,0,0); C(0,0,2) a second root.
    fn sample() -> (SceneGraph, EntityId, EntityId, EntityId) {
        let mut graph = SceneGraph::new();
        let a = graph.create_entity("A").with_transform(Transform::from_xyz(5.0, 0.0, 0.0));
        let a = graph.add_root(a).unwrap();
        let b = graph.create_entity("B").with_transform(Transform::from_xyz(1.0, 0.0, 0.0));
        let b = graph.add_child(a, b).unwrap();
        let c = graph.create_entity("C").with_transform(Transform::from_xyz(0.0, 0.0, 2.0));
        let c = graph.add_root(c).unwrap();
        (graph, a, b, c)
    }

    fn shape(graph: &SceneGraph) -> Vec<(EntityId, usize, Option<EntityId>)> {
        graph
            .traverse()
            .iter()
            .map(|(e, depth)| (e.id(), depth, e.parent().map(|p| p.id())))
            .collect()
    }

    #[test]
    fn test_world_position_composes_parent_chain() {
        let (graph, a, b, _) = sample();
        assert_relative_eq!(graph.world_position(a).unwrap(), Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(graph.world_position(b).unwrap(), Vec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn test_reparent_to_root_preserves_world() {
        let (mut graph, a, b, _) = sample();
        let before = graph.reparent(b, None).unwrap();

        assert_eq!(before, Placement { parent: Some(a), index: 0 });
        let b_ref = graph.find(b).unwrap();
        assert!(b_ref.parent().is_none());
        assert_relative_eq!(b_ref.transform().position, Vec3::new(6.0, 0.0, 0.0));
        assert_relative_eq!(b_ref.world_position(), Vec3::new(6.0, 0.0, 0.0));
        assert_eq!(graph.find(a).unwrap().child_count(), 0);
    }

    #[test]
    fn test_reparent_between_parents_preserves_world() {
        let (mut graph, _, b, c) = sample();
        let world = graph.world_position(b).unwrap();
        graph.reparent(b, Some(c)).unwrap();

        assert_relative_eq!(graph.world_position(b).unwrap(), world, epsilon = transform::POSITION_EPSILON);
        assert_relative_eq!(graph.find(b).unwrap().transform().position, Vec3::new(6.0, 0.0, -2.0));
        assert_eq!(graph.placement(b).unwrap(), Placement { parent: Some(c), index: 0 });
    }

    #[test]
    fn test_reparent_keeps_rotation_and_scale_local() {
        let (mut graph, _, b, c) = sample();
        let scale = Vec3::new(2.0, 2.0, 2.0);
        graph.entity_mut(b).unwrap().transform.scale = scale;
        graph.reparent(b, Some(c)).unwrap();
        assert_eq!(graph.find(b).unwrap().transform().scale, scale);
    }

    #[test]
    fn test_reparent_into_self_or_descendant_is_cyclic() {
        let (mut graph, a, b, _) = sample();
        let before = shape(&graph);

        assert_eq!(
            graph.reparent(a, Some(a)),
            Err(SceneError::CyclicParent { entity: a, parent: a })
        );
        assert_eq!(
            graph.reparent(a, Some(b)),
            Err(SceneError::CyclicParent { entity: a, parent: b })
        );
        assert_eq!(shape(&graph), before);
        assert_relative_eq!(graph.find(b).unwrap().transform().position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_reparent_unknown_ids() {
        let (mut graph, a, _, _) = sample();
        let ghost = EntityId::new(999);
        assert_eq!(graph.reparent(ghost, None), Err(SceneError::NotFound(ghost)));
        assert_eq!(graph.reparent(a, Some(ghost)), Err(SceneError::NotFound(ghost)));
    }

    #[test]
    fn test_add_rejects_duplicate_identity() {
        let (mut graph, _, b, _) = sample();
        let clash = Entity::new(b, "clash");
        assert_eq!(graph.add_root(clash), Err(SceneError::DuplicateIdentity(b)));
    }

    #[test]
    fn test_add_child_rejects_subtree_containing_parent() {
        let (mut graph, a, _, _) = sample();
        let tree = Subtree::new(Entity::new(EntityId::new(100), "x")).with_child(Entity::new(a, "a-again"));
        assert_eq!(
            graph.add_child(a, tree),
            Err(SceneError::CyclicParent { entity: EntityId::new(100), parent: a })
        );
    }

    #[test]
    fn test_remove_returns_intact_subtree() {
        let (mut graph, a, b, _) = sample();
        let tree = graph.remove(a).unwrap();

        assert_eq!(tree.ids(), vec![a, b]);
        assert!(!graph.contains(a));
        assert!(!graph.contains(b));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_remove_then_insert_restores_structure_and_world() {
        let (mut graph, a, b, _) = sample();
        let extra = graph.create_entity("B2");
        let b2 = graph.add_child(a, extra).unwrap();
        let before = shape(&graph);
        let world = graph.world_position(b).unwrap();

        let placement = graph.placement(b).unwrap();
        let tree = graph.remove(b).unwrap();
        graph.restore(tree, placement.parent, Some(placement.index)).unwrap();

        assert_eq!(shape(&graph), before);
        assert_eq!(graph.placement(b2).unwrap().index, 1);
        assert_relative_eq!(graph.world_position(b).unwrap(), world);
    }

    #[test]
    fn test_removed_ids_are_not_reminted() {
        let (mut graph, a, _, _) = sample();
        let removed = graph.remove(a).unwrap();
        let fresh = graph.next_id();
        assert!(removed.ids().iter().all(|id| *id < fresh));
    }

    #[test]
    fn test_removed_ids_cannot_be_reused() {
        let (mut graph, a, b, c) = sample();
        graph.remove(b).unwrap();

        assert!(graph.is_retired(b));
        assert_eq!(
            graph.add_root(Entity::new(b, "other")),
            Err(SceneError::DuplicateIdentity(b))
        );
        assert_eq!(
            graph.add_child(c, Entity::new(b, "other")),
            Err(SceneError::DuplicateIdentity(b))
        );
        assert!(!graph.contains(b));
        assert_eq!(graph.find(a).unwrap().child_count(), 0);
    }

    #[test]
    fn test_restore_takes_back_removed_subtree() {
        let (mut graph, a, b, _) = sample();
        let tree = graph.remove(a).unwrap();
        assert_eq!(graph.validate_restore(&tree, None), Ok(()));

        graph.restore(tree, None, Some(0)).unwrap();

        assert!(!graph.is_retired(a) && !graph.is_retired(b));
        assert_eq!(graph.placement(b).unwrap(), Placement { parent: Some(a), index: 0 });
        let again = graph.to_forest().swap_remove(0);
        assert_eq!(graph.add_root(again), Err(SceneError::DuplicateIdentity(a)));
    }

    #[test]
    fn test_replace_forest_releases_retired_ids() {
        let (mut graph, _, b, c) = sample();
        let tree = graph.remove(b).unwrap();

        graph.replace_forest(vec![tree]).unwrap();

        assert!(graph.contains(b));
        assert!(!graph.contains(c));
        assert!(!graph.is_retired(b));
    }

    #[test]
    fn test_foreign_ids_are_reserved() {
        let mut graph = SceneGraph::new();
        graph.add_root(Entity::new(EntityId::new(77), "loaded")).unwrap();
        assert_eq!(graph.next_id(), EntityId::new(78));
    }

    #[test]
    fn test_duplicate_is_isomorphic_with_fresh_ids() {
        let (mut graph, a, b, _) = sample();
        let terrain = Component::Terrain(TerrainComponent {
            asset: "t".to_string(),
            vertex_resolution: 8,
            size: 64,
        });
        graph.entity_mut(b).unwrap().components.insert(terrain);
        let existing: Vec<_> = graph.traverse().iter().map(|(e, _)| e.id()).collect();

        let copy = graph.duplicate(a, None).unwrap();

        let source: Vec<_> = graph.traverse_from(a).unwrap().iter().collect();
        let cloned: Vec<_> = graph.traverse_from(copy).unwrap().iter().collect();
        assert_eq!(source.len(), cloned.len());
        for ((s, s_depth), (c, c_depth)) in source.iter().zip(&cloned) {
            assert_eq!(s_depth, c_depth);
            assert_eq!(s.name(), c.name());
            assert_eq!(s.transform(), c.transform());
            assert_eq!(s.entity().components, c.entity().components);
            assert!(!existing.contains(&c.id()));
        }
    }

    #[test]
    fn test_duplicate_does_not_reposition() {
        let (mut graph, a, b, _) = sample();
        let copy = graph.duplicate(b, Some(a)).unwrap();
        assert_eq!(graph.find(copy).unwrap().transform(), graph.find(b).unwrap().transform());
        assert_eq!(graph.placement(copy).unwrap(), Placement { parent: Some(a), index: 1 });
    }

    #[test]
    fn test_duplicate_into_own_subtree() {
        let (mut graph, a, b, _) = sample();
        let copy = graph.duplicate(a, Some(b)).unwrap();
        assert!(graph.is_ancestor_of(a, copy).unwrap());
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn test_duplicate_unknown_parent_mints_nothing() {
        let (mut graph, a, _, _) = sample();
        let next = graph.allocator().peek();
        let ghost = EntityId::new(500);
        assert_eq!(graph.duplicate(a, Some(ghost)), Err(SceneError::NotFound(ghost)));
        assert_eq!(graph.allocator().peek(), next);
    }

    #[test]
    fn test_restore_placement_reverses_reparent() {
        let (mut graph, a, b, c) = sample();
        let local = graph.find(b).unwrap().transform().clone();
        let before = graph.reparent(b, Some(c)).unwrap();

        graph.restore_placement(b, before, local.clone()).unwrap();

        assert_eq!(graph.placement(b).unwrap(), Placement { parent: Some(a), index: 0 });
        assert_eq!(graph.find(b).unwrap().transform(), &local);
    }

    #[test]
    fn test_forest_snapshot_and_replace() {
        let (mut graph, a, b, c) = sample();
        let forest = graph.to_forest();
        assert_eq!(forest.len(), 2);

        let copy = SceneGraph::from_forest(forest.clone()).unwrap();
        assert_eq!(shape(&copy), shape(&graph));

        let next = graph.allocator().peek();
        graph.replace_forest(vec![forest[1].clone()]).unwrap();
        assert!(graph.contains(c));
        assert!(!graph.contains(a) && !graph.contains(b));
        assert_eq!(graph.allocator().peek(), next);
    }

    #[test]
    fn test_replace_forest_is_atomic() {
        let (mut graph, a, _, _) = sample();
        let before = shape(&graph);
        let dup = Entity::new(EntityId::new(50), "x");
        let result = graph.replace_forest(vec![Subtree::from(dup.clone()), Subtree::from(dup)]);

        assert_eq!(result, Err(SceneError::DuplicateIdentity(EntityId::new(50))));
        assert_eq!(shape(&graph), before);
        assert!(graph.contains(a));
    }
}
