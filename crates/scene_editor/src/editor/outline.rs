//! Outline: the presentation tree shown next to the viewport
//!
//! Mirrors the scene graph one node per entity. Nodes hold only the entity
//! id plus display state, never the entity itself. They live in their own
//! arena, so a key obtained before a rebuild no longer resolves afterwards.

use std::collections::{HashMap, HashSet};

use super::DragDrop;
use crate::core::config::OutlineConfig;
use crate::foundation::collections::{HandleMap, OutlineKey};
use crate::scene::{EntityId, EntityRef, SceneGraph};

/// One row of the outline
#[derive(Debug, Clone)]
pub struct OutlineNode {
    entity: EntityId,
    label: String,
    depth: usize,
    expanded: bool,
    highlighted: bool,
    parent: Option<OutlineKey>,
    children: Vec<OutlineKey>,
}

impl OutlineNode {
    /// Entity this row represents
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Display label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Nesting depth, 0 for roots
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Children are shown
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Row of the selected entity
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Row has child rows (shown or not)
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Presentation tree of a scene graph
#[derive(Debug, Default)]
pub struct Outline {
    nodes: HandleMap<OutlineKey, OutlineNode>,
    roots: Vec<OutlineKey>,
    by_entity: HashMap<EntityId, OutlineKey>,
    highlighted: Option<OutlineKey>,
    show_ids: bool,
}

impl Outline {
    /// Empty outline using the configured label style
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            show_ids: config.show_ids,
            ..Self::default()
        }
    }

    /// Discard every row and mirror `graph` again.
    ///
    /// Collapsed rows stay collapsed. The highlight is dropped; the caller
    /// re-applies it by entity id.
    pub fn rebuild(&mut self, graph: &SceneGraph) {
        let collapsed: HashSet<EntityId> = self
            .nodes
            .values()
            .filter(|node| !node.expanded)
            .map(|node| node.entity)
            .collect();

        self.nodes.clear();
        self.roots.clear();
        self.by_entity.clear();
        self.highlighted = None;

        for (entity, depth) in graph.traverse() {
            let parent = entity
                .parent()
                .and_then(|parent| self.by_entity.get(&parent.id()).copied());
            let key = self.push_node(&entity, depth, parent, None);
            if collapsed.contains(&entity.id()) {
                self.nodes[key].expanded = false;
            }
        }
        log::trace!("outline rebuilt with {} rows", self.nodes.len());
    }

    /// Add rows for a newly attached subtree.
    ///
    /// Returns false when the outline cannot be patched (unknown entity,
    /// parent row missing, row already present) and needs a rebuild.
    pub fn insert(&mut self, graph: &SceneGraph, entity: EntityId) -> bool {
        if self.by_entity.contains_key(&entity) {
            return false;
        }
        let (Some(root), Ok(placement)) = (graph.get(entity), graph.placement(entity)) else {
            return false;
        };
        let parent = match placement.parent {
            Some(parent) => match self.by_entity.get(&parent) {
                Some(&key) => Some(key),
                None => return false,
            },
            None => None,
        };
        let base = parent.map_or(0, |key| self.nodes[key].depth + 1);

        self.push_node(&root, base, parent, Some(placement.index));
        let Ok(walk) = graph.traverse_from(entity) else {
            return false;
        };
        for (child, depth) in walk.iter().skip(1) {
            let parent = child
                .parent()
                .and_then(|parent| self.by_entity.get(&parent.id()).copied());
            self.push_node(&child, base + depth, parent, None);
        }
        true
    }

    /// Drop the rows of a detached subtree. Returns false if it had none.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(&key) = self.by_entity.get(&entity) else {
            return false;
        };
        let parent = self.nodes[key].parent;
        match parent.and_then(|parent| self.nodes.get_mut(parent)) {
            Some(parent) => parent.children.retain(|&k| k != key),
            None => self.roots.retain(|&k| k != key),
        }
        self.drop_rows(key);
        true
    }

    /// Refresh one row's label from the graph
    pub fn relabel(&mut self, graph: &SceneGraph, entity: EntityId) -> bool {
        let (Some(&key), Some(source)) = (self.by_entity.get(&entity), graph.get(entity)) else {
            return false;
        };
        let label = self.label_for(&source);
        self.nodes[key].label = label;
        true
    }

    /// Highlight the row of `entity` and expand every ancestor row.
    ///
    /// Returns false (and highlights nothing) if the entity has no row.
    pub fn highlight(&mut self, entity: Option<EntityId>) -> bool {
        if let Some(previous) = self.highlighted.take().and_then(|key| self.nodes.get_mut(key)) {
            previous.highlighted = false;
        }
        let Some(&key) = entity.as_ref().and_then(|id| self.by_entity.get(id)) else {
            return false;
        };

        self.nodes[key].highlighted = true;
        self.highlighted = Some(key);
        let mut ancestor = self.nodes[key].parent;
        while let Some(parent) = ancestor {
            let node = &mut self.nodes[parent];
            node.expanded = true;
            ancestor = node.parent;
        }
        true
    }

    /// Entity of the highlighted row
    pub fn highlighted(&self) -> Option<EntityId> {
        self.highlighted
            .and_then(|key| self.nodes.get(key))
            .map(|node| node.entity)
    }

    /// Flip a row between expanded and collapsed, returning the new state
    pub fn toggle_expanded(&mut self, entity: EntityId) -> Option<bool> {
        let key = *self.by_entity.get(&entity)?;
        let node = &mut self.nodes[key];
        node.expanded = !node.expanded;
        Some(node.expanded)
    }

    /// Rows a tree widget shows, top to bottom
    pub fn visible_rows(&self) -> Vec<&OutlineNode> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<OutlineKey> = self.roots.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            rows.push(node);
            if node.expanded {
                stack.extend(node.children.iter().rev());
            }
        }
        rows
    }

    /// Entity shown at a visible row
    pub fn entity_at_row(&self, row: usize) -> Option<EntityId> {
        self.visible_rows().get(row).map(|node| node.entity)
    }

    /// Turn a drag from one visible row to another into a drop request.
    ///
    /// Releasing below the last row targets root level.
    pub fn resolve_drop(&self, from_row: usize, to_row: usize) -> Option<DragDrop> {
        let rows = self.visible_rows();
        let dragged = rows.get(from_row)?.entity;
        Some(DragDrop {
            dragged,
            target: rows.get(to_row).map(|node| node.entity),
        })
    }

    /// Arena key of an entity's row
    pub fn key_of(&self, entity: EntityId) -> Option<OutlineKey> {
        self.by_entity.get(&entity).copied()
    }

    /// Row behind a key, `None` once the key went stale
    pub fn get(&self, key: OutlineKey) -> Option<&OutlineNode> {
        self.nodes.get(key)
    }

    /// Row of an entity
    pub fn node(&self, entity: EntityId) -> Option<&OutlineNode> {
        self.key_of(entity).and_then(|key| self.nodes.get(key))
    }

    /// Number of rows, shown or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// No rows
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn label_for(&self, entity: &EntityRef<'_>) -> String {
        if self.show_ids {
            format!("{} [{}]", entity.name(), entity.id())
        } else {
            entity.name().to_string()
        }
    }

    fn push_node(
        &mut self,
        entity: &EntityRef<'_>,
        depth: usize,
        parent: Option<OutlineKey>,
        index: Option<usize>,
    ) -> OutlineKey {
        let label = self.label_for(entity);
        let key = self.nodes.insert(OutlineNode {
            entity: entity.id(),
            label,
            depth,
            expanded: true,
            highlighted: false,
            parent,
            children: Vec::new(),
        });
        self.by_entity.insert(entity.id(), key);

        let siblings = match parent.and_then(|parent| self.nodes.get_mut(parent)) {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, key);
        key
    }

    fn drop_rows(&mut self, key: OutlineKey) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };
        self.by_entity.remove(&node.entity);
        if self.highlighted == Some(key) {
            self.highlighted = None;
        }
        for child in node.children {
            self.drop_rows(child);
        }
    }
}
