//! Depth-first traversal of the scene graph
//!
//! [`Traversal`] is a cheap, copyable description of *what* to walk; every
//! call to [`Traversal::iter`] starts a new lazy walk, so the same traversal
//! can be consumed any number of times.

use super::graph::{EntityRef, SceneGraph};
use crate::foundation::collections::EntityKey;

#[derive(Debug, Clone, Copy)]
enum Start {
    Forest,
    Subtree(EntityKey),
}

/// Restartable depth-first walk yielding `(entity, depth)` pairs: parents
/// before children, siblings in insertion order.
#[derive(Debug, Clone, Copy)]
pub struct Traversal<'a> {
    graph: &'a SceneGraph,
    start: Start,
}

impl<'a> Traversal<'a> {
    pub(crate) const fn forest(graph: &'a SceneGraph) -> Self {
        Self {
            graph,
            start: Start::Forest,
        }
    }

    pub(crate) const fn subtree(graph: &'a SceneGraph, root: EntityKey) -> Self {
        Self {
            graph,
            start: Start::Subtree(root),
        }
    }

    /// Begin a fresh walk
    pub fn iter(&self) -> DepthFirst<'a> {
        let stack: Vec<(EntityKey, usize)> = match self.start {
            Start::Forest => self.graph.root_keys().iter().rev().map(|&key| (key, 0)).collect(),
            Start::Subtree(root) => vec![(root, 0)],
        };
        DepthFirst {
            graph: self.graph,
            stack,
        }
    }

    /// Number of entities the walk visits
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

impl<'a> IntoIterator for Traversal<'a> {
    type Item = (EntityRef<'a>, usize);
    type IntoIter = DepthFirst<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &Traversal<'a> {
    type Item = (EntityRef<'a>, usize);
    type IntoIter = DepthFirst<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One lazy pass of a [`Traversal`]
#[derive(Debug, Clone)]
pub struct DepthFirst<'a> {
    graph: &'a SceneGraph,
    stack: Vec<(EntityKey, usize)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (EntityRef<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, depth) = self.stack.pop()?;
            let Some(node) = self.graph.node(key) else {
                continue;
            };
            self.stack
                .extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
            if let Some(entity) = EntityRef::from_key(self.graph, key) {
                return Some((entity, depth));
            }
        }
    }
}
