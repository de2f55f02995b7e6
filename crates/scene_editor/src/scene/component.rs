//! Capability attachments
//!
//! The set of capabilities is closed: every attachment is a variant of
//! [`Component`], and an entity holds at most one per [`ComponentKind`].

use serde::{Deserialize, Serialize};

/// Discriminant of a [`Component`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Renders a model asset
    Model,
    /// Renders a terrain asset
    Terrain,
}

/// Marks an entity as rendering a model asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelComponent {
    /// Asset name or id understood by the asset collaborator
    pub asset: String,
}

/// Marks an entity as rendering a terrain asset.
///
/// Height data lives with the asset; this only records which asset and the
/// grid it was created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainComponent {
    /// Asset name or id understood by the asset collaborator
    pub asset: String,
    /// Vertices per terrain edge
    pub vertex_resolution: u32,
    /// Edge length in world units
    pub size: u32,
}

/// A typed capability attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    /// See [`ModelComponent`]
    Model(ModelComponent),
    /// See [`TerrainComponent`]
    Terrain(TerrainComponent),
}

impl Component {
    /// Which capability this is
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Model(_) => ComponentKind::Model,
            Self::Terrain(_) => ComponentKind::Terrain,
        }
    }
}

/// At most one [`Component`] per kind, kept in kind order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentSet {
    items: Vec<Component>,
}

impl ComponentSet {
    /// Attach a component, returning the one of the same kind it replaced
    pub fn insert(&mut self, component: Component) -> Option<Component> {
        let kind = component.kind();
        match self.items.binary_search_by_key(&kind, Component::kind) {
            Ok(slot) => Some(std::mem::replace(&mut self.items[slot], component)),
            Err(slot) => {
                self.items.insert(slot, component);
                None
            }
        }
    }

    /// Detach the component of the given kind
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.items
            .binary_search_by_key(&kind, Component::kind)
            .ok()
            .map(|slot| self.items.remove(slot))
    }

    /// Get the component of the given kind
    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.items
            .binary_search_by_key(&kind, Component::kind)
            .ok()
            .map(|slot| &self.items[slot])
    }

    /// Whether a component of the given kind is attached
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.get(kind).is_some()
    }

    /// The terrain attachment, if any
    pub fn terrain(&self) -> Option<&TerrainComponent> {
        match self.get(ComponentKind::Terrain) {
            Some(Component::Terrain(terrain)) => Some(terrain),
            _ => None,
        }
    }

    /// Iterate attachments in kind order
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.items.iter()
    }

    /// Number of attachments
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No attachments
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
