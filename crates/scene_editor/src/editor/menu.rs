//! Context menu model for outline rows

use std::fmt;

use bitflags::bitflags;

use crate::scene::{EntityId, SceneGraph};

bitflags! {
    /// Menu entries that are enabled for a target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MenuItems: u8 {
        /// Add an empty entity
        const ADD_EMPTY = 1 << 0;
        /// Add a terrain entity
        const ADD_TERRAIN = 1 << 1;
        /// Rename the target
        const RENAME = 1 << 2;
        /// Duplicate the target subtree
        const DUPLICATE = 1 << 3;
        /// Delete the target subtree
        const DELETE = 1 << 4;
    }
}

/// An action picked from the context menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// New entity under the target, or at root level
    AddEmpty,
    /// New root entity carrying a terrain component
    AddTerrain,
    /// Give the target a new name
    Rename(String),
    /// Copy the target subtree under the target's parent
    Duplicate,
    /// Remove the target subtree (undoable)
    Delete,
}

impl MenuAction {
    /// The menu entry this action belongs to
    pub const fn item(&self) -> MenuItems {
        match self {
            Self::AddEmpty => MenuItems::ADD_EMPTY,
            Self::AddTerrain => MenuItems::ADD_TERRAIN,
            Self::Rename(_) => MenuItems::RENAME,
            Self::Duplicate => MenuItems::DUPLICATE,
            Self::Delete => MenuItems::DELETE,
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddEmpty => "Add Empty",
            Self::AddTerrain => "Add Terrain",
            Self::Rename(_) => "Rename",
            Self::Duplicate => "Duplicate",
            Self::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Enabled entries for a right click on `target` (`None` = empty space).
///
/// A target that is not in the graph counts as no target. Terrain entities
/// cannot be duplicated.
pub fn menu_for(graph: &SceneGraph, target: Option<EntityId>) -> MenuItems {
    let adds = MenuItems::ADD_EMPTY | MenuItems::ADD_TERRAIN;
    let Some(entity) = target.and_then(|id| graph.get(id)) else {
        return adds;
    };

    let mut items = adds | MenuItems::RENAME | MenuItems::DELETE;
    if entity.entity().components.terrain().is_none() {
        items |= MenuItems::DUPLICATE;
    }
    items
}
