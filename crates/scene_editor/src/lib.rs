//! # Scene Editor
//!
//! Scene graph core of a 3D scene editor.
//!
//! ## Features
//!
//! - **Scene Graph**: forest of entities with local transforms, arena backed
//! - **World-Preserving Reparenting**: drag and drop never makes an entity jump
//! - **Duplication**: deep copies with freshly minted ids
//! - **Undo/Redo**: bounded command history of structural edits
//! - **Outline**: presentation tree with single selection and change notifications
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_editor::prelude::*;
//!
//! let editor = SceneEditor::new(EditorConfig::default());
//! editor.on_structural_change(|_, change| log::info!("scene changed: {change:?}"));
//!
//! let parent = editor.perform(MenuAction::AddEmpty, None)?.expect("entity created");
//! let child = editor.perform(MenuAction::AddEmpty, Some(parent))?.expect("entity created");
//!
//! editor.handle_drop(DragDrop { dragged: child, target: None })?;
//! editor.perform(MenuAction::Delete, Some(child))?;
//! editor.undo()?;
//! assert!(editor.graph().contains(child));
//! # Ok::<(), EditorError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Foundation and configuration
pub mod config;
pub mod core;
pub mod foundation;

// Scene model and editing
pub mod editor;
pub mod events;
pub mod history;
pub mod scene;

pub use editor::{DragDrop, EditorError, SceneEditor};

/// Common imports for editor users
pub mod prelude {
    pub use crate::{
        core::config::EditorConfig,
        editor::{menu_for, DragDrop, EditorError, MenuAction, MenuItems, Outline, SceneEditor},
        events::{ListenerId, StructuralChange},
        foundation::math::{Quat, Transform, Vec3},
        history::{Command, CommandHistory, HistoryError},
        scene::{Component, Entity, EntityId, SceneError, SceneGraph, Subtree, TerrainComponent},
    };
}
