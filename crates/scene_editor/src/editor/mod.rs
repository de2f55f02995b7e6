//! Editor context
//!
//! [`SceneEditor`] ties the scene graph, the command history, the outline
//! and the selection together and is the single entry point for UI input.
//!
//! Every structural entry point runs the same pipeline:
//!
//! 1. acquire the mutation guard (a nested call fails with
//!    [`SceneError::ReentrantMutation`])
//! 2. validate and apply the edit, recording a command where configured
//! 3. rebuild or patch the outline, revalidate the selection
//! 4. dispatch exactly one [`StructuralChange`] to subscribers
//! 5. release the guard
//!
//! Subscribers receive `&SceneEditor`, so they can read the graph or change
//! the selection from inside a notification. State lives behind `RefCell`s;
//! no borrow is held while subscriber code runs.

pub mod menu;
pub mod outline;
pub mod selection;


pub use menu::{menu_for, MenuAction, MenuItems};
pub use outline::{Outline, OutlineNode};
pub use selection::Selection;

use std::cell::{Cell, Ref, RefCell};

use thiserror::Error;

use crate::core::config::EditorConfig;
use crate::events::{EditorEvent, EventBus, EventKind, ListenerId, StructuralChange};
use crate::foundation::math::Transform;
use crate::history::{AddCommand, CommandHistory, DeleteCommand, HistoryError, ReparentCommand};
use crate::scene::{Component, Entity, EntityId, SceneError, SceneGraph, Subtree, TerrainComponent};

/// Editor level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The scene graph refused the edit
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Nothing to undo or redo
    #[error(transparent)]
    History(HistoryError),

    /// The menu entry is disabled for this target
    #[error("'{action}' is not available for target {target:?}")]
    ActionUnavailable {
        /// Requested action
        action: MenuAction,
        /// Row it was requested on
        target: Option<EntityId>,
    },
}

impl From<HistoryError> for EditorError {
    /// Graph refusals surface as [`EditorError::Scene`] whether or not the
    /// edit went through the history
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Scene(err) => Self::Scene(err),
            other => Self::History(other),
        }
    }
}

/// A finished drag gesture in the outline: drop `dragged` onto `target`
/// (`None` = empty space, i.e. root level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragDrop {
    /// Entity being moved
    pub dragged: EntityId,
    /// New parent
    pub target: Option<EntityId>,
}

/// Held for the duration of one structural edit
struct MutationGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> MutationGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self, SceneError> {
        if flag.replace(true) {
            return Err(SceneError::ReentrantMutation);
        }
        Ok(Self { flag })
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Single-threaded editor context owning one scene
pub struct SceneEditor {
    config: EditorConfig,
    graph: RefCell<SceneGraph>,
    history: RefCell<CommandHistory>,
    outline: RefCell<Outline>,
    selection: Cell<Selection>,
    events: EventBus<SceneEditor>,
    mutating: Cell<bool>,
}

impl SceneEditor {
    /// Editor with an empty scene
    pub fn new(config: EditorConfig) -> Self {
        let history = CommandHistory::from_config(&config.history);
        let outline = Outline::new(&config.outline);
        Self {
            config,
            graph: RefCell::new(SceneGraph::new()),
            history: RefCell::new(history),
            outline: RefCell::new(outline),
            selection: Cell::new(Selection::default()),
            events: EventBus::new(),
            mutating: Cell::new(false),
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    /// Configuration the editor was built with
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The scene graph. Do not hold the borrow across editor calls.
    pub fn graph(&self) -> Ref<'_, SceneGraph> {
        self.graph.borrow()
    }

    /// The outline. Do not hold the borrow across editor calls.
    pub fn outline(&self) -> Ref<'_, Outline> {
        self.outline.borrow()
    }

    /// The command history
    pub fn history(&self) -> Ref<'_, CommandHistory> {
        self.history.borrow()
    }

    /// Selected entity
    pub fn selected(&self) -> Option<EntityId> {
        self.selection.get().get()
    }

    /// Enabled context menu entries for `target`
    pub fn menu_for(&self, target: Option<EntityId>) -> MenuItems {
        menu_for(&self.graph.borrow(), target)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Call `handler` once after every completed structural edit
    pub fn on_structural_change<F>(&self, mut handler: F) -> ListenerId
    where
        F: FnMut(&Self, &StructuralChange) + 'static,
    {
        self.events.register_handler(
            EventKind::StructuralChange,
            Box::new(move |editor: &Self, event: &EditorEvent| {
                if let EditorEvent::Structural(change) = event {
                    handler(editor, change);
                }
            }),
        )
    }

    /// Call `handler` whenever the selected entity changes
    pub fn on_selection_changed<F>(&self, mut handler: F) -> ListenerId
    where
        F: FnMut(&Self, Option<EntityId>) + 'static,
    {
        self.events.register_handler(
            EventKind::SelectionChanged,
            Box::new(move |editor: &Self, event: &EditorEvent| {
                if let EditorEvent::SelectionChanged(selected) = event {
                    handler(editor, *selected);
                }
            }),
        )
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, listener: ListenerId) -> bool {
        self.events.unregister(listener)
    }

    // ── UI input ─────────────────────────────────────────────────────

    /// Reparent the dragged entity under the drop target, keeping its world
    /// position.
    pub fn handle_drop(&self, drop: DragDrop) -> Result<(), EditorError> {
        let DragDrop { dragged, target } = drop;
        let record = self.config.history.record_all_edits;
        self.apply("drop", |graph, history| {
            let change = if record {
                history.add(Box::new(ReparentCommand::new(dragged, target)), graph)?
            } else {
                let before = graph.reparent(dragged, target)?;
                StructuralChange::Reparented {
                    entity: dragged,
                    from: before.parent,
                    to: target,
                }
            };
            Ok(((), change))
        })
    }

    /// Run a context menu action on `target`.
    ///
    /// Returns the created entity for add and duplicate actions.
    pub fn perform(&self, action: MenuAction, target: Option<EntityId>) -> Result<Option<EntityId>, EditorError> {
        let record = self.config.history.record_all_edits;
        let label = action.to_string();
        self.apply(&label, |graph, history| {
            if !menu_for(graph, target).contains(action.item()) {
                return Err(EditorError::ActionUnavailable { action, target });
            }
            let unavailable = || EditorError::ActionUnavailable {
                action: action.clone(),
                target,
            };

            match &action {
                MenuAction::AddEmpty => {
                    let entity = graph.create_entity(self.config.outline.default_entity_name.as_str());
                    let change = attach(graph, history, record, entity.into(), target)?;
                    Ok((change.entity(), change))
                }
                MenuAction::AddTerrain => {
                    let entity = self.terrain_entity(graph);
                    let change = attach(graph, history, record, entity.into(), None)?;
                    Ok((change.entity(), change))
                }
                MenuAction::Rename(name) => {
                    let entity = target.ok_or_else(unavailable)?;
                    graph.entity_mut(entity)?.name.clone_from(name);
                    Ok((None, StructuralChange::Renamed { entity }))
                }
                MenuAction::Duplicate => {
                    let source = target.ok_or_else(unavailable)?;
                    let parent = graph.placement(source)?.parent;
                    let change = if record {
                        let copy = graph.clone_subtree(source)?;
                        history.add(Box::new(AddCommand::duplicate_of(source, copy, parent)), graph)?
                    } else {
                        let copy = graph.duplicate(source, parent)?;
                        StructuralChange::Duplicated { source, copy, parent }
                    };
                    Ok((change.entity(), change))
                }
                MenuAction::Delete => {
                    let entity = target.ok_or_else(unavailable)?;
                    let change = history.add(Box::new(DeleteCommand::new(entity)), graph)?;
                    Ok((None, change))
                }
            }
        })
    }

    /// Select an entity (`None` clears). An id that is not in the scene
    /// clears the selection. Returns the resulting selection.
    pub fn select(&self, entity: Option<EntityId>) -> Option<EntityId> {
        let mut selection = self.selection.get();
        let changed = selection.set(&self.graph.borrow(), entity);
        self.selection.set(selection);
        self.outline.borrow_mut().highlight(selection.get());

        if changed {
            log::debug!("selection changed to {:?}", selection.get());
            self.events.send(EditorEvent::SelectionChanged(selection.get()));
            self.events.dispatch(self);
        }
        selection.get()
    }

    /// Reverse the most recent recorded edit
    pub fn undo(&self) -> Result<(), EditorError> {
        self.apply("undo", |graph, history| Ok(((), history.undo(graph)?)))
    }

    /// Re-apply the most recently undone edit
    pub fn redo(&self) -> Result<(), EditorError> {
        self.apply("redo", |graph, history| Ok(((), history.redo(graph)?)))
    }

    /// Replace the scene, e.g. after a project or scene was loaded.
    ///
    /// Clears the history and the selection.
    pub fn open_scene(&self, forest: Vec<Subtree>) -> Result<(), EditorError> {
        self.apply("open scene", |graph, history| {
            graph.replace_forest(forest)?;
            history.clear();
            log::info!("opened scene with {} entities", graph.len());
            Ok(((), StructuralChange::SceneReplaced))
        })
    }

    /// Set an entity's local transform (inspector edit). Not recorded.
    pub fn set_local_transform(&self, entity: EntityId, transform: Transform) -> Result<(), EditorError> {
        self.apply("set transform", |graph, _| {
            graph.entity_mut(entity)?.transform = transform;
            Ok(((), StructuralChange::Transformed { entity }))
        })
    }

    // ── Pipeline ─────────────────────────────────────────────────────

    fn apply<T>(
        &self,
        operation: &str,
        edit: impl FnOnce(&mut SceneGraph, &mut CommandHistory) -> Result<(T, StructuralChange), EditorError>,
    ) -> Result<T, EditorError> {
        let _guard = MutationGuard::acquire(&self.mutating).map_err(|err| {
            log::warn!("{operation} rejected: {err}");
            EditorError::from(err)
        })?;

        let result = {
            let mut graph = self.graph.borrow_mut();
            let mut history = self.history.borrow_mut();
            edit(&mut *graph, &mut *history)
        };
        let (value, change) = result.map_err(|err| {
            log::warn!("{operation} rejected: {err}");
            err
        })?;
        log::debug!("{operation}: {change:?}");

        let selection_cleared = self.refresh(&change);
        self.events.send(EditorEvent::Structural(change));
        if selection_cleared {
            self.events.send(EditorEvent::SelectionChanged(None));
        }
        self.events.dispatch(self);
        Ok(value)
    }

    /// Bring outline and selection in line with the graph. Returns whether
    /// the selection was cleared.
    fn refresh(&self, change: &StructuralChange) -> bool {
        let graph = self.graph.borrow();
        let mut outline = self.outline.borrow_mut();

        let patched = match change {
            StructuralChange::Transformed { .. } => true,
            _ if !self.config.outline.incremental_patching => false,
            StructuralChange::Added { entity, .. } => outline.insert(&graph, *entity),
            StructuralChange::Duplicated { copy, .. } => outline.insert(&graph, *copy),
            StructuralChange::Removed { entity, .. } => outline.remove(*entity),
            StructuralChange::Renamed { entity } => outline.relabel(&graph, *entity),
            StructuralChange::Reparented { .. } | StructuralChange::SceneReplaced => false,
        };
        if !patched {
            outline.rebuild(&graph);
        }

        let mut selection = self.selection.get();
        let cleared = if matches!(change, StructuralChange::SceneReplaced) {
            selection.clear()
        } else {
            selection.revalidate(&graph)
        };
        self.selection.set(selection);
        outline.highlight(selection.get());
        cleared
    }

    fn terrain_entity(&self, graph: &mut SceneGraph) -> Entity {
        let id = graph.next_id();
        let terrain = TerrainComponent {
            asset: format!("terrain_{id}"),
            vertex_resolution: self.config.terrain.vertex_resolution,
            size: self.config.terrain.size,
        };
        Entity::new(id, format!("Terrain {id}")).with_component(Component::Terrain(terrain))
    }
}

impl Default for SceneEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Attach a new subtree, through the history when every edit is recorded
fn attach(
    graph: &mut SceneGraph,
    history: &mut CommandHistory,
    record: bool,
    tree: Subtree,
    parent: Option<EntityId>,
) -> Result<StructuralChange, EditorError> {
    if record {
        return Ok(history.add(Box::new(AddCommand::new(tree, parent)), graph)?);
    }
    let entity = graph.insert(tree, parent, None)?;
    Ok(StructuralChange::Added { entity, parent })
}
