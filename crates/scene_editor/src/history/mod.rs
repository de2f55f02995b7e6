//! Structural command log
//!
//! A linear undo/redo history with a cursor. Entries below the cursor are
//! executed, entries at or above it are undone and form the redo tail.
//! Adding a new command drops the redo tail.

pub mod add;
pub mod command;
pub mod delete;
pub mod reparent;

pub use add::AddCommand;
pub use command::{Command, CommandState};
pub use delete::DeleteCommand;
pub use reparent::ReparentCommand;

use std::collections::VecDeque;

use thiserror::Error;

use crate::core::config::HistoryConfig;
use crate::events::StructuralChange;
use crate::scene::{SceneError, SceneGraph};

/// History navigation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The cursor is at the bottom of the history
    #[error("nothing to undo")]
    NothingToUndo,

    /// The cursor is at the top of the history
    #[error("nothing to redo")]
    NothingToRedo,

    /// The command could not be applied or reversed
    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[derive(Debug)]
struct Entry {
    command: Box<dyn Command>,
    state: CommandState,
}

impl Entry {
    fn new(command: Box<dyn Command>) -> Self {
        Self {
            command,
            state: CommandState::Pending,
        }
    }
}

/// Bounded undo/redo history of structural commands
#[derive(Debug)]
pub struct CommandHistory {
    entries: VecDeque<Entry>,
    cursor: usize,
    capacity: usize,
}

impl CommandHistory {
    /// Create an empty history keeping at most `capacity` commands
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Create an empty history sized from configuration
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Execute `command` and record it.
    ///
    /// On failure nothing is recorded and the redo tail is kept.
    pub fn add(
        &mut self,
        command: Box<dyn Command>,
        graph: &mut SceneGraph,
    ) -> Result<StructuralChange, HistoryError> {
        let mut entry = Entry::new(command);
        let change = entry.command.execute(graph)?;
        entry.state = CommandState::Executed;

        self.entries.truncate(self.cursor);
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            if let Some(dropped) = self.entries.pop_front() {
                log::debug!("history full, dropping '{}'", dropped.command.label());
            }
        }
        self.cursor = self.entries.len();
        Ok(change)
    }

    /// Reverse the command below the cursor and step back
    pub fn undo(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, HistoryError> {
        let index = self.cursor.checked_sub(1).ok_or(HistoryError::NothingToUndo)?;
        let entry = self.entries.get_mut(index).ok_or(HistoryError::NothingToUndo)?;

        let change = entry.command.undo(graph)?;
        entry.state = CommandState::Undone;
        self.cursor = index;
        log::info!("undo '{}'", entry.command.label());
        Ok(change)
    }

    /// Re-apply the command at the cursor and step forward
    pub fn redo(&mut self, graph: &mut SceneGraph) -> Result<StructuralChange, HistoryError> {
        let entry = self
            .entries
            .get_mut(self.cursor)
            .ok_or(HistoryError::NothingToRedo)?;

        let change = entry.command.execute(graph)?;
        entry.state = CommandState::Executed;
        self.cursor += 1;
        log::info!("redo '{}'", entry.command.label());
        Ok(change)
    }

    /// Something below the cursor
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Something at or above the cursor
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No recorded commands
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of commands currently applied
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Maximum number of commands kept
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every command, releasing any subtree they hold
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Labels and states, oldest first
    pub fn entries(&self) -> impl Iterator<Item = (String, CommandState)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.command.label(), entry.state))
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::from_config(&HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::scene::{Entity, EntityId, Placement};

    /// A(5,0,0) with child B(1,0,0)
    fn sample() -> (SceneGraph, EntityId, EntityId) {
        let mut graph = SceneGraph::new();
        let a = graph.create_entity("A").with_transform(Transform::from_xyz(5.0, 0.0, 0.0));
        let a = graph.add_root(a).unwrap();
        let b = graph.create_entity("B").with_transform(Transform::from_xyz(1.0, 0.0, 0.0));
        let b = graph.add_child(a, b).unwrap();
        (graph, a, b)
    }

    #[test]
    fn test_empty_history_errors() {
        let (mut graph, ..) = sample();
        let mut history = CommandHistory::new(10);
        assert_eq!(history.undo(&mut graph), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(&mut graph), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_delete_undo_redo_cycle() {
        let (mut graph, a, b) = sample();
        let mut history = CommandHistory::new(10);

        history.add(Box::new(DeleteCommand::new(b)), &mut graph).unwrap();
        assert!(!graph.contains(b));
        assert!(history.can_undo() && !history.can_redo());

        history.undo(&mut graph).unwrap();
        assert_eq!(graph.placement(b).unwrap(), Placement { parent: Some(a), index: 0 });
        assert_eq!(graph.find(b).unwrap().transform(), &Transform::from_xyz(1.0, 0.0, 0.0));
        assert_eq!(history.cursor(), 0);

        history.redo(&mut graph).unwrap();
        assert!(!graph.contains(b));
        assert_eq!(history.redo(&mut graph), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_failed_command_is_not_recorded() {
        let (mut graph, ..) = sample();
        let mut history = CommandHistory::new(10);
        let ghost = EntityId::new(999);

        let result = history.add(Box::new(DeleteCommand::new(ghost)), &mut graph);
        assert_eq!(result, Err(HistoryError::Scene(SceneError::NotFound(ghost))));
        assert!(history.is_empty());
    }

    #[test]
    fn test_failed_command_keeps_redo_tail() {
        let (mut graph, _, b) = sample();
        let mut history = CommandHistory::new(10);
        history.add(Box::new(DeleteCommand::new(b)), &mut graph).unwrap();
        history.undo(&mut graph).unwrap();

        let ghost = EntityId::new(999);
        assert!(history.add(Box::new(DeleteCommand::new(ghost)), &mut graph).is_err());
        assert_eq!(history.len(), 1);
        assert!(history.can_redo());
    }

    #[test]
    fn test_new_entry_is_pending() {
        let (_, _, b) = sample();
        let entry = Entry::new(Box::new(DeleteCommand::new(b)));
        assert_eq!(entry.state, CommandState::Pending);
    }

    #[test]
    fn test_deleted_id_stays_reserved_for_undo() {
        let (mut graph, a, b) = sample();
        let mut history = CommandHistory::new(10);
        history.add(Box::new(DeleteCommand::new(b)), &mut graph).unwrap();

        assert_eq!(
            graph.add_root(Entity::new(b, "impostor")),
            Err(SceneError::DuplicateIdentity(b))
        );

        history.undo(&mut graph).unwrap();
        assert_eq!(graph.placement(b).unwrap(), Placement { parent: Some(a), index: 0 });
        assert_eq!(graph.find(b).unwrap().name(), "B");
    }

    #[test]
    fn test_add_redo_after_undo_reuses_ids() {
        let (mut graph, a, _) = sample();
        let mut history = CommandHistory::new(10);
        let child = graph.create_entity("C");
        let c = child.id();
        history.add(Box::new(AddCommand::new(child.into(), Some(a))), &mut graph).unwrap();

        history.undo(&mut graph).unwrap();
        assert!(graph.is_retired(c));
        history.redo(&mut graph).unwrap();
        assert_eq!(graph.placement(c).unwrap(), Placement { parent: Some(a), index: 1 });
    }

    #[test]
    fn test_new_command_truncates_redo_tail() {
        let (mut graph, a, b) = sample();
        let mut history = CommandHistory::new(10);
        history.add(Box::new(DeleteCommand::new(b)), &mut graph).unwrap();
        history.undo(&mut graph).unwrap();

        history.add(Box::new(DeleteCommand::new(a)), &mut graph).unwrap();
        assert_eq!(history.len(), 1);
        assert!(!history.can_redo());
        assert_eq!(history.entries().next().map(|(label, _)| label), Some(format!("Delete entity {a}")));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut graph = SceneGraph::new();
        let ids: Vec<_> = (0..4)
            .map(|i| {
                let e = graph.create_entity(format!("e{i}"));
                graph.add_root(e).unwrap()
            })
            .collect();
        let mut history = CommandHistory::new(3);

        for id in &ids {
            history.add(Box::new(DeleteCommand::new(*id)), &mut graph).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 3);

        for _ in 0..3 {
            history.undo(&mut graph).unwrap();
        }
        assert_eq!(history.undo(&mut graph), Err(HistoryError::NothingToUndo));
        assert!(!graph.contains(ids[0]));
        assert!(ids[1..].iter().all(|id| graph.contains(*id)));
    }

    #[test]
    fn test_failed_undo_keeps_cursor_and_state() {
        let (mut graph, a, b) = sample();
        let mut history = CommandHistory::new(10);
        history.add(Box::new(DeleteCommand::new(b)), &mut graph).unwrap();
        graph.remove(a).unwrap();

        assert_eq!(history.undo(&mut graph), Err(HistoryError::Scene(SceneError::NotFound(a))));
        assert_eq!(history.cursor(), 1);
        let states: Vec<_> = history.entries().map(|(_, state)| state).collect();
        assert_eq!(states, vec![CommandState::Executed]);
    }

    #[test]
    fn test_entry_states_follow_cursor() {
        let (mut graph, a, b) = sample();
        let mut history = CommandHistory::default();
        history.add(Box::new(DeleteCommand::new(b)), &mut graph).unwrap();
        history.add(Box::new(DeleteCommand::new(a)), &mut graph).unwrap();
        history.undo(&mut graph).unwrap();

        let states: Vec<_> = history.entries().map(|(_, state)| state).collect();
        assert_eq!(states, vec![CommandState::Executed, CommandState::Undone]);
        assert_eq!(history.capacity(), 50);
    }
}
