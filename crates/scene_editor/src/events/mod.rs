//! Editor event system
//!
//! Key principles:
//! - Registration per event kind (only interested handlers are notified)
//! - Queued delivery: events sent while a dispatch is running are delivered
//!   after the current one, in order
//! - Owned by an editor context, no process-wide registry
//! - Handlers may subscribe or unsubscribe from inside a callback

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::scene::EntityId;

/// What a completed structural mutation did. Exactly one is emitted per
/// top-level mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralChange {
    /// An entity (with its subtree) was attached
    Added {
        /// Root of the attached subtree
        entity: EntityId,
        /// Where it was attached, `None` for root level
        parent: Option<EntityId>,
    },
    /// An entity (with its subtree) was detached
    Removed {
        /// Root of the detached subtree
        entity: EntityId,
        /// Where it hung before, `None` for root level
        parent: Option<EntityId>,
    },
    /// An entity moved to another parent
    Reparented {
        /// The moved entity
        entity: EntityId,
        /// Previous parent
        from: Option<EntityId>,
        /// New parent
        to: Option<EntityId>,
    },
    /// A subtree was deep-copied
    Duplicated {
        /// Root of the source subtree
        source: EntityId,
        /// Root of the copy
        copy: EntityId,
        /// Where the copy was attached
        parent: Option<EntityId>,
    },
    /// An entity's display name changed
    Renamed {
        /// The renamed entity
        entity: EntityId,
    },
    /// An entity's local transform was set directly
    Transformed {
        /// The moved entity
        entity: EntityId,
    },
    /// The whole forest was replaced (scene or project opened)
    SceneReplaced,
}

impl StructuralChange {
    /// The entity the change is about, if it is about one
    pub const fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Added { entity, .. }
            | Self::Removed { entity, .. }
            | Self::Reparented { entity, .. }
            | Self::Renamed { entity }
            | Self::Transformed { entity } => Some(*entity),
            Self::Duplicated { copy, .. } => Some(*copy),
            Self::SceneReplaced => None,
        }
    }
}

/// Event kind used for handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`EditorEvent::Structural`]
    StructuralChange,
    /// [`EditorEvent::SelectionChanged`]
    SelectionChanged,
}

/// Notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A structural mutation completed
    Structural(StructuralChange),
    /// The selected entity changed (`None` = nothing selected)
    SelectionChanged(Option<EntityId>),
}

impl EditorEvent {
    /// Registration kind of this event
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Structural(_) => EventKind::StructuralChange,
            Self::SelectionChanged(_) => EventKind::SelectionChanged,
        }
    }
}

/// Handle returned by registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Event handler trait
///
/// `C` is the context handed to handlers alongside the event, typically the
/// editor that emitted it.
pub trait EventHandler<C: ?Sized> {
    /// Handle an event
    fn on_event(&mut self, context: &C, event: &EditorEvent);
}

impl<C: ?Sized, F> EventHandler<C> for F
where
    F: FnMut(&C, &EditorEvent),
{
    fn on_event(&mut self, context: &C, event: &EditorEvent) {
        self(context, event);
    }
}

type HandlerList<C> = Vec<(ListenerId, Box<dyn EventHandler<C>>)>;

/// Event bus with registration and queuing, usable through `&self`
pub struct EventBus<C: ?Sized> {
    queue: RefCell<VecDeque<EditorEvent>>,
    handlers: RefCell<HashMap<EventKind, HandlerList<C>>>,
    /// Unsubscribed while their list was checked out for dispatch
    removed: RefCell<HashSet<ListenerId>>,
    next_id: Cell<u64>,
    dispatching: Cell<bool>,
}

impl<C: ?Sized> EventBus<C> {
    /// Create a new empty event bus
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            handlers: RefCell::new(HashMap::new()),
            removed: RefCell::new(HashSet::new()),
            next_id: Cell::new(0),
            dispatching: Cell::new(false),
        }
    }

    /// Register a handler for a specific event kind
    pub fn register_handler(&self, kind: EventKind, handler: Box<dyn EventHandler<C>>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, handler));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        for list in handlers.values_mut() {
            if let Some(slot) = list.iter().position(|(listener, _)| *listener == id) {
                list.remove(slot);
                return true;
            }
        }
        if self.dispatching.get() {
            // Its list may be checked out right now
            return self.removed.borrow_mut().insert(id);
        }
        false
    }

    /// Queue an event for delivery
    pub fn send(&self, event: EditorEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Number of queued events
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether a dispatch loop is currently running
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    /// Deliver all queued events in order.
    ///
    /// A nested call (from inside a handler) returns immediately; the outer
    /// loop delivers whatever the handler queued.
    pub fn dispatch(&self, context: &C) {
        if self.dispatching.replace(true) {
            return;
        }
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            self.dispatch_event(context, &event);
        }
        self.dispatching.set(false);
    }

    fn dispatch_event(&self, context: &C, event: &EditorEvent) {
        let kind = event.kind();
        let mut checked_out = self
            .handlers
            .borrow_mut()
            .get_mut(&kind)
            .map(std::mem::take)
            .unwrap_or_default();

        for (_, handler) in &mut checked_out {
            handler.on_event(context, event);
        }

        let mut removed = self.removed.borrow_mut();
        checked_out.retain(|(id, _)| !removed.contains(id));
        removed.clear();

        let mut handlers = self.handlers.borrow_mut();
        let list = handlers.entry(kind).or_default();
        // Handlers registered during the callbacks go after the existing ones
        let added = std::mem::replace(list, checked_out);
        list.extend(added);
    }

    /// Drop all queued events
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}

impl<C: ?Sized> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    /// Context that records what handlers saw
    #[derive(Default)]
    struct Log {
        seen: RefCell<Vec<String>>,
    }

    fn structural() -> EditorEvent {
        EditorEvent::Structural(StructuralChange::SceneReplaced)
    }

    #[test]
    fn test_only_registered_kind_is_notified() {
        let bus: EventBus<Log> = EventBus::new();
        let log = Log::default();
        bus.register_handler(
            EventKind::SelectionChanged,
            Box::new(|log: &Log, _: &EditorEvent| log.seen.borrow_mut().push("selection".into())),
        );

        bus.send(structural());
        bus.dispatch(&log);
        assert!(log.seen.borrow().is_empty());
        assert_eq!(bus.pending(), 0);

        bus.send(EditorEvent::SelectionChanged(None));
        bus.dispatch(&log);
        assert_eq!(*log.seen.borrow(), vec!["selection".to_string()]);
    }

    #[test]
    fn test_every_handler_sees_the_event() {
        let bus: EventBus<Log> = EventBus::new();
        let log = Log::default();
        for name in ["outline", "inspector"] {
            bus.register_handler(
                EventKind::StructuralChange,
                Box::new(move |log: &Log, _: &EditorEvent| log.seen.borrow_mut().push(name.to_string())),
            );
        }

        bus.send(structural());
        bus.dispatch(&log);
        assert_eq!(*log.seen.borrow(), vec!["outline".to_string(), "inspector".to_string()]);
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let bus: EventBus<Log> = EventBus::new();
        let log = Log::default();
        let id = bus.register_handler(
            EventKind::StructuralChange,
            Box::new(|log: &Log, _: &EditorEvent| log.seen.borrow_mut().push("hit".into())),
        );

        assert!(bus.unregister(id));
        assert!(!bus.unregister(id));
        bus.send(structural());
        bus.dispatch(&log);
        assert!(log.seen.borrow().is_empty());
    }

    #[test]
    fn test_events_sent_during_dispatch_are_delivered_after() {
        let bus: Rc<EventBus<Log>> = Rc::new(EventBus::new());
        let log = Log::default();
        let inner = Rc::clone(&bus);
        bus.register_handler(
            EventKind::StructuralChange,
            Box::new(move |log: &Log, _: &EditorEvent| {
                log.seen.borrow_mut().push("structural".into());
                inner.send(EditorEvent::SelectionChanged(None));
                // Nested dispatch must not deliver out of order
                inner.dispatch(log);
                log.seen.borrow_mut().push("structural done".into());
            }),
        );
        bus.register_handler(
            EventKind::SelectionChanged,
            Box::new(|log: &Log, _: &EditorEvent| log.seen.borrow_mut().push("selection".into())),
        );

        bus.send(structural());
        bus.dispatch(&log);
        assert_eq!(
            *log.seen.borrow(),
            vec!["structural".to_string(), "structural done".to_string(), "selection".to_string()]
        );
    }

    #[test]
    fn test_handler_can_unsubscribe_itself() {
        let bus: Rc<EventBus<Log>> = Rc::new(EventBus::new());
        let log = Log::default();
        let own_id: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let (inner, slot) = (Rc::clone(&bus), Rc::clone(&own_id));
        let id = bus.register_handler(
            EventKind::StructuralChange,
            Box::new(move |log: &Log, _: &EditorEvent| {
                log.seen.borrow_mut().push("once".into());
                if let Some(id) = slot.get() {
                    inner.unregister(id);
                }
            }),
        );
        own_id.set(Some(id));

        bus.send(structural());
        bus.send(structural());
        bus.dispatch(&log);
        assert_eq!(*log.seen.borrow(), vec!["once".to_string()]);
    }

    #[test]
    fn test_change_entity_accessor() {
        let e = EntityId::new(4);
        let copy = EntityId::new(9);
        assert_eq!(StructuralChange::Renamed { entity: e }.entity(), Some(e));
        assert_eq!(
            StructuralChange::Duplicated { source: e, copy, parent: None }.entity(),
            Some(copy)
        );
        assert_eq!(StructuralChange::SceneReplaced.entity(), None);
    }
}
