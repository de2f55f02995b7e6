//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational handle of a live node in the scene graph arena.
    ///
    /// Used for the parent back-reference: a key never owns its target and
    /// resolves to nothing once the node has been taken out of the arena.
    pub struct EntityKey;

    /// Handle of a row in the outline presentation tree.
    ///
    /// Keys from a previous outline build are stale after a rebuild.
    pub struct OutlineKey;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;
