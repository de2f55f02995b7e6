//! Transform composition along a parent chain
//!
//! World position is always derived from local transforms, never stored.
//! Only position is composed and preserved: rotation and scale stay in the
//! entity's local space when it changes parent.

use crate::foundation::math::{Transform, Vec3};

/// Tolerance used when comparing positions that went through a reparent
pub const POSITION_EPSILON: f32 = 1.0e-4;

/// Sum of local positions over a parent chain.
///
/// The chain may be given leaf-to-root or root-to-leaf; addition commutes.
pub fn world_position<'a, I>(chain: I) -> Vec3
where
    I: IntoIterator<Item = &'a Transform>,
{
    chain
        .into_iter()
        .fold(Vec3::zeros(), |acc, transform| acc + transform.position)
}

/// Local position that keeps an entity at `dragged_world` once it hangs
/// under a parent whose world position is `new_parent_world`.
///
/// `None` means the entity becomes a root, whose local space is world space.
pub fn reparent_preserving_world(dragged_world: Vec3, new_parent_world: Option<Vec3>) -> Vec3 {
    dragged_world - new_parent_world.unwrap_or_else(Vec3::zeros)
}

/// Whether two positions are equal within [`POSITION_EPSILON`]
pub fn positions_match(a: Vec3, b: Vec3) -> bool {
    approx::relative_eq!(a, b, epsilon = POSITION_EPSILON, max_relative = POSITION_EPSILON)
}
