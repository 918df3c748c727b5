//! World-query capability consumed by the engine.
//!
//! The engine never talks to a physics library directly. Anything that can sweep a
//! sphere/capsule through the world and test a stationary overlap can drive it:
//! the rapier backend in [`crate::rapier_world`], or a scripted world in tests.

use super::types::{BodyId, TraceHit, TraceShape, Vec3};

pub trait WorldQuery {
    /// Sweep `shape` from `start` to `end` and return the nearest blocking contact.
    ///
    /// Geometry already overlapping the shape at `start` is ignored, and so is `ignore`
    /// (the character's own body).
    fn sweep(
        &self,
        shape: TraceShape,
        start: Vec3,
        end: Vec3,
        ignore: Option<BodyId>,
    ) -> Option<TraceHit>;

    /// Stationary overlap test: does any blocking geometry intersect `shape` placed at `center`?
    fn overlap(&self, shape: TraceShape, center: Vec3, ignore: Option<BodyId>) -> bool;
}
