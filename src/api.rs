use std::collections::HashSet;

use crate::shape::{Aabb, Circle, Polygon};
use crate::spatial::SpatialId;
use crate::types::*;

/// Swept shape-vs-shape tests.
///
/// Each answers: if the first shape moves by `move_vec` over one unit of
/// time while the second stays put, when does it first touch, and which
/// surface does it hit? Tests are pure; a zero `move_vec` never collides.
pub trait NarrowphaseApi {
    fn sweep_circle_circle(moving: &Circle, other: &Circle, move_vec: Vector) -> Option<Collision>;
    fn sweep_circle_polygon(moving: &Circle, other: &Polygon, move_vec: Vector) -> Option<Collision>;
    fn sweep_polygon_polygon(moving: &Polygon, other: &Polygon, move_vec: Vector) -> Option<Collision>;
    fn sweep_polygon_circle(moving: &Polygon, other: &Circle, move_vec: Vector) -> Option<Collision>;
}

/// Broad-phase index over spatial bounds.
///
/// Results are candidate sets: a superset of the true overlappers.
pub trait BroadphaseApi {
    /// Add `id` to every bucket overlapped by `bounds`.
    fn register(&mut self, id: SpatialId, bounds: &Aabb);

    /// Remove `id` from every bucket overlapped by `bounds`.
    fn unregister(&mut self, id: SpatialId, bounds: &Aabb);

    /// Move `id` from its `old` placement to `new`, touching only the buckets
    /// that differ.
    fn update_moved(&mut self, id: SpatialId, old: &Aabb, new: &Aabb);

    /// Everything bucketed in a cell overlapped by `bounds`.
    fn get_within_bounds(&self, bounds: &Aabb) -> HashSet<SpatialId>;
}

/// Something the frame loop advances.
pub trait Updatable {
    /// Overriding this lets an updatable sleep while nothing needs doing.
    fn should_update(&self) -> bool {
        true
    }

    /// Advance by `dt` seconds (`dt >= 0`). Called once per frame.
    fn update(&mut self, dt: f64);

    /// Entry point for the frame loop.
    fn do_update(&mut self, dt: f64) {
        if self.should_update() {
            self.update(dt);
        }
    }
}
