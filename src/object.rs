//! Moving bodies and per-tick motion resolution.
//!
//! A tick is split in two so the grid can be borrowed immutably while
//! contacts are searched: [`SpatialObject::sweep`] is pure and produces a
//! [`MotionPlan`]; [`SpatialObject::commit`] applies it, telling the
//! broad phase about the new bounds before the position changes.

use std::collections::HashMap;

use log::trace;

use crate::api::BroadphaseApi;
use crate::error::Result;
use crate::positional::Positions;
use crate::shape::{Aabb, Shape};
use crate::spatial::{CollisionBox, EnvironmentalCollisionBox, Spatial, SpatialId};
use crate::types::*;

/// Construction parameters for a [`SpatialObject`].
#[derive(Clone, Debug)]
pub struct ObjectDesc {
    pub position: Point,
    /// Environmental collision shape; placed at `position` on creation.
    pub shape: Shape,
    pub category: SpatialCategory,
    /// Velocity in world units per second.
    pub motion: Vector,
    pub tags: Vec<SpatialTag>,
}

impl ObjectDesc {
    pub fn new(position: Point, shape: Shape, category: SpatialCategory) -> Self {
        Self { position, shape, category, motion: Vector::ZERO, tags: Vec::new() }
    }

    pub fn with_motion(mut self, motion: Vector) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_tag(mut self, tag: SpatialTag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// Outcome of sweeping an object through one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionPlan {
    /// Full displacement requested this tick.
    pub move_vec: Vector,
    /// Displacement after clamping to the earliest contact.
    pub applied: Vector,
    /// Union of the current and fully-moved bounds.
    pub search: Aabb,
    pub candidates: usize,
    /// Environment contacts, earliest first.
    pub contacts: Vec<Collision>,
}

/// A spatial with velocity and an environmental collision box.
///
/// The box hangs off the object's position node as a child at zero offset,
/// so it follows every move.
#[derive(Clone, Debug)]
pub struct SpatialObject {
    pub spatial: Spatial,
    pub motion: Vector,
    last_position: Point,
    last_motion: Vector,
    pub ecb: EnvironmentalCollisionBox,
}

impl SpatialObject {
    pub fn new(positions: &mut Positions, desc: ObjectDesc) -> Result<Self> {
        let root = positions.insert_root(desc.position);
        let ecb_key = positions.insert_child(root, Vector::ZERO)?;
        let mut cb = CollisionBox::new(ecb_key, desc.shape, desc.category);
        cb.spatial.tracking = false;
        cb.sync(positions)?;

        let mut spatial = Spatial::new(root, desc.category, cb.bounds());
        spatial.tags.extend(desc.tags);
        Ok(Self {
            spatial,
            motion: desc.motion,
            last_position: desc.position,
            last_motion: Vector::ZERO,
            ecb: EnvironmentalCollisionBox::new(cb),
        })
    }

    pub fn id(&self) -> SpatialId {
        self.spatial.id
    }

    pub fn bounds(&self) -> Aabb {
        self.spatial.bounds()
    }

    pub fn shape(&self) -> &Shape {
        self.ecb.collision_box.shape()
    }

    pub fn position(&self, positions: &Positions) -> Result<Point> {
        self.spatial.position(positions)
    }

    /// Position before the last committed move.
    pub fn last_position(&self) -> Point {
        self.last_position
    }

    /// Velocity used for the last committed move.
    pub fn last_motion(&self) -> Vector {
        self.last_motion
    }

    /// Finds the earliest environment contact of moving by `motion * dt`.
    ///
    /// Only candidates present in `environment` and active are tested.
    pub fn sweep<B: BroadphaseApi>(
        &self,
        dt: f64,
        broadphase: &B,
        environment: &HashMap<SpatialId, CollisionBox>,
    ) -> MotionPlan {
        let move_vec = self.motion * dt;
        let bounds = self.bounds();
        let search = Aabb::bounds_of(&[bounds, bounds.translated(move_vec)]);
        if move_vec.is_zero() {
            return MotionPlan { move_vec, applied: move_vec, search, candidates: 0, contacts: Vec::new() };
        }

        let mut ids: Vec<SpatialId> = broadphase.get_within_bounds(&search).into_iter().collect();
        ids.sort_unstable();
        let candidates = ids.len();

        let mut contacts = Vec::new();
        for id in ids {
            if id == self.id() {
                continue;
            }
            let Some(obstacle) = environment.get(&id) else {
                continue;
            };
            if !obstacle.active || !obstacle.bounds().overlaps(&search) {
                continue;
            }
            if let Some(hit) = self.shape().sweep(obstacle.shape(), move_vec) {
                trace!("{} hits {} at t={:.4} n={}", self.id(), id, hit.time, hit.normal);
                contacts.push(hit);
            }
        }
        contacts.sort_by(|a, b| a.time.total_cmp(&b.time));
        trace!("{}: {} candidates, {} contacts", self.id(), candidates, contacts.len());

        let applied = contacts.first().map_or(move_vec, |c| move_vec * c.time);
        MotionPlan { move_vec, applied, search, candidates, contacts }
    }

    /// Applies `plan`: grid first, then the position, then the history.
    pub fn commit<B: BroadphaseApi>(&mut self, plan: &MotionPlan, positions: &mut Positions, broadphase: &mut B) -> Result<()> {
        let here = self.position(positions)?;
        self.relocate(positions, broadphase, plan.applied)?;
        self.last_position = here;
        self.last_motion = self.motion;
        self.ecb.record(&plan.contacts);
        Ok(())
    }

    /// Teleports the object to `p` without sweeping.
    pub fn set_position<B: BroadphaseApi>(&mut self, positions: &mut Positions, broadphase: &mut B, p: Point) -> Result<()> {
        let here = self.position(positions)?;
        self.relocate(positions, broadphase, here.vec_to(p))
    }

    fn relocate<B: BroadphaseApi>(&mut self, positions: &mut Positions, broadphase: &mut B, v: Vector) -> Result<()> {
        let old = self.bounds();
        let new = old.translated(v);
        if self.spatial.tracking {
            broadphase.update_moved(self.id(), &old, &new);
        }
        positions.move_by(self.spatial.position, v)?;
        self.ecb.collision_box.sync(positions)?;
        self.spatial.set_bounds(self.ecb.collision_box.bounds());
        Ok(())
    }
}
