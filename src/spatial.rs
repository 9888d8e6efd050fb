use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::positional::{PositionKey, Positions};
use crate::shape::{Aabb, Shape};
use crate::types::*;

/// Stable identity of a physical entity, generated once at creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpatialId(Uuid);

impl SpatialId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SpatialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpatialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity, placement and grouping shared by every physical entity.
#[derive(Clone, Debug)]
pub struct Spatial {
    pub id: SpatialId,
    pub position: PositionKey,
    pub category: SpatialCategory,
    pub tags: HashSet<SpatialTag>,
    /// Whether the entity participates in the broad-phase index.
    pub tracking: bool,
    bounds: Aabb,
}

impl Spatial {
    pub fn new(position: PositionKey, category: SpatialCategory, bounds: Aabb) -> Self {
        Self { id: SpatialId::new(), position, category, tags: HashSet::new(), tracking: true, bounds }
    }

    pub fn with_tag(mut self, tag: SpatialTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn has_tag(&self, tag: SpatialTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Bounds as of the last sync.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Aabb) {
        self.bounds = bounds;
    }

    pub fn position(&self, positions: &Positions) -> Result<Point> {
        positions.position(self.position)
    }
}

/// A spatial wrapping one shape. The shape sits wherever the spatial's
/// position node is.
#[derive(Clone, Debug)]
pub struct CollisionBox {
    pub spatial: Spatial,
    shape: Shape,
    /// Inactive boxes are ignored by narrow phase.
    pub active: bool,
}

impl CollisionBox {
    pub fn new(position: PositionKey, shape: Shape, category: SpatialCategory) -> Self {
        let bounds = shape.bounds();
        Self { spatial: Spatial::new(position, category, bounds), shape, active: true }
    }

    pub fn id(&self) -> SpatialId {
        self.spatial.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn bounds(&self) -> Aabb {
        self.spatial.bounds()
    }

    /// Pulls the shape onto the current position of the box's node.
    pub fn sync(&mut self, positions: &Positions) -> Result<()> {
        let p = positions.position(self.spatial.position)?;
        self.shape.set_position(p);
        self.spatial.set_bounds(self.shape.bounds());
        Ok(())
    }

    pub fn set_position(&mut self, positions: &mut Positions, p: Point) -> Result<()> {
        positions.set_position(self.spatial.position, p)?;
        self.sync(positions)
    }

    pub fn move_by(&mut self, positions: &mut Positions, v: Vector) -> Result<()> {
        positions.move_by(self.spatial.position, v)?;
        self.sync(positions)
    }

    /// The shape as it would sit at `p`.
    pub fn shape_at(&self, p: Point) -> Shape {
        let mut shape = self.shape.clone();
        shape.set_position(p);
        shape
    }
}

/// Collision box that remembers the contacts of the last tick, earliest
/// first, one slot per tracked contact.
#[derive(Clone, Debug)]
pub struct EnvironmentalCollisionBox {
    pub collision_box: CollisionBox,
    history: [Option<Collision>; MAX_COLLISIONS],
}

impl EnvironmentalCollisionBox {
    pub fn new(collision_box: CollisionBox) -> Self {
        Self { collision_box, history: [None; MAX_COLLISIONS] }
    }

    /// Replaces the history with the first `MAX_COLLISIONS` of `contacts`.
    pub fn record(&mut self, contacts: &[Collision]) {
        self.clear();
        for (slot, c) in self.history.iter_mut().zip(contacts) {
            *slot = Some(*c);
        }
    }

    pub fn clear(&mut self) {
        self.history = [None; MAX_COLLISIONS];
    }

    pub fn collisions(&self) -> impl Iterator<Item = &Collision> {
        self.history.iter().flatten()
    }

    pub fn earliest(&self) -> Option<Collision> {
        self.history[0]
    }

    /// Whether any recorded contact pushes back along `normal`.
    pub fn touching(&self, normal: Vector) -> bool {
        self.collisions().any(|c| c.normal.dot(normal) > 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = SpatialId::new();
        let b = SpatialId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.as_uuid().to_string());
    }

    #[test]
    fn test_tags_and_tracking_defaults() {
        let mut positions = Positions::new();
        let key = positions.insert_root(Point::ORIGIN);
        let s = Spatial::new(key, SpatialCategory::Living, Aabb::new(Point::ORIGIN, 1.0, 1.0))
            .with_tag(SpatialTag::Enemy);
        assert!(s.tracking);
        assert!(s.has_tag(SpatialTag::Enemy));
        assert_eq!(s.category, SpatialCategory::Living);
        assert_eq!(s.position(&positions).unwrap(), Point::ORIGIN);
    }

    #[test]
    fn test_collision_box_moves_shape_identically() {
        let mut positions = Positions::new();
        let key = positions.insert_root(Point::new(1.0, 1.0));
        let mut cb = CollisionBox::new(key, Shape::aabb(Point::new(1.0, 1.0), 2.0, 2.0), SpatialCategory::StaticEnv);
        assert!(cb.active);

        cb.move_by(&mut positions, Vector::new(3.0, 0.0)).unwrap();
        assert_eq!(cb.shape().position(), Point::new(4.0, 1.0));
        assert_eq!(cb.bounds().min_x(), 3.0);
        assert_eq!(cb.bounds().max_x(), 5.0);

        cb.set_position(&mut positions, Point::new(0.0, -2.0)).unwrap();
        assert_eq!(cb.shape().position(), Point::new(0.0, -2.0));
        assert_eq!(positions.position(key).unwrap(), Point::new(0.0, -2.0));
        assert_eq!(cb.bounds().max_y(), -1.0);

        let ghost = cb.shape_at(Point::new(10.0, 10.0));
        assert_eq!(ghost.position(), Point::new(10.0, 10.0));
        assert_eq!(cb.shape().position(), Point::new(0.0, -2.0));
    }

    #[test]
    fn test_child_box_follows_parent() {
        let mut positions = Positions::new();
        let root = positions.insert_root(Point::ORIGIN);
        let key = positions.insert_child(root, Vector::new(0.0, 1.0)).unwrap();
        let mut cb = CollisionBox::new(key, Shape::circle(Point::ORIGIN, 0.5), SpatialCategory::Living);
        cb.sync(&positions).unwrap();
        assert_eq!(cb.shape().position(), Point::new(0.0, 1.0));

        positions.move_by(root, Vector::new(2.0, 0.0)).unwrap();
        cb.sync(&positions).unwrap();
        assert_eq!(cb.shape().position(), Point::new(2.0, 1.0));
    }

    #[test]
    fn test_history_keeps_earliest_contacts() {
        let mut positions = Positions::new();
        let key = positions.insert_root(Point::ORIGIN);
        let cb = CollisionBox::new(key, Shape::aabb(Point::ORIGIN, 1.0, 1.0), SpatialCategory::Living);
        let mut ecb = EnvironmentalCollisionBox::new(cb);
        assert_eq!(ecb.collisions().count(), 0);

        let floor = Collision::new(0.0, Vector::UNIT_X, Vector::UNIT_Y);
        let wall = Collision::new(0.5, Vector::UNIT_Y, -Vector::UNIT_X);
        let contacts = vec![floor, wall, wall, wall, wall, wall];
        ecb.record(&contacts);
        assert_eq!(ecb.collisions().count(), MAX_COLLISIONS);
        assert_eq!(ecb.earliest(), Some(floor));
        assert!(ecb.touching(Vector::UNIT_Y));
        assert!(ecb.touching(-Vector::UNIT_X));
        assert!(!ecb.touching(Vector::UNIT_X));

        ecb.record(&[wall]);
        assert_eq!(ecb.collisions().count(), 1);
        ecb.clear();
        assert_eq!(ecb.earliest(), None);
    }
}
