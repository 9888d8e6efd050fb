use crate::api::NarrowphaseApi;
use crate::error::{PhysicsError, Result};
use crate::narrowphase::Narrowphase;
use crate::types::{Axis, Collision, Point, Vector};

/// Directed polygon edge with cached direction data.
///
/// Walking edges in order traces the polygon clockwise (y-up), so the
/// normal, a 90° counter-clockwise turn of the plane, points outwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub p1: Point,
    pub p2: Point,
    /// Unit direction `p1 -> p2`.
    pub plane: Vector,
    /// Unit outward normal.
    pub normal: Vector,
    /// Set when the edge runs parallel to an axis.
    pub alignment: Option<Axis>,
    /// Rise over run for edges that are not axis-aligned.
    pub gradient: Option<f64>,
}

impl Edge {
    pub fn new(p1: Point, p2: Point) -> Self {
        let d = p1.vec_to(p2);
        let alignment = if p1.x() == p2.x() {
            Some(Axis::X)
        } else if p1.y() == p2.y() {
            Some(Axis::Y)
        } else {
            None
        };
        let plane = d.normalize();
        let normal = Vector::new(-plane.y(), plane.x());
        let gradient = if alignment.is_none() { d.gradient() } else { None };
        Self { p1, p2, plane, normal, alignment, gradient }
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.alignment.is_some()
    }

    /// Unnormalised `p2 - p1`.
    pub fn vector(&self) -> Vector {
        self.p1.vec_to(self.p2)
    }
}

/// Centered circle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Circle {
    pub position: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(position: Point, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Inclusive of the rim.
    pub fn contains(&self, point: Point) -> bool {
        point.dist_squared(self.position) <= self.radius * self.radius
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.radius * 2.0, self.radius * 2.0)
    }
}

/// Axis-aligned box around a center position.
///
/// Invariant: `max = center + half extent` and `min = center - half extent`
/// on both axes, refreshed by every mutator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    position: Point,
    width: f64,
    height: f64,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Aabb {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative box extents");
        let mut aabb = Self { position, width, height, min_x: 0.0, max_x: 0.0, min_y: 0.0, max_y: 0.0 };
        aabb.set_min_max();
        aabb
    }

    /// Box spanning two opposite corners, in any order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(p1.midpoint_to(p2), (p1.x() - p2.x()).abs(), (p1.y() - p2.y()).abs())
    }

    /// Smallest box containing every point.
    ///
    /// # Panics
    /// Panics if `points` is empty.
    pub fn bounds_of_points(points: &[Point]) -> Self {
        assert!(!points.is_empty(), "bounds_of_points requires at least one point");
        let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
        let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
        for p in points {
            min_x = min_x.min(p.x());
            min_y = min_y.min(p.y());
            max_x = max_x.max(p.x());
            max_y = max_y.max(p.y());
        }
        Self::from_corners(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Smallest box containing every box.
    ///
    /// # Panics
    /// Panics if `bounds` is empty.
    pub fn bounds_of(bounds: &[Aabb]) -> Self {
        assert!(!bounds.is_empty(), "bounds_of requires at least one box");
        let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
        let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
        for b in bounds {
            min_x = min_x.min(b.min_x);
            min_y = min_y.min(b.min_y);
            max_x = max_x.max(b.max_x);
            max_y = max_y.max(b.max_y);
        }
        Self::from_corners(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    fn set_min_max(&mut self) {
        self.max_x = self.position.x() + self.width * 0.5;
        self.min_x = self.position.x() - self.width * 0.5;
        self.max_y = self.position.y() + self.height * 0.5;
        self.min_y = self.position.y() - self.height * 0.5;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.set_min_max();
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.set_min_max();
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.set_min_max();
    }

    /// Copy moved by `translation`.
    pub fn translated(&self, translation: Vector) -> Self {
        Self::new(self.position + translation, self.width, self.height)
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.max_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
        ]
    }

    /// Clockwise from the bottom-right corner.
    pub fn vertices(&self) -> Vec<Point> {
        vec![
            Point::new(self.max_x, self.min_y),
            Point::new(self.min_x, self.min_y),
            Point::new(self.min_x, self.max_y),
            Point::new(self.max_x, self.max_y),
        ]
    }

    /// Strict interior test; points on the boundary are outside.
    pub fn contains(&self, point: Point) -> bool {
        self.min_x < point.x() && point.x() < self.max_x && self.min_y < point.y() && point.y() < self.max_y
    }

    /// Inclusive overlap; touching faces count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }
}

/// Axis-aligned right triangle.
///
/// The right angle sits on `position`; one leg runs `width` along x and the
/// other `height` along y. Negative extents flip the leg across the anchor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aat {
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

impl Aat {
    pub fn new(anchor: Point, width: f64, height: f64) -> Self {
        Self { position: anchor, width, height }
    }

    pub fn vertices(&self) -> Vec<Point> {
        let a = self.position;
        let b = a + Vector::new(self.width, 0.0);
        let c = a + Vector::new(0.0, self.height);
        // Cross product of the legs is width * height; positive means a-b-c
        // runs counter-clockwise.
        let verts = if self.width * self.height > 0.0 { vec![a, c, b] } else { vec![a, b, c] };
        start_at_bottom(verts)
    }
}

/// Convex polygon stored as offsets around a position.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPolygon {
    pub position: Point,
    local: Vec<Vector>,
}

impl ConvexPolygon {
    /// Builds a polygon from vertex offsets in either winding.
    ///
    /// Offsets are re-wound clockwise and rotated to start at the lowest vertex.
    pub fn new(position: Point, offsets: Vec<Vector>) -> Result<Self> {
        let n = offsets.len();
        if n < 3 {
            return Err(PhysicsError::TooFewVertices(n));
        }

        // Shoelace; positive area means counter-clockwise.
        let twice_area: f64 = (0..n)
            .map(|i| {
                let a = offsets[i];
                let b = offsets[(i + 1) % n];
                a.x() * b.y() - b.x() * a.y()
            })
            .sum();
        if twice_area == 0.0 || !twice_area.is_finite() {
            return Err(PhysicsError::DegeneratePolygon);
        }

        let mut local = offsets;
        if twice_area > 0.0 {
            local.reverse();
        }

        for i in 0..n {
            let a = local[i];
            let b = local[(i + 1) % n];
            let c = local[(i + 2) % n];
            if a == b {
                return Err(PhysicsError::DegeneratePolygon);
            }
            let ab = b - a;
            let bc = c - b;
            // Clockwise outlines only ever turn right.
            if ab.x() * bc.y() - ab.y() * bc.x() > 0.0 {
                return Err(PhysicsError::NonConvexPolygon);
            }
        }

        let start = lowest_index(local.iter().map(|v| Point(v.0)));
        local.rotate_left(start);
        Ok(Self { position, local })
    }

    pub fn offsets(&self) -> &[Vector] {
        &self.local
    }

    pub fn vertices(&self) -> Vec<Point> {
        self.local.iter().map(|&v| self.position + v).collect()
    }
}

fn lowest_index(points: impl Iterator<Item = Point>) -> usize {
    let mut best = 0;
    let mut best_p: Option<Point> = None;
    for (i, p) in points.enumerate() {
        let lower = match best_p {
            None => true,
            Some(b) => p.y() < b.y() || (p.y() == b.y() && p.x() < b.x()),
        };
        if lower {
            best = i;
            best_p = Some(p);
        }
    }
    best
}

fn start_at_bottom(mut verts: Vec<Point>) -> Vec<Point> {
    let start = lowest_index(verts.iter().copied());
    verts.rotate_left(start);
    verts
}

/// Polygon variants; all answer vertex and edge queries the same way.
#[derive(Clone, Debug, PartialEq)]
pub enum Polygon {
    Aabb(Aabb),
    Aat(Aat),
    Convex(ConvexPolygon),
}

impl Polygon {
    /// Vertices in clockwise order, starting at a bottom vertex.
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Polygon::Aabb(b) => b.vertices(),
            Polygon::Aat(t) => t.vertices(),
            Polygon::Convex(p) => p.vertices(),
        }
    }

    /// One edge per consecutive vertex pair, closing last to first.
    pub fn edges(&self) -> Vec<Edge> {
        let verts = self.vertices();
        let n = verts.len();
        (0..n).map(|i| Edge::new(verts[i], verts[(i + 1) % n])).collect()
    }

    pub fn position(&self) -> Point {
        match self {
            Polygon::Aabb(b) => b.position(),
            Polygon::Aat(t) => t.position,
            Polygon::Convex(p) => p.position,
        }
    }

    pub fn set_position(&mut self, position: Point) {
        match self {
            Polygon::Aabb(b) => b.set_position(position),
            Polygon::Aat(t) => t.position = position,
            Polygon::Convex(p) => p.position = position,
        }
    }

    /// Strict interior test.
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Polygon::Aabb(b) => b.contains(point),
            _ => self.edges().iter().all(|e| e.p1.vec_to(point).dot(e.normal) < 0.0),
        }
    }

    pub fn bounds(&self) -> Aabb {
        match self {
            Polygon::Aabb(b) => *b,
            _ => Aabb::bounds_of_points(&self.vertices()),
        }
    }
}

/// Any collision volume.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
}

impl Shape {
    pub fn circle(position: Point, radius: f64) -> Self {
        Shape::Circle(Circle::new(position, radius))
    }

    pub fn aabb(position: Point, width: f64, height: f64) -> Self {
        Shape::Polygon(Polygon::Aabb(Aabb::new(position, width, height)))
    }

    pub fn aat(anchor: Point, width: f64, height: f64) -> Self {
        Shape::Polygon(Polygon::Aat(Aat::new(anchor, width, height)))
    }

    pub fn convex(position: Point, offsets: Vec<Vector>) -> Result<Self> {
        Ok(Shape::Polygon(Polygon::Convex(ConvexPolygon::new(position, offsets)?)))
    }

    pub fn position(&self) -> Point {
        match self {
            Shape::Circle(c) => c.position,
            Shape::Polygon(p) => p.position(),
        }
    }

    pub fn set_position(&mut self, position: Point) {
        match self {
            Shape::Circle(c) => c.position = position,
            Shape::Polygon(p) => p.set_position(position),
        }
    }

    pub fn translate(&mut self, v: Vector) {
        let p = self.position() + v;
        self.set_position(p);
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            Shape::Circle(c) => c.contains(point),
            Shape::Polygon(p) => p.contains(point),
        }
    }

    pub fn contains_all(&self, points: &[Point]) -> bool {
        points.iter().all(|&p| self.contains(p))
    }

    pub fn bounds(&self) -> Aabb {
        match self {
            Shape::Circle(c) => c.bounds(),
            Shape::Polygon(p) => p.bounds(),
        }
    }

    /// Earliest contact when this shape moves by `move_vec` against `other`.
    pub fn sweep(&self, other: &Shape, move_vec: Vector) -> Option<Collision> {
        match other {
            Shape::Circle(c) => self.sweep_circle(c, move_vec),
            Shape::Polygon(p) => self.sweep_polygon(p, move_vec),
        }
    }

    pub fn sweep_polygon(&self, other: &Polygon, move_vec: Vector) -> Option<Collision> {
        match self {
            Shape::Circle(c) => Narrowphase::sweep_circle_polygon(c, other, move_vec),
            Shape::Polygon(p) => Narrowphase::sweep_polygon_polygon(p, other, move_vec),
        }
    }

    pub fn sweep_circle(&self, other: &Circle, move_vec: Vector) -> Option<Collision> {
        match self {
            Shape::Circle(c) => Narrowphase::sweep_circle_circle(c, other, move_vec),
            Shape::Polygon(p) => Narrowphase::sweep_polygon_circle(p, other, move_vec),
        }
    }
}
