use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::DVec2;

/// Number of contact slots kept by an environmental collision box per tick.
pub const MAX_COLLISIONS: usize = 4;

/// Immutable 2D location in world space (y-up).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point(pub DVec2);

/// Immutable 2D displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector(pub DVec2);

impl Point {
    pub const ORIGIN: Point = Point(DVec2::ZERO);

    pub const fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    /// Displacement from `self` to `to`.
    #[inline]
    pub fn vec_to(self, to: Point) -> Vector {
        Vector(to.0 - self.0)
    }

    pub fn dist(self, to: Point) -> f64 {
        self.0.distance(to.0)
    }

    pub fn dist_squared(self, to: Point) -> f64 {
        self.0.distance_squared(to.0)
    }

    /// True if `to` lies strictly closer than `dist`.
    pub fn in_range(self, to: Point, dist: f64) -> bool {
        self.dist_squared(to) < dist * dist
    }

    pub fn midpoint_to(self, to: Point) -> Point {
        Point((self.0 + to.0) * 0.5)
    }
}

impl Vector {
    pub const ZERO: Vector = Vector(DVec2::ZERO);
    pub const UNIT_X: Vector = Vector(DVec2::X);
    pub const UNIT_Y: Vector = Vector(DVec2::Y);

    pub const fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    /// Exact zero test; a tiny non-zero motion is still motion.
    pub fn is_zero(self) -> bool {
        self.0.x == 0.0 && self.0.y == 0.0
    }

    pub fn length(self) -> f64 {
        self.0.length()
    }

    pub fn length_squared(self) -> f64 {
        self.0.length_squared()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalize(self) -> Vector {
        Vector(self.0.normalize_or_zero())
    }

    /// Unit vector rotated 90° counter-clockwise.
    pub fn normal(self) -> Vector {
        Vector(self.0.perp()).normalize()
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.0.dot(other.0)
    }

    /// Rise over run; `None` for vertical vectors.
    pub fn gradient(self) -> Option<f64> {
        if self.0.x == 0.0 { None } else { Some(self.0.y / self.0.x) }
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl From<DVec2> for Vector {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, rhs: Vector) -> Point {
        Point(self.0 + rhs.0)
    }
}

impl Sub<Vector> for Point {
    type Output = Point;
    fn sub(self, rhs: Vector) -> Point {
        Point(self.0 - rhs.0)
    }
}

impl Sub for Point {
    type Output = Vector;
    fn sub(self, rhs: Point) -> Vector {
        Vector(self.0 - rhs.0)
    }
}

impl AddAssign<Vector> for Point {
    fn add_assign(&mut self, rhs: Vector) {
        self.0 += rhs.0;
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector(self.0 + rhs.0)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector(self.0 - rhs.0)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.0 -= rhs.0;
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector(-self.0)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        Vector(self.0 * rhs)
    }
}

impl Mul<Vector> for f64 {
    type Output = Vector;
    fn mul(self, rhs: Vector) -> Vector {
        Vector(rhs.0 * self)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;
    fn div(self, rhs: f64) -> Vector {
        Vector(self.0 / rhs)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}

/// Coordinate an axis-aligned edge is pinned to.
///
/// `Axis::X` is a vertical edge (constant x), `Axis::Y` a horizontal one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Swept time-of-impact result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collision {
    /// Fraction of the displacement travelled before first contact.
    pub time: f64,
    /// Unit tangent of the surface hit.
    pub plane: Vector,
    /// Unit normal of the surface hit, pointing out of the obstacle.
    pub normal: Vector,
}

impl Collision {
    pub fn new(time: f64, plane: Vector, normal: Vector) -> Self {
        Self { time, plane, normal }
    }

    /// Same contact seen from the other body.
    pub fn flipped(self) -> Self {
        Self { time: self.time, plane: -self.plane, normal: -self.normal }
    }
}

/// Mutually exclusive broad category; each spatial belongs to exactly one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpatialCategory {
    StaticEnv,
    DynamicEnv,
    Projectile,
    Living,
    Particle,
}

impl SpatialCategory {
    pub const ALL: [SpatialCategory; 5] = [
        SpatialCategory::StaticEnv,
        SpatialCategory::DynamicEnv,
        SpatialCategory::Projectile,
        SpatialCategory::Living,
        SpatialCategory::Particle,
    ];

    /// Categories that block movers.
    pub fn is_environment(self) -> bool {
        matches!(self, SpatialCategory::StaticEnv | SpatialCategory::DynamicEnv)
    }
}

/// Finer-grained tag; a spatial may carry any number of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpatialTag {
    Enemy,
}
