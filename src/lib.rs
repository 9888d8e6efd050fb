//! ledge: spatial physics core for 2D platformers (swept shapes, grid broad phase, anchored positions)

pub mod types;
pub mod config;
pub mod error;
pub mod geometry;
pub mod shape;
pub mod api;
pub mod narrowphase;
pub mod positional;
pub mod spatial;
pub mod grid;
pub mod object;
pub mod world;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::config::WorldConfig;
pub use crate::error::{PhysicsError, Result};
pub use crate::grid::{Bucket, GridStats, SpatialGrid};
pub use crate::narrowphase::Narrowphase;
pub use crate::object::{MotionPlan, ObjectDesc, SpatialObject};
pub use crate::positional::{PositionKey, Positions};
pub use crate::shape::{Aabb, Aat, Circle, ConvexPolygon, Edge, Polygon, Shape};
pub use crate::spatial::{CollisionBox, EnvironmentalCollisionBox, Spatial, SpatialId};
pub use crate::world::World;
