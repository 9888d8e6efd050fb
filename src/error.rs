//! Error types for the physics core

use thiserror::Error;

use crate::positional::PositionKey;
use crate::spatial::SpatialId;
use crate::types::SpatialCategory;

/// Recoverable physics errors.
///
/// Broken invariants that indicate a caller defect (anchoring a parented
/// node, for instance) panic instead of surfacing here.
#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    /// Cell size must be finite and strictly positive
    #[error("Invalid grid cell size: {0}")]
    InvalidCellSize(f64),

    /// World bounds are empty, inverted or non-finite
    #[error("Invalid world bounds: min {min:?}, max {max:?}")]
    InvalidBounds { min: [f64; 2], max: [f64; 2] },

    /// Position key does not refer to a live node
    #[error("Position node not found: {0:?}")]
    PositionNotFound(PositionKey),

    /// Attaching would make a node its own ancestor
    #[error("Cannot attach {child:?} beneath its own descendant {parent:?}")]
    CyclicParent { child: PositionKey, parent: PositionKey },

    /// Node already has a parent
    #[error("Position node already parented: {0:?}")]
    AlreadyParented(PositionKey),

    /// No spatial with this id lives in the world
    #[error("Spatial not found: {0}")]
    SpatialNotFound(SpatialId),

    /// Operation does not apply to spatials of this category
    #[error("Spatial category {0:?} not allowed here")]
    WrongCategory(SpatialCategory),

    /// Polygon needs at least three vertices
    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Polygon vertices do not describe a convex outline
    #[error("Polygon is not convex")]
    NonConvexPolygon,

    /// Polygon encloses no area
    #[error("Polygon is degenerate (zero area)")]
    DegeneratePolygon,
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
