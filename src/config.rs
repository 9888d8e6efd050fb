//! World configuration

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};
use crate::shape::Aabb;
use crate::types::Point;

/// Construction parameters for a [`World`](crate::world::World).
///
/// Supplied by the owning application; the core never loads it from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Lower-left corner of the gridded area.
    pub bounds_min: [f64; 2],
    /// Upper-right corner of the gridded area.
    pub bounds_max: [f64; 2],
    /// Edge length of one square grid cell, in world units.
    pub cell_size: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds_min: [0.0, 0.0],
            bounds_max: [100.0, 100.0],
            cell_size: 10.0,
        }
    }
}

impl WorldConfig {
    /// Set the gridded area
    pub fn with_bounds(mut self, min: [f64; 2], max: [f64; 2]) -> Self {
        self.bounds_min = min;
        self.bounds_max = max;
        self
    }

    /// Set the cell size
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(PhysicsError::InvalidCellSize(self.cell_size));
        }
        let [x0, y0] = self.bounds_min;
        let [x1, y1] = self.bounds_max;
        let finite = [x0, y0, x1, y1].iter().all(|v| v.is_finite());
        if !finite || x1 <= x0 || y1 <= y0 {
            return Err(PhysicsError::InvalidBounds { min: self.bounds_min, max: self.bounds_max });
        }
        Ok(())
    }

    /// The gridded area as a box.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_corners(
            Point::new(self.bounds_min[0], self.bounds_min[1]),
            Point::new(self.bounds_max[0], self.bounds_max[1]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_world() {
        let cfg = WorldConfig::default();
        assert!(cfg.validate().is_ok());
        let bb = cfg.bounding_box();
        assert_eq!(bb.min_x(), 0.0);
        assert_eq!(bb.max_y(), 100.0);
        assert_eq!(bb.width(), 100.0);
        assert_eq!(bb.height(), 100.0);
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        for cs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = WorldConfig::default().with_cell_size(cs);
            assert!(matches!(cfg.validate(), Err(PhysicsError::InvalidCellSize(_))));
        }
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let cfg = WorldConfig::default().with_bounds([10.0, 0.0], [0.0, 10.0]);
        assert!(matches!(cfg.validate(), Err(PhysicsError::InvalidBounds { .. })));
    }
}
