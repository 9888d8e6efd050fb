use std::collections::HashSet;

use log::{debug, warn};

use crate::api::BroadphaseApi;
use crate::config::WorldConfig;
use crate::error::{PhysicsError, Result};
use crate::shape::Aabb;
use crate::spatial::SpatialId;

/// One storage slot of the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    Cell { row: usize, col: usize },
    /// Shared bucket for everything beyond the grid area.
    Outside,
}

/// Occupancy snapshot for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    pub rows: usize,
    pub cols: usize,
    pub occupied_cells: usize,
    /// Distinct entities across all cells.
    pub entities: usize,
    pub overflow: usize,
}

/// Uniform grid over a bounded area, plus one overflow bucket.
///
/// Rows run along y and columns along x, both counted from the area's
/// minimum corner. Each cell holds the ids whose bounds touch it.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    area: Aabb,
    cell_size: f64,
    rows: usize,
    cols: usize,
    cells: Vec<HashSet<SpatialId>>,
    overflow: HashSet<SpatialId>,
}

impl SpatialGrid {
    pub fn new(area: Aabb, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(PhysicsError::InvalidCellSize(cell_size));
        }
        if !(area.width() > 0.0 && area.height() > 0.0) || !area.width().is_finite() || !area.height().is_finite() {
            return Err(PhysicsError::InvalidBounds {
                min: [area.min_x(), area.min_y()],
                max: [area.max_x(), area.max_y()],
            });
        }
        let rows = (area.height() / cell_size).ceil() as usize;
        let cols = (area.width() / cell_size).ceil() as usize;
        debug!("spatial grid {}x{} cells of {}", rows, cols, cell_size);
        Ok(Self { area, cell_size, rows, cols, cells: vec![HashSet::new(); rows * cols], overflow: HashSet::new() })
    }

    pub fn from_config(cfg: &WorldConfig) -> Result<Self> {
        cfg.validate()?;
        Self::new(cfg.bounding_box(), cfg.cell_size)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn area(&self) -> Aabb {
        self.area
    }

    /// Members of one bucket; `None` for a cell outside the grid.
    pub fn members(&self, bucket: Bucket) -> Option<&HashSet<SpatialId>> {
        match bucket {
            Bucket::Cell { row, col } if row < self.rows && col < self.cols => Some(&self.cells[row * self.cols + col]),
            Bucket::Cell { .. } => None,
            Bucket::Outside => Some(&self.overflow),
        }
    }

    /// Every bucket touched by `bounds`: the clamped cell range, plus
    /// `Outside` if any part falls beyond the grid area.
    pub fn buckets(&self, bounds: &Aabb) -> Vec<Bucket> {
        let (row_lo, row_hi) = self.index_span(bounds.min_y(), bounds.max_y(), self.area.min_y());
        let (col_lo, col_hi) = self.index_span(bounds.min_x(), bounds.max_x(), self.area.min_x());
        let outside = row_lo < 0 || col_lo < 0 || row_hi >= self.rows as i64 || col_hi >= self.cols as i64;

        let row_lo = row_lo.max(0);
        let col_lo = col_lo.max(0);
        let row_hi = row_hi.min(self.rows as i64 - 1);
        let col_hi = col_hi.min(self.cols as i64 - 1);

        let mut out = Vec::new();
        if row_lo <= row_hi && col_lo <= col_hi {
            for row in row_lo as usize..=row_hi as usize {
                for col in col_lo as usize..=col_hi as usize {
                    out.push(Bucket::Cell { row, col });
                }
            }
        }
        if outside {
            out.push(Bucket::Outside);
        }
        out
    }

    pub fn stats(&self) -> GridStats {
        let occupied_cells = self.cells.iter().filter(|c| !c.is_empty()).count();
        let entities = self.cells.iter().flatten().collect::<HashSet<_>>().len();
        GridStats { rows: self.rows, cols: self.cols, occupied_cells, entities, overflow: self.overflow.len() }
    }

    /// Unclamped first and last index along one axis.
    fn index_span(&self, lo: f64, hi: f64, origin: f64) -> (i64, i64) {
        let first = ((lo - origin) / self.cell_size).floor() as i64;
        let last = ((hi - origin) / self.cell_size).floor() as i64;
        (first, last)
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut HashSet<SpatialId> {
        match bucket {
            Bucket::Cell { row, col } => &mut self.cells[row * self.cols + col],
            Bucket::Outside => &mut self.overflow,
        }
    }
}

impl BroadphaseApi for SpatialGrid {
    fn register(&mut self, id: SpatialId, bounds: &Aabb) {
        let buckets = self.buckets(bounds);
        if buckets == [Bucket::Outside] {
            warn!("spatial {} registered entirely outside the grid area", id);
        }
        for b in buckets {
            self.bucket_mut(b).insert(id);
        }
    }

    fn unregister(&mut self, id: SpatialId, bounds: &Aabb) {
        for b in self.buckets(bounds) {
            self.bucket_mut(b).remove(&id);
        }
    }

    fn update_moved(&mut self, id: SpatialId, old: &Aabb, new: &Aabb) {
        let before: HashSet<Bucket> = self.buckets(old).into_iter().collect();
        let after: HashSet<Bucket> = self.buckets(new).into_iter().collect();
        for &b in before.difference(&after) {
            self.bucket_mut(b).remove(&id);
        }
        for &b in after.difference(&before) {
            self.bucket_mut(b).insert(id);
        }
    }

    fn get_within_bounds(&self, bounds: &Aabb) -> HashSet<SpatialId> {
        let mut out = HashSet::new();
        for b in self.buckets(bounds) {
            if let Some(members) = self.members(b) {
                out.extend(members.iter().copied());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use proptest::prelude::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::from_config(&WorldConfig::default()).unwrap()
    }

    fn bx(min: (f64, f64), max: (f64, f64)) -> Aabb {
        Aabb::from_corners(Point::new(min.0, min.1), Point::new(max.0, max.1))
    }

    fn holders(g: &SpatialGrid, id: SpatialId) -> HashSet<Bucket> {
        let mut out = HashSet::new();
        for row in 0..g.rows() {
            for col in 0..g.cols() {
                let b = Bucket::Cell { row, col };
                if g.members(b).is_some_and(|m| m.contains(&id)) {
                    out.insert(b);
                }
            }
        }
        if g.members(Bucket::Outside).is_some_and(|m| m.contains(&id)) {
            out.insert(Bucket::Outside);
        }
        out
    }

    #[test]
    fn test_dimensions_round_up() {
        let g = SpatialGrid::new(bx((0.0, 0.0), (95.0, 41.0)), 10.0).unwrap();
        assert_eq!(g.rows(), 5);
        assert_eq!(g.cols(), 10);
        assert_eq!(g.cell_size(), 10.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(SpatialGrid::new(bx((0.0, 0.0), (10.0, 10.0)), 0.0).unwrap_err(), PhysicsError::InvalidCellSize(0.0));
        assert!(matches!(
            SpatialGrid::new(bx((0.0, 0.0), (10.0, 0.0)), 1.0),
            Err(PhysicsError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_move_between_rows_leaves_old_cells_empty() {
        let mut g = grid();
        let id = SpatialId::new();
        let old = bx((1.0, 1.0), (19.0, 19.0));
        g.register(id, &old);
        let expected: HashSet<Bucket> = [(0, 0), (0, 1), (1, 0), (1, 1)]
            .into_iter()
            .map(|(row, col)| Bucket::Cell { row, col })
            .collect();
        assert_eq!(holders(&g, id), expected);

        let new = bx((1.0, 21.0), (19.0, 39.0));
        g.update_moved(id, &old, &new);
        for row in 0..2 {
            for col in 0..2 {
                assert!(!g.members(Bucket::Cell { row, col }).unwrap().contains(&id));
            }
        }
        for row in 2..4 {
            for col in 0..2 {
                assert!(g.members(Bucket::Cell { row, col }).unwrap().contains(&id));
            }
        }
        assert_eq!(holders(&g, id).len(), 4);
    }

    #[test]
    fn test_rows_follow_y_and_cols_follow_x() {
        let g = grid();
        assert_eq!(g.buckets(&bx((31.0, 55.0), (32.0, 56.0))), vec![Bucket::Cell { row: 5, col: 3 }]);
    }

    #[test]
    fn test_overflow_bucket() {
        let mut g = grid();
        let straddle = SpatialId::new();
        let far = SpatialId::new();
        g.register(straddle, &bx((-5.0, 2.0), (5.0, 8.0)));
        g.register(far, &bx((500.0, 500.0), (510.0, 510.0)));

        assert_eq!(holders(&g, straddle), [Bucket::Cell { row: 0, col: 0 }, Bucket::Outside].into_iter().collect());
        assert_eq!(holders(&g, far), [Bucket::Outside].into_iter().collect());

        // Any query that pokes outside sees the overflow bucket.
        let seen = g.get_within_bounds(&bx((90.0, 90.0), (120.0, 95.0)));
        assert!(seen.contains(&far));
        assert!(seen.contains(&straddle));
        let inside = g.get_within_bounds(&bx((50.0, 50.0), (60.0, 60.0)));
        assert!(inside.is_empty());

        let stats = g.stats();
        assert_eq!(stats.occupied_cells, 1);
        assert_eq!(stats.entities, 1);
        assert_eq!(stats.overflow, 2);
    }

    #[test]
    fn test_unregister_and_query() {
        let mut g = grid();
        let a = SpatialId::new();
        let b = SpatialId::new();
        let ba = bx((0.0, 0.0), (5.0, 5.0));
        let bb = bx((40.0, 40.0), (45.0, 45.0));
        g.register(a, &ba);
        g.register(b, &bb);
        assert_eq!(g.get_within_bounds(&bx((1.0, 1.0), (2.0, 2.0))), [a].into_iter().collect());
        assert_eq!(g.get_within_bounds(&bx((0.0, 0.0), (49.0, 49.0))).len(), 2);
        g.unregister(a, &ba);
        assert!(holders(&g, a).is_empty());
        assert_eq!(g.stats().entities, 1);
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (-30.0f64..130.0, -30.0f64..130.0, 0.0f64..40.0, 0.0f64..40.0)
            .prop_map(|(x, y, w, h)| Aabb::from_corners(Point::new(x, y), Point::new(x + w, y + h)))
    }

    proptest! {
        #[test]
        fn prop_query_has_no_false_negatives(
            boxes in prop::collection::vec(arb_box(), 1..20),
            query in arb_box(),
        ) {
            let mut g = grid();
            let ids: Vec<SpatialId> = boxes.iter().map(|_| SpatialId::new()).collect();
            for (id, b) in ids.iter().zip(&boxes) {
                g.register(*id, b);
            }
            let found = g.get_within_bounds(&query);
            for (id, b) in ids.iter().zip(&boxes) {
                if b.overlaps(&query) {
                    prop_assert!(found.contains(id));
                }
            }
        }

        #[test]
        fn prop_update_moved_matches_reregister(old in arb_box(), new in arb_box()) {
            let id = SpatialId::new();
            let mut moved = grid();
            let mut fresh = grid();
            moved.register(id, &old);
            fresh.register(id, &old);

            moved.update_moved(id, &old, &new);
            fresh.unregister(id, &old);
            fresh.register(id, &new);
            prop_assert_eq!(holders(&moved, id), holders(&fresh, id));
        }
    }
}
