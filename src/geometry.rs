//! Scalar geometry helpers shared by the narrowphase.

use crate::types::Point;

/// Intersection of segments `p1-p2` and `p3-p4`.
///
/// Parallel (and collinear) segments never intersect here, even when they
/// overlap. Only points lying on both finite segments are reported.
pub fn intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let (x1, y1) = (p1.x(), p1.y());
    let (x2, y2) = (p2.x(), p2.y());
    let (x3, y3) = (p3.x(), p3.y());
    let (x4, y4) = (p4.x(), p4.y());

    let det = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if det == 0.0 {
        return None;
    }

    // Parameters along each segment; both must land in [0,1].
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / det;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / det;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(p1 + p1.vec_to(p2) * t)
}

/// Real roots of `a*x^2 + b*x + c = 0`, unordered.
///
/// Empty for a negative discriminant, one root when it is exactly zero.
pub fn quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    if disc == 0.0 {
        return vec![single_sol_quadratic(a, b)];
    }
    let rt_disc = disc.sqrt();
    vec![(-b + rt_disc) / (2.0 * a), (-b - rt_disc) / (2.0 * a)]
}

/// The root of a quadratic whose discriminant is taken to be zero.
pub fn single_sol_quadratic(a: f64, b: f64) -> f64 {
    -b / (2.0 * a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_quadratic_two_roots() {
        let mut roots = quadratic(1.0, -3.0, 2.0);
        roots.sort_by(f64::total_cmp);
        assert_eq!(roots, vec![1.0, 2.0]);
    }

    #[test]
    fn test_quadratic_one_and_none() {
        assert_eq!(quadratic(1.0, -2.0, 1.0), vec![1.0]);
        assert!(quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_quadratic_respects_leading_coefficient() {
        // 2x^2 - 8 = 0 -> ±2
        let mut roots = quadratic(2.0, 0.0, -8.0);
        roots.sort_by(f64::total_cmp);
        assert_relative_eq!(roots[0], -2.0);
        assert_relative_eq!(roots[1], 2.0);
        assert_relative_eq!(single_sol_quadratic(4.0, -8.0), 1.0);
    }

    #[test]
    fn test_intersect_crossing() {
        let p = intersect(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(p.x(), 1.0);
        assert_relative_eq!(p.y(), 1.0);
    }

    #[test]
    fn test_intersect_parallel_is_none() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 0.0);
        assert!(intersect(a, b, Point::new(0.0, 1.0), Point::new(2.0, 1.0)).is_none());
        // Collinear overlap still counts as parallel.
        assert!(intersect(a, b, Point::new(1.0, 0.0), Point::new(3.0, 0.0)).is_none());
    }

    #[test]
    fn test_intersect_outside_segment_is_none() {
        // Infinite lines cross at (3,0) but the first segment stops at x=2.
        assert!(intersect(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, -1.0),
            Point::new(3.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_intersect_horizontal_path_hits_vertical_edge() {
        let p = intersect(
            Point::new(0.0, 0.5),
            Point::new(4.0, 0.5),
            Point::new(3.0, 0.0),
            Point::new(3.0, 1.0),
        )
        .unwrap();
        assert_eq!(p, Point::new(3.0, 0.5));
    }

    proptest! {
        #[test]
        fn prop_root_count_follows_discriminant(
            a in 0.1f64..10.0,
            b in -10.0f64..10.0,
            c in -10.0f64..10.0,
        ) {
            let disc = b * b - 4.0 * a * c;
            let roots = quadratic(a, b, c);
            if disc < 0.0 {
                prop_assert!(roots.is_empty());
            } else if disc == 0.0 {
                prop_assert_eq!(roots.len(), 1);
            } else {
                prop_assert_eq!(roots.len(), 2);
                for r in roots {
                    let residual = a * r * r + b * r + c;
                    prop_assert!(residual.abs() < 1e-6 * (1.0 + b.abs() * r.abs() + c.abs()));
                }
            }
        }
    }
}
