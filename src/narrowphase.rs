use crate::api::NarrowphaseApi;
use crate::geometry::{intersect, quadratic};
use crate::shape::{Circle, Edge, Polygon};
use crate::types::*;

/// Swept time-of-impact tests for every shape pairing.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn sweep_circle_circle(moving: &Circle, other: &Circle, move_vec: Vector) -> Option<Collision> {
        if move_vec.is_zero() {
            return None;
        }
        // Frame with the other circle at the origin: solve |p + t*v| = r0 + r1
        let p = other.position.vec_to(moving.position);
        let rsum = moving.radius + other.radius;
        let a = move_vec.length_squared();
        let b = 2.0 * p.dot(move_vec);
        let c = p.length_squared() - rsum * rsum;

        // Already touching and pushing in: blocked from the start.
        if c <= 0.0 {
            if p.dot(move_vec) >= 0.0 {
                return None;
            }
            let normal = p.normalize();
            return Some(Collision::new(0.0, plane_of(normal), normal));
        }

        let t = quadratic(a, b, c)
            .into_iter()
            .filter(|&t| t > 0.0 && t <= 1.0)
            // Entry root only; the exit root is moving apart.
            .filter(|&t| (p + move_vec * t).dot(move_vec) < 0.0)
            .min_by(f64::total_cmp)?;

        let center_at_hit = moving.position + move_vec * t;
        let normal = other.position.vec_to(center_at_hit).normalize();
        Some(Collision::new(t, plane_of(normal), normal))
    }

    fn sweep_circle_polygon(moving: &Circle, other: &Polygon, move_vec: Vector) -> Option<Collision> {
        if move_vec.is_zero() {
            return None;
        }
        let r = moving.radius;
        let mut best: Option<Collision> = None;

        // Faces: the center reaches distance r from the edge line while the
        // foot of the perpendicular lies strictly inside the edge.
        for edge in other.edges() {
            let approach = move_vec.dot(edge.normal);
            if approach >= 0.0 {
                continue;
            }
            let s0 = edge.p1.vec_to(moving.position).dot(edge.normal);
            // Resting on the face (s0 == r up to rounding) contacts at t = 0.
            let t = if (0.0..=r).contains(&s0) { 0.0 } else { (r - s0) / approach };
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            let center_at_hit = moving.position + move_vec * t;
            let d = edge.vector();
            let l = edge.p1.vec_to(center_at_hit).dot(d) / d.length_squared();
            if l > 0.0 && l < 1.0 {
                keep_earliest(&mut best, Collision::new(t, edge.plane, edge.normal));
            }
        }

        // Corners: |p + t*v| = r around each vertex.
        let a = move_vec.length_squared();
        for vertex in other.vertices() {
            let p = vertex.vec_to(moving.position);
            let b = 2.0 * p.dot(move_vec);
            let c = p.length_squared() - r * r;
            if c <= 0.0 {
                if p.dot(move_vec) < 0.0 {
                    let normal = p.normalize();
                    keep_earliest(&mut best, Collision::new(0.0, plane_of(normal), normal));
                }
                continue;
            }
            let hit = quadratic(a, b, c)
                .into_iter()
                .filter(|&t| t > 0.0 && t <= 1.0)
                .filter(|&t| (p + move_vec * t).dot(move_vec) < 0.0)
                .min_by(f64::total_cmp);
            if let Some(t) = hit {
                let normal = vertex.vec_to(moving.position + move_vec * t).normalize();
                keep_earliest(&mut best, Collision::new(t, plane_of(normal), normal));
            }
        }

        best
    }

    fn sweep_polygon_polygon(moving: &Polygon, other: &Polygon, move_vec: Vector) -> Option<Collision> {
        if move_vec.is_zero() {
            return None;
        }
        let forward = vertices_against_edges(&moving.vertices(), &other.edges(), move_vec);
        // Seen from `moving`, the other polygon's corners sweep the opposite way.
        let reverse = vertices_against_edges(&other.vertices(), &moving.edges(), -move_vec).map(Collision::flipped);

        match (forward, reverse) {
            (Some(f), Some(r)) if r.time < f.time => Some(r),
            (Some(f), _) => Some(f),
            (None, r) => r,
        }
    }

    fn sweep_polygon_circle(moving: &Polygon, other: &Circle, move_vec: Vector) -> Option<Collision> {
        let hit = Self::sweep_circle_polygon(other, moving, -move_vec)?;
        Some(hit.flipped())
    }
}

/// Tangent whose counter-clockwise normal is `normal`.
fn plane_of(normal: Vector) -> Vector {
    Vector::new(normal.y(), -normal.x())
}

fn keep_earliest(best: &mut Option<Collision>, candidate: Collision) {
    if best.is_none_or(|b| candidate.time < b.time) {
        *best = Some(candidate);
    }
}

/// Earliest vertex/edge contact for `vertices` sweeping by `move_vec`.
///
/// A pair counts only if the motion approaches the edge's outer face, the
/// approach distance is shorter than the distance covered this tick, and the
/// vertex crosses the edge within its finite span.
fn vertices_against_edges(vertices: &[Point], edges: &[Edge], move_vec: Vector) -> Option<Collision> {
    let mut collision_dist = f64::INFINITY;
    let mut collision_vel = 0.0;
    let mut colliding_edge: Option<&Edge> = None;

    for &vert in vertices {
        for edge in edges {
            if move_vec.dot(edge.normal) >= 0.0 {
                continue;
            }
            let (dist, vel) = match edge.alignment {
                Some(axis) => {
                    // Starting behind the face means already through it.
                    if edge.p1.vec_to(vert).dot(edge.normal) < 0.0 {
                        continue;
                    }
                    let (dist, vel, along, lo, hi) = match axis {
                        Axis::X => (
                            (edge.p1.x() - vert.x()).abs(),
                            move_vec.x().abs(),
                            (vert.y(), move_vec.y()),
                            edge.p1.y().min(edge.p2.y()),
                            edge.p1.y().max(edge.p2.y()),
                        ),
                        Axis::Y => (
                            (edge.p1.y() - vert.y()).abs(),
                            move_vec.y().abs(),
                            (vert.x(), move_vec.x()),
                            edge.p1.x().min(edge.p2.x()),
                            edge.p1.x().max(edge.p2.x()),
                        ),
                    };
                    if vel > 0.0 {
                        let shift = along.1 * (dist / vel);
                        let cross = along.0 + shift;
                        if cross < lo || cross > hi {
                            continue;
                        }
                        // Corner meeting corner (e.g. the seam between two
                        // level tiles) only blocks if the outlines overlap
                        // along the edge.
                        if (cross == lo || cross == hi) && !overlaps_along(vertices, axis, shift, lo, hi) {
                            continue;
                        }
                    }
                    (dist, vel)
                }
                None => {
                    let Some(hit) = intersect(vert, vert + move_vec, edge.p1, edge.p2) else {
                        continue;
                    };
                    (vert.dist(hit), move_vec.length())
                }
            };

            if dist < vel && dist < collision_dist {
                collision_dist = dist;
                collision_vel = vel;
                colliding_edge = Some(edge);
            }
        }
    }

    let edge = colliding_edge?;
    let time = if collision_vel == 0.0 { 0.0 } else { collision_dist / collision_vel };
    Some(Collision::new(time, edge.plane, edge.normal))
}

/// Whether `vertices`, shifted by `shift` along the edge, cover a stretch
/// of `[lo, hi]` longer than a point.
fn overlaps_along(vertices: &[Point], axis: Axis, shift: f64, lo: f64, hi: f64) -> bool {
    let coord = |p: &Point| match axis {
        Axis::X => p.y(),
        Axis::Y => p.x(),
    };
    let min = vertices.iter().map(coord).fold(f64::INFINITY, f64::min) + shift;
    let max = vertices.iter().map(coord).fold(f64::NEG_INFINITY, f64::max) + shift;
    max.min(hi) - min.max(lo) > 0.0
}
