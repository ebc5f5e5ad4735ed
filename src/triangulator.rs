//! Ear-clipping triangulation of simple 2D polygons.

use glam::Vec2;
use log::error;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Triangulate a simple polygon, returning a flat index list (three indices
/// per triangle, referring back to `points`).
///
/// A convex N-gon yields exactly N-2 triangles. Self-intersecting or
/// otherwise degenerate input stops early: the failure is logged and the
/// triangles clipped so far are returned.
pub fn triangulate_points(points: &[Vec2]) -> Vec<u32> {
    if points.len() < 3 {
        return Vec::new();
    }

    let mut index_list: Vec<u32> = (0..points.len() as u32).collect();
    // The convexity test below assumes counter-clockwise winding.
    if signed_area(points) < 0.0 {
        index_list.reverse();
    }

    let mut triangles = Vec::with_capacity((points.len() - 2) * 3);

    while index_list.len() > 3 {
        let mut ear_found = false;
        for i in 0..index_list.len() {
            let a = index_list[i];
            let b = index_list[(i + index_list.len() - 1) % index_list.len()];
            let c = index_list[(i + 1) % index_list.len()];

            let va = points[a as usize];
            let vb = points[b as usize];
            let vc = points[c as usize];

            // Reflex vertices cannot be ears.
            if cross(vb - va, vc - va) > 0.0 {
                continue;
            }

            // Only vertices still in play can block an ear; clipped ones
            // are already covered by earlier triangles.
            let mut is_ear = true;
            for &j in index_list.iter() {
                if j == a || j == b || j == c {
                    continue;
                }
                if point_in_triangle(points[j as usize], vb, va, vc) {
                    is_ear = false;
                    break;
                }
            }

            if is_ear {
                triangles.extend_from_slice(&[b, a, c]);
                index_list.remove(i);
                ear_found = true;
                break;
            }
        }
        if !ear_found {
            error!(
                "triangulation failed with {} vertices remaining, polygon is degenerate",
                index_list.len()
            );
            return triangles;
        }
    }

    triangles.extend_from_slice(&index_list);
    triangles
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[inline]
fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed polygon area; positive for counter-clockwise winding.
fn signed_area(points: &[Vec2]) -> f32 {
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += cross(a, b);
    }
    sum
}

/// Boundary-inclusive containment in a clockwise triangle.
fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    cross(b - a, p - a) >= 0.0 && cross(c - b, p - b) >= 0.0 && cross(a - c, p - c) >= 0.0
}
