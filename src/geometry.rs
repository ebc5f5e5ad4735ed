//! Leaf geometry routines: polygon containment, local-space raycasts against
//! plane boundaries and volume boxes, and closest-point-on-bounds queries.
//!
//! Everything here works in an anchor's local space; callers are responsible
//! for transforming in and out of world space.

use crate::types::Aabb;
use glam::{Vec2, Vec3};

pub const INV_SQRT_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

// ---------------------------------------------------------------------------
// Polygon containment
// ---------------------------------------------------------------------------

/// Even-odd crossing test against a simple polygon.
///
/// The boundary closes implicitly from the last vertex back to the first.
/// Horizontal edges are skipped; the half-open `(min, max]` Y interval keeps
/// vertex crossings from being counted twice.
pub fn point_in_polygon(boundary: &[Vec2], point: Vec2) -> bool {
    let mut crossings = 0u32;
    for i in 0..boundary.len() {
        let p1 = boundary[i];
        let p2 = boundary[(i + 1) % boundary.len()];
        if point.y > p1.y.min(p2.y) && point.y <= p1.y.max(p2.y) && point.x <= p1.x.max(p2.x) {
            if p1.y != p2.y {
                let frac = (point.y - p1.y) / (p2.y - p1.y);
                let x_intersection = p1.x + frac * (p2.x - p1.x);
                if p1.x == p2.x || point.x <= x_intersection {
                    crossings += 1;
                }
            }
        }
    }
    crossings % 2 == 1
}

// ---------------------------------------------------------------------------
// Local-space raycasts
// ---------------------------------------------------------------------------

/// Intersect a local-space ray with the Z=0 plane bounded by `boundary`.
///
/// Only front hits count: the ray must travel against local +Z. Returns the
/// entry distance.
pub fn raycast_plane_local(
    origin: Vec3,
    direction: Vec3,
    boundary: &[Vec2],
    max_distance: f32,
) -> Option<f32> {
    if direction.z >= 0.0 {
        return None;
    }
    let entry = -origin.z / direction.z;
    if entry <= 0.0 || entry >= max_distance {
        return None;
    }
    let hit = origin + direction * entry;
    if point_in_polygon(boundary, Vec2::new(hit.x, hit.y)) {
        Some(entry)
    } else {
        None
    }
}

/// Intersect a local-space ray with an axis-aligned box, slab by slab.
///
/// Returns the entry distance and the local normal of the entered face.
pub fn raycast_volume_local(
    origin: Vec3,
    direction: Vec3,
    bounds: &Aabb,
    max_distance: f32,
) -> Option<(f32, Vec3)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut hit_axis = 0usize;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let min = bounds.min[axis];
        let max = bounds.max[axis];
        if d.abs() < f32::EPSILON {
            // Parallel to this slab: must already be between the faces.
            if o < min || o > max {
                return None;
            }
            continue;
        }
        let mut t1 = (min - o) / d;
        let mut t2 = (max - o) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_near {
            t_near = t1;
            hit_axis = axis;
        }
        t_far = t_far.min(t2);
        if t_near > t_far {
            return None;
        }
    }

    if t_near < 0.0 || t_near >= max_distance {
        return None;
    }

    let mut normal = Vec3::ZERO;
    normal[hit_axis] = -direction[hit_axis].signum();
    Some((t_near, normal))
}

// ---------------------------------------------------------------------------
// Closest point on bounds
// ---------------------------------------------------------------------------

/// Closest point on the surface of `bounds` to a local-space point, with a
/// signed distance: negative when the point is inside the box.
pub fn closest_point_on_box(point: Vec3, bounds: &Aabb) -> (Vec3, f32) {
    if bounds.contains_point(point) {
        // Inside: push out through the face with the least penetration.
        let to_min = point - bounds.min;
        let to_max = bounds.max - point;
        let pen = to_min.min(to_max);
        let mut surface = point;
        let (axis, depth) = if pen.x < pen.y {
            if pen.x < pen.z {
                (0, pen.x)
            } else {
                (2, pen.z)
            }
        } else if pen.y < pen.z {
            (1, pen.y)
        } else {
            (2, pen.z)
        };
        surface[axis] = if to_min[axis] < to_max[axis] {
            bounds.min[axis]
        } else {
            bounds.max[axis]
        };
        (surface, -depth)
    } else {
        let clamped = point.clamp(bounds.min, bounds.max);
        (clamped, point.distance(clamped))
    }
}

// ---------------------------------------------------------------------------
// Angles
// ---------------------------------------------------------------------------

/// Unsigned angle between two vectors in degrees; zero when either is zero.
#[inline]
pub fn angle_degrees(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Remove the component of `tangent` along the unit vector `normal` and
/// normalize what remains.
#[inline]
pub fn ortho_normalize(normal: Vec3, tangent: Vec3) -> Vec3 {
    (tangent - normal * tangent.dot(normal)).normalize_or_zero()
}
