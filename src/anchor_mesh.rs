//! Delaunay mesh over anchor positions.
//!
//! Wall anchors, projected onto the horizontal XZ plane, are triangulated
//! with the Bowyer-Watson algorithm. The mesh answers "which anchors
//! surround this point, and with what weights", which is the basis for
//! blending per-anchor tracking corrections smoothly as the user moves
//! through the room.

use crate::types::Aabb;
use glam::{Vec2, Vec3};

// ---------------------------------------------------------------------------
// Mesh data
// ---------------------------------------------------------------------------

/// A mesh vertex: an anchor index plus its XZ position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshNode {
    pub anchor: usize,
    pub position: Vec2,
}

/// Three node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTriangle(pub [usize; 3]);

/// A translation offset plus a yaw, the unit of world-lock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseCorrection {
    pub offset: Vec3,
    pub yaw_degrees: f32,
}

#[derive(Debug, Clone, Default)]
pub struct AnchorMesh {
    nodes: Vec<MeshNode>,
    triangles: Vec<MeshTriangle>,
}

impl AnchorMesh {
    /// Triangulate the given `(anchor index, world position)` pairs.
    pub fn new(anchors: impl IntoIterator<Item = (usize, Vec3)>) -> Self {
        let mut nodes = Vec::new();
        let mut bounds = Aabb::ZERO;
        for (anchor, position) in anchors {
            nodes.push(MeshNode {
                anchor,
                position: Vec2::new(position.x, position.z),
            });
            bounds.encapsulate(position);
        }

        if nodes.is_empty() {
            return Self::default();
        }

        // Super-triangle large enough to contain every point.
        let max_size = bounds.size().length();
        let bc = bounds.center();
        let center = Vec2::new(bc.x, bc.z);
        let num_points = nodes.len();

        let mut positions: Vec<Vec2> = nodes.iter().map(|n| n.position).collect();
        positions.push(Vec2::new(center.x - 20.0 * max_size, center.y - max_size));
        positions.push(Vec2::new(center.x, center.y + 20.0 * max_size));
        positions.push(Vec2::new(center.x + 20.0 * max_size, center.y - max_size));

        let mut triangles: Vec<[usize; 3]> = vec![[num_points, num_points + 1, num_points + 2]];

        // Incremental insertion: carve out the cavity of triangles whose
        // circumcircle contains the new point, then re-fan its boundary.
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for i in 0..num_points {
            edges.clear();
            let mut j = triangles.len();
            while j > 0 {
                j -= 1;
                let [a, b, c] = triangles[j];
                if in_circumcircle(positions[a], positions[b], positions[c], positions[i]) {
                    toggle_edge(&mut edges, (a, b));
                    toggle_edge(&mut edges, (b, c));
                    toggle_edge(&mut edges, (c, a));
                    triangles.remove(j);
                }
            }
            for &(a, b) in &edges {
                triangles.push([a, b, i]);
            }
        }

        // Drop everything still attached to the super-triangle.
        triangles.retain(|t| t.iter().all(|&p| p < num_points));

        Self {
            nodes,
            triangles: triangles.into_iter().map(MeshTriangle).collect(),
        }
    }

    pub fn nodes(&self) -> &[MeshNode] {
        &self.nodes
    }

    pub fn triangles(&self) -> &[MeshTriangle] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The triangle whose surface is closest to `point`, with the clamped
    /// barycentric coordinates of the closest surface point.
    pub fn find_closest_triangle(&self, point: Vec2) -> Option<(MeshTriangle, Vec3)> {
        let mut min_distance_squared = f32::INFINITY;
        let mut closest = None;

        for triangle in &self.triangles {
            let p1 = self.nodes[triangle.0[0]].position;
            let p2 = self.nodes[triangle.0[1]].position;
            let p3 = self.nodes[triangle.0[2]].position;

            let barycentric = barycentric_coordinates(p1, p2, p3, point);
            let projected = barycentric.x * p1 + barycentric.y * p2 + barycentric.z * p3;
            let distance_squared = projected.distance_squared(point);

            if distance_squared < min_distance_squared {
                min_distance_squared = distance_squared;
                closest = Some((*triangle, barycentric));
            }
        }

        closest
    }

    /// Blend per-anchor corrections across the triangle containing `point`.
    ///
    /// Offsets combine linearly; yaw angles are summed as weighted 2D unit
    /// vectors and recovered with `atan2`, which keeps the blend stable
    /// across the 0/360 wrap. Anchors without a correction are skipped.
    pub fn blend_corrections(
        &self,
        point: Vec2,
        correction: impl Fn(usize) -> Option<PoseCorrection>,
    ) -> Option<PoseCorrection> {
        let (triangle, barycentric) = self.find_closest_triangle(point)?;

        let mut offset = Vec3::ZERO;
        let mut yaw_vector = Vec2::ZERO;
        for (k, &node) in triangle.0.iter().enumerate() {
            let weight = barycentric[k];
            let Some(c) = correction(self.nodes[node].anchor) else {
                continue;
            };
            offset += c.offset * weight;
            let radians = c.yaw_degrees.to_radians();
            yaw_vector += Vec2::new(radians.cos(), radians.sin()) * weight;
        }

        Some(PoseCorrection {
            offset,
            yaw_degrees: yaw_vector.y.atan2(yaw_vector.x).to_degrees(),
        })
    }
}

// ---------------------------------------------------------------------------
// Delaunay predicates
// ---------------------------------------------------------------------------

#[inline]
fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Clockwise orientation of the determinant indicates the point lies inside
/// the circumcircle.
fn in_circumcircle(p1: Vec2, p2: Vec2, p3: Vec2, p: Vec2) -> bool {
    let a = p1 - p;
    let b = p2 - p;
    let c = p3 - p;
    let det = a.length_squared() * cross(b, c)
        + b.length_squared() * cross(c, a)
        + c.length_squared() * cross(a, b);
    det < 0.0
}

/// XOR-toggle: a cavity-interior edge appears twice and cancels out, leaving
/// only the cavity boundary.
fn toggle_edge(edges: &mut Vec<(usize, usize)>, new_edge: (usize, usize)) {
    for i in 0..edges.len() {
        let edge = edges[i];
        if edge == new_edge || (edge.0 == new_edge.1 && edge.1 == new_edge.0) {
            edges.remove(i);
            return;
        }
    }
    edges.push(new_edge);
}

/// Barycentric coordinates of `p`, clamped onto the nearest edge when `p`
/// falls outside the triangle.
fn barycentric_coordinates(p1: Vec2, p2: Vec2, p3: Vec2, p: Vec2) -> Vec3 {
    let total_area = 0.5 * cross(p2 - p1, p3 - p1);
    let area1 = 0.5 * cross(p2 - p, p3 - p);
    let area2 = 0.5 * cross(p - p1, p3 - p1);
    let area3 = total_area - area1 - area2;

    let mut barycentric = Vec3::new(area1 / total_area, area2 / total_area, area3 / total_area);

    if barycentric.x < 0.0 {
        let edge = p3 - p2;
        let t = ((p - p2).dot(edge) / edge.length_squared()).clamp(0.0, 1.0);
        barycentric = Vec3::new(0.0, 1.0 - t, t);
    } else if barycentric.y < 0.0 {
        let edge = p1 - p3;
        let t = ((p - p3).dot(edge) / edge.length_squared()).clamp(0.0, 1.0);
        barycentric = Vec3::new(t, 0.0, 1.0 - t);
    } else if barycentric.z < 0.0 {
        let edge = p2 - p1;
        let t = ((p - p1).dot(edge) / edge.length_squared()).clamp(0.0, 1.0);
        barycentric = Vec3::new(1.0 - t, t, 0.0);
    }

    barycentric
}
