//! Scene anchors: the labeled geometric primitives a room is made of.

use crate::error::{Result, SceneError};
use crate::geometry;
use crate::types::{Aabb, Ray, RaycastHit, Rect2, SceneLabel, Transform, TriMesh};
use glam::{Vec2, Vec3};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// A 2D surface in anchor-local space: an axis-aligned rect plus the polygon
/// actually occupied within it. The plane lives at local Z=0 with +Z as its
/// normal.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneShape {
    pub rect: Rect2,
    pub boundary: Vec<Vec2>,
}

impl PlaneShape {
    /// Boundary defaults to the rect corners when the capture provided none.
    pub fn new(rect: Rect2, boundary: Option<Vec<Vec2>>) -> Self {
        let boundary = boundary.unwrap_or_else(|| {
            vec![
                rect.min,
                Vec2::new(rect.max.x, rect.min.y),
                rect.max,
                Vec2::new(rect.min.x, rect.max.y),
            ]
        });
        Self { rect, boundary }
    }
}

/// What geometry an anchor carries. Never empty: every anchor is a plane, a
/// volume, both, or the one global triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorShape {
    Plane(PlaneShape),
    Volume(Aabb),
    PlaneAndVolume(PlaneShape, Aabb),
    GlobalMesh(TriMesh),
}

impl AnchorShape {
    pub fn plane(&self) -> Option<&PlaneShape> {
        match self {
            AnchorShape::Plane(p) | AnchorShape::PlaneAndVolume(p, _) => Some(p),
            _ => None,
        }
    }

    pub fn volume(&self) -> Option<&Aabb> {
        match self {
            AnchorShape::Volume(v) | AnchorShape::PlaneAndVolume(_, v) => Some(v),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&TriMesh> {
        match self {
            AnchorShape::GlobalMesh(m) => Some(m),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Anchor
// ---------------------------------------------------------------------------

/// One scanned scene element: semantic labels, a world transform, and shape.
///
/// Volumes use the capture convention: the anchor pivot sits at the center
/// of the volume's top face with local +Z pointing up, so the bounds span
/// negative local Z.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub uuid: Uuid,
    pub labels: Vec<SceneLabel>,
    pub transform: Transform,
    pub shape: AnchorShape,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

impl Anchor {
    pub fn new(labels: Vec<SceneLabel>, transform: Transform, shape: AnchorShape) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            labels,
            transform,
            shape,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Assemble a shape from optional parts, rejecting geometry-less anchors.
    pub fn build_shape(
        labels: &[SceneLabel],
        plane_rect: Option<Rect2>,
        plane_boundary: Option<Vec<Vec2>>,
        volume: Option<Aabb>,
        mesh: Option<TriMesh>,
    ) -> Result<AnchorShape> {
        match (plane_rect, volume, mesh) {
            (Some(rect), Some(vol), _) => Ok(AnchorShape::PlaneAndVolume(
                PlaneShape::new(rect, plane_boundary),
                vol,
            )),
            (Some(rect), None, _) => Ok(AnchorShape::Plane(PlaneShape::new(rect, plane_boundary))),
            (None, Some(vol), _) => Ok(AnchorShape::Volume(vol)),
            (None, None, Some(mesh)) => Ok(AnchorShape::GlobalMesh(mesh)),
            (None, None, None) => {
                let name = labels
                    .first()
                    .map(|l| l.as_str().to_string())
                    .unwrap_or_else(|| "unlabeled".to_string());
                Err(SceneError::EmptyAnchor(name))
            }
        }
    }

    pub fn has_label(&self, label: SceneLabel) -> bool {
        self.labels.contains(&label)
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    // -----------------------------------------------------------------------
    // Size and centers
    // -----------------------------------------------------------------------

    /// World-space center: the volume center when present, otherwise the
    /// anchor position.
    pub fn center(&self) -> Vec3 {
        if let Some(volume) = self.shape.volume() {
            return self.transform.transform_point(volume.center());
        }
        self.transform.position
    }

    /// Transform-friendly size. The volume size takes priority over the
    /// plane's, which reports depth 1.
    pub fn size(&self) -> Vec3 {
        if let Some(volume) = self.shape.volume() {
            return volume.size();
        }
        if let Some(plane) = self.shape.plane() {
            let s = plane.rect.size();
            return Vec3::new(s.x, s.y, 1.0);
        }
        Vec3::ONE
    }

    /// Face centers in world space: six for a volume, one for a plane.
    pub fn bounds_face_centers(&self) -> Vec<Vec3> {
        if let Some(volume) = self.shape.volume() {
            let scale = volume.size();
            let forward = self.transform.forward();
            let right = self.transform.right();
            let up = self.transform.up();
            // The pivot sits on the volume's top face.
            let cube_center = self.transform.position - forward * scale.z * 0.5;
            return vec![
                self.transform.position,
                cube_center - forward * scale.z * 0.5,
                cube_center + right * scale.x * 0.5,
                cube_center - right * scale.x * 0.5,
                cube_center + up * scale.y * 0.5,
                cube_center - up * scale.y * 0.5,
            ];
        }
        if self.shape.plane().is_some() {
            return vec![self.transform.position];
        }
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Containment
    // -----------------------------------------------------------------------

    /// Test a world position against the plane boundary polygon.
    pub fn is_position_in_boundary(&self, position: Vec3) -> bool {
        let Some(plane) = self.shape.plane() else {
            return false;
        };
        let local = self.transform.inverse_transform_point(position);
        geometry::point_in_polygon(&plane.boundary, Vec2::new(local.x, local.y))
    }

    /// Test a world position against the volume, grown by `buffer` on every
    /// face. With `test_vertical_bounds` off the height axis (local Z) is
    /// ignored.
    pub fn is_position_in_volume(
        &self,
        position: Vec3,
        test_vertical_bounds: bool,
        buffer: f32,
    ) -> bool {
        let Some(volume) = self.shape.volume() else {
            return false;
        };
        let local = self.transform.inverse_transform_point(position);
        let bounds = volume.expanded(buffer);
        if test_vertical_bounds {
            bounds.contains_point(local)
        } else {
            local.x >= bounds.min.x
                && local.x <= bounds.max.x
                && local.y >= bounds.min.y
                && local.y <= bounds.max.y
        }
    }

    // -----------------------------------------------------------------------
    // Raycast
    // -----------------------------------------------------------------------

    /// Cast a world-space ray against this anchor, returning the closer of
    /// the plane and volume intersections.
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        let local_origin = self.transform.inverse_transform_point(ray.origin);
        let local_direction = self.transform.inverse_transform_direction(ray.direction);

        let mut best: Option<RaycastHit> = None;

        if let Some(plane) = self.shape.plane() {
            if let Some(distance) = geometry::raycast_plane_local(
                local_origin,
                local_direction,
                &plane.boundary,
                max_distance,
            ) {
                best = Some(RaycastHit {
                    point: ray.point_at(distance),
                    normal: self.transform.forward(),
                    distance,
                });
            }
        }

        if let Some(volume) = self.shape.volume() {
            if let Some((distance, local_normal)) =
                geometry::raycast_volume_local(local_origin, local_direction, volume, max_distance)
            {
                if best.map_or(true, |hit| distance < hit.distance) {
                    best = Some(RaycastHit {
                        point: ray.point_at(distance),
                        normal: self.transform.transform_direction(local_normal),
                        distance,
                    });
                }
            }
        }

        best
    }

    // -----------------------------------------------------------------------
    // Closest surface
    // -----------------------------------------------------------------------

    /// The closest point on this anchor's surface, its signed distance
    /// (negative when the query point is inside the volume) and the outward
    /// surface normal at that point.
    pub fn closest_surface_position(&self, position: Vec3) -> (Vec3, f32, Vec3) {
        if let Some(volume) = self.shape.volume() {
            let local = self.transform.inverse_transform_point(position);
            let (surface, distance) = geometry::closest_point_on_box(local, volume);
            let world = self.transform.transform_point(surface);
            if distance < 0.0 {
                // Pushed out through one face; the offset runs along its
                // outward normal.
                let normal = self
                    .transform
                    .transform_direction((surface - local).normalize_or_zero());
                return (world, distance, normal);
            }
            let normal = self
                .transform
                .transform_direction((local - surface).normalize_or_zero());
            return (world, position.distance(world), normal);
        }

        if let Some(plane) = self.shape.plane() {
            let local = self.transform.inverse_transform_point(position);
            let clamped = Vec2::new(local.x, local.y).clamp(plane.rect.min, plane.rect.max);
            let world = self.transform.transform_point(clamped.extend(0.0));
            return (world, position.distance(world), self.transform.forward());
        }

        (
            self.transform.position,
            position.distance(self.transform.position),
            Vec3::ZERO,
        )
    }
}
