//! Core scene types shared across all modules.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// A world-space rigid transform with non-uniform scale.
///
/// Conventions follow the scanned-scene data: Y is up, `forward` is the
/// rotated +Z axis, and Euler angles are YXZ-ordered degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self::new(position, rotation, Vec3::ONE)
    }

    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local point to world space (scale, then rotate, then translate).
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (point * self.scale) + self.position
    }

    /// World point to local space.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        (self.rotation.inverse() * (point - self.position)) / self.scale
    }

    /// Local direction to world space. Scale does not apply to directions.
    pub fn transform_direction(&self, dir: Vec3) -> Vec3 {
        self.rotation * dir
    }

    /// World direction to local space. Scale does not apply to directions.
    pub fn inverse_transform_direction(&self, dir: Vec3) -> Vec3 {
        self.rotation.inverse() * dir
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// YXZ Euler angles in degrees, each normalized to `[0, 360)`.
    pub fn euler_degrees(&self) -> Vec3 {
        let (y, x, z) = self.rotation.to_euler(EulerRot::YXZ);
        Vec3::new(
            x.to_degrees().rem_euclid(360.0),
            y.to_degrees().rem_euclid(360.0),
            z.to_degrees().rem_euclid(360.0),
        )
    }

    pub fn from_euler_degrees(position: Vec3, degrees: Vec3, scale: Vec3) -> Self {
        Self::new(position, quat_from_euler_degrees(degrees), scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// YXZ-ordered Euler degrees to a quaternion.
pub fn quat_from_euler_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// A position plus facing, the result type for placement queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Rotation whose +Z axis points along `forward`, with `up` as the
/// approximate +Y axis. `forward` must not be parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let fwd = forward.normalize();
    let right = up.cross(fwd).normalize();
    let new_up = fwd.cross(right);
    Quat::from_mat3(&glam::Mat3::from_cols(right, new_up, fwd))
}

// ---------------------------------------------------------------------------
// Rays
// ---------------------------------------------------------------------------

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// A surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// An axis-aligned 2D rectangle in a plane's local X/Y space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// An axis-aligned 3D box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow (or shrink, when negative) by `amount` on every face.
    pub fn expanded(&self, amount: f32) -> Self {
        let half = Vec3::splat(amount);
        Self::new(self.min - half, self.max + half)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Grow to include `point`.
    pub fn encapsulate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

// ---------------------------------------------------------------------------
// Mesh payload
// ---------------------------------------------------------------------------

/// An indexed triangle mesh, the payload of a global-mesh anchor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Semantic labels
// ---------------------------------------------------------------------------

/// The closed set of semantic classifications an anchor can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneLabel {
    Floor,
    Ceiling,
    WallFace,
    Table,
    Couch,
    DoorFrame,
    WindowFrame,
    Other,
    Storage,
    Bed,
    Screen,
    Lamp,
    Plant,
    WallArt,
    GlobalMesh,
    InvisibleWallFace,
}

impl SceneLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneLabel::Floor => "FLOOR",
            SceneLabel::Ceiling => "CEILING",
            SceneLabel::WallFace => "WALL_FACE",
            SceneLabel::Table => "TABLE",
            SceneLabel::Couch => "COUCH",
            SceneLabel::DoorFrame => "DOOR_FRAME",
            SceneLabel::WindowFrame => "WINDOW_FRAME",
            SceneLabel::Other => "OTHER",
            SceneLabel::Storage => "STORAGE",
            SceneLabel::Bed => "BED",
            SceneLabel::Screen => "SCREEN",
            SceneLabel::Lamp => "LAMP",
            SceneLabel::Plant => "PLANT",
            SceneLabel::WallArt => "WALL_ART",
            SceneLabel::GlobalMesh => "GLOBAL_MESH",
            SceneLabel::InvisibleWallFace => "INVISIBLE_WALL_FACE",
        }
    }
}

impl fmt::Display for SceneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneLabel {
    type Err = crate::error::SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "FLOOR" => SceneLabel::Floor,
            "CEILING" => SceneLabel::Ceiling,
            "WALL_FACE" => SceneLabel::WallFace,
            "TABLE" => SceneLabel::Table,
            "COUCH" => SceneLabel::Couch,
            "DOOR_FRAME" => SceneLabel::DoorFrame,
            "WINDOW_FRAME" => SceneLabel::WindowFrame,
            "OTHER" => SceneLabel::Other,
            "STORAGE" => SceneLabel::Storage,
            "BED" => SceneLabel::Bed,
            "SCREEN" => SceneLabel::Screen,
            "LAMP" => SceneLabel::Lamp,
            "PLANT" => SceneLabel::Plant,
            "WALL_ART" => SceneLabel::WallArt,
            "GLOBAL_MESH" => SceneLabel::GlobalMesh,
            "INVISIBLE_WALL_FACE" => SceneLabel::InvisibleWallFace,
            other => return Err(crate::error::SceneError::UnknownLabel(other.to_string())),
        })
    }
}

// ---------------------------------------------------------------------------
// Label filter
// ---------------------------------------------------------------------------

/// Includes/excludes anchors by semantic label.
///
/// Exclusion wins over inclusion; an empty filter passes everything.
#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    included: Option<Vec<SceneLabel>>,
    excluded: Option<Vec<SceneLabel>>,
}

impl LabelFilter {
    /// Passes every anchor.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn include(labels: impl Into<Vec<SceneLabel>>) -> Self {
        Self {
            included: Some(labels.into()),
            excluded: None,
        }
    }

    pub fn exclude(labels: impl Into<Vec<SceneLabel>>) -> Self {
        Self {
            included: None,
            excluded: Some(labels.into()),
        }
    }

    pub fn passes(&self, labels: &[SceneLabel]) -> bool {
        if let Some(excluded) = &self.excluded {
            if labels.iter().any(|l| excluded.contains(l)) {
                return false;
            }
        }
        if let Some(included) = &self.included {
            return labels.iter().any(|l| included.contains(l));
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Surface orientation mask
// ---------------------------------------------------------------------------

/// Bitmask selecting surfaces by world orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceMask(u8);

impl SurfaceMask {
    pub const FACING_UP: Self = Self(1);
    pub const FACING_DOWN: Self = Self(1 << 1);
    pub const VERTICAL: Self = Self(1 << 2);
    pub const ANY: Self = Self(0b111);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for SurfaceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How [`Room::best_pose_from_raycast`](crate::Room::best_pose_from_raycast)
/// positions the result relative to the hit surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositioningMethod {
    /// At the hit point.
    #[default]
    Default,
    /// At the center of the hit surface.
    Center,
    /// On the nearest edge of the hit surface.
    Edge,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Width in meters of a single couch seat slot.
    pub seat_width: f32,
    /// Iteration cap for rejection-sampling position generators.
    pub max_sample_iterations: u32,
    /// Distance tolerance for the parent/child hierarchy heuristics.
    pub coplanar_tolerance: f32,
    /// Max angle in degrees between a wall and a plane mounted on it.
    pub wall_angle_tolerance: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            seat_width: 0.6,
            max_sample_iterations: 1000,
            coplanar_tolerance: 0.1,
            wall_angle_tolerance: 5.0,
        }
    }
}
