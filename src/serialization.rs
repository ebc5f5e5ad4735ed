//! JSON persistence for scanned rooms.
//!
//! The document is an indented object with compact single-line vector
//! payloads, in either the native (Unity-style, Y-up meters) coordinate
//! convention or the Unreal one (Z-up centimeters, mirrored X). Absent
//! optional geometry is omitted; anchors without persisted identity get a
//! fresh UUID on write.

use std::str::FromStr;

use glam::{Vec2, Vec3};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::error::{Result, SceneError};
use crate::room::Room;
use crate::types::{Aabb, Rect2, SceneLabel, SceneSettings, Transform, TriMesh};

const UNREAL_WORLD_TO_METERS: f32 = 100.0;

// ---------------------------------------------------------------------------
// Conventions
// ---------------------------------------------------------------------------

/// Which engine convention the document's numbers are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateConvention {
    Unity,
    Unreal,
}

// ---------------------------------------------------------------------------
// Compact vector payloads
// ---------------------------------------------------------------------------

// The document is pretty-printed, but vectors serialize through RawValue so
// each one stays on a single line.

fn compact<S: Serializer, T: Serialize>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let text = serde_json::to_string(value).map_err(S::Error::custom)?;
    let raw = RawValue::from_string(text).map_err(S::Error::custom)?;
    raw.serialize(serializer)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WireVec2(Vec2);

impl Serialize for WireVec2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        compact(&[self.0.x, self.0.y], serializer)
    }
}

impl<'de> Deserialize<'de> for WireVec2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        <[f32; 2]>::deserialize(deserializer).map(|a| Self(Vec2::from_array(a)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WireVec3(Vec3);

impl Serialize for WireVec3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        compact(&[self.0.x, self.0.y, self.0.z], serializer)
    }
}

impl<'de> Deserialize<'de> for WireVec3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        <[f32; 3]>::deserialize(deserializer).map(|a| Self(Vec3::from_array(a)))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct WirePositions(Vec<Vec3>);

impl Serialize for WirePositions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let rows: Vec<[f32; 3]> = self.0.iter().map(|v| v.to_array()).collect();
        compact(&rows, serializer)
    }
}

impl<'de> Deserialize<'de> for WirePositions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<[f32; 3]>::deserialize(deserializer)?;
        Ok(Self(rows.into_iter().map(Vec3::from_array).collect()))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct WireIndices(Vec<u32>);

impl Serialize for WireIndices {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        compact(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for WireIndices {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<u32>::deserialize(deserializer).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

// Field declaration order matches the wire format, including the historical
// "WallsUUid" misspelling.

#[derive(Debug, Serialize, Deserialize)]
struct TransformData {
    #[serde(rename = "Translation")]
    translation: WireVec3,
    #[serde(rename = "Rotation")]
    rotation: WireVec3,
    #[serde(rename = "Scale")]
    scale: WireVec3,
}

#[derive(Debug, Serialize, Deserialize)]
struct PlaneBoundsData {
    #[serde(rename = "Min")]
    min: WireVec2,
    #[serde(rename = "Max")]
    max: WireVec2,
}

#[derive(Debug, Serialize, Deserialize)]
struct VolumeBoundsData {
    #[serde(rename = "Min")]
    min: WireVec3,
    #[serde(rename = "Max")]
    max: WireVec3,
}

#[derive(Debug, Serialize, Deserialize)]
struct GlobalMeshData {
    #[serde(rename = "Positions")]
    positions: WirePositions,
    #[serde(rename = "Indices")]
    indices: WireIndices,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnchorData {
    #[serde(rename = "UUID")]
    uuid: String,
    #[serde(rename = "SemanticClassifications")]
    semantic_classifications: Vec<String>,
    #[serde(rename = "Transform")]
    transform: TransformData,
    #[serde(rename = "PlaneBounds", skip_serializing_if = "Option::is_none", default)]
    plane_bounds: Option<PlaneBoundsData>,
    #[serde(rename = "VolumeBounds", skip_serializing_if = "Option::is_none", default)]
    volume_bounds: Option<VolumeBoundsData>,
    #[serde(rename = "PlaneBoundary2D", skip_serializing_if = "Option::is_none", default)]
    plane_boundary_2d: Option<Vec<WireVec2>>,
    #[serde(rename = "GlobalMesh", skip_serializing_if = "Option::is_none", default)]
    global_mesh: Option<GlobalMeshData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RoomLayoutData {
    #[serde(rename = "FloorUuid", skip_serializing_if = "Option::is_none", default)]
    floor_uuid: Option<String>,
    #[serde(rename = "CeilingUuid", skip_serializing_if = "Option::is_none", default)]
    ceiling_uuid: Option<String>,
    #[serde(rename = "GlobalMeshUuid", skip_serializing_if = "Option::is_none", default)]
    global_mesh_uuid: Option<String>,
    #[serde(rename = "WallsUUid")]
    walls_uuid: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RoomData {
    #[serde(rename = "UUID")]
    uuid: String,
    #[serde(rename = "RoomLayout")]
    room_layout: RoomLayoutData,
    #[serde(rename = "Anchors")]
    anchors: Vec<AnchorData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SceneData {
    #[serde(rename = "CoordinateSystem")]
    coordinate_system: CoordinateConvention,
    #[serde(rename = "Rooms")]
    rooms: Vec<RoomData>,
}

// ---------------------------------------------------------------------------
// Serialize
// ---------------------------------------------------------------------------

fn format_uuid(uuid: Uuid) -> String {
    uuid.simple().to_string().to_uppercase()
}

/// Serialize rooms into an indented JSON document in the given convention.
pub fn serialize_rooms(
    rooms: &[Room],
    convention: CoordinateConvention,
    include_global_mesh: bool,
) -> Result<String> {
    let mut scene = SceneData {
        coordinate_system: convention,
        rooms: Vec::with_capacity(rooms.len()),
    };

    for room in rooms {
        let mut layout = RoomLayoutData {
            floor_uuid: None,
            ceiling_uuid: None,
            global_mesh_uuid: None,
            walls_uuid: Vec::new(),
        };
        let mut anchors = Vec::with_capacity(room.anchors().len());

        for anchor in room.anchors() {
            let uuid = format_uuid(anchor.uuid);
            if anchor.has_label(SceneLabel::Ceiling) {
                layout.ceiling_uuid = Some(uuid.clone());
            }
            if anchor.has_label(SceneLabel::Floor) {
                layout.floor_uuid = Some(uuid.clone());
            }
            if anchor.has_label(SceneLabel::GlobalMesh) {
                layout.global_mesh_uuid = Some(uuid.clone());
            }
            if anchor.has_label(SceneLabel::WallFace) {
                layout.walls_uuid.push(uuid.clone());
            }
            anchors.push(anchor_to_data(anchor, uuid, convention, include_global_mesh));
        }

        scene.rooms.push(RoomData {
            uuid: format_uuid(room.uuid),
            room_layout: layout,
            anchors,
        });
    }

    Ok(serde_json::to_string_pretty(&scene)?)
}

fn anchor_to_data(
    anchor: &Anchor,
    uuid: String,
    convention: CoordinateConvention,
    include_global_mesh: bool,
) -> AnchorData {
    let position = anchor.transform.position;
    let rotation = anchor.transform.euler_degrees();
    let (translation, rotation) = match convention {
        CoordinateConvention::Unity => (position, rotation),
        CoordinateConvention::Unreal => (
            Vec3::new(position.z, position.x, position.y) * UNREAL_WORLD_TO_METERS,
            Vec3::new(rotation.x, 180.0 + rotation.y, rotation.z),
        ),
    };

    let plane_bounds = anchor.shape.plane().map(|plane| {
        let (min, max) = match convention {
            CoordinateConvention::Unity => (plane.rect.min, plane.rect.max),
            CoordinateConvention::Unreal => (
                Vec2::new(-plane.rect.max.x, plane.rect.min.y) * UNREAL_WORLD_TO_METERS,
                Vec2::new(-plane.rect.min.x, plane.rect.max.y) * UNREAL_WORLD_TO_METERS,
            ),
        };
        PlaneBoundsData { min: WireVec2(min), max: WireVec2(max) }
    });

    let plane_boundary_2d = anchor.shape.plane().map(|plane| match convention {
        CoordinateConvention::Unity => plane.boundary.iter().map(|&p| WireVec2(p)).collect(),
        CoordinateConvention::Unreal => {
            let mut boundary: Vec<WireVec2> = plane
                .boundary
                .iter()
                .map(|&p| WireVec2(Vec2::new(-p.x, p.y) * UNREAL_WORLD_TO_METERS))
                .collect();
            boundary.reverse();
            boundary
        }
    });

    let volume_bounds = anchor.shape.volume().map(|volume| {
        let (min, max) = match convention {
            CoordinateConvention::Unity => (volume.min, volume.max),
            CoordinateConvention::Unreal => (
                Vec3::new(-volume.max.z, volume.min.x, volume.min.y) * UNREAL_WORLD_TO_METERS,
                Vec3::new(-volume.min.z, volume.max.x, volume.max.y) * UNREAL_WORLD_TO_METERS,
            ),
        };
        VolumeBoundsData { min: WireVec3(min), max: WireVec3(max) }
    });

    let global_mesh = if include_global_mesh {
        anchor.shape.mesh().map(|mesh| match convention {
            CoordinateConvention::Unity => GlobalMeshData {
                positions: WirePositions(mesh.positions.clone()),
                indices: WireIndices(mesh.indices.clone()),
            },
            CoordinateConvention::Unreal => {
                let positions = mesh
                    .positions
                    .iter()
                    .map(|v| Vec3::new(-v.z, -v.x, v.y))
                    .collect();
                let mut indices = mesh.indices.clone();
                indices.reverse();
                GlobalMeshData {
                    positions: WirePositions(positions),
                    indices: WireIndices(indices),
                }
            }
        })
    } else {
        None
    };

    AnchorData {
        uuid,
        semantic_classifications: anchor.labels.iter().map(|l| l.as_str().to_string()).collect(),
        transform: TransformData {
            translation: WireVec3(translation),
            rotation: WireVec3(rotation),
            scale: WireVec3(anchor.transform.scale),
        },
        plane_bounds,
        volume_bounds,
        plane_boundary_2d,
        global_mesh,
    }
}

// ---------------------------------------------------------------------------
// Deserialize
// ---------------------------------------------------------------------------

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|source| SceneError::InvalidUuid {
        value: value.to_string(),
        source,
    })
}

/// Parse a JSON document into populated rooms. The convention is read from
/// the document; derived room state is left for the caller to compute.
pub fn deserialize_rooms(json: &str, settings: &SceneSettings) -> Result<Vec<Room>> {
    let scene: SceneData = serde_json::from_str(json)?;
    let convention = scene.coordinate_system;

    let mut rooms = Vec::with_capacity(scene.rooms.len());
    for room_data in scene.rooms {
        let mut room = Room::new(settings.clone()).with_uuid(parse_uuid(&room_data.uuid)?);
        for anchor_data in room_data.anchors {
            room.push_anchor(anchor_from_data(anchor_data, convention)?);
        }
        rooms.push(room);
    }
    Ok(rooms)
}

fn anchor_from_data(data: AnchorData, convention: CoordinateConvention) -> Result<Anchor> {
    let uuid = parse_uuid(&data.uuid)?;
    let labels = data
        .semantic_classifications
        .iter()
        .map(|s| SceneLabel::from_str(s))
        .collect::<Result<Vec<_>>>()?;

    let translation = data.transform.translation.0;
    let rotation = data.transform.rotation.0;
    let scale = data.transform.scale.0;
    let transform = match convention {
        CoordinateConvention::Unity => Transform::from_euler_degrees(translation, rotation, scale),
        CoordinateConvention::Unreal => Transform::from_euler_degrees(
            Vec3::new(translation.y, translation.z, translation.x) / UNREAL_WORLD_TO_METERS,
            Vec3::new(rotation.x, 180.0 + rotation.y, rotation.z),
            scale,
        ),
    };

    let plane_rect = data.plane_bounds.map(|bounds| match convention {
        CoordinateConvention::Unity => Rect2::new(bounds.min.0, bounds.max.0),
        CoordinateConvention::Unreal => Rect2::new(
            Vec2::new(-bounds.max.0.x, bounds.min.0.y) / UNREAL_WORLD_TO_METERS,
            Vec2::new(-bounds.min.0.x, bounds.max.0.y) / UNREAL_WORLD_TO_METERS,
        ),
    });

    let plane_boundary = data.plane_boundary_2d.map(|boundary| match convention {
        CoordinateConvention::Unity => boundary.into_iter().map(|p| p.0).collect(),
        CoordinateConvention::Unreal => {
            let mut points: Vec<Vec2> = boundary
                .into_iter()
                .map(|p| Vec2::new(-p.0.x, p.0.y) / UNREAL_WORLD_TO_METERS)
                .collect();
            points.reverse();
            points
        }
    });

    let volume = data.volume_bounds.map(|bounds| match convention {
        CoordinateConvention::Unity => Aabb::new(bounds.min.0, bounds.max.0),
        CoordinateConvention::Unreal => Aabb::new(
            Vec3::new(bounds.min.0.y, bounds.min.0.z, -bounds.max.0.x) / UNREAL_WORLD_TO_METERS,
            Vec3::new(bounds.max.0.y, bounds.max.0.z, -bounds.min.0.x) / UNREAL_WORLD_TO_METERS,
        ),
    });

    let mesh = data.global_mesh.map(|mesh| match convention {
        CoordinateConvention::Unity => TriMesh {
            positions: mesh.positions.0,
            indices: mesh.indices.0,
        },
        CoordinateConvention::Unreal => {
            // vertices were written unscaled, only the axes swap back
            let positions = mesh
                .positions
                .0
                .iter()
                .map(|v| Vec3::new(-v.y, v.z, -v.x))
                .collect();
            let mut indices = mesh.indices.0;
            indices.reverse();
            TriMesh { positions, indices }
        }
    });

    let shape = Anchor::build_shape(&labels, plane_rect, plane_boundary, volume, mesh)?;
    Ok(Anchor::new(labels, transform, shape).with_uuid(uuid))
}
