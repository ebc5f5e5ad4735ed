//! Template room builder.
//!
//! Hand-authored rooms are described as plain Y-up, center-pivot boxes (the
//! way a level editor lays them out). This module converts them into the
//! scanned-anchor conventions: walls get re-seated so their seams close
//! exactly, volumes get the top-center Z-up pivot, and floor and ceiling
//! anchors are synthesized from the wall corner loop.

use glam::{Quat, Vec2, Vec3};

use crate::error::{Result, SceneError};
use crate::scene::{AnchorDescriptor, RoomDescriptor};
use crate::types::{look_rotation, quat_from_euler_degrees, Aabb, Rect2, SceneLabel, Transform};

/// One authored box: a label, a Y-up center-pivot transform, and the box
/// extent as scale. Walls and other plane labels are quads in the XY plane
/// facing -Z; volume labels are solid boxes.
#[derive(Debug, Clone)]
pub struct TemplateBox {
    pub label: SceneLabel,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl TemplateBox {
    pub fn new(label: SceneLabel, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { label, position, rotation, scale }
    }
}

fn is_plane_only(label: SceneLabel) -> bool {
    matches!(
        label,
        SceneLabel::WindowFrame | SceneLabel::DoorFrame | SceneLabel::WallArt
    )
}

fn has_plane_on_top(label: SceneLabel) -> bool {
    matches!(label, SceneLabel::Table | SceneLabel::Couch)
}

fn centered_rect(size: Vec2) -> Rect2 {
    Rect2::from_center_size(Vec2::ZERO, size)
}

/// An intermediate wall during seam sealing.
struct WallSlab {
    transform: Transform,
    rect: Rect2,
}

impl WallSlab {
    fn bottom_right(&self) -> Vec3 {
        let half = self.rect.size() * 0.5;
        self.transform.position
            - self.transform.up() * half.y
            - self.transform.right() * half.x
    }

    fn bottom_left(&self) -> Vec3 {
        let half = self.rect.size() * 0.5;
        self.transform.position
            - self.transform.up() * half.y
            + self.transform.right() * half.x
    }
}

/// Build a room descriptor from template boxes. Requires at least three
/// walls so the floor outline closes.
pub fn build_template_room(boxes: &[TemplateBox]) -> Result<RoomDescriptor> {
    let mut walls: Vec<WallSlab> = Vec::new();
    let mut anchors: Vec<AnchorDescriptor> = Vec::new();
    let mut wall_height = 0.0;

    for tbox in boxes {
        match tbox.label {
            SceneLabel::WallFace => {
                if walls.is_empty() {
                    wall_height = tbox.scale.y;
                }
                // authored quads face the opposite way, flip them inward
                let rotation = tbox.rotation * quat_from_euler_degrees(Vec3::new(0.0, 180.0, 0.0));
                walls.push(WallSlab {
                    transform: Transform::from_position_rotation(tbox.position, rotation),
                    rect: centered_rect(Vec2::new(tbox.scale.x, tbox.scale.y)),
                });
            }
            label if is_plane_only(label) => {
                let rotation = tbox.rotation * quat_from_euler_degrees(Vec3::new(0.0, 180.0, 0.0));
                anchors.push(AnchorDescriptor {
                    labels: vec![label],
                    transform: Transform::from_position_rotation(tbox.position, rotation),
                    plane_rect: Some(centered_rect(Vec2::new(tbox.scale.x, tbox.scale.y))),
                    ..Default::default()
                });
            }
            label => {
                // box extent in anchor convention: X stays, depth becomes Y,
                // height becomes Z
                let cube_scale = Vec3::new(tbox.scale.x, tbox.scale.z, tbox.scale.y);
                // move the pivot to the top face and point local Z up
                let position = tbox.position + Vec3::Y * cube_scale.z * 0.5;
                let rotation =
                    tbox.rotation * quat_from_euler_degrees(Vec3::new(-90.0, 0.0, 0.0));
                let volume = Aabb::from_center_size(
                    Vec3::new(0.0, 0.0, -cube_scale.z * 0.5),
                    cube_scale,
                );
                let plane_rect = has_plane_on_top(label)
                    .then(|| centered_rect(Vec2::new(cube_scale.x, cube_scale.y)));
                anchors.push(AnchorDescriptor {
                    labels: vec![label],
                    transform: Transform::from_position_rotation(position, rotation),
                    plane_rect,
                    volume: Some(volume),
                    ..Default::default()
                });
            }
        }
    }

    if walls.len() < 3 {
        return Err(SceneError::OpenWallLoop(walls.len()));
    }

    let (ordered, corners) = order_walls(walls);
    if ordered.len() != corners.len() {
        // a wall matched twice, the loop does not close
        return Err(SceneError::OpenWallLoop(corners.len()));
    }
    let sealed = seal_walls(ordered, &corners);
    let (floor, ceiling) = synthesize_floor_and_ceiling(&sealed, &corners, wall_height);

    let mut all = Vec::with_capacity(sealed.len() + anchors.len() + 2);
    for wall in sealed {
        all.push(wall);
    }
    all.append(&mut anchors);
    all.push(floor);
    all.push(ceiling);

    Ok(RoomDescriptor { uuid: None, anchors: all })
}

/// Chain walls so each one's bottom-right corner meets the next one's
/// bottom-left, collecting the shared corners as the floor outline. Assumes
/// the authored walls form one loop; the closest-corner match absorbs small
/// authoring misalignments.
fn order_walls(walls: Vec<WallSlab>) -> (Vec<WallSlab>, Vec<Vec3>) {
    let count = walls.len();
    let mut order = Vec::with_capacity(count);
    let mut corners = Vec::with_capacity(count);

    let mut current = 0usize;
    for _ in 0..count {
        let bottom_right = walls[current].bottom_right();
        let mut next = 0usize;
        let mut closest = f32::INFINITY;
        for (i, candidate) in walls.iter().enumerate() {
            if i == current {
                continue;
            }
            let distance = candidate.bottom_left().distance(bottom_right);
            if distance < closest {
                closest = distance;
                next = i;
            }
        }
        current = next;
        order.push(current);
        corners.push(walls[current].bottom_left());
    }

    let mut slots: Vec<Option<WallSlab>> = walls.into_iter().map(Some).collect();
    let ordered = order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();
    (ordered, corners)
}

/// Re-seat each wall exactly between its two outline corners, rebuilding the
/// transform and rect so adjacent edges coincide.
fn seal_walls(walls: Vec<WallSlab>, corners: &[Vec3]) -> Vec<AnchorDescriptor> {
    let count = walls.len();
    walls
        .into_iter()
        .enumerate()
        .map(|(i, wall)| {
            let corner1 = corners[i];
            let corner2 = corners[(i + 1) % count];
            let mut wall_right = corner1 - corner2;
            wall_right.y = 0.0;
            let wall_width = wall_right.length();
            let wall_right = wall_right / wall_width;
            let wall_fwd = wall_right.cross(Vec3::Y);
            let height = wall.rect.size().y;

            let position = (corner1 + corner2) * 0.5 + Vec3::Y * height * 0.5;
            let rotation = look_rotation(wall_fwd, Vec3::Y);
            let rect = centered_rect(Vec2::new(wall_width, height));

            AnchorDescriptor {
                labels: vec![SceneLabel::WallFace],
                transform: Transform::from_position_rotation(position, rotation),
                plane_rect: Some(rect),
                ..Default::default()
            }
        })
        .collect()
}

/// Floor and ceiling anchors aligned with the longest wall, sized and
/// outlined from the wall corner loop. The ceiling boundary winds the other
/// way so its normal points down into the room.
fn synthesize_floor_and_ceiling(
    walls: &[AnchorDescriptor],
    corners: &[Vec3],
    wall_height: f32,
) -> (AnchorDescriptor, AnchorDescriptor) {
    let longest = walls
        .iter()
        .max_by(|a, b| {
            let wa = a.plane_rect.map_or(0.0, |r| r.size().x);
            let wb = b.plane_rect.map_or(0.0, |r| r.size().x);
            wa.partial_cmp(&wb).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|w| w.transform)
        .unwrap_or_default();

    let mut min = Vec2::ZERO;
    let mut max = Vec2::ZERO;
    for (i, &corner) in corners.iter().enumerate() {
        let local = longest.inverse_transform_point(corner);
        let flat = Vec2::new(local.x, local.z);
        if i == 0 {
            min = flat;
            max = flat;
        } else {
            min = min.min(flat);
            max = max.max(flat);
        }
    }
    let local_center = Vec3::new((min.x + max.x) * 0.5, 0.0, (min.y + max.y) * 0.5);
    let room_center = longest.transform_point(local_center) - Vec3::Y * wall_height * 0.5;
    let floor_size = Vec2::new(max.y - min.y, max.x - min.x);

    let build = |ceiling: bool| {
        let position = room_center + Vec3::Y * wall_height * if ceiling { 1.0 } else { 0.0 };
        let flip = if ceiling { -1.0 } else { 1.0 };
        let transform = Transform::from_position_rotation(
            position,
            look_rotation(longest.up() * flip, longest.right()),
        );
        let mut boundary: Vec<Vec2> = corners
            .iter()
            .map(|&corner| {
                let local = transform.inverse_transform_point(corner);
                Vec2::new(local.x, local.y)
            })
            .collect();
        if ceiling {
            boundary.reverse();
        }
        AnchorDescriptor {
            labels: vec![if ceiling { SceneLabel::Ceiling } else { SceneLabel::Floor }],
            transform,
            plane_rect: Some(centered_rect(floor_size)),
            plane_boundary: Some(boundary),
            ..Default::default()
        }
    };

    (build(false), build(true))
}
