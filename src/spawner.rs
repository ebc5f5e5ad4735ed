//! Spawn-position search: scatter content around a computed room.
//!
//! Repeatedly samples candidate positions, either floating in free space or
//! on filtered surfaces, and keeps the ones that fit: inside the room, clear
//! of scene volumes, and spaced away from previously accepted spawns.

use glam::{Quat, Vec3};
use log::debug;
use rand::Rng;

use crate::room::Room;
use crate::types::{Aabb, LabelFilter, Pose, SurfaceMask};

const CLEARANCE_DISTANCE: f32 = 0.01;

/// Where spawned content should attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnLocation {
    /// Floating in the free space of the room.
    #[default]
    Floating,
    /// Any surface orientation.
    AnySurface,
    /// Walls, windows, wall art, doors.
    VerticalSurfaces,
    /// Floor, table tops, beds, couches.
    OnTopOfSurfaces,
    /// Downward-facing surfaces such as the ceiling.
    HangingDown,
}

impl SpawnLocation {
    fn surface_mask(self) -> SurfaceMask {
        match self {
            SpawnLocation::AnySurface => SurfaceMask::ANY,
            SpawnLocation::VerticalSurfaces => SurfaceMask::VERTICAL,
            SpawnLocation::OnTopOfSurfaces => SurfaceMask::FACING_UP,
            SpawnLocation::HangingDown => SurfaceMask::FACING_DOWN,
            // not used for floating placement
            SpawnLocation::Floating => SurfaceMask::ANY,
        }
    }
}

/// Parameters for one spawn batch.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub location: SpawnLocation,
    /// How many positions to find.
    pub amount: usize,
    /// Sampling attempts per position before giving up on it.
    pub max_iterations: u32,
    /// Label filter applied to surface placement.
    pub labels: LabelFilter,
    /// Local-space bounds of the object being placed, Y-up with the origin
    /// at its resting point. None spawns point-sized content.
    pub object_bounds: Option<Aabb>,
    /// Overrides the footprint radius derived from `object_bounds`.
    pub override_radius: Option<f32>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            location: SpawnLocation::Floating,
            amount: 8,
            max_iterations: 1000,
            labels: LabelFilter::any(),
            object_bounds: None,
            override_radius: None,
        }
    }
}

impl SpawnConfig {
    /// Clearance radius used while sampling.
    fn min_radius(&self) -> f32 {
        self.object_bounds.map_or(0.0, |b| {
            (-b.min.x).min(-b.min.z).min(b.max.x).min(b.max.z).max(0.0)
        })
    }

    /// Offset along the surface normal that puts the object's base on the
    /// surface.
    fn base_offset(&self) -> f32 {
        self.object_bounds.map_or(0.0, |b| -b.min.y)
    }

    fn center_offset(&self) -> f32 {
        self.object_bounds.map_or(0.0, |b| b.center().y)
    }

    /// Half-diagonal of the spacing footprint kept between spawns.
    fn spacing_radius(&self) -> f32 {
        if let Some(radius) = self.override_radius {
            return Vec3::new(radius * 2.0, CLEARANCE_DISTANCE, radius * 2.0).length() * 0.5;
        }
        self.object_bounds.map_or(0.0, |b| {
            let mut min = b.min;
            let mut max = b.max;
            min.y += CLEARANCE_DISTANCE;
            max.y = max.y.max(min.y);
            (max - min).length() * 0.5
        })
    }
}

/// Find up to `config.amount` placement poses in the room. Poses orient
/// local +Y along the surface normal; floating poses stay upright. The
/// result may be shorter than requested when the room runs out of space.
pub fn find_spawn_positions(
    room: &Room,
    config: &SpawnConfig,
    rng: &mut impl Rng,
) -> Vec<Pose> {
    let min_radius = config.min_radius();
    let base_offset = config.base_offset();
    let center_offset = config.center_offset();
    let spacing_radius = config.spacing_radius();

    let mut accepted: Vec<Pose> = Vec::with_capacity(config.amount);

    'spawns: for _ in 0..config.amount {
        for _ in 0..config.max_iterations {
            let (position, normal) = if config.location == SpawnLocation::Floating {
                match room.generate_random_position_in_room(rng, min_radius, true) {
                    Some(position) => (position, Vec3::Y),
                    // the room cannot fit this object at all
                    None => continue 'spawns,
                }
            } else {
                let Some((surface_position, normal)) = room.generate_random_position_on_surface(
                    rng,
                    config.location.surface_mask(),
                    min_radius,
                    &config.labels,
                ) else {
                    continue;
                };
                let position = surface_position + normal * base_offset;
                if !room.is_position_in_room(position + normal * center_offset, true) {
                    continue;
                }
                (position, normal)
            };

            let too_close = accepted
                .iter()
                .any(|prev| position.distance(prev.position) < spacing_radius * 2.0);
            if too_close {
                continue;
            }

            let rotation = Quat::from_rotation_arc(Vec3::Y, normal);
            accepted.push(Pose::new(position, rotation));
            break;
        }
    }

    if accepted.len() < config.amount {
        debug!(
            "placed {} of {} requested spawn position(s)",
            accepted.len(),
            config.amount
        );
    }
    accepted
}
