//! Scene root: the owned collection of rooms and their shared settings.
//!
//! The scene is a plain value, owned by the host. Rooms come in either as
//! geometric descriptors or as a serialized JSON document; both paths run
//! the room derivation passes before the data becomes queryable.

use glam::{Vec2, Vec3};
use log::debug;
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::error::Result;
use crate::room::Room;
use crate::serialization::{self, CoordinateConvention};
use crate::types::{Aabb, Rect2, SceneLabel, SceneSettings, Transform, TriMesh};

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Geometric input for one anchor; the engine-free equivalent of a scanned
/// scene element. At least one of the shape parts must be present.
#[derive(Debug, Clone, Default)]
pub struct AnchorDescriptor {
    pub uuid: Option<Uuid>,
    pub labels: Vec<SceneLabel>,
    pub transform: Transform,
    pub plane_rect: Option<Rect2>,
    pub plane_boundary: Option<Vec<Vec2>>,
    pub volume: Option<Aabb>,
    pub mesh: Option<TriMesh>,
}

/// Geometric input for one room.
#[derive(Debug, Clone, Default)]
pub struct RoomDescriptor {
    pub uuid: Option<Uuid>,
    pub anchors: Vec<AnchorDescriptor>,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The root of the spatial model: all loaded rooms plus the current-room
/// cache. Hosts drive the frame counter; the room lookup is cached so the
/// containment scan runs at most once per frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    settings: SceneSettings,
    rooms: Vec<Room>,
    cached_room: Option<usize>,
    cached_frame: u64,
}

impl Scene {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            settings,
            rooms: Vec::new(),
            cached_room: None,
            cached_frame: 0,
        }
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Replace the scene contents with rooms built from descriptors.
    pub fn load_rooms(&mut self, descriptors: Vec<RoomDescriptor>) -> Result<()> {
        let mut rooms = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let mut room = Room::new(self.settings.clone());
            if let Some(uuid) = descriptor.uuid {
                room = room.with_uuid(uuid);
            }
            for anchor in descriptor.anchors {
                let shape = Anchor::build_shape(
                    &anchor.labels,
                    anchor.plane_rect,
                    anchor.plane_boundary,
                    anchor.volume,
                    anchor.mesh,
                )?;
                let mut built = Anchor::new(anchor.labels, anchor.transform, shape);
                if let Some(uuid) = anchor.uuid {
                    built = built.with_uuid(uuid);
                }
                room.push_anchor(built);
            }
            room.compute_room_info();
            rooms.push(room);
        }
        debug!("loaded {} room(s) from descriptors", rooms.len());
        self.rooms = rooms;
        self.cached_room = None;
        Ok(())
    }

    /// Replace the scene contents with rooms parsed from a JSON document.
    pub fn load_from_json(&mut self, json: &str) -> Result<()> {
        let mut rooms = serialization::deserialize_rooms(json, &self.settings)?;
        for room in &mut rooms {
            room.compute_room_info();
        }
        debug!("loaded {} room(s) from json", rooms.len());
        self.rooms = rooms;
        self.cached_room = None;
        Ok(())
    }

    /// Serialize every room into a JSON document.
    pub fn save_to_json(
        &self,
        convention: CoordinateConvention,
        include_global_mesh: bool,
    ) -> Result<String> {
        serialization::serialize_rooms(&self.rooms, convention, include_global_mesh)
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
        self.cached_room = None;
    }

    /// Drop the room with the given identity, if present.
    pub fn remove_room(&mut self, uuid: Uuid) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.uuid != uuid);
        if self.rooms.len() != before {
            self.cached_room = None;
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Current room
    // -----------------------------------------------------------------------

    /// The room the eye position is inside of. The containment scan runs at
    /// most once per `frame` value; between lookups (or when the eye is
    /// outside every room) the previous answer sticks, falling back to the
    /// first room.
    pub fn current_room(&mut self, eye: Option<Vec3>, frame: u64) -> Option<&Room> {
        if self.cached_frame != frame {
            if let Some(eye) = eye {
                if let Some(found) = self
                    .rooms
                    .iter()
                    .position(|room| room.is_position_in_room(eye, false))
                {
                    self.cached_room = Some(found);
                    self.cached_frame = frame;
                    return self.rooms.get(found);
                }
            }
        }

        if let Some(cached) = self.cached_room {
            if cached < self.rooms.len() {
                return self.rooms.get(cached);
            }
        }
        self.rooms.first()
    }
}
