//! Roomkit
//!
//! A headless scene-understanding core for physically scanned rooms. Rooms
//! are built from labeled anchor primitives (planes, volumes, a global
//! mesh), derive their own structure (outline, bounds, hierarchy, seat
//! poses, world-lock mesh), and answer spatial queries without any engine
//! dependency.
//!
//! ## Architecture
//!
//! ```text
//! Scene  (scene.rs)            ← room list, current-room cache, load/save
//!   └── Room  (room.rs)        ← anchor arena, derived state, queries
//!         ├── Anchor      (anchor.rs)       ← labeled shape + transform
//!         ├── AnchorMesh  (anchor_mesh.rs)  ← Delaunay world-lock mesh
//!         └── geometry / triangulator       ← leaf math
//! serialization.rs             ← Unity/Unreal JSON documents
//! template.rs                  ← rooms from hand-authored boxes
//! spawner.rs                   ← content placement sampling
//! ```

pub mod anchor;
pub mod anchor_mesh;
pub mod error;
pub mod geometry;
pub mod room;
pub mod scene;
pub mod serialization;
pub mod spawner;
pub mod template;
pub mod triangulator;
pub mod types;

// Convenience re-exports
pub use anchor::{Anchor, AnchorShape, PlaneShape};
pub use anchor_mesh::{AnchorMesh, MeshNode, MeshTriangle, PoseCorrection};
pub use error::{Result, SceneError};
pub use room::{CouchSeat, Room};
pub use scene::{AnchorDescriptor, RoomDescriptor, Scene};
pub use serialization::CoordinateConvention;
pub use spawner::{find_spawn_positions, SpawnConfig, SpawnLocation};
pub use template::{build_template_room, TemplateBox};
pub use triangulator::triangulate_points;
pub use types::{
    Aabb, LabelFilter, Pose, PositioningMethod, Ray, RaycastHit, Rect2, SceneLabel, SceneSettings,
    SurfaceMask, Transform, TriMesh,
};
