//! Room model: an arena of anchors plus everything derived from them.
//!
//! A room starts empty, gets populated with [`Anchor`] values, and becomes
//! queryable after [`Room::compute_room_info`] runs the derivation passes:
//! classification, floor outline, bounds, seat poses, the parent/child
//! hierarchy, and the world-lock anchor mesh. Queries made before that (or
//! on a room with no floor) return graceful negatives rather than errors.

use glam::{Quat, Vec2, Vec3};
use log::{debug, warn};
use rand::Rng;
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::anchor_mesh::AnchorMesh;
use crate::geometry::{self, INV_SQRT_2};
use crate::types::{
    look_rotation, quat_from_euler_degrees, Aabb, LabelFilter, Pose, PositioningMethod, Ray,
    RaycastHit, Rect2, SceneLabel, SceneSettings, SurfaceMask, Transform,
};

// ---------------------------------------------------------------------------
// Seats
// ---------------------------------------------------------------------------

/// Suggested seating slots on one couch anchor, spaced for human occupants.
#[derive(Debug, Clone)]
pub struct CouchSeat {
    /// Arena index of the couch anchor the poses sit on.
    pub anchor: usize,
    /// One pose per seat slot, facing away from the nearest wall.
    pub poses: Vec<Pose>,
}

// ---------------------------------------------------------------------------
// Surface sampling
// ---------------------------------------------------------------------------

/// One candidate face for surface sampling: a 2D rect in face-local space
/// plus the transform that lifts local (x, y, 0) onto the face, with local
/// +Z as the outward normal.
struct SampleSurface {
    anchor: usize,
    usable_area: f32,
    is_plane: bool,
    bounds: Rect2,
    transform: Transform,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A single room: its anchors and the derived spatial model.
#[derive(Debug, Clone)]
pub struct Room {
    pub uuid: Uuid,
    settings: SceneSettings,
    anchors: Vec<Anchor>,
    floor: Option<usize>,
    ceiling: Option<usize>,
    global_mesh: Option<usize>,
    walls: Vec<usize>,
    /// World-space wall bottom corners projected to Y=0, one per wall seam.
    corners: Vec<Vec3>,
    bounds: Aabb,
    seats: Vec<CouchSeat>,
    anchor_mesh: AnchorMesh,
    computed: bool,
}

impl Room {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            settings,
            anchors: Vec::new(),
            floor: None,
            ceiling: None,
            global_mesh: None,
            walls: Vec::new(),
            corners: Vec::new(),
            bounds: Aabb::ZERO,
            seats: Vec::new(),
            anchor_mesh: AnchorMesh::default(),
            computed: false,
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Add an anchor to the arena. Derived state is stale until the next
    /// [`Room::compute_room_info`].
    pub fn push_anchor(&mut self, anchor: Anchor) -> usize {
        self.anchors.push(anchor);
        self.computed = false;
        self.anchors.len() - 1
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Whether the derivation passes have run for the current anchor set.
    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn anchor(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    pub fn floor_anchor(&self) -> Option<usize> {
        self.floor
    }

    pub fn ceiling_anchor(&self) -> Option<usize> {
        self.ceiling
    }

    pub fn global_mesh_anchor(&self) -> Option<usize> {
        self.global_mesh
    }

    pub fn wall_anchors(&self) -> &[usize] {
        &self.walls
    }

    /// The wall bottom corner loop at Y=0, in floor boundary order.
    pub fn outline(&self) -> &[Vec3] {
        &self.corners
    }

    /// World-oriented bounding box of the room.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn seats(&self) -> &[CouchSeat] {
        &self.seats
    }

    /// All seat poses in the room, flattened across couches.
    pub fn seat_poses(&self) -> Vec<Pose> {
        self.seats.iter().flat_map(|s| s.poses.iter().copied()).collect()
    }

    /// The world-lock mesh over the wall anchors; node anchor indices point
    /// into this room's arena.
    pub fn anchor_mesh(&self) -> &AnchorMesh {
        &self.anchor_mesh
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.anchors.get(index).and_then(|a| a.parent())
    }

    pub fn children_of(&self, index: usize) -> &[usize] {
        self.anchors.get(index).map_or(&[], |a| a.children())
    }

    /// True when every one of `labels` appears on some anchor in the room.
    pub fn has_all_labels(&self, labels: &[SceneLabel]) -> bool {
        !labels.is_empty()
            && labels
                .iter()
                .all(|l| self.anchors.iter().any(|a| a.has_label(*l)))
    }

    // -----------------------------------------------------------------------
    // Derivation
    // -----------------------------------------------------------------------

    /// Run all derivation passes over the current anchor set. Idempotent;
    /// call again after changing the anchors.
    pub fn compute_room_info(&mut self) {
        self.floor = None;
        self.ceiling = None;
        self.global_mesh = None;
        self.walls.clear();

        let mut wall_height_sum = 0.0;
        for (i, anchor) in self.anchors.iter().enumerate() {
            if anchor.has_label(SceneLabel::WallFace) {
                if let Some(plane) = anchor.shape.plane() {
                    wall_height_sum += plane.rect.size().y;
                }
                self.walls.push(i);
            } else if anchor.has_label(SceneLabel::Floor) {
                self.floor = Some(i);
            } else if anchor.has_label(SceneLabel::Ceiling) {
                self.ceiling = Some(i);
            } else if anchor.has_label(SceneLabel::GlobalMesh) {
                self.global_mesh = Some(i);
            }
        }
        let average_height = if self.walls.is_empty() {
            0.0
        } else {
            wall_height_sum / self.walls.len() as f32
        };

        self.calculate_outline();
        self.calculate_bounds(average_height);
        self.calculate_seat_poses();
        self.calculate_hierarchy();

        self.anchor_mesh = AnchorMesh::new(
            self.walls
                .iter()
                .map(|&w| (w, self.anchors[w].transform.position)),
        );
        self.computed = true;
    }

    /// Project the floor boundary to a world outline at exactly Y=0.
    fn calculate_outline(&mut self) {
        self.corners.clear();
        let Some(floor) = self.floor.map(|i| &self.anchors[i]) else {
            warn!("room has no floor anchor, outline left empty");
            return;
        };
        let Some(plane) = floor.shape.plane() else {
            warn!("floor anchor has no plane, outline left empty");
            return;
        };
        for point in &plane.boundary {
            let mut pos = floor.transform.transform_point(point.extend(0.0));
            pos.y = 0.0;
            self.corners.push(pos);
        }
    }

    fn calculate_bounds(&mut self, room_height: f32) {
        let mut x_min = 0.0f32;
        let mut x_max = 0.0f32;
        let mut z_min = 0.0f32;
        let mut z_max = 0.0f32;
        for corner in &self.corners {
            x_min = x_min.min(corner.x);
            x_max = x_max.max(corner.x);
            z_min = z_min.min(corner.z);
            z_max = z_max.max(corner.z);
        }
        let size = Vec3::new(x_max - x_min, room_height, z_max - z_min);
        let center = Vec3::new(
            (x_max + x_min) * 0.5,
            room_height * 0.5,
            (z_max + z_min) * 0.5,
        );
        self.bounds = Aabb::from_center_size(center, size);
    }

    /// Lay seat slots along every couch. A roughly square couch gets one
    /// centered seat; an elongated one gets fixed-width slots along its long
    /// axis with the leftover spread evenly between them.
    fn calculate_seat_poses(&mut self) {
        let seat_width = self.settings.seat_width;
        let mut seats = Vec::new();

        for (i, anchor) in self.anchors.iter().enumerate() {
            if !anchor.has_label(SceneLabel::Couch) {
                continue;
            }
            let surface_dim = anchor
                .shape
                .plane()
                .map(|p| p.rect.size())
                .unwrap_or(Vec2::ONE);
            let ratio = surface_dim.x / surface_dim.y;

            let seat_fwd = self.facing_direction(i).normalize_or_zero();
            let seat_up = geometry::ortho_normalize(seat_fwd, Vec3::Y);
            let rotation = look_rotation(seat_fwd, seat_up);

            let mut poses = Vec::new();
            if (0.5..=2.0).contains(&ratio) {
                // roughly square couch, just take the center
                poses.push(Pose::new(anchor.transform.position, rotation));
            } else {
                let x_long = surface_dim.x > surface_dim.y;
                let longest_dim = if x_long { surface_dim.x } else { surface_dim.y };
                let num_seats = (longest_dim / seat_width).floor() as i32;
                if num_seats > 0 {
                    let seat_buffer =
                        (longest_dim - num_seats as f32 * seat_width) / num_seats as f32;
                    let seat_right = if x_long {
                        anchor.transform.right()
                    } else {
                        anchor.transform.up()
                    };
                    for k in 0..num_seats {
                        let position = anchor.transform.position
                            - seat_right * longest_dim * 0.5
                            + seat_right * seat_buffer * 0.5
                            + seat_right * seat_width * 0.5
                            + seat_right * (seat_width + seat_buffer) * k as f32;
                        poses.push(Pose::new(position, rotation));
                    }
                }
            }
            seats.push(CouchSeat { anchor: i, poses });
        }
        self.seats = seats;
    }

    /// Infer parent/child back-references with three disjoint heuristics:
    /// planes mounted on walls, volumes resting on the floor, and volumes
    /// stacked on other volumes.
    fn calculate_hierarchy(&mut self) {
        let tol = self.settings.coplanar_tolerance;
        let mut links: Vec<(usize, usize)> = Vec::new();

        for (i, parent) in self.anchors.iter().enumerate() {
            if parent.has_label(SceneLabel::WallFace) {
                let Some(wall_plane) = parent.shape.plane() else {
                    continue;
                };
                let half_width = wall_plane.rect.size().x * 0.5;
                for (k, child) in self.anchors.iter().enumerate() {
                    if k == i || child.shape.plane().is_none() || child.shape.volume().is_some() {
                        continue;
                    }
                    let angle =
                        geometry::angle_degrees(child.transform.right(), parent.transform.right());
                    let aligns = angle <= self.settings.wall_angle_tolerance;
                    let local = parent
                        .transform
                        .inverse_transform_point(child.transform.position);
                    let on_wall = local.z.abs() <= tol * local.x.abs().max(1.0);
                    let within = local.x.abs() < half_width;
                    if aligns && on_wall && within {
                        links.push((i, k));
                    }
                }
            } else if parent.has_label(SceneLabel::Floor) {
                for (k, child) in self.anchors.iter().enumerate() {
                    let Some(volume) = child.shape.volume() else {
                        continue;
                    };
                    let bottom_y = child.transform.position.y - volume.size().z;
                    if (parent.transform.position.y - bottom_y).abs() <= tol {
                        links.push((i, k));
                    }
                }
            } else if let Some(parent_bounds) = parent.shape.volume() {
                for (k, child) in self.anchors.iter().enumerate() {
                    if k == i {
                        continue;
                    }
                    let Some(child_bounds) = child.shape.volume() else {
                        continue;
                    };
                    let child_bottom_y = child.transform.position.y - child_bounds.size().z;
                    let on_top = (parent.transform.position.y - child_bottom_y).abs() <= tol;
                    if !on_top {
                        continue;
                    }
                    // require at least one footprint corner inside the parent
                    let mut any_corner_inside = false;
                    for c in 0..4 {
                        let corner = Vec3::new(
                            if c < 2 { child_bounds.min.x } else { child_bounds.max.x },
                            if c % 2 == 0 { child_bounds.min.y } else { child_bounds.max.y },
                            0.0,
                        );
                        let world = child.transform.transform_point(corner);
                        let relative = parent.transform.inverse_transform_point(world);
                        if relative.x >= parent_bounds.min.x
                            && relative.x <= parent_bounds.max.x
                            && relative.y >= parent_bounds.min.y
                            && relative.y <= parent_bounds.max.y
                        {
                            any_corner_inside = true;
                            break;
                        }
                    }
                    if any_corner_inside {
                        links.push((i, k));
                    }
                }
            }
        }

        for anchor in &mut self.anchors {
            anchor.parent = None;
            anchor.children.clear();
        }
        for (parent, child) in links {
            self.anchors[parent].children.push(child);
            self.anchors[child].parent = Some(parent);
        }
    }

    // -----------------------------------------------------------------------
    // Raycast queries
    // -----------------------------------------------------------------------

    /// Closest filtered anchor hit within `max_distance`, if any.
    pub fn raycast(
        &self,
        ray: &Ray,
        max_distance: f32,
        filter: &LabelFilter,
    ) -> Option<(RaycastHit, usize)> {
        let mut closest = max_distance;
        let mut best = None;
        for (i, anchor) in self.anchors.iter().enumerate() {
            if !filter.passes(&anchor.labels) {
                continue;
            }
            if let Some(hit) = anchor.raycast(ray, closest) {
                closest = hit.distance;
                best = Some((hit, i));
            }
        }
        best
    }

    /// Every filtered anchor hit within `max_distance`, unordered.
    pub fn raycast_all(
        &self,
        ray: &Ray,
        max_distance: f32,
        filter: &LabelFilter,
    ) -> Vec<(RaycastHit, usize)> {
        let mut hits = Vec::new();
        for (i, anchor) in self.anchors.iter().enumerate() {
            if !filter.passes(&anchor.labels) {
                continue;
            }
            if let Some(hit) = anchor.raycast(ray, max_distance) {
                hits.push((hit, i));
            }
        }
        hits
    }

    /// A placement pose derived from a raycast: position on the hit surface,
    /// forward chosen from surface context. Volume top hits snap forward to
    /// the nearest top edge; horizontal plane hits face back toward the ray
    /// origin; everything else faces along the surface normal.
    pub fn best_pose_from_raycast(
        &self,
        ray: &Ray,
        max_distance: f32,
        filter: &LabelFilter,
        positioning: PositioningMethod,
    ) -> Option<(Pose, usize, Vec3)> {
        let Some((hit, index)) = self.raycast(ray, max_distance, filter) else {
            debug!("best pose not found, no surface anchor hit");
            return None;
        };
        let anchor = &self.anchors[index];

        let mut position = hit.point;
        let mut pose_fwd = hit.normal;

        if hit.normal.dot(Vec3::Y) >= 0.9 && anchor.shape.volume().is_some() {
            // ray hit the top surface of a volume, snap forward to the
            // nearest top edge
            let to_plane = ray.origin - anchor.transform.position;
            let plane_y_up = if anchor.transform.up().dot(to_plane) > 0.0 {
                anchor.transform.up()
            } else {
                -anchor.transform.up()
            };
            let plane_x_up = if anchor.transform.right().dot(to_plane) > 0.0 {
                anchor.transform.right()
            } else {
                -anchor.transform.right()
            };
            let scale = anchor.size();
            let nearest_corner = plane_x_up * scale.x * 0.5 + plane_y_up * scale.y * 0.5;
            let flat_to_plane = geometry::ortho_normalize(anchor.transform.forward(), to_plane);
            let x_up = geometry::angle_degrees(flat_to_plane, plane_y_up)
                > geometry::angle_degrees(nearest_corner, plane_y_up);
            pose_fwd = if x_up { plane_x_up } else { plane_y_up };
            let offset = if x_up { scale.x } else { scale.y };
            match positioning {
                PositioningMethod::Center => position = anchor.transform.position,
                PositioningMethod::Edge => {
                    position = anchor.transform.position + pose_fwd * offset * 0.5
                }
                PositioningMethod::Default => {}
            }
        } else if hit.normal.dot(Vec3::Y).abs() >= 0.9 {
            // floor, ceiling, or another horizontal plane: face the viewer
            pose_fwd = Vec3::new(ray.origin.x - hit.point.x, 0.0, ray.origin.z - hit.point.z)
                .normalize_or_zero();
        }

        let pose = Pose::new(position, look_rotation(pose_fwd, Vec3::Y));
        Some((pose, index, hit.normal))
    }

    // -----------------------------------------------------------------------
    // Containment
    // -----------------------------------------------------------------------

    /// Test a position against the floor outline, and optionally against the
    /// floor/ceiling heights so the room is not an infinite column.
    pub fn is_position_in_room(&self, position: Vec3, test_vertical_bounds: bool) -> bool {
        let Some(floor) = self.floor.map(|i| &self.anchors[i]) else {
            return false;
        };
        let mut in_room = floor.is_position_in_boundary(position);
        if test_vertical_bounds {
            in_room &= position.y <= self.bounds.size().y && position.y >= 0.0;
        }
        in_room
    }

    /// First anchor whose (buffered) volume contains the position.
    pub fn position_in_scene_volume(
        &self,
        position: Vec3,
        test_vertical_bounds: bool,
        buffer: f32,
    ) -> Option<usize> {
        self.anchors
            .iter()
            .position(|a| a.is_position_in_volume(position, test_vertical_bounds, buffer))
    }

    pub fn is_position_in_scene_volume(&self, position: Vec3, buffer: f32) -> bool {
        self.position_in_scene_volume(position, true, buffer).is_some()
    }

    // -----------------------------------------------------------------------
    // Surface queries
    // -----------------------------------------------------------------------

    /// Closest surface point over all filtered anchors, with its outward
    /// normal, signed distance (negative inside a volume) and the anchor
    /// index.
    pub fn closest_surface_position(
        &self,
        position: Vec3,
        filter: &LabelFilter,
    ) -> Option<(Vec3, Vec3, f32, usize)> {
        let mut best: Option<(Vec3, Vec3, f32, usize)> = None;
        for (i, anchor) in self.anchors.iter().enumerate() {
            if !filter.passes(&anchor.labels) {
                continue;
            }
            let (point, distance, normal) = anchor.closest_surface_position(position);
            if best.map_or(true, |(_, _, d, _)| distance < d) {
                best = Some((point, normal, distance, i));
            }
        }
        best
    }

    /// The labeled anchor with the largest top surface area.
    pub fn find_largest_surface(&self, label: SceneLabel) -> Option<usize> {
        let mut largest = None;
        let mut largest_area = 0.0;
        for (i, anchor) in self.anchors.iter().enumerate() {
            if !anchor.has_label(label) {
                continue;
            }
            let area = if let Some(plane) = anchor.shape.plane() {
                let s = plane.rect.size();
                s.x * s.y
            } else if let Some(volume) = anchor.shape.volume() {
                let s = volume.size();
                s.x * s.y
            } else {
                0.0
            };
            if area > largest_area {
                largest_area = area;
                largest = Some(i);
            }
        }
        largest
    }

    /// The wall most likely to be the room's "feature" wall: the longest
    /// wall that has every outline corner in front of it (no corner behind
    /// its plane beyond `tolerance`).
    pub fn key_wall(&self, tolerance: f32) -> Option<usize> {
        let mut sorted = self.walls.clone();
        sorted.sort_by(|&a, &b| {
            let wa = self.wall_width(a);
            let wb = self.wall_width(b);
            wa.partial_cmp(&wb).unwrap_or(std::cmp::Ordering::Equal)
        });

        for &wall in sorted.iter().rev() {
            let anchor = &self.anchors[wall];
            let forward = anchor.transform.forward();
            let all_in_front = self.corners.iter().all(|&corner| {
                let to_corner = corner - anchor.transform.position + forward * tolerance;
                forward.dot(to_corner) >= 0.0
            });
            if all_in_front {
                return Some(wall);
            }
        }
        None
    }

    fn wall_width(&self, wall: usize) -> f32 {
        self.anchors[wall]
            .shape
            .plane()
            .map_or(0.0, |p| p.rect.size().x)
    }

    // -----------------------------------------------------------------------
    // Facing
    // -----------------------------------------------------------------------

    /// Likely facing direction of an anchor: planes face along their normal,
    /// volumes face away from the closest wall.
    pub fn facing_direction(&self, index: usize) -> Vec3 {
        let anchor = &self.anchors[index];
        if anchor.shape.volume().is_none() {
            return anchor.transform.forward();
        }
        self.direction_away_from_closest_wall(index, &[]).0
    }

    /// Sweep the four horizontal cardinal axes of a volume anchor against
    /// every wall and point away from whichever wall is closest. Returns the
    /// direction and the winning axis index.
    pub fn direction_away_from_closest_wall(
        &self,
        index: usize,
        excluded_axes: &[usize],
    ) -> (Vec3, usize) {
        let anchor = &self.anchors[index];
        let mut closest_wall_distance = f32::INFINITY;
        // volume pivots point local forward upward, so the horizontal front
        // axis is -up
        let mut away_from_wall = anchor.transform.up();
        let mut cardinal_index = 0;

        for axis in 0..4 {
            if excluded_axes.contains(&axis) {
                continue;
            }
            let cardinal = Quat::from_rotation_y((90.0 * axis as f32).to_radians())
                * -anchor.transform.up();
            let ray = Ray::new(anchor.transform.position, cardinal);
            for &wall in &self.walls {
                if let Some(hit) = self.anchors[wall].raycast(&ray, closest_wall_distance) {
                    closest_wall_distance = hit.distance;
                    cardinal_index = axis;
                    away_from_wall = -cardinal;
                }
            }
        }
        (away_from_wall, cardinal_index)
    }

    // -----------------------------------------------------------------------
    // Seats
    // -----------------------------------------------------------------------

    /// The seat pose best aligned with the gaze ray, for placements like
    /// remote callers. None when the room has no couches.
    pub fn closest_seat_pose(&self, ray: &Ray) -> Option<(Pose, usize)> {
        let mut best: Option<(Pose, usize)> = None;
        let mut closest_dot = -1.0;
        for seat in &self.seats {
            for pose in &seat.poses {
                let to_seat = (pose.position - ray.origin).normalize_or_zero();
                let dot = ray.direction.dot(to_seat);
                if dot > closest_dot {
                    closest_dot = dot;
                    best = Some((*pose, seat.anchor));
                }
            }
        }
        best
    }

    // -----------------------------------------------------------------------
    // Random positions
    // -----------------------------------------------------------------------

    /// Rejection-sample a free-space position in the room: inside the floor
    /// outline, at least `min_distance_to_surface` from every wall, and
    /// optionally outside all scene volumes. None when the constraints look
    /// unsatisfiable or the iteration cap runs out.
    pub fn generate_random_position_in_room(
        &self,
        rng: &mut impl Rng,
        min_distance_to_surface: f32,
        avoid_volumes: bool,
    ) -> Option<Vec3> {
        if self.floor.is_none() {
            return None;
        }
        let extents = self.bounds.size() * 0.5;
        let min_extent = extents.x.min(extents.y).min(extents.z);
        if min_distance_to_surface >= min_extent {
            // no position can satisfy the clearance, skip the sampling loop
            return None;
        }
        let min = self.bounds.min;
        let max = self.bounds.max;
        let wall_filter = LabelFilter::include([SceneLabel::WallFace]);

        for _ in 0..self.settings.max_sample_iterations {
            let candidate = Vec3::new(
                rng.gen_range(min.x + min_distance_to_surface..max.x - min_distance_to_surface),
                rng.gen_range(min.y + min_distance_to_surface..max.y - min_distance_to_surface),
                rng.gen_range(min.z + min_distance_to_surface..max.z - min_distance_to_surface),
            );
            if !self.is_position_in_room(candidate, true) {
                continue;
            }
            if let Some((_, _, wall_distance, _)) =
                self.closest_surface_position(candidate, &wall_filter)
            {
                if wall_distance <= min_distance_to_surface {
                    continue;
                }
            }
            if avoid_volumes
                && self.is_position_in_scene_volume(candidate, min_distance_to_surface)
            {
                continue;
            }
            return Some(candidate);
        }
        debug!("free-space sampling gave up after {} iterations", self.settings.max_sample_iterations);
        None
    }

    /// Rejection-sample a position on a filtered surface: candidate faces
    /// are weighted by usable area, the sample keeps `min_distance_to_edge`
    /// clearance, and plane anchors recheck their boundary polygon. Returns
    /// the world position and the outward surface normal.
    pub fn generate_random_position_on_surface(
        &self,
        rng: &mut impl Rng,
        surface_types: SurfaceMask,
        min_distance_to_edge: f32,
        filter: &LabelFilter,
    ) -> Option<(Vec3, Vec3)> {
        let min_width = 2.0 * min_distance_to_edge;
        let mut surfaces: Vec<SampleSurface> = Vec::new();
        let mut total_usable_area = 0.0;

        for (i, anchor) in self.anchors.iter().enumerate() {
            if !filter.passes(&anchor.labels) {
                continue;
            }
            if let Some(plane) = anchor.shape.plane() {
                let forward_y = anchor.transform.forward().y;
                let wanted = if forward_y >= INV_SQRT_2 {
                    surface_types.contains(SurfaceMask::FACING_UP)
                } else if forward_y <= -INV_SQRT_2 {
                    surface_types.contains(SurfaceMask::FACING_DOWN)
                } else {
                    surface_types.contains(SurfaceMask::VERTICAL)
                };
                if wanted {
                    let size = plane.rect.size();
                    if size.x > min_width && size.y > min_width {
                        let usable_area = (size.x - min_width) * (size.y - min_width);
                        total_usable_area += usable_area;
                        surfaces.push(SampleSurface {
                            anchor: i,
                            usable_area,
                            is_plane: true,
                            bounds: plane.rect,
                            transform: anchor.transform,
                        });
                    }
                }
            }
            if let Some(volume) = anchor.shape.volume() {
                for face in 0..6 {
                    let wanted = match face {
                        0 => surface_types.contains(SurfaceMask::FACING_UP),
                        1 => surface_types.contains(SurfaceMask::FACING_DOWN),
                        _ => surface_types.contains(SurfaceMask::VERTICAL),
                    };
                    if !wanted {
                        continue;
                    }
                    let (bounds, offset, euler) = volume_face(volume, face);
                    let size = bounds.size();
                    if size.x > min_width && size.y > min_width {
                        let usable_area = (size.x - min_width) * (size.y - min_width);
                        total_usable_area += usable_area;
                        let face_transform = Transform::from_position_rotation(
                            anchor.transform.transform_point(offset),
                            anchor.transform.rotation * quat_from_euler_degrees(euler),
                        );
                        surfaces.push(SampleSurface {
                            anchor: i,
                            usable_area,
                            is_plane: false,
                            bounds,
                            transform: face_transform,
                        });
                    }
                }
            }
        }

        if surfaces.is_empty() {
            return None;
        }

        for _ in 0..self.settings.max_sample_iterations {
            // pick a surface weighted by usable area
            let mut pick = rng.gen_range(0.0..total_usable_area);
            let mut index = 0;
            while index < surfaces.len() - 1 {
                pick -= surfaces[index].usable_area;
                if pick <= 0.0 {
                    break;
                }
                index += 1;
            }
            let surface = &surfaces[index];
            let bounds = surface.bounds;
            let local = Vec2::new(
                rng.gen_range(
                    bounds.min.x + min_distance_to_edge..bounds.max.x - min_distance_to_edge,
                ),
                rng.gen_range(
                    bounds.min.y + min_distance_to_edge..bounds.max.y - min_distance_to_edge,
                ),
            );
            if surface.is_plane {
                let in_boundary = self.anchors[surface.anchor]
                    .shape
                    .plane()
                    .map_or(false, |p| geometry::point_in_polygon(&p.boundary, local));
                if !in_boundary {
                    continue;
                }
            }
            let position = surface.transform.transform_point(local.extend(0.0));
            let normal = surface.transform.transform_direction(Vec3::Z);
            return Some((position, normal));
        }
        debug!("surface sampling gave up after {} iterations", self.settings.max_sample_iterations);
        None
    }
}

/// The local rect, pivot offset, and orientation of one volume face. Faces
/// are indexed +Z, -Z, +X, -X, +Y, -Y; the returned rotation turns local +Z
/// into the face's outward normal.
fn volume_face(volume: &Aabb, face: usize) -> (Rect2, Vec3, Vec3) {
    match face {
        0 => (
            Rect2::new(
                Vec2::new(volume.min.x, volume.min.y),
                Vec2::new(volume.max.x, volume.max.y),
            ),
            Vec3::new(0.0, 0.0, volume.max.z),
            Vec3::ZERO,
        ),
        1 => (
            Rect2::new(
                Vec2::new(-volume.max.x, volume.min.y),
                Vec2::new(-volume.min.x, volume.max.y),
            ),
            Vec3::new(0.0, 0.0, volume.min.z),
            Vec3::new(0.0, 180.0, 0.0),
        ),
        2 => (
            Rect2::new(
                Vec2::new(-volume.max.z, volume.min.y),
                Vec2::new(-volume.min.z, volume.max.y),
            ),
            Vec3::new(volume.max.x, 0.0, 0.0),
            Vec3::new(0.0, 90.0, 0.0),
        ),
        3 => (
            Rect2::new(
                Vec2::new(volume.min.z, volume.min.y),
                Vec2::new(volume.max.z, volume.max.y),
            ),
            Vec3::new(volume.min.x, 0.0, 0.0),
            Vec3::new(0.0, -90.0, 0.0),
        ),
        4 => (
            Rect2::new(
                Vec2::new(volume.min.x, -volume.max.z),
                Vec2::new(volume.max.x, -volume.min.z),
            ),
            Vec3::new(0.0, volume.max.y, 0.0),
            Vec3::new(-90.0, 0.0, 0.0),
        ),
        _ => (
            Rect2::new(
                Vec2::new(volume.min.x, volume.min.z),
                Vec2::new(volume.max.x, volume.max.z),
            ),
            Vec3::new(0.0, volume.min.y, 0.0),
            Vec3::new(90.0, 0.0, 0.0),
        ),
    }
}
