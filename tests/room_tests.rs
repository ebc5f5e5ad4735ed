//! Derived room model tests: outline, bounds, hierarchy, seats, queries

mod common;

#[cfg(test)]
mod tests {
    use crate::common;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use roomkit::{
        build_template_room, LabelFilter, PositioningMethod, Ray, Room, Scene, SceneLabel,
        SceneSettings, SurfaceMask,
    };

    fn find_anchor(room: &Room, label: SceneLabel) -> usize {
        room.anchors()
            .iter()
            .position(|a| a.has_label(label))
            .unwrap_or_else(|| panic!("room should contain a {} anchor", label))
    }

    // -----------------------------------------------------------------------
    // Classification and outline
    // -----------------------------------------------------------------------

    #[test]
    fn template_room_classifies_anchors() {
        let room = common::template_room();
        assert!(room.is_computed());
        assert_eq!(room.wall_anchors().len(), 4);
        assert!(room.floor_anchor().is_some());
        assert!(room.ceiling_anchor().is_some());
        assert!(room.global_mesh_anchor().is_none());
        // 4 walls + floor + ceiling + table + couch
        assert_eq!(room.anchors().len(), 8);
    }

    #[test]
    fn outline_has_one_corner_per_wall_at_ground_level() {
        let room = common::template_room();
        let outline = room.outline();
        assert_eq!(outline.len(), 4);
        for corner in outline {
            assert!(corner.y.abs() < 1e-4, "outline corners sit at Y=0");
        }
        let expected = [
            Vec3::new(2.5, 0.0, 2.0),
            Vec3::new(2.5, 0.0, -2.0),
            Vec3::new(-2.5, 0.0, -2.0),
            Vec3::new(-2.5, 0.0, 2.0),
        ];
        for want in expected {
            assert!(
                outline.iter().any(|c| (*c - want).length() < 1e-3),
                "missing outline corner {:?} in {:?}",
                want,
                outline
            );
        }
    }

    #[test]
    fn bounds_span_the_walls() {
        let room = common::template_room();
        common::assert_vec3_near(room.bounds().size(), Vec3::new(5.0, 3.0, 4.0), 1e-3, "bounds size");
        common::assert_vec3_near(
            room.bounds().center(),
            Vec3::new(0.0, 1.5, 0.0),
            1e-3,
            "bounds center",
        );
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    #[test]
    fn furniture_parents_to_the_floor() {
        let room = common::template_room();
        let floor = room.floor_anchor().unwrap();
        let table = find_anchor(&room, SceneLabel::Table);
        let couch = find_anchor(&room, SceneLabel::Couch);
        assert_eq!(room.parent_of(table), Some(floor));
        assert_eq!(room.parent_of(couch), Some(floor));
        assert!(room.children_of(floor).contains(&table));
        assert!(room.children_of(floor).contains(&couch));
    }

    #[test]
    fn walls_do_not_parent_themselves() {
        let room = common::template_room();
        for &wall in room.wall_anchors() {
            assert_eq!(room.parent_of(wall), None);
            assert!(room.children_of(wall).is_empty());
        }
    }

    // -----------------------------------------------------------------------
    // Seats
    // -----------------------------------------------------------------------

    #[test]
    fn elongated_couch_gets_three_seats() {
        let room = common::template_room();
        let couch = find_anchor(&room, SceneLabel::Couch);
        assert_eq!(room.seats().len(), 1);
        let seat = &room.seats()[0];
        assert_eq!(seat.anchor, couch);
        assert_eq!(seat.poses.len(), 3, "2.2m couch fits three 0.6m seats");

        // seats face away from the nearest (west) wall
        for pose in &seat.poses {
            common::assert_vec3_near(pose.forward(), Vec3::X, 1e-3, "seat facing");
            assert!((pose.position.y - 0.7).abs() < 1e-3, "seats sit on the couch top");
        }
        let spacing = 2.2 / 3.0;
        for want_z in [-spacing, 0.0, spacing] {
            assert!(
                seat.poses.iter().any(|p| (p.position.z - want_z).abs() < 1e-3),
                "missing seat slot near z={}",
                want_z
            );
        }
    }

    #[test]
    fn couch_at_the_aspect_limit_gets_one_centered_seat() {
        // A 2.0 x 1.0 top surface sits exactly on the 2:1 aspect limit and
        // still counts as roughly square.
        let mut boxes = common::template_boxes();
        let couch_box = boxes
            .iter_mut()
            .find(|b| b.label == SceneLabel::Couch)
            .expect("template has a couch");
        couch_box.scale = Vec3::new(2.0, 0.7, 1.0);

        let descriptor = build_template_room(&boxes).expect("walls form a closed loop");
        let mut scene = Scene::new(SceneSettings::default());
        scene
            .load_rooms(vec![descriptor])
            .expect("template descriptors are valid");
        let room = &scene.rooms()[0];

        let couch = find_anchor(room, SceneLabel::Couch);
        assert_eq!(room.seats().len(), 1);
        let seat = &room.seats()[0];
        assert_eq!(seat.anchor, couch);
        assert_eq!(seat.poses.len(), 1, "a square-ish couch seats at its center");
        common::assert_vec3_near(
            seat.poses[0].position,
            room.anchors()[couch].transform.position,
            1e-3,
            "centered seat",
        );
    }

    #[test]
    fn closest_seat_pose_follows_the_gaze() {
        let room = common::template_room();
        let couch = find_anchor(&room, SceneLabel::Couch);
        let ray = Ray::new(Vec3::new(2.0, 1.0, 0.0), -Vec3::X);
        let (pose, anchor) = room.closest_seat_pose(&ray).expect("room has a couch");
        assert_eq!(anchor, couch);
        common::assert_vec3_near(
            pose.position,
            Vec3::new(-1.8, 0.7, 0.0),
            1e-3,
            "the middle seat is best aligned",
        );
    }

    // -----------------------------------------------------------------------
    // Containment
    // -----------------------------------------------------------------------

    #[test]
    fn containment_follows_the_floor_outline() {
        let room = common::template_room();
        assert!(room.is_position_in_room(Vec3::new(0.0, 1.0, 0.0), true));
        assert!(room.is_position_in_room(Vec3::new(2.4, 0.5, -1.9), true));
        assert!(!room.is_position_in_room(Vec3::new(3.0, 1.0, 0.0), true));
        assert!(!room.is_position_in_room(Vec3::new(0.0, 1.0, 2.5), true));
    }

    #[test]
    fn vertical_bounds_are_optional() {
        let room = common::template_room();
        let above = Vec3::new(0.0, 3.5, 0.0);
        assert!(room.is_position_in_room(above, false));
        assert!(!room.is_position_in_room(above, true));
        assert!(!room.is_position_in_room(Vec3::new(0.0, -0.1, 0.0), true));
    }

    #[test]
    fn scene_volume_containment_finds_the_table() {
        let room = common::template_room();
        let table = find_anchor(&room, SceneLabel::Table);
        assert!(room.is_position_in_scene_volume(Vec3::new(1.5, 0.4, 0.0), 0.0));
        assert_eq!(
            room.position_in_scene_volume(Vec3::new(1.5, 0.4, 0.0), true, 0.0),
            Some(table)
        );
        assert!(!room.is_position_in_scene_volume(Vec3::new(0.0, 1.0, 0.0), 0.0));
    }

    #[test]
    fn volume_buffer_extends_containment() {
        let room = common::template_room();
        // just outside the table footprint, inside with a 0.3m buffer
        let beside = Vec3::new(1.5, 0.4, 0.55);
        assert!(!room.is_position_in_scene_volume(beside, 0.0));
        assert!(room.is_position_in_scene_volume(beside, 0.3));
    }

    // -----------------------------------------------------------------------
    // Surface queries
    // -----------------------------------------------------------------------

    #[test]
    fn closest_wall_from_room_center() {
        let room = common::template_room();
        let filter = LabelFilter::include([SceneLabel::WallFace]);
        let (point, normal, distance, index) = room
            .closest_surface_position(Vec3::new(0.0, 1.5, 0.0), &filter)
            .expect("walls exist");
        assert!((distance - 2.0).abs() < 1e-3, "nearest walls are 2m away, got {}", distance);
        assert!((point.z.abs() - 2.0).abs() < 1e-3);
        assert!(normal.y.abs() < 1e-3, "wall normals are horizontal");
        assert!(
            normal.dot(Vec3::new(0.0, 1.5, 0.0) - point) > 0.9,
            "the wall faces back into the room"
        );
        assert!(room.anchors()[index].has_label(SceneLabel::WallFace));
    }

    #[test]
    fn largest_surface_by_label() {
        let room = common::template_room();
        let table = find_anchor(&room, SceneLabel::Table);
        assert_eq!(room.find_largest_surface(SceneLabel::Table), Some(table));
        assert_eq!(room.find_largest_surface(SceneLabel::Bed), None);
    }

    #[test]
    fn key_wall_is_a_long_wall() {
        let room = common::template_room();
        let wall = room.key_wall(0.1).expect("rectangular rooms have a key wall");
        let width = room.anchors()[wall]
            .shape
            .plane()
            .map(|p| p.rect.size().x)
            .unwrap_or(0.0);
        assert!((width - 5.0).abs() < 1e-3, "key wall should be 5m wide, got {}", width);
    }

    // -----------------------------------------------------------------------
    // Facing
    // -----------------------------------------------------------------------

    #[test]
    fn couch_faces_away_from_the_west_wall() {
        let room = common::template_room();
        let couch = find_anchor(&room, SceneLabel::Couch);
        common::assert_vec3_near(room.facing_direction(couch), Vec3::X, 1e-3, "couch facing");
    }

    #[test]
    fn table_faces_away_from_the_east_wall() {
        let room = common::template_room();
        let table = find_anchor(&room, SceneLabel::Table);
        let (away, axis) = room.direction_away_from_closest_wall(table, &[]);
        common::assert_vec3_near(away, -Vec3::X, 1e-3, "away direction");
        assert_eq!(axis, 1);
    }

    #[test]
    fn excluding_the_winning_axis_changes_the_answer() {
        let room = common::template_room();
        let table = find_anchor(&room, SceneLabel::Table);
        let (_, axis) = room.direction_away_from_closest_wall(table, &[]);
        let (_, other_axis) = room.direction_away_from_closest_wall(table, &[axis]);
        assert_ne!(axis, other_axis);
    }

    #[test]
    fn plane_anchors_face_along_their_normal() {
        let room = common::template_room();
        let floor = room.floor_anchor().unwrap();
        common::assert_vec3_near(room.facing_direction(floor), Vec3::Y, 1e-3, "floor facing");
    }

    // -----------------------------------------------------------------------
    // Pose from raycast
    // -----------------------------------------------------------------------

    #[test]
    fn volume_top_pose_snaps_to_center() {
        let room = common::template_room();
        let table = find_anchor(&room, SceneLabel::Table);
        let ray = Ray::new(Vec3::new(1.9, 2.0, 0.1), -Vec3::Y);
        let (pose, index, normal) = room
            .best_pose_from_raycast(&ray, f32::INFINITY, &LabelFilter::any(), PositioningMethod::Center)
            .expect("ray hits the table top");
        assert_eq!(index, table);
        common::assert_vec3_near(normal, Vec3::Y, 1e-3, "top surface normal");
        common::assert_vec3_near(pose.position, Vec3::new(1.5, 0.8, 0.0), 1e-3, "centered pose");
        common::assert_vec3_near(pose.forward(), Vec3::X, 1e-3, "pose faces the near long edge");
    }

    #[test]
    fn volume_top_pose_edge_offsets_along_forward() {
        let room = common::template_room();
        let ray = Ray::new(Vec3::new(1.9, 2.0, 0.1), -Vec3::Y);
        let (pose, _, _) = room
            .best_pose_from_raycast(&ray, f32::INFINITY, &LabelFilter::any(), PositioningMethod::Edge)
            .expect("ray hits the table top");
        common::assert_vec3_near(pose.position, Vec3::new(2.1, 0.8, 0.0), 1e-3, "edge pose");
    }

    #[test]
    fn volume_top_pose_default_stays_at_the_hit() {
        let room = common::template_room();
        let ray = Ray::new(Vec3::new(1.9, 2.0, 0.1), -Vec3::Y);
        let (pose, _, _) = room
            .best_pose_from_raycast(&ray, f32::INFINITY, &LabelFilter::any(), PositioningMethod::Default)
            .expect("ray hits the table top");
        common::assert_vec3_near(pose.position, Vec3::new(1.9, 0.8, 0.1), 1e-3, "default pose");
    }

    #[test]
    fn floor_pose_faces_back_toward_the_viewer() {
        let room = common::template_room();
        let ray = Ray::new(Vec3::new(0.0, 1.5, -1.0), Vec3::new(0.0, -1.0, 0.4));
        let (pose, index, _) = room
            .best_pose_from_raycast(&ray, f32::INFINITY, &LabelFilter::any(), PositioningMethod::Default)
            .expect("ray hits the floor");
        assert!(room.anchors()[index].has_label(SceneLabel::Floor));
        let to_viewer = Vec3::new(
            ray.origin.x - pose.position.x,
            0.0,
            ray.origin.z - pose.position.z,
        )
        .normalize();
        common::assert_vec3_near(pose.forward(), to_viewer, 1e-3, "pose forward");
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    #[test]
    fn has_all_labels_checks_the_whole_set() {
        let room = common::template_room();
        assert!(room.has_all_labels(&[
            SceneLabel::Floor,
            SceneLabel::Ceiling,
            SceneLabel::WallFace,
            SceneLabel::Table,
            SceneLabel::Couch,
        ]));
        assert!(!room.has_all_labels(&[SceneLabel::Floor, SceneLabel::Bed]));
    }

    // -----------------------------------------------------------------------
    // Random positions
    // -----------------------------------------------------------------------

    #[test]
    fn random_positions_respect_clearance_and_volumes() {
        let room = common::template_room();
        let mut rng = StdRng::seed_from_u64(7);
        let wall_filter = LabelFilter::include([SceneLabel::WallFace]);
        for _ in 0..25 {
            let position = room
                .generate_random_position_in_room(&mut rng, 0.3, true)
                .expect("the room has plenty of free space");
            assert!(room.is_position_in_room(position, true));
            assert!(!room.is_position_in_scene_volume(position, 0.3));
            let (_, _, wall_distance, _) = room
                .closest_surface_position(position, &wall_filter)
                .unwrap();
            assert!(
                wall_distance > 0.3,
                "position {:?} is only {}m from a wall",
                position,
                wall_distance
            );
        }
    }

    #[test]
    fn impossible_clearance_returns_none() {
        let room = common::template_room();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(room
            .generate_random_position_in_room(&mut rng, 10.0, true)
            .is_none());
    }

    #[test]
    fn surface_samples_land_on_the_table_top() {
        let room = common::template_room();
        let mut rng = StdRng::seed_from_u64(11);
        let filter = LabelFilter::include([SceneLabel::Table]);
        for _ in 0..25 {
            let (position, normal) = room
                .generate_random_position_on_surface(
                    &mut rng,
                    SurfaceMask::FACING_UP,
                    0.1,
                    &filter,
                )
                .expect("the table top is sampleable");
            common::assert_vec3_near(normal, Vec3::Y, 1e-3, "top surface normal");
            assert!((position.y - 0.8).abs() < 1e-3, "sample at table height, got {:?}", position);
            assert!((position.x - 1.5).abs() <= 0.5 + 1e-3);
            assert!(position.z.abs() <= 0.3 + 1e-3);
        }
    }

    #[test]
    fn vertical_surface_samples_have_horizontal_normals() {
        let room = common::template_room();
        let mut rng = StdRng::seed_from_u64(13);
        let filter = LabelFilter::include([SceneLabel::WallFace]);
        for _ in 0..25 {
            let (position, normal) = room
                .generate_random_position_on_surface(
                    &mut rng,
                    SurfaceMask::VERTICAL,
                    0.3,
                    &filter,
                )
                .expect("walls are sampleable");
            assert!(normal.y.abs() < 1e-3, "wall normals are horizontal");
            assert!(position.y > 0.3 - 1e-3 && position.y < 2.7 + 1e-3);
        }
    }

    #[test]
    fn surface_sampling_without_candidates_returns_none() {
        let room = common::template_room();
        let mut rng = StdRng::seed_from_u64(17);
        let filter = LabelFilter::include([SceneLabel::Bed]);
        assert!(room
            .generate_random_position_on_surface(&mut rng, SurfaceMask::ANY, 0.1, &filter)
            .is_none());
    }
}
