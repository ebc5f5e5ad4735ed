//! Leaf geometry unit tests

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use roomkit::geometry::{
        angle_degrees, closest_point_on_box, ortho_normalize, point_in_polygon,
        raycast_plane_local, raycast_volume_local,
    };
    use roomkit::Aabb;

    fn square(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    }

    // -----------------------------------------------------------------------
    // Polygon containment
    // -----------------------------------------------------------------------

    #[test]
    fn point_inside_square() {
        let boundary = square(1.0);
        assert!(point_in_polygon(&boundary, Vec2::new(0.0, 0.0)));
        assert!(point_in_polygon(&boundary, Vec2::new(0.9, -0.9)));
    }

    #[test]
    fn point_outside_square() {
        let boundary = square(1.0);
        assert!(!point_in_polygon(&boundary, Vec2::new(1.5, 0.0)));
        assert!(!point_in_polygon(&boundary, Vec2::new(0.0, -1.01)));
        assert!(!point_in_polygon(&boundary, Vec2::new(-2.0, 2.0)));
    }

    #[test]
    fn concave_polygon_notch_is_outside() {
        // A square with a notch cut into its right side.
        let boundary = vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, -0.2),
            Vec2::new(0.2, -0.2),
            Vec2::new(0.2, 0.2),
            Vec2::new(1.0, 0.2),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ];
        assert!(
            !point_in_polygon(&boundary, Vec2::new(0.6, 0.0)),
            "point in the notch should be outside"
        );
        assert!(
            point_in_polygon(&boundary, Vec2::new(-0.5, 0.0)),
            "point in the body should be inside"
        );
        assert!(
            point_in_polygon(&boundary, Vec2::new(0.6, 0.6)),
            "point above the notch should be inside"
        );
    }

    #[test]
    fn crossing_test_is_consistent_near_vertices() {
        // Rays through a vertex must not double-count the two edges that
        // meet there.
        let boundary = square(1.0);
        assert!(point_in_polygon(&boundary, Vec2::new(0.0, -1.0 + 1e-4)));
        assert!(!point_in_polygon(&boundary, Vec2::new(-1.5, 1.0)));
    }

    // -----------------------------------------------------------------------
    // Plane raycast (local space, Z=0 plane)
    // -----------------------------------------------------------------------

    #[test]
    fn plane_raycast_front_hit() {
        let boundary = square(1.0);
        let entry = raycast_plane_local(
            Vec3::new(0.2, 0.3, 2.0),
            Vec3::new(0.0, 0.0, -1.0),
            &boundary,
            f32::INFINITY,
        );
        assert_eq!(entry, Some(2.0));
    }

    #[test]
    fn plane_raycast_back_side_misses() {
        let boundary = square(1.0);
        let entry = raycast_plane_local(
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(0.0, 0.0, 1.0),
            &boundary,
            f32::INFINITY,
        );
        assert_eq!(entry, None, "rays along +Z approach from behind");
    }

    #[test]
    fn plane_raycast_respects_max_distance() {
        let boundary = square(1.0);
        let entry = raycast_plane_local(
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, -1.0),
            &boundary,
            1.5,
        );
        assert_eq!(entry, None);
    }

    #[test]
    fn plane_raycast_misses_outside_boundary() {
        let boundary = square(1.0);
        let entry = raycast_plane_local(
            Vec3::new(3.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, -1.0),
            &boundary,
            f32::INFINITY,
        );
        assert_eq!(entry, None);
    }

    // -----------------------------------------------------------------------
    // Volume raycast (local space slab test)
    // -----------------------------------------------------------------------

    #[test]
    fn volume_raycast_hits_entry_face() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let (entry, normal) = raycast_volume_local(
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            &bounds,
            f32::INFINITY,
        )
        .expect("ray aimed at the box should hit");
        assert!((entry - 2.0).abs() < 1e-6);
        assert_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn volume_raycast_diagonal_reports_entered_face() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let (_, normal) = raycast_volume_local(
            Vec3::new(0.0, 4.0, 0.5),
            Vec3::new(0.0, -1.0, 0.0),
            &bounds,
            f32::INFINITY,
        )
        .expect("ray should enter through the top face");
        assert_eq!(normal, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn volume_raycast_parallel_outside_slab_misses() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let hit = raycast_volume_local(
            Vec3::new(-3.0, 2.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            &bounds,
            f32::INFINITY,
        );
        assert!(hit.is_none(), "ray above the box runs parallel to the Y slab");
    }

    #[test]
    fn volume_raycast_pointing_away_misses() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let hit = raycast_volume_local(
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            &bounds,
            f32::INFINITY,
        );
        assert!(hit.is_none());
    }

    // -----------------------------------------------------------------------
    // Closest point on bounds
    // -----------------------------------------------------------------------

    #[test]
    fn closest_point_outside_clamps() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let (point, distance) = closest_point_on_box(Vec3::new(3.0, 0.5, 0.0), &bounds);
        assert_eq!(point, Vec3::new(1.0, 0.5, 0.0));
        assert!((distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn closest_point_inside_is_negative() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let (point, distance) = closest_point_on_box(Vec3::new(0.8, 0.0, 0.0), &bounds);
        assert_eq!(
            point,
            Vec3::new(1.0, 0.0, 0.0),
            "nearest face is +X at 0.2 penetration"
        );
        assert!((distance + 0.2).abs() < 1e-6, "inside distance is signed negative");
    }

    // -----------------------------------------------------------------------
    // Angles and projection
    // -----------------------------------------------------------------------

    #[test]
    fn angle_between_axes_is_ninety() {
        let angle = angle_degrees(Vec3::X, Vec3::Y);
        assert!((angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn angle_with_zero_vector_is_zero() {
        assert_eq!(angle_degrees(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn ortho_normalize_projects_onto_plane() {
        let tangent = ortho_normalize(Vec3::Y, Vec3::new(1.0, 3.0, 0.0));
        assert!((tangent - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn ortho_normalize_degenerate_is_zero() {
        let tangent = ortho_normalize(Vec3::Y, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(tangent, Vec3::ZERO);
    }
}
