//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use glam::{Quat, Vec3};
use roomkit::{build_template_room, Room, Scene, SceneLabel, SceneSettings, TemplateBox};

/// The scanned reference room, in native coordinates: 8 walls, 4 OTHER
/// volumes, a table, a couch, a window, a door, floor and ceiling.
pub const UNITY_SCENE: &str = include_str!("../fixtures/scene_unity.json");
/// The same room expressed in the Unreal convention.
pub const UNREAL_SCENE: &str = include_str!("../fixtures/scene_unreal.json");

pub fn fixture_scene() -> Scene {
    let mut scene = Scene::new(SceneSettings::default());
    scene
        .load_from_json(UNITY_SCENE)
        .expect("reference scene should load");
    scene
}

pub fn fixture_room() -> Room {
    fixture_scene().rooms()[0].clone()
}

fn yaw(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees.to_radians())
}

/// A hand-authored 5m x 4m x 3m rectangular room with a table on the east
/// side and an elongated couch near the west wall.
pub fn template_boxes() -> Vec<TemplateBox> {
    vec![
        TemplateBox::new(
            SceneLabel::WallFace,
            Vec3::new(0.0, 1.5, 2.0),
            Quat::IDENTITY,
            Vec3::new(5.0, 3.0, 1.0),
        ),
        TemplateBox::new(
            SceneLabel::WallFace,
            Vec3::new(0.0, 1.5, -2.0),
            yaw(180.0),
            Vec3::new(5.0, 3.0, 1.0),
        ),
        TemplateBox::new(
            SceneLabel::WallFace,
            Vec3::new(2.5, 1.5, 0.0),
            yaw(90.0),
            Vec3::new(4.0, 3.0, 1.0),
        ),
        TemplateBox::new(
            SceneLabel::WallFace,
            Vec3::new(-2.5, 1.5, 0.0),
            yaw(-90.0),
            Vec3::new(4.0, 3.0, 1.0),
        ),
        TemplateBox::new(
            SceneLabel::Table,
            Vec3::new(1.5, 0.4, 0.0),
            Quat::IDENTITY,
            Vec3::new(1.2, 0.8, 0.8),
        ),
        TemplateBox::new(
            SceneLabel::Couch,
            Vec3::new(-1.8, 0.35, 0.0),
            Quat::IDENTITY,
            Vec3::new(0.9, 0.7, 2.2),
        ),
    ]
}

pub fn template_room() -> Room {
    let descriptor = build_template_room(&template_boxes()).expect("walls form a closed loop");
    let mut scene = Scene::new(SceneSettings::default());
    scene
        .load_rooms(vec![descriptor])
        .expect("template descriptors are valid");
    scene.rooms()[0].clone()
}

pub fn assert_vec3_near(actual: Vec3, expected: Vec3, tolerance: f32, what: &str) {
    assert!(
        (actual - expected).length() <= tolerance,
        "{} was {:?}, expected {:?} (within {})",
        what,
        actual,
        expected,
        tolerance
    );
}
