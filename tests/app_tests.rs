//! Frame loop tests
//!
//! Tests for:
//! - `FramePump` driving scene updates and rendering
//! - Fixed-step accounting: idle frames, catch-up, hitches
//! - `LoopSettings` parsing and validation

use std::sync::Arc;
use std::time::Duration;

use arbor::prelude::*;
use serde_json::json;

// ============================================================================
// Helper
// ============================================================================

fn quarter_second_settings() -> LoopSettings {
    LoopSettings {
        fixed_timestep: 0.25,
        max_frame_delta: 1.0,
        max_steps_per_pump: 4,
        render_when_idle: false,
    }
}

/// One spinning cube at the origin.
fn spinning_cube(scene: &mut Scene) -> NodeHandle {
    let cube = scene.spawn("Cube");
    scene.attach_component(cube, MeshRenderer::new(Arc::new(Mesh::cube(1.0))));
    scene.add_component::<Spinner>(cube);
    cube
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn yaw(scene: &Scene, h: NodeHandle) -> f32 {
    scene.euler_angles(h).unwrap().y
}

// ============================================================================
// Pump
// ============================================================================

#[test]
fn pump_steps_then_renders() {
    let mut scene = Scene::new();
    let cube = spinning_cube(&mut scene);
    let mut pump = FramePump::new(quarter_second_settings()).unwrap();
    let mut list = DrawList::new();

    let report = pump.pump_with_elapsed(secs(0.5), &mut scene, &mut list);
    assert_eq!(report.steps, 2);
    assert!(report.rendered);
    assert_eq!(report.draws, 1);
    assert!((yaw(&scene, cube) - 45.0).abs() < 1e-3);

    // The draw saw the post-update transform
    let model = list.items()[0].model;
    assert!(model.abs_diff_eq(scene.local_to_world_matrix(cube).unwrap(), 1e-6));
}

#[test]
fn idle_frames_skip_render() {
    let mut scene = Scene::new();
    spinning_cube(&mut scene);
    let mut pump = FramePump::new(quarter_second_settings()).unwrap();
    let mut list = DrawList::new();

    let report = pump.pump_with_elapsed(secs(0.1), &mut scene, &mut list);
    assert_eq!(report.steps, 0);
    assert!(!report.rendered);
    assert!(list.is_empty());

    // Leftover time carries into the next frame
    let report = pump.pump_with_elapsed(secs(0.15), &mut scene, &mut list);
    assert_eq!(report.steps, 1);
    assert_eq!(list.len(), 1);
}

#[test]
fn render_when_idle_draws_every_pump() {
    let mut scene = Scene::new();
    spinning_cube(&mut scene);
    let settings = LoopSettings {
        render_when_idle: true,
        ..quarter_second_settings()
    };
    let mut pump = FramePump::new(settings).unwrap();
    let mut list = DrawList::new();

    let report = pump.pump_with_elapsed(Duration::ZERO, &mut scene, &mut list);
    assert_eq!(report.steps, 0);
    assert!(report.rendered);
    assert_eq!(report.draws, 1);
}

#[test]
fn hitches_are_capped() {
    let mut scene = Scene::new();
    let cube = spinning_cube(&mut scene);
    let mut pump = FramePump::new(quarter_second_settings()).unwrap();
    let mut list = DrawList::new();

    let report = pump.pump_with_elapsed(secs(3.0), &mut scene, &mut list);
    assert_eq!(report.steps, 4);
    assert!((report.dropped - 2.0).abs() < 1e-4);
    // One simulated second at 90 degrees per second
    assert!((yaw(&scene, cube) - 90.0).abs() < 1e-3);
    assert_eq!(pump.clock().step_count, 4);
    assert_eq!(pump.clock().simulated, Duration::from_secs(1));
}

#[test]
fn backlog_beyond_step_cap_is_dropped() {
    let mut scene = Scene::new();
    spinning_cube(&mut scene);
    let settings = LoopSettings {
        max_steps_per_pump: 2,
        ..quarter_second_settings()
    };
    let mut pump = FramePump::new(settings).unwrap();
    let mut list = DrawList::new();

    let report = pump.pump_with_elapsed(secs(1.0), &mut scene, &mut list);
    assert_eq!(report.steps, 2);
    assert!((report.dropped - 0.5).abs() < 1e-4);

    // Nothing left over to catch up on
    let report = pump.pump_with_elapsed(Duration::ZERO, &mut scene, &mut list);
    assert_eq!(report.steps, 0);
}

#[test]
fn inactive_nodes_neither_update_nor_draw() {
    let mut scene = Scene::new();
    let cube = spinning_cube(&mut scene);
    scene.set_active(cube, false);
    let mut pump = FramePump::new(quarter_second_settings()).unwrap();
    let mut list = DrawList::new();

    let report = pump.pump_with_elapsed(secs(0.5), &mut scene, &mut list);
    assert_eq!(report.steps, 2);
    assert_eq!(report.draws, 0);
    assert!(yaw(&scene, cube).abs() < 1e-6);
}

#[test]
fn child_draws_use_world_matrices() {
    let mut scene = Scene::new();
    let arm = scene.spawn("Arm");
    let hand = scene.spawn_child(arm, "Hand").unwrap();
    scene.set_position(hand, Vec3::Z * 2.0);
    scene.attach_component(hand, MeshRenderer::new(Arc::new(Mesh::cube(0.5))));
    scene.attach_component(arm, Spinner::new(Vec3::Y, 360.0));

    let mut pump = FramePump::new(quarter_second_settings()).unwrap();
    let mut list = DrawList::new();
    pump.pump_with_elapsed(secs(0.25), &mut scene, &mut list);

    // A quarter turn swings the hand from +Z to +X
    let draw = &list.items()[0];
    assert_eq!(draw.node, hand);
    let p = draw.model.transform_point3(Vec3::ZERO);
    assert!(p.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-4));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn partial_json_keeps_defaults() {
    let doc = json!({ "fixed_timestep": 0.02, "render_when_idle": true });
    let settings = LoopSettings::from_json_str(&doc.to_string()).unwrap();
    assert!((settings.fixed_timestep - 0.02).abs() < 1e-6);
    assert!(settings.render_when_idle);
    assert_eq!(settings.max_steps_per_pump, LoopSettings::default().max_steps_per_pump);
}

#[test]
fn invalid_settings_are_rejected() {
    let bad = [
        json!({ "fixed_timestep": 0.0 }),
        json!({ "fixed_timestep": 0.5, "max_frame_delta": 0.1 }),
        json!({ "max_steps_per_pump": 0 }),
    ];
    for doc in bad {
        assert!(
            matches!(
                LoopSettings::from_json_str(&doc.to_string()),
                Err(ArborError::InvalidSettings(_))
            ),
            "{doc}"
        );
    }

    let zero_steps = LoopSettings {
        max_steps_per_pump: 0,
        ..LoopSettings::default()
    };
    assert!(FramePump::new(zero_steps).is_err());
}

#[test]
fn malformed_json_is_a_json_error() {
    assert!(matches!(
        LoopSettings::from_json_str("{ fixed_timestep: "),
        Err(ArborError::JsonError(_))
    ));
}

#[test]
fn load_reads_a_file() {
    let path = std::env::temp_dir().join(format!("arbor_loop_{}.json", std::process::id()));
    let settings = quarter_second_settings();
    std::fs::write(&path, settings.to_json_string().unwrap()).unwrap();

    let loaded = LoopSettings::load(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.unwrap(), settings);

    assert!(matches!(
        LoopSettings::load(path.with_extension("missing")),
        Err(ArborError::IoError(_))
    ));
}
