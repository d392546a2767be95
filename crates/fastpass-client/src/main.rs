//! fastpass client — Bevy viewer for the visitor building floor plans.
//!
//! The engine (floor model, geometry, collision, camera, interaction) lives
//! in `fastpass-logic`; this binary renders its scene graph, feeds input in,
//! and relays its notifications. Per-frame work runs in the engine's fixed
//! order: input → session tick → scene/door/avatar sync → camera → HUD.

use bevy::prelude::*;

use fastpass_logic::floor::FloorDescriptor;
use fastpass_logic::session::FloorSession;

mod camera;
mod input;
mod rendering;
mod state;

use state::{ActiveSession, Building, LaunchConfig, NotificationBus, PermissionDemo, SavedViewports};

const BUILDING_JSON: &str = include_str!("../../../data/building.json");

fn main() {
    let config = LaunchConfig::from_args();
    let floors: Vec<FloorDescriptor> = match serde_json::from_str(BUILDING_JSON) {
        Ok(floors) => floors,
        Err(e) => {
            eprintln!("building.json is invalid: {e}");
            std::process::exit(1);
        }
    };
    if floors.is_empty() {
        eprintln!("building.json contains no floors");
        std::process::exit(1);
    }
    let active = config
        .start_floor
        .and_then(|n| floors.iter().position(|f| f.floor == n))
        .unwrap_or(0);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "fastpass — Building Viewer".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(Building { floors, active })
        .insert_resource(ActiveSession::default())
        .insert_resource(SavedViewports::default())
        .insert_resource(PermissionDemo::default())
        .insert_resource(NotificationBus::default())
        .add_systems(
            Startup,
            (camera::setup_camera, rendering::setup_fixtures, setup_session),
        )
        .add_systems(
            Update,
            (
                input::keyboard_input,
                input::floor_switch_input,
                input::wheel_zoom,
                input::pointer_input,
                input::window_resize,
                drive_session,
                rendering::sync_scene,
                rendering::sync_doors,
                rendering::sync_avatar,
                camera::apply_camera_rig,
                rendering::update_hud,
            )
                .chain(),
        )
        .run();
}

/// Load the starting floor into a fresh session.
fn setup_session(
    mut active: ResMut<ActiveSession>,
    building: Res<Building>,
    windows: Query<&Window>,
) {
    let mut session = FloorSession::load(building.active_floor().clone());
    if let Ok(window) = windows.get_single() {
        session.resize(window.width(), window.height());
    }
    info!("loaded {}", building.active_floor().name);
    active.session = Some(session);
    active.scene_dirty = true;
}

/// One engine tick per frame: player movement, zone check, camera smoothing.
fn drive_session(
    mut active: ResMut<ActiveSession>,
    time: Res<Time>,
    mut bus: ResMut<NotificationBus>,
) {
    let Some(session) = active.session.as_mut() else {
        return;
    };
    let notes = session.tick(time.delta_secs());
    bus.publish(notes);
}
