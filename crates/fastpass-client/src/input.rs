//! Input handling for the fastpass client.
//!
//! Keyboard edges feed the player controller, clicks go to the picking
//! pipeline, and keybinds drive view mode, zoom, floor switching (with
//! vantage preservation), and the demo badge cycler.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::WindowResized;

use fastpass_logic::floor::AccessLevel;
use fastpass_logic::movement::MoveKey;

use crate::state::{ActiveSession, Building, NotificationBus, PermissionDemo, SavedViewports};

const MOVE_BINDINGS: &[(KeyCode, MoveKey)] = &[
    (KeyCode::KeyW, MoveKey::Forward),
    (KeyCode::ArrowUp, MoveKey::Forward),
    (KeyCode::KeyS, MoveKey::Back),
    (KeyCode::ArrowDown, MoveKey::Back),
    (KeyCode::KeyA, MoveKey::Left),
    (KeyCode::ArrowLeft, MoveKey::Left),
    (KeyCode::KeyD, MoveKey::Right),
    (KeyCode::ArrowRight, MoveKey::Right),
];

pub fn keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut active: ResMut<ActiveSession>,
    building: Res<Building>,
    mut demo: ResMut<PermissionDemo>,
    mut bus: ResMut<NotificationBus>,
    mut room_cursor: Local<usize>,
) {
    let Some(session) = active.session.as_mut() else {
        return;
    };

    // Movement keys, edge-triggered both ways.
    for &(code, key) in MOVE_BINDINGS {
        if keyboard.just_pressed(code) {
            session.set_move_key(key, true);
        }
        if keyboard.just_released(code) {
            session.set_move_key(key, false);
        }
    }

    // View mode and zoom.
    if keyboard.just_pressed(KeyCode::KeyV) {
        session.toggle_projection();
    }
    if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd) {
        session.zoom_in();
    }
    if keyboard.just_pressed(KeyCode::Minus) || keyboard.just_pressed(KeyCode::NumpadSubtract) {
        session.zoom_out();
    }

    // Back out of the current selection.
    if keyboard.just_pressed(KeyCode::Escape) {
        let notes = session.clear_focus();
        bus.publish(notes);
    }

    // List-driven focus: walk the rooms of the active floor without
    // opening the detail surface (the access-list behavior).
    if keyboard.just_pressed(KeyCode::KeyL) {
        let rooms: Vec<String> = session
            .floor()
            .zones
            .iter()
            .flat_map(|z| z.rooms.iter())
            .map(|r| r.id.clone())
            .collect();
        if !rooms.is_empty() {
            let id = &rooms[*room_cursor % rooms.len()];
            *room_cursor += 1;
            let notes = session.focus_on_asset(id, false);
            bus.publish(notes);
        }
    }

    // Demo badge cycler: no grants → public doors → full building badge.
    if keyboard.just_pressed(KeyCode::KeyG) {
        demo.stage = (demo.stage + 1) % 3;
        let grants = badge_grants(&building, demo.stage);
        info!("badge stage {} ({} grants)", demo.stage, grants.len());
        let notes = session.set_permission_list(grants);
        bus.publish(notes);
    }
}

/// Digit keys switch floors, checkpointing the vantage on the way out and
/// restoring it when a floor is revisited.
pub fn floor_switch_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut active: ResMut<ActiveSession>,
    mut building: ResMut<Building>,
    mut saved: ResMut<SavedViewports>,
    mut bus: ResMut<NotificationBus>,
) {
    let floor_keys: &[(KeyCode, usize)] = &[
        (KeyCode::Digit1, 0),
        (KeyCode::Digit2, 1),
        (KeyCode::Digit3, 2),
    ];
    let Some(index) = floor_keys
        .iter()
        .find(|(code, _)| keyboard.just_pressed(*code))
        .map(|&(_, index)| index)
    else {
        return;
    };
    if index == building.active || index >= building.floors.len() {
        return;
    }

    let current_number = building.active_floor().floor;
    building.active = index;
    let next = building.active_floor().clone();
    let next_number = next.floor;
    info!("switching to {}", next.name);

    {
        let Some(session) = active.session.as_mut() else {
            return;
        };
        saved.by_floor.insert(current_number, session.save_viewport());
        let notes = session.swap_floor(next);
        bus.publish(notes);
        if let Some(viewport) = saved.by_floor.get(&next_number) {
            session.restore_viewport(viewport);
        }
    }
    active.scene_dirty = true;
}

fn badge_grants(building: &Building, stage: u8) -> Vec<String> {
    match stage {
        0 => Vec::new(),
        1 => building
            .floors
            .iter()
            .flat_map(|f| f.zones.iter())
            .flat_map(|z| z.rooms.iter())
            .flat_map(|r| r.doors.iter())
            .filter(|d| d.access_level == AccessLevel::Public)
            .map(|d| d.id.clone())
            .collect(),
        _ => building
            .floors
            .iter()
            .flat_map(|f| f.zones.iter())
            .flat_map(|z| z.rooms.iter())
            .map(|r| r.id.clone())
            .collect(),
    }
}

/// Scroll wheel zoom, stepping the same clamped zoom as the +/- keys.
pub fn wheel_zoom(
    mut scroll_events: EventReader<MouseWheel>,
    mut active: ResMut<ActiveSession>,
) {
    let Some(session) = active.session.as_mut() else {
        return;
    };
    for event in scroll_events.read() {
        if event.y > 0.0 {
            session.zoom_in();
        } else if event.y < 0.0 {
            session.zoom_out();
        }
    }
}

/// Left click → ray pick → selection/detail.
pub fn pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut active: ResMut<ActiveSession>,
    mut bus: ResMut<NotificationBus>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(session) = active.session.as_mut() else {
        return;
    };
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let notes = session.handle_pointer_click(cursor.x, cursor.y);
    bus.publish(notes);
}

/// Keep the session's viewport in step with the window for picking.
pub fn window_resize(
    mut events: EventReader<WindowResized>,
    mut active: ResMut<ActiveSession>,
) {
    let Some(session) = active.session.as_mut() else {
        return;
    };
    for event in events.read() {
        session.resize(event.width, event.height);
    }
}
