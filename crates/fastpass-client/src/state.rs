//! State management for the fastpass client.
//!
//! Contains resource types and Bevy components used throughout the client.

use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;

use fastpass_logic::camera::ViewportState;
use fastpass_logic::floor::FloorDescriptor;
use fastpass_logic::interaction::Notification;
use fastpass_logic::session::FloorSession;

// ============================================================================
// RESOURCES
// ============================================================================

/// Launch options parsed from argv.
pub struct LaunchConfig {
    pub start_floor: Option<i32>,
}

impl LaunchConfig {
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self { start_floor: None };
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--floor" | "-f" if i + 1 < args.len() => {
                    config.start_floor = args[i + 1].parse().ok();
                    i += 2;
                }
                _ => i += 1,
            }
        }
        config
    }
}

/// The building's floors and which one is active.
#[derive(Resource)]
pub struct Building {
    pub floors: Vec<FloorDescriptor>,
    pub active: usize,
}

impl Building {
    pub fn active_floor(&self) -> &FloorDescriptor {
        &self.floors[self.active]
    }
}

/// The live floor session, plus a dirty flag for the scene-mirroring system.
#[derive(Resource, Default)]
pub struct ActiveSession {
    pub session: Option<FloorSession>,
    /// Set when the scene graph was (re)built and Bevy meshes must respawn.
    pub scene_dirty: bool,
}

/// Per-floor saved vantage points, so switching away and back restores the
/// exact camera/avatar placement.
#[derive(Resource, Default)]
pub struct SavedViewports {
    pub by_floor: HashMap<i32, ViewportState>,
}

/// Which canned permission list the demo G-key cycler is on.
#[derive(Resource, Default)]
pub struct PermissionDemo {
    pub stage: u8,
}

/// Message-passing channel from the engine to the UI layer. Systems push
/// session notifications here; the HUD drains them.
#[derive(Resource, Default)]
pub struct NotificationBus {
    pub queue: VecDeque<Notification>,
    pub toasts: Vec<Toast>,
}

impl NotificationBus {
    pub fn publish(&mut self, notes: impl IntoIterator<Item = Notification>) {
        for n in notes {
            self.queue.push_back(n);
        }
    }
}

pub struct Toast {
    pub message: String,
    pub timer: f32,
}

// ============================================================================
// BEVY COMPONENTS
// ============================================================================

/// Marker for every spawned scene primitive; despawned wholesale on rebuild.
#[derive(Component)]
pub struct ScenePrim;

/// A door mesh mirroring `graph.doors[index]`; tracks the last grant state
/// it was colored with.
#[derive(Component)]
pub struct DoorVisual {
    pub index: usize,
    pub shown_granted: bool,
}

#[derive(Component)]
pub struct RoomLabel;

#[derive(Component)]
pub struct AvatarBody;

#[derive(Component)]
pub struct PlayerCamera;

#[derive(Component)]
pub struct HudText;
