//! Avatar movement and wall collision.
//!
//! Algorithm: "try then slide"
//! 1. Build a direction from key state (or the analog override)
//! 2. Candidate = position + direction · speed · dt
//! 3. Reject a candidate that comes within `radius` of any wall segment or
//!    lands on a denied door's footprint
//! 4. On rejection, retry each axis alone (smooth wall slide)
//! 5. Clamp the result into the floor's union bounds
//!
//! Movement is planar — the avatar's height never changes. This controller
//! is the sole writer of the avatar position.

use crate::access::PermissionSet;
use crate::floor::FloorDescriptor;
use crate::layout::{SceneGraph, WALL_THICKNESS};
use crate::math::{Vec2, Vec3};

/// Fixed avatar collision radius.
pub const AVATAR_RADIUS: f32 = 0.4;
/// Walk speed, plan units per second.
pub const WALK_SPEED: f32 = 4.0;

/// Directional input keys, edge-triggered via [`PlayerController::set_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
}

/// Owns the avatar position and applies collision-checked movement.
#[derive(Debug, Clone)]
pub struct PlayerController {
    position: Vec3,
    radius: f32,
    keys: [bool; 4],
    /// Joystick-style vector; overrides key state while present.
    analog: Option<Vec2>,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerController {
    /// Spawn at the floor origin, resting on the ground plane.
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, AVATAR_RADIUS, 0.0),
            radius: AVATAR_RADIUS,
            keys: [false; 4],
            analog: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Edge-triggered key state: call with `active = true` on press and
    /// `false` on release.
    pub fn set_key(&mut self, key: MoveKey, active: bool) {
        self.keys[key as usize] = active;
    }

    /// Analog input channel (joystick). `None` returns control to the keys.
    pub fn set_analog(&mut self, vector: Option<Vec2>) {
        self.analog = vector;
    }

    /// Current input direction, unit length or zero.
    pub fn input_vector(&self) -> Vec2 {
        if let Some(v) = self.analog {
            return v.normalize_or_zero();
        }
        let mut dir = Vec2::ZERO;
        if self.keys[MoveKey::Forward as usize] {
            dir.y -= 1.0;
        }
        if self.keys[MoveKey::Back as usize] {
            dir.y += 1.0;
        }
        if self.keys[MoveKey::Left as usize] {
            dir.x -= 1.0;
        }
        if self.keys[MoveKey::Right as usize] {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }

    /// Advance one tick. Walls always block; a door's footprint blocks only
    /// while the permission list denies that door.
    pub fn update(
        &mut self,
        dt: f32,
        floor: &FloorDescriptor,
        graph: &SceneGraph,
        permissions: &PermissionSet,
    ) {
        let dir = self.input_vector();
        if dir == Vec2::ZERO || dt <= 0.0 {
            return;
        }
        let step = dir.scale(WALK_SPEED * dt);
        let here = self.position.to_plan();
        let want = here + step;

        let free = |p: Vec2| !blocked(p, self.radius, floor, graph, permissions);

        let landed = if free(want) {
            want
        } else if free(Vec2::new(want.x, here.y)) {
            Vec2::new(want.x, here.y)
        } else if free(Vec2::new(here.x, want.y)) {
            Vec2::new(here.x, want.y)
        } else {
            here
        };

        let landed = clamp_to_bounds(landed, self.radius, graph);
        self.position = Vec3::new(landed.x, self.position.y, landed.y);
    }

    /// Warp to a plan-space point (selected entity center). No collision
    /// check — entity centers are assumed walkable.
    pub fn teleport_to(&mut self, point: Vec2) {
        self.position = Vec3::new(point.x, self.position.y, point.y);
    }

    /// Back to the floor origin with all input released.
    pub fn reset(&mut self) {
        self.position = Vec3::new(0.0, self.position.y, 0.0);
        self.keys = [false; 4];
        self.analog = None;
    }
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab.scale(t))
}

fn blocked(
    p: Vec2,
    radius: f32,
    floor: &FloorDescriptor,
    graph: &SceneGraph,
    permissions: &PermissionSet,
) -> bool {
    let clearance = radius + WALL_THICKNESS / 2.0;
    for wall in &floor.walls {
        if segment_distance(p, wall.start, wall.end) < clearance {
            return true;
        }
    }
    for door in &graph.doors {
        if permissions.grants_door(&door.door_id, &door.room_id) {
            continue;
        }
        let f = door.footprint();
        let inflated = crate::floor::Boundary {
            min: Vec2::new(f.min.x - radius, f.min.y - radius),
            max: Vec2::new(f.max.x + radius, f.max.y + radius),
        };
        if inflated.contains(p) {
            return true;
        }
    }
    false
}

fn clamp_to_bounds(p: Vec2, radius: f32, graph: &SceneGraph) -> Vec2 {
    match graph.bounds {
        Some(b) if b.is_valid() => Vec2::new(
            p.x.clamp(b.min.x + radius, b.max.x - radius),
            p.y.clamp(b.min.y + radius, b.max.y - radius),
        ),
        _ => p,
    }
}
