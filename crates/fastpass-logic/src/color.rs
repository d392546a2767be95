//! Deterministic entity coloring.
//!
//! Entities classify into tone families by name/id keywords; each family has
//! a base hue. Rooms additionally get a positional gradient so spatially
//! adjacent rooms read as related. Assignments are keyed by `(zone, entity)`
//! and cached for the life of a scene graph, so rebuilding the same floor
//! reproduces the exact same palette.

use std::collections::HashMap;

use crate::floor::{Boundary, FloorDescriptor};

/// Linear-ish RGB triple in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Unpack 0xRRGGBB.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// HSL → RGB, hue in degrees.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(360.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h / 60.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let (r1, g1, b1) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Rgb::new(r1 + m, g1 + m, b1 + m)
    }
}

/// Door shown as denied (red).
pub const DOOR_DENIED: u32 = 0xff4d4f;
/// Door shown as granted (green).
pub const DOOR_GRANTED: u32 = 0x25c26e;
/// Generic scene-object grey.
pub const OBJECT_COLOR: u32 = 0x9aa4b5;
/// Wall white (rendered translucent by the client).
pub const WALL_COLOR: u32 = 0xffffff;

/// Tone family an entity falls into, derived from its name/id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Elevators, stairs, escalators.
    Vertical,
    /// Restrooms, mechanical and utility spaces.
    Service,
    /// Lobbies, atria, hubs.
    Core,
    /// Corridors, hallways, walkways.
    Circulation,
    /// Everything else — generic room space.
    Room,
}

const VERTICAL_KEYWORDS: &[&str] = &["elevator", "lift", "stair", "escalator"];
const SERVICE_KEYWORDS: &[&str] = &["restroom", "toilet", "mechanical", "utility"];
const CORE_KEYWORDS: &[&str] = &["lobby", "atrium", "hub"];
const CIRCULATION_KEYWORDS: &[&str] = &["corridor", "hallway", "walkway"];

/// Classify an entity by keyword match on its name and id (case-insensitive).
pub fn classify(name: &str, id: &str) -> Tone {
    let haystack = format!("{} {}", name.to_lowercase(), id.to_lowercase());
    let matches = |keys: &[&str]| keys.iter().any(|k| haystack.contains(k));
    if matches(VERTICAL_KEYWORDS) {
        Tone::Vertical
    } else if matches(SERVICE_KEYWORDS) {
        Tone::Service
    } else if matches(CORE_KEYWORDS) {
        Tone::Core
    } else if matches(CIRCULATION_KEYWORDS) {
        Tone::Circulation
    } else {
        Tone::Room
    }
}

// Pastel bases per tone family.
const TONE_SATURATION: f32 = 0.55;
const TONE_LIGHTNESS: f32 = 0.74;

fn tone_hue(tone: Tone) -> f32 {
    match tone {
        Tone::Vertical => 38.0,     // amber
        Tone::Service => 172.0,     // teal
        Tone::Core => 215.0,        // blue
        Tone::Circulation => 96.0,  // soft green
        Tone::Room => ROOM_HUE_LOW, // gradient start; see assign()
    }
}

// Generic rooms sweep rose → violet across the floor's horizontal extent.
const ROOM_HUE_LOW: f32 = 330.0;
const ROOM_HUE_HIGH: f32 = 262.0;

/// Deterministic per-`(zone, entity)` color assignment, cached for the life
/// of one scene graph.
#[derive(Debug, Default)]
pub struct ColorAssigner {
    assigned: HashMap<String, Rgb>,
    /// Horizontal extent (min x, max x) of all room boundaries on the floor.
    room_extent: Option<(f32, f32)>,
}

impl ColorAssigner {
    /// Prepare an assigner for one floor. Pre-computes the room extent that
    /// drives the positional gradient.
    pub fn for_floor(floor: &FloorDescriptor) -> Self {
        let rooms: Vec<&Boundary> = floor
            .zones
            .iter()
            .flat_map(|z| z.rooms.iter())
            .map(|r| &r.boundary)
            .filter(|b| b.is_valid())
            .collect();
        let room_extent = Boundary::union_all(rooms.into_iter()).map(|b| (b.min.x, b.max.x));
        Self {
            assigned: HashMap::new(),
            room_extent,
        }
    }

    /// Color for one entity. `center_x` positions generic rooms on the
    /// floor-wide gradient; other tones ignore it.
    pub fn assign(&mut self, zone_id: &str, entity_id: &str, name: &str, center_x: f32) -> Rgb {
        let key = format!("{zone_id}/{entity_id}");
        if let Some(&color) = self.assigned.get(&key) {
            return color;
        }
        let tone = classify(name, entity_id);
        let hue = match tone {
            Tone::Room => {
                let t = match self.room_extent {
                    Some((lo, hi)) if hi > lo => ((center_x - lo) / (hi - lo)).clamp(0.0, 1.0),
                    _ => 0.5,
                };
                ROOM_HUE_LOW + (ROOM_HUE_HIGH - ROOM_HUE_LOW) * t
            }
            other => tone_hue(other),
        };
        let color = Rgb::from_hsl(hue, TONE_SATURATION, TONE_LIGHTNESS);
        self.assigned.insert(key, color);
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor::{Room, Zone};
    use crate::math::Vec2;

    fn floor_with_rooms(rooms: Vec<Room>) -> FloorDescriptor {
        FloorDescriptor {
            floor: 1,
            name: "Test".into(),
            color: 0xdfe6f3,
            walls: vec![],
            zones: vec![Zone {
                id: "z1".into(),
                name: "Zone 1".into(),
                areas: vec![],
                rooms,
                objects: vec![],
                boundary: None,
                center: None,
            }],
        }
    }

    fn room(id: &str, min_x: f32, max_x: f32) -> Room {
        Room {
            id: id.into(),
            name: id.into(),
            boundary: Boundary {
                min: Vec2::new(min_x, 0.0),
                max: Vec2::new(max_x, 4.0),
            },
            color: None,
            doors: vec![],
        }
    }

    #[test]
    fn classify_by_keyword() {
        assert_eq!(classify("Elevator Bank A", "elev-a"), Tone::Vertical);
        assert_eq!(classify("Fire Stair 2", "stair-2"), Tone::Vertical);
        assert_eq!(classify("Restroom West", "wc-w"), Tone::Service);
        assert_eq!(classify("Utility Closet", "util-3"), Tone::Service);
        assert_eq!(classify("Main Lobby", "lobby-1"), Tone::Core);
        assert_eq!(classify("North Corridor", "cor-n"), Tone::Circulation);
        assert_eq!(classify("Meeting Room 4", "mr-4"), Tone::Room);
    }

    #[test]
    fn classify_matches_id_when_name_is_generic() {
        assert_eq!(classify("Space 7", "hallway-7"), Tone::Circulation);
    }

    #[test]
    fn hex_round_values() {
        let c = Rgb::from_hex(0xff4d4f);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 0x4d as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 0x4f as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn hsl_primaries() {
        let red = Rgb::from_hsl(0.0, 1.0, 0.5);
        assert!((red.r - 1.0).abs() < 1e-5 && red.g.abs() < 1e-5 && red.b.abs() < 1e-5);
        let green = Rgb::from_hsl(120.0, 1.0, 0.5);
        assert!((green.g - 1.0).abs() < 1e-5 && green.r.abs() < 1e-5);
    }

    #[test]
    fn assignment_is_deterministic() {
        let floor = floor_with_rooms(vec![room("r1", 0.0, 5.0), room("r2", 10.0, 15.0)]);
        let mut a = ColorAssigner::for_floor(&floor);
        let mut b = ColorAssigner::for_floor(&floor);
        for r in &floor.zones[0].rooms {
            let ca = a.assign("z1", &r.id, &r.name, r.boundary.center().x);
            let cb = b.assign("z1", &r.id, &r.name, r.boundary.center().x);
            assert_eq!(ca, cb);
        }
    }

    #[test]
    fn assignment_is_cached_per_key() {
        let floor = floor_with_rooms(vec![room("r1", 0.0, 5.0)]);
        let mut a = ColorAssigner::for_floor(&floor);
        let first = a.assign("z1", "r1", "r1", 2.5);
        // Same key returns the cached color even with a different center.
        let second = a.assign("z1", "r1", "r1", 99.0);
        assert_eq!(first, second);
    }

    #[test]
    fn rooms_far_apart_get_distinct_gradient_colors() {
        let floor = floor_with_rooms(vec![room("west", 0.0, 5.0), room("east", 40.0, 45.0)]);
        let mut a = ColorAssigner::for_floor(&floor);
        let west = a.assign("z1", "west", "West Office", 2.5);
        let east = a.assign("z1", "east", "East Office", 42.5);
        assert_ne!(west, east);
    }

    #[test]
    fn single_room_extent_uses_midpoint() {
        let floor = floor_with_rooms(vec![room("only", 3.0, 3.0)]); // degenerate extent
        let mut a = ColorAssigner::for_floor(&floor);
        // Must not divide by zero.
        let _ = a.assign("z1", "only", "Only Room", 3.0);
    }
}
