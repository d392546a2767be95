//! Floor description data model.
//!
//! Plain serde structs matching the JSON-shaped floor feed. A descriptor is
//! immutable once loaded except for the derived zone `boundary`/`center`
//! fields, which the geometry builder writes back after a build.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// One floor of the building: walls plus zones of areas, rooms, and objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorDescriptor {
    pub floor: i32,
    pub name: String,
    /// Display color for the floor base, packed 0xRRGGBB.
    #[serde(default = "default_floor_color")]
    pub color: u32,
    #[serde(default)]
    pub walls: Vec<Segment>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

fn default_floor_color() -> u32 {
    0xdfe6f3
}

/// A wall segment. Purely geometric — walls carry no identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Axis-aligned plan-space rectangle. Valid iff min < max on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub min: Vec2,
    pub max: Vec2,
}

impl Boundary {
    pub fn is_valid(&self) -> bool {
        self.min.x < self.max.x && self.min.y < self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn depth(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        self.min.midpoint(self.max)
    }

    /// Closed containment test (edges count as inside).
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &Boundary) -> Boundary {
        Boundary {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Union of a set of boundaries, or `None` when the set is empty.
    pub fn union_all<'a>(mut boundaries: impl Iterator<Item = &'a Boundary>) -> Option<Boundary> {
        let first = *boundaries.next()?;
        Some(boundaries.fold(first, |acc, b| acc.union(b)))
    }
}

/// A named grouping of areas, rooms, and objects. `boundary`/`center` are
/// derived from the children by the geometry builder, not authoritative input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Boundary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Vec2>,
}

/// Open floor space (corridor, lobby, ...) — walkable, no doors of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub boundary: Boundary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

/// An enclosed room with doors. The room id is a permission join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub boundary: Boundary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default)]
    pub doors: Vec<Door>,
}

/// Non-room scene furniture (desks, planters, kiosks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: String,
    pub name: String,
    pub boundary: Boundary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

/// Door footprint on the plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorSize {
    pub width: f32,
    pub depth: f32,
}

/// A door. `id` is unique across the floor and is the permission join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: String,
    pub center: Vec2,
    pub size: DoorSize,
    #[serde(default, rename = "accessLevel")]
    pub access_level: AccessLevel,
}

/// Declared sensitivity of a door. Informational — the live grant/deny
/// state comes from the pushed permission list, not from this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Public,
    Staff,
    Restricted,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_validity() {
        let good = Boundary {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(2.0, 3.0),
        };
        assert!(good.is_valid());
        let inverted = Boundary {
            min: Vec2::new(2.0, 0.0),
            max: Vec2::new(0.0, 3.0),
        };
        assert!(!inverted.is_valid());
        let flat = Boundary {
            min: Vec2::new(0.0, 1.0),
            max: Vec2::new(5.0, 1.0),
        };
        assert!(!flat.is_valid());
    }

    #[test]
    fn boundary_contains_edges() {
        let b = Boundary {
            min: Vec2::new(-1.0, -1.0),
            max: Vec2::new(1.0, 1.0),
        };
        assert!(b.contains(Vec2::ZERO));
        assert!(b.contains(Vec2::new(1.0, 1.0)));
        assert!(!b.contains(Vec2::new(1.01, 0.0)));
    }

    #[test]
    fn boundary_union_all() {
        let a = Boundary {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(1.0, 1.0),
        };
        let b = Boundary {
            min: Vec2::new(3.0, -2.0),
            max: Vec2::new(4.0, 0.5),
        };
        let u = Boundary::union_all([a, b].iter()).unwrap();
        assert_eq!(u.min, Vec2::new(0.0, -2.0));
        assert_eq!(u.max, Vec2::new(4.0, 1.0));
        assert!(Boundary::union_all([].iter()).is_none());
    }

    #[test]
    fn segment_length() {
        let s = Segment {
            start: Vec2::new(0.0, 0.0),
            end: Vec2::new(3.0, 4.0),
        };
        assert!((s.length() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn descriptor_parses_from_json() {
        let json = r#"{
            "floor": 1,
            "name": "Ground",
            "color": 14673651,
            "walls": [
                {"start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}}
            ],
            "zones": [{
                "id": "z-west",
                "name": "West Wing",
                "rooms": [{
                    "id": "room-101",
                    "name": "Meeting Room 101",
                    "boundary": {"min": {"x": 0.0, "y": 0.0}, "max": {"x": 5.0, "y": 4.0}},
                    "doors": [{
                        "id": "door-101a",
                        "center": {"x": 2.5, "y": 0.0},
                        "size": {"width": 1.2, "depth": 0.3},
                        "accessLevel": "staff"
                    }]
                }]
            }]
        }"#;
        let floor: FloorDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(floor.floor, 1);
        assert_eq!(floor.walls.len(), 1);
        let room = &floor.zones[0].rooms[0];
        assert_eq!(room.doors[0].access_level, AccessLevel::Staff);
        assert!(floor.zones[0].boundary.is_none());
    }

    #[test]
    fn unknown_access_level_is_tolerated() {
        let json = r#"{"id": "d1", "center": {"x": 0.0, "y": 0.0},
                       "size": {"width": 1.0, "depth": 0.2},
                       "accessLevel": "biometric"}"#;
        let door: Door = serde_json::from_str(json).unwrap();
        assert_eq!(door.access_level, AccessLevel::Unknown);
    }

    #[test]
    fn missing_access_level_defaults_public() {
        let json = r#"{"id": "d1", "center": {"x": 0.0, "y": 0.0},
                       "size": {"width": 1.0, "depth": 0.2}}"#;
        let door: Door = serde_json::from_str(json).unwrap();
        assert_eq!(door.access_level, AccessLevel::Public);
    }
}
