//! Geometry builder: floor description → tagged scene graph.
//!
//! Every wall, area, room, door, and object becomes one primitive with a
//! transform, a color, and (for addressable entities) a closed tagged
//! payload for hit-testing. Malformed entities are skipped and recorded,
//! never fatal. Rebuilding the same descriptor reproduces the same graph.

use std::collections::HashMap;

use crate::access::PermissionSet;
use crate::color::{self, ColorAssigner, Rgb};
use crate::floor::{Area, Boundary, Door, FloorDescriptor, Room, SceneObject};
use crate::math::{Aabb3, Vec2, Vec3};

pub const WALL_HEIGHT: f32 = 3.0;
pub const WALL_THICKNESS: f32 = 0.2;
/// Segments shorter than this are dropped as degenerate.
pub const MIN_WALL_LENGTH: f32 = 0.1;

// Surfaces stack base < area < room so overlaps resolve predictably.
const AREA_LIFT: f32 = 0.01;
const ROOM_LIFT: f32 = 0.02;
/// Pick-slab half thickness for flat surfaces.
const SURFACE_PICK_THICKNESS: f32 = 0.05;
/// How far the base plate's color is washed toward white.
const BASE_WASH: f32 = 0.75;

/// Semantic role of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Wall,
    Area,
    Room,
    Door,
    SceneObject,
}

/// Closed payload attached to addressable primitives. Walls and the base
/// plate carry none — they are never pickable.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityTag {
    Area {
        zone_id: String,
        area: Area,
    },
    Room {
        zone_id: String,
        room: Room,
    },
    Door {
        zone_id: String,
        /// The room this door belongs to — the second half of the grant rule.
        room_id: String,
        door: Door,
    },
    SceneObject {
        zone_id: String,
        object: SceneObject,
    },
}

impl EntityTag {
    pub fn role(&self) -> Role {
        match self {
            EntityTag::Area { .. } => Role::Area,
            EntityTag::Room { .. } => Role::Room,
            EntityTag::Door { .. } => Role::Door,
            EntityTag::SceneObject { .. } => Role::SceneObject,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityTag::Area { area, .. } => &area.id,
            EntityTag::Room { room, .. } => &room.id,
            EntityTag::Door { door, .. } => &door.id,
            EntityTag::SceneObject { object, .. } => &object.id,
        }
    }

    /// Display label. Doors have no name of their own, so their id serves.
    pub fn name(&self) -> &str {
        match self {
            EntityTag::Area { area, .. } => &area.name,
            EntityTag::Room { room, .. } => &room.name,
            EntityTag::Door { door, .. } => &door.id,
            EntityTag::SceneObject { object, .. } => &object.name,
        }
    }

    /// Where the camera should look when this entity is focused: the
    /// explicit center for doors, the boundary centroid otherwise.
    pub fn focus_point(&self) -> Vec3 {
        match self {
            EntityTag::Area { area, .. } => Vec3::from_plan(area.boundary.center(), 0.0),
            EntityTag::Room { room, .. } => Vec3::from_plan(room.boundary.center(), 0.0),
            EntityTag::Door { door, .. } => Vec3::from_plan(door.center, 0.0),
            EntityTag::SceneObject { object, .. } => {
                Vec3::from_plan(object.boundary.center(), 0.0)
            }
        }
    }
}

/// A wall slab: length along its yaw, fixed height and thickness. Not
/// addressable and never pickable.
#[derive(Debug, Clone, PartialEq)]
pub struct WallPrim {
    pub center: Vec3,
    pub length: f32,
    /// Rotation around the vertical axis, from the segment direction.
    pub yaw: f32,
}

/// A flat surface: area, room, or (untagged) the floor base plate.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePrim {
    pub center: Vec3,
    pub width: f32,
    pub depth: f32,
    pub color: Rgb,
    pub tag: Option<EntityTag>,
}

impl SurfacePrim {
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_center_size(
            self.center,
            Vec3::new(self.width, SURFACE_PICK_THICKNESS * 2.0, self.depth),
        )
    }
}

/// A door box at wall height. Carries its live grant state.
#[derive(Debug, Clone, PartialEq)]
pub struct DoorPrim {
    pub center: Vec3,
    pub width: f32,
    pub depth: f32,
    pub door_id: String,
    pub room_id: String,
    pub granted: bool,
    pub tag: EntityTag,
}

impl DoorPrim {
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_center_size(self.center, Vec3::new(self.width, WALL_HEIGHT, self.depth))
    }

    pub fn color(&self) -> Rgb {
        if self.granted {
            Rgb::from_hex(color::DOOR_GRANTED)
        } else {
            Rgb::from_hex(color::DOOR_DENIED)
        }
    }

    /// Plan-space footprint, for movement gating.
    pub fn footprint(&self) -> Boundary {
        let c = self.center.to_plan();
        Boundary {
            min: Vec2::new(c.x - self.width / 2.0, c.y - self.depth / 2.0),
            max: Vec2::new(c.x + self.width / 2.0, c.y + self.depth / 2.0),
        }
    }
}

/// A box spanning an object's boundary at wall height.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPrim {
    pub center: Vec3,
    pub width: f32,
    pub depth: f32,
    pub color: Rgb,
    pub tag: EntityTag,
}

impl ObjectPrim {
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_center_size(self.center, Vec3::new(self.width, WALL_HEIGHT, self.depth))
    }
}

/// Record of an entity the builder refused to render.
#[derive(Debug, Clone)]
pub struct SkippedEntity {
    pub role: Role,
    pub id: Option<String>,
    pub reason: String,
}

/// The built scene: primitive registries plus the floor extent.
#[derive(Debug, Default)]
pub struct SceneGraph {
    pub walls: Vec<WallPrim>,
    pub surfaces: Vec<SurfacePrim>,
    pub doors: Vec<DoorPrim>,
    pub objects: Vec<ObjectPrim>,
    /// Union extent of everything built (drives the base plate and the
    /// avatar clamp).
    pub bounds: Option<Boundary>,
    pub skipped: Vec<SkippedEntity>,
    colors: HashMap<String, Rgb>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the scene for `floor`, disposing any previous build first.
    /// Writes the derived `boundary`/`center` back onto each zone.
    pub fn build(&mut self, floor: &mut FloorDescriptor) {
        self.dispose();

        let mut assigner = ColorAssigner::for_floor(floor);
        let mut extent: Option<Boundary> = None;

        for wall in &floor.walls {
            if wall.length() < MIN_WALL_LENGTH {
                self.skipped.push(SkippedEntity {
                    role: Role::Wall,
                    id: None,
                    reason: format!("zero-length wall at ({}, {})", wall.start.x, wall.start.y),
                });
                continue;
            }
            let mid = wall.start.midpoint(wall.end);
            let dir = wall.end - wall.start;
            self.walls.push(WallPrim {
                center: Vec3::from_plan(mid, WALL_HEIGHT / 2.0),
                length: wall.length(),
                yaw: dir.y.atan2(dir.x),
            });
            extend(&mut extent, wall.start);
            extend(&mut extent, wall.end);
        }

        for zone in &mut floor.zones {
            let mut child_bounds: Vec<Boundary> = Vec::new();

            for area in &zone.areas {
                if !area.boundary.is_valid() {
                    self.skipped.push(SkippedEntity {
                        role: Role::Area,
                        id: Some(area.id.clone()),
                        reason: "degenerate boundary".into(),
                    });
                    continue;
                }
                let center = area.boundary.center();
                let color = match area.color {
                    Some(hex) => Rgb::from_hex(hex),
                    None => assigner.assign(&zone.id, &area.id, &area.name, center.x),
                };
                self.colors.insert(area.id.clone(), color);
                self.surfaces.push(SurfacePrim {
                    center: Vec3::from_plan(center, AREA_LIFT),
                    width: area.boundary.width(),
                    depth: area.boundary.depth(),
                    color,
                    tag: Some(EntityTag::Area {
                        zone_id: zone.id.clone(),
                        area: area.clone(),
                    }),
                });
                child_bounds.push(area.boundary);
                extend(&mut extent, area.boundary.min);
                extend(&mut extent, area.boundary.max);
            }

            for room in &zone.rooms {
                if !room.boundary.is_valid() {
                    self.skipped.push(SkippedEntity {
                        role: Role::Room,
                        id: Some(room.id.clone()),
                        reason: "degenerate boundary".into(),
                    });
                    continue;
                }
                let center = room.boundary.center();
                let color = match room.color {
                    Some(hex) => Rgb::from_hex(hex),
                    None => assigner.assign(&zone.id, &room.id, &room.name, center.x),
                };
                self.colors.insert(room.id.clone(), color);
                self.surfaces.push(SurfacePrim {
                    center: Vec3::from_plan(center, ROOM_LIFT),
                    width: room.boundary.width(),
                    depth: room.boundary.depth(),
                    color,
                    tag: Some(EntityTag::Room {
                        zone_id: zone.id.clone(),
                        room: room.clone(),
                    }),
                });
                child_bounds.push(room.boundary);
                extend(&mut extent, room.boundary.min);
                extend(&mut extent, room.boundary.max);

                for door in &room.doors {
                    if door.size.width <= 0.0 || door.size.depth <= 0.0 {
                        self.skipped.push(SkippedEntity {
                            role: Role::Door,
                            id: Some(door.id.clone()),
                            reason: "non-positive door size".into(),
                        });
                        continue;
                    }
                    self.doors.push(DoorPrim {
                        center: Vec3::from_plan(door.center, WALL_HEIGHT / 2.0),
                        width: door.size.width,
                        depth: door.size.depth,
                        door_id: door.id.clone(),
                        room_id: room.id.clone(),
                        granted: false,
                        tag: EntityTag::Door {
                            zone_id: zone.id.clone(),
                            room_id: room.id.clone(),
                            door: door.clone(),
                        },
                    });
                    extend(&mut extent, door.center);
                }
            }

            for object in &zone.objects {
                if !object.boundary.is_valid() {
                    self.skipped.push(SkippedEntity {
                        role: Role::SceneObject,
                        id: Some(object.id.clone()),
                        reason: "degenerate boundary".into(),
                    });
                    continue;
                }
                let color = object
                    .color
                    .map(Rgb::from_hex)
                    .unwrap_or_else(|| Rgb::from_hex(color::OBJECT_COLOR));
                self.objects.push(ObjectPrim {
                    center: Vec3::from_plan(object.boundary.center(), WALL_HEIGHT / 2.0),
                    width: object.boundary.width(),
                    depth: object.boundary.depth(),
                    color,
                    tag: EntityTag::SceneObject {
                        zone_id: zone.id.clone(),
                        object: object.clone(),
                    },
                });
                child_bounds.push(object.boundary);
                extend(&mut extent, object.boundary.min);
                extend(&mut extent, object.boundary.max);
            }

            let combined = Boundary::union_all(child_bounds.iter());
            zone.center = combined.map(|b| b.center());
            zone.boundary = combined;
        }

        // Base plate under everything, washed toward white from the floor's
        // display color. Untagged — never pickable.
        if let Some(b) = extent {
            if b.is_valid() {
                self.surfaces.push(SurfacePrim {
                    center: Vec3::from_plan(b.center(), 0.0),
                    width: b.width(),
                    depth: b.depth(),
                    color: Rgb::from_hex(floor.color).lerp(Rgb::WHITE, BASE_WASH),
                    tag: None,
                });
            }
        }
        self.bounds = extent;
    }

    /// Recolor doors from the permission list. Geometry is untouched.
    pub fn update_door_states(&mut self, permissions: &PermissionSet) {
        for door in &mut self.doors {
            door.granted = permissions.grants_door(&door.door_id, &door.room_id);
        }
    }

    /// Everything a pointer ray may hit: doors, tagged surfaces, objects.
    /// Walls and the base plate are excluded.
    pub fn pickables(&self) -> impl Iterator<Item = (Aabb3, &EntityTag)> {
        self.doors
            .iter()
            .map(|d| (d.aabb(), &d.tag))
            .chain(
                self.surfaces
                    .iter()
                    .filter_map(|s| s.tag.as_ref().map(|t| (s.aabb(), t))),
            )
            .chain(self.objects.iter().map(|o| (o.aabb(), &o.tag)))
    }

    /// The color the builder assigned to a room or area id.
    pub fn assigned_color(&self, id: &str) -> Option<Rgb> {
        self.colors.get(id).copied()
    }

    /// Release everything. Safe to call when nothing was built.
    pub fn dispose(&mut self) {
        self.walls.clear();
        self.surfaces.clear();
        self.doors.clear();
        self.objects.clear();
        self.skipped.clear();
        self.colors.clear();
        self.bounds = None;
    }
}

fn extend(extent: &mut Option<Boundary>, p: Vec2) {
    *extent = Some(match extent {
        Some(b) => Boundary {
            min: Vec2::new(b.min.x.min(p.x), b.min.y.min(p.y)),
            max: Vec2::new(b.max.x.max(p.x), b.max.y.max(p.y)),
        },
        None => Boundary { min: p, max: p },
    });
}
