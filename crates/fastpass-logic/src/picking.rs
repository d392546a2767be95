//! Pointer picking: camera ray construction and AABB intersection.
//!
//! A click resolves to a semantic entity by casting a ray from the camera
//! through the normalized screen point and taking the nearest hit among the
//! pickable primitives (doors, tagged surfaces, objects — never walls).

use crate::layout::{EntityTag, SceneGraph};
use crate::math::{Aabb3, Vec3};

/// Vertical field of view at zoom 1.0.
pub const VERTICAL_FOV: f32 = std::f32::consts::FRAC_PI_4;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Up hint for a camera looking along `forward`. Straight-down cameras use
/// -Z so the frame stays well defined.
pub fn up_hint(forward: Vec3) -> Vec3 {
    if forward.y.abs() > 0.999 {
        Vec3::NEG_Z
    } else {
        Vec3::Y
    }
}

/// Build a ray through a screen point given the camera state.
///
/// `ndc_x`/`ndc_y` are in [-1, 1], +x right and +y up (the usual pointer
/// conversion). Returns `None` when the camera frame is degenerate.
pub fn camera_ray(
    cam_pos: Vec3,
    cam_target: Vec3,
    zoom: f32,
    aspect: f32,
    ndc_x: f32,
    ndc_y: f32,
) -> Option<Ray> {
    let forward = (cam_target - cam_pos).normalize_or_zero();
    if forward == Vec3::ZERO {
        return None;
    }
    let right = forward.cross(up_hint(forward)).normalize_or_zero();
    if right == Vec3::ZERO {
        return None;
    }
    let up = right.cross(forward);

    let tan_half = (VERTICAL_FOV / 2.0).tan() / zoom.max(f32::EPSILON);
    let dir = (forward
        + right.scale(ndc_x * tan_half * aspect)
        + up.scale(ndc_y * tan_half))
    .normalize_or_zero();
    Some(Ray {
        origin: cam_pos,
        dir,
    })
}

/// Slab test. Returns the entry distance along the ray, or `None` on miss.
/// A ray starting inside the box reports distance 0.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    let axes = [
        (ray.origin.x, ray.dir.x, aabb.min.x, aabb.max.x),
        (ray.origin.y, ray.dir.y, aabb.min.y, aabb.max.y),
        (ray.origin.z, ray.dir.z, aabb.min.z, aabb.max.z),
    ];
    for (o, d, lo, hi) in axes {
        if d.abs() < 1e-9 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let mut t1 = (lo - o) / d;
        let mut t2 = (hi - o) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

/// Nearest pickable entity hit by the ray, if any.
pub fn pick<'a>(ray: &Ray, graph: &'a SceneGraph) -> Option<&'a EntityTag> {
    let mut best: Option<(f32, &EntityTag)> = None;
    for (aabb, tag) in graph.pickables() {
        if let Some(t) = ray_aabb(ray, &aabb) {
            if best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, tag));
            }
        }
    }
    best.map(|(_, tag)| tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor::{Boundary, Door, DoorSize, FloorDescriptor, Room, SceneObject, Zone};
    use crate::layout::Role;
    use crate::math::Vec2;

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, 50.0, z),
            dir: Vec3::new(0.0, -1.0, 0.0),
        }
    }

    fn picking_floor() -> (FloorDescriptor, SceneGraph) {
        let mut floor = FloorDescriptor {
            floor: 1,
            name: "Pick".into(),
            color: 0xdfe6f3,
            walls: vec![],
            zones: vec![Zone {
                id: "z".into(),
                name: "Z".into(),
                areas: vec![],
                rooms: vec![Room {
                    id: "room-a".into(),
                    name: "Room A".into(),
                    boundary: Boundary {
                        min: Vec2::new(0.0, 0.0),
                        max: Vec2::new(10.0, 10.0),
                    },
                    color: None,
                    doors: vec![Door {
                        id: "door-a".into(),
                        center: Vec2::new(5.0, 0.0),
                        size: DoorSize {
                            width: 1.2,
                            depth: 0.3,
                        },
                        access_level: Default::default(),
                    }],
                }],
                objects: vec![SceneObject {
                    id: "kiosk".into(),
                    name: "Info Kiosk".into(),
                    boundary: Boundary {
                        min: Vec2::new(4.0, 4.0),
                        max: Vec2::new(6.0, 6.0),
                    },
                    color: None,
                }],
                boundary: None,
                center: None,
            }],
        };
        let mut graph = SceneGraph::new();
        graph.build(&mut floor);
        (floor, graph)
    }

    #[test]
    fn ray_aabb_hit_and_miss() {
        let b = Aabb3::from_center_size(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        let hit = ray_aabb(&down_ray(0.0, 0.0), &b).unwrap();
        assert!((hit - 49.0).abs() < 1e-4);
        assert!(ray_aabb(&down_ray(5.0, 0.0), &b).is_none());
    }

    #[test]
    fn ray_behind_misses() {
        let b = Aabb3::from_center_size(Vec3::new(0.0, 100.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        // Box is above the origin but the ray points down.
        assert!(ray_aabb(&down_ray(0.0, 0.0), &b).is_none());
    }

    #[test]
    fn ray_from_inside_reports_zero() {
        let b = Aabb3::from_center_size(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        let r = Ray {
            origin: Vec3::ZERO,
            dir: Vec3::new(0.0, -1.0, 0.0),
        };
        assert_eq!(ray_aabb(&r, &b), Some(0.0));
    }

    #[test]
    fn nearest_hit_wins() {
        let (_floor, graph) = picking_floor();
        // Straight down over the kiosk: the kiosk box (wall height) sits
        // above the room surface, so the kiosk is the nearer hit.
        let tag = pick(&down_ray(5.0, 5.0), &graph).unwrap();
        assert_eq!(tag.role(), Role::SceneObject);
        assert_eq!(tag.id(), "kiosk");
    }

    #[test]
    fn room_surface_picked_outside_the_kiosk() {
        let (_floor, graph) = picking_floor();
        let tag = pick(&down_ray(2.0, 2.0), &graph).unwrap();
        assert_eq!(tag.role(), Role::Room);
        assert_eq!(tag.id(), "room-a");
    }

    #[test]
    fn door_picked_at_its_center() {
        let (_floor, graph) = picking_floor();
        let tag = pick(&down_ray(5.0, 0.0), &graph).unwrap();
        assert_eq!(tag.role(), Role::Door);
        assert_eq!(tag.id(), "door-a");
    }

    #[test]
    fn miss_is_none() {
        let (_floor, graph) = picking_floor();
        assert!(pick(&down_ray(50.0, 50.0), &graph).is_none());
    }

    #[test]
    fn empty_graph_is_a_silent_no_op() {
        let graph = SceneGraph::new();
        assert!(pick(&down_ray(0.0, 0.0), &graph).is_none());
    }

    #[test]
    fn camera_ray_center_points_forward() {
        let ray = camera_ray(
            Vec3::new(0.0, 10.0, 10.0),
            Vec3::ZERO,
            1.0,
            16.0 / 9.0,
            0.0,
            0.0,
        )
        .unwrap();
        let forward = (Vec3::ZERO - Vec3::new(0.0, 10.0, 10.0)).normalize_or_zero();
        assert!((ray.dir - forward).length() < 1e-5);
    }

    #[test]
    fn camera_ray_overhead_is_well_defined() {
        let ray = camera_ray(
            Vec3::new(3.0, 100.0, 7.0),
            Vec3::new(3.0, 0.0, 7.0),
            1.0,
            1.0,
            0.0,
            0.0,
        )
        .unwrap();
        assert!((ray.dir - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn camera_ray_zoom_narrows_the_frustum() {
        let wide = camera_ray(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO, 1.0, 1.0, 1.0, 0.0).unwrap();
        let tight = camera_ray(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO, 4.0, 1.0, 1.0, 0.0).unwrap();
        let forward = (Vec3::ZERO - Vec3::new(0.0, 10.0, 10.0)).normalize_or_zero();
        // Higher zoom keeps the edge ray closer to the view axis.
        assert!(tight.dir.dot(forward) > wide.dir.dot(forward));
    }

    #[test]
    fn degenerate_camera_is_none() {
        assert!(camera_ray(Vec3::ZERO, Vec3::ZERO, 1.0, 1.0, 0.0, 0.0).is_none());
    }
}
