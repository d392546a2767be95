//! 3D rendering for the fastpass client.
//!
//! Mirrors the session's scene graph into Bevy meshes: walls, floor
//! surfaces, doors, objects, room labels, and the avatar. Door materials
//! track the live grant state every frame.

use bevy::prelude::*;

use fastpass_logic::color::Rgb;
use fastpass_logic::layout::{EntityTag, SceneGraph, WALL_HEIGHT, WALL_THICKNESS};
use fastpass_logic::movement::AVATAR_RADIUS;

use crate::state::{ActiveSession, AvatarBody, DoorVisual, HudText, NotificationBus, RoomLabel, ScenePrim, Toast};

/// Height of the avatar capsule's center above the floor.
const AVATAR_BODY_Y: f32 = 1.0;
const SURFACE_THICKNESS: f32 = 0.04;

fn tint(c: Rgb) -> Color {
    Color::srgb(c.r, c.g, c.b)
}

pub fn v3(v: fastpass_logic::math::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// One-time fixtures that survive floor rebuilds: the avatar and the HUD.
pub fn setup_fixtures(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Capsule3d::new(AVATAR_RADIUS, 1.2))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.20, 0.45, 0.95),
            perceptual_roughness: 0.4,
            ..default()
        })),
        Transform::from_xyz(0.0, AVATAR_BODY_Y, 0.0),
        AvatarBody,
    ));

    commands.spawn((
        Text::new("Loading floor..."),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        HudText,
    ));
}

/// Despawn-and-respawn mirror of the scene graph, driven by the dirty flag
/// the input layer sets on floor load/switch.
pub fn sync_scene(
    mut active: ResMut<ActiveSession>,
    mut commands: Commands,
    existing: Query<Entity, With<ScenePrim>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !active.scene_dirty {
        return;
    }
    let Some(session) = active.session.as_ref() else {
        return;
    };
    let graph = session.graph();

    for entity in existing.iter() {
        if let Ok(mut cmd) = commands.get_entity(entity) {
            cmd.despawn();
        }
    }

    for skip in &graph.skipped {
        warn!(
            "floor build skipped {:?} {}: {}",
            skip.role,
            skip.id.as_deref().unwrap_or("<anonymous>"),
            skip.reason
        );
    }

    spawn_walls(&mut commands, &mut meshes, &mut materials, graph);
    spawn_surfaces(&mut commands, &mut meshes, &mut materials, graph);
    spawn_doors(&mut commands, &mut meshes, &mut materials, graph);
    spawn_objects(&mut commands, &mut meshes, &mut materials, graph);

    active.scene_dirty = false;
}

fn spawn_walls(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    graph: &SceneGraph,
) {
    let wall_mat = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.55),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.35,
        ..default()
    });
    for wall in &graph.walls {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(wall.length, WALL_HEIGHT, WALL_THICKNESS))),
            MeshMaterial3d(wall_mat.clone()),
            Transform::from_translation(v3(wall.center))
                .with_rotation(Quat::from_rotation_y(-wall.yaw)),
            ScenePrim,
        ));
    }
}

fn spawn_surfaces(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    graph: &SceneGraph,
) {
    for surface in &graph.surfaces {
        let mat = materials.add(StandardMaterial {
            base_color: tint(surface.color),
            perceptual_roughness: 0.85,
            ..default()
        });
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(surface.width, SURFACE_THICKNESS, surface.depth))),
            MeshMaterial3d(mat),
            Transform::from_translation(v3(surface.center)),
            ScenePrim,
        ));

        // Label tagged rooms and areas, like a printed floor plan.
        if let Some(tag @ (EntityTag::Room { .. } | EntityTag::Area { .. })) = &surface.tag {
            let font_size = (surface.width.min(surface.depth) * 2.5).clamp(8.0, 28.0);
            commands.spawn((
                Text2d::new(tag.name()),
                TextFont {
                    font_size,
                    ..default()
                },
                TextColor(Color::srgba(0.15, 0.15, 0.2, 0.7)),
                Transform::from_xyz(surface.center.x, surface.center.y + 0.2, surface.center.z)
                    .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
                RoomLabel,
                ScenePrim,
            ));
        }
    }
}

fn spawn_doors(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    graph: &SceneGraph,
) {
    for (index, door) in graph.doors.iter().enumerate() {
        let mat = materials.add(StandardMaterial {
            base_color: tint(door.color()),
            perceptual_roughness: 0.2,
            ..default()
        });
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(door.width, WALL_HEIGHT, door.depth))),
            MeshMaterial3d(mat),
            Transform::from_translation(v3(door.center)),
            DoorVisual {
                index,
                shown_granted: door.granted,
            },
            ScenePrim,
        ));
    }
}

fn spawn_objects(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    graph: &SceneGraph,
) {
    for object in &graph.objects {
        let mat = materials.add(StandardMaterial {
            base_color: tint(object.color),
            perceptual_roughness: 0.75,
            metallic: 0.05,
            ..default()
        });
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(object.width, WALL_HEIGHT, object.depth))),
            MeshMaterial3d(mat),
            Transform::from_translation(v3(object.center)),
            ScenePrim,
        ));
    }
}

/// Keep door materials in step with the live grant state.
pub fn sync_doors(
    active: Res<ActiveSession>,
    mut door_q: Query<(&mut DoorVisual, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(session) = active.session.as_ref() else {
        return;
    };
    let graph = session.graph();
    for (mut visual, material) in door_q.iter_mut() {
        let Some(prim) = graph.doors.get(visual.index) else {
            continue;
        };
        if prim.granted != visual.shown_granted {
            visual.shown_granted = prim.granted;
            if let Some(mat) = materials.get_mut(&material.0) {
                mat.base_color = tint(prim.color());
            }
        }
    }
}

/// Move the avatar capsule to the controller's position.
pub fn sync_avatar(
    active: Res<ActiveSession>,
    mut avatar_q: Query<&mut Transform, With<AvatarBody>>,
) {
    let Some(session) = active.session.as_ref() else {
        return;
    };
    let Ok(mut tf) = avatar_q.get_single_mut() else {
        return;
    };
    let p = session.player().position();
    tf.translation = Vec3::new(p.x, AVATAR_BODY_Y, p.z);
}

/// Drain engine notifications into toasts and redraw the HUD text.
pub fn update_hud(
    active: Res<ActiveSession>,
    mut bus: ResMut<NotificationBus>,
    time: Res<Time>,
    mut hud_q: Query<&mut Text, With<HudText>>,
) {
    use fastpass_logic::interaction::Notification;

    let Some(session) = active.session.as_ref() else {
        return;
    };

    while let Some(note) = bus.queue.pop_front() {
        let message = match &note {
            Notification::ZoneChanged(Some(id)) => {
                Some(format!("Entered {}", zone_display_name(session, id)))
            }
            Notification::ZoneChanged(None) => Some("Left the mapped zones".to_string()),
            Notification::SelectionChanged(Some(tag)) => {
                Some(format!("Selected {}", tag.name()))
            }
            Notification::SelectionChanged(None) => None,
            Notification::DetailVisibilityChanged(_) => None,
        };
        if let Some(message) = message {
            info!("{message}");
            bus.toasts.push(Toast {
                message,
                timer: 3.0,
            });
        }
    }

    let dt = time.delta_secs();
    bus.toasts.retain_mut(|t| {
        t.timer -= dt;
        t.timer > 0.0
    });

    let Ok(mut text) = hud_q.get_single_mut() else {
        return;
    };
    let interaction = session.interaction();
    let zone_line = match interaction.current_zone() {
        Some(id) => zone_display_name(session, id),
        None => "—".to_string(),
    };
    let selection_line = match interaction.selection() {
        Some(tag) => format!(
            "{}{}",
            tag.name(),
            if interaction.detail_visible() {
                " (detail open)"
            } else {
                ""
            }
        ),
        None => "—".to_string(),
    };
    let mut hud = format!(
        "{}\nZone: {}\nSelected: {}\nBadge grants: {}\n\n\
         WASD/arrows move | V view | +/- zoom | 1-3 floor\n\
         click inspect | L list-focus | Esc back | G cycle badge",
        session.floor().name,
        zone_line,
        selection_line,
        interaction.permissions().len(),
    );
    for toast in &bus.toasts {
        hud.push('\n');
        hud.push_str(&toast.message);
    }
    **text = hud;
}

fn zone_display_name(session: &fastpass_logic::session::FloorSession, id: &str) -> String {
    for zone in &session.floor().zones {
        for room in &zone.rooms {
            if room.id == id {
                return room.name.clone();
            }
        }
        for area in &zone.areas {
            if area.id == id {
                return area.name.clone();
            }
        }
    }
    id.to_string()
}
