//! Camera setup and control for the fastpass client.
//!
//! The pure camera rig computes the vantage; this module applies it to the
//! Bevy camera every frame and owns the scene lighting.

use bevy::prelude::*;

use fastpass_logic::picking::{self, VERTICAL_FOV};

use crate::state::{ActiveSession, PlayerCamera};

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-33.0, 31.2, -33.0).looking_at(Vec3::ZERO, Vec3::Y),
        PlayerCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.95, 0.95, 1.0),
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 3500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(20.0, 60.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Mirror the rig onto the Bevy camera: position, orientation, and zoom
/// (applied as a narrowed field of view).
pub fn apply_camera_rig(
    active: Res<ActiveSession>,
    mut camera_q: Query<(&mut Transform, &mut Projection), With<PlayerCamera>>,
) {
    let Some(session) = active.session.as_ref() else {
        return;
    };
    let Ok((mut cam_tf, mut projection)) = camera_q.get_single_mut() else {
        return;
    };
    let rig = session.rig();
    let pos = rig.position();
    let target = rig.target();

    let forward = (target - pos).normalize_or_zero();
    let up = picking::up_hint(forward);

    cam_tf.translation = Vec3::new(pos.x, pos.y, pos.z);
    cam_tf.look_at(
        Vec3::new(target.x, target.y, target.z),
        Vec3::new(up.x, up.y, up.z),
    );

    if let Projection::Perspective(persp) = projection.as_mut() {
        persp.fov = VERTICAL_FOV / rig.zoom();
    }
}
