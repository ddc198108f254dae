use bevy::{camera::Exposure, prelude::*};
use engine::EntityKind;

use crate::visuals::BodyVisual;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, follow_player);
}

const CAMERA_OFFSET_GLOBAL: Vec3 = Vec3::new(0.0, 5.0, 10.0);
const CAMERA_DECAY_RATE: f32 = 8.0;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure::INDOOR,
        Camera3d::default(),
        Transform::from_translation(CAMERA_OFFSET_GLOBAL).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            falloff: FogFalloff::from_visibility_colors(
                200.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
            ..default()
        },
    ));
}

fn follow_player(
    mut camera: Single<&mut Transform, With<Camera3d>>,
    players: Query<(&BodyVisual, &Transform), Without<Camera3d>>,
    time: Res<Time>,
) {
    let Some((_, player)) = players.iter().find(|(v, _)| v.0 == EntityKind::Player) else {
        return;
    };

    let target = player.translation + CAMERA_OFFSET_GLOBAL;
    camera
        .translation
        .smooth_nudge(&target, CAMERA_DECAY_RATE, time.delta_secs());
    camera.look_at(player.translation, Vec3::Y);
}
