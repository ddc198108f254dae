use bevy::{platform::collections::HashMap, prelude::*};
use engine::EntityKind;

use crate::FrameSet;
use crate::session::Session;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_body_visuals);
    app.add_systems(
        Update,
        (sync_body_visuals, apply_node_visibility).in_set(FrameSet::Present),
    );
}

/// Render entity driven by a session body.
#[derive(Component, Debug)]
pub struct BodyVisual(pub EntityKind);

fn spawn_body_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<Session>,
) {
    let cfg = session.config();

    commands.spawn((
        Name::new("PlayerSphere"),
        BodyVisual(EntityKind::Player),
        Mesh3d(meshes.add(Sphere::new(cfg.player.radius).mesh().uv(32, 18))),
        MeshMaterial3d(materials.add(Color::srgb_u8(255, 85, 85))),
        Transform::default(),
        Visibility::Hidden,
    ));

    let edge = cfg.puzzle_crate.half_extent * 2.0;
    commands.spawn((
        Name::new("PuzzleCrate"),
        BodyVisual(EntityKind::Crate),
        Mesh3d(meshes.add(Cuboid::new(edge, edge, edge))),
        MeshMaterial3d(materials.add(Color::srgb_u8(0, 170, 255))),
        Transform::default(),
        Visibility::Hidden,
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Copy published body transforms; bodies the session no longer reports are hidden.
fn sync_body_visuals(
    session: Res<Session>,
    mut visuals: Query<(&BodyVisual, &mut Transform, &mut Visibility)>,
) {
    let published = session.transforms();
    for (visual, mut transform, mut visibility) in &mut visuals {
        match published.iter().find(|t| t.kind == visual.0) {
            Some(t) => {
                transform.translation = Vec3::new(t.translation.x, t.translation.y, t.translation.z);
                let q = t.rotation.into_inner();
                transform.rotation = Quat::from_xyzw(q.i, q.j, q.k, q.w);
                visibility.set_if_neq(Visibility::Inherited);
            }
            None => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}

/// Show/hide room nodes (exit platforms, toggle props, collision-only meshes) by name.
fn apply_node_visibility(
    session: Res<Session>,
    mut nodes: Query<(&Name, &mut Visibility), Without<BodyVisual>>,
) {
    let wanted: HashMap<String, bool> = session.visibility().into_iter().collect();
    if wanted.is_empty() {
        return;
    }
    for (name, mut visibility) in &mut nodes {
        if let Some(&visible) = wanted.get(name.as_str()) {
            let v = if visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
            visibility.set_if_neq(v);
        }
    }
}
