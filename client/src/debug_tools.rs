//! Debug tooling for native dev builds.
//!
//! This plugin is compiled/used only when the caller gates it behind `dev_native`
//! (recommended: `#[cfg(feature = "dev_native")] mod debug_tools;` in `main.rs`).
//!
//! - frame/entity diagnostics logged to the console
//! - F1 toggles wireframe gizmos for the derived static colliders (green solid, grey disabled)

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin,
};
use bevy::prelude::*;

use crate::session::Session;

#[derive(Resource, Default)]
struct ShowColliders(bool);

/// Add debug tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        LogDiagnosticsPlugin::default(),
    ));

    app.init_resource::<ShowColliders>();
    app.add_systems(Update, (toggle_colliders, draw_colliders).chain());
}

fn toggle_colliders(keys: Res<ButtonInput<KeyCode>>, mut show: ResMut<ShowColliders>) {
    if keys.just_pressed(KeyCode::F1) {
        show.0 = !show.0;
    }
}

fn draw_colliders(show: Res<ShowColliders>, session: Res<Session>, mut gizmos: Gizmos) {
    if !show.0 {
        return;
    }
    for (collider, enabled) in session.debug_colliders() {
        let c = collider.center;
        let h = collider.half_extents;
        let q = collider.rotation.into_inner();
        let transform = Transform {
            translation: Vec3::new(c.x, c.y, c.z),
            rotation: Quat::from_xyzw(q.i, q.j, q.k, q.w),
            scale: Vec3::new(h.x, h.y, h.z) * 2.0,
        };
        let color = if enabled {
            Color::srgb(0.0, 1.0, 0.0)
        } else {
            Color::srgb(0.5, 0.5, 0.5)
        };
        gizmos.cuboid(transform, color);
    }
}
