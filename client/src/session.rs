//! Owns the `GameSession` and runs one gameplay frame per display frame.
//!
//! Events drained from the session are logged here; a HUD would hook in at the same point.

use bevy::prelude::*;
use engine::{GameConfig, GameEvent, GameSession};
use leafwing_input_manager::prelude::ActionState;

use crate::FrameSet;
use crate::input::{InputAction, intent};
use crate::level::RoomLoader;

#[cfg(not(target_arch = "wasm32"))]
const CONFIG_PATH: &str = "assets/config/game.json";

#[derive(Resource, Deref, DerefMut)]
pub struct Session(pub GameSession);

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Session(new_session()));
    app.add_systems(Update, (run_frame, dispatch_events).chain().in_set(FrameSet::Simulate));
}

fn new_session() -> GameSession {
    let cfg = load_config();
    match GameSession::new(cfg) {
        Ok(session) => session,
        Err(e) => {
            error!("config rejected ({e}); starting with defaults");
            GameSession::with_defaults()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> GameConfig {
    let Ok(json) = std::fs::read_to_string(CONFIG_PATH) else {
        return GameConfig::default();
    };
    match GameConfig::from_json(&json) {
        Ok(cfg) => {
            info!("loaded {CONFIG_PATH}");
            cfg
        }
        Err(e) => {
            warn!("ignoring {CONFIG_PATH}: {e}");
            GameConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_config() -> GameConfig {
    GameConfig::default()
}

fn run_frame(
    mut session: ResMut<Session>,
    actions: Res<ActionState<InputAction>>,
    camera: Single<&Transform, With<Camera3d>>,
    time: Res<Time>,
) {
    let fwd = camera.forward();
    let camera_forward = engine::Vec3::new(fwd.x, fwd.y, fwd.z);
    session.frame(&intent(&actions), camera_forward, time.delta_secs());
}

fn dispatch_events(
    mut commands: Commands,
    mut session: ResMut<Session>,
    mut loader: ResMut<RoomLoader>,
    asset_server: Res<AssetServer>,
) {
    for event in session.drain_events() {
        match &event {
            GameEvent::LoadRequested { room, asset } => {
                loader.request(*room, asset_server.load(asset.clone()));
            }
            GameEvent::RoomTransitionStarted { .. } => {
                info!("[{}] {event:?}", event.key());
                loader.clear_scene(&mut commands);
            }
            GameEvent::RuntimeError { reason } => warn!("[{}] {reason}", event.key()),
            GameEvent::LoadFailed { room, reason } => {
                warn!("[{}] {room:?}: {reason} (press R to retry)", event.key())
            }
            _ => info!("[{}] {event:?}", event.key()),
        }
    }
}
