//! Semantic notifications and per-frame transforms published to the presentation layer.
//!
//! Events carry identifiers, never UI text; the client maps them to toasts/strings.

use serde::{Deserialize, Serialize};

use crate::room::RoomId;
use crate::types::{Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Crate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityTransform {
    pub kind: EntityKind,
    pub translation: Vec3,
    pub rotation: Quat,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Crate reached `cubeend`; exit platforms revealed.
    PuzzleSolved,
    CheckpointSaved { position: Vec3, room: RoomId },
    FellAndReset { entity: EntityKind, to: Vec3 },
    RoomTransitionStarted { to: RoomId },
    /// The client should load this room's scene and call `GameSession::on_room_loaded`.
    LoadRequested { room: RoomId, asset: String },
    RoomEntered { room: RoomId },
    LoadFailed { room: RoomId, reason: String },
    KeyCollected,
    PowerActivated,
    PlateActivated,
    BridgeRevealed,
    Won,
    Restarted { room: RoomId },
    RuntimeError { reason: String },
}

impl GameEvent {
    /// Stable identifier for string tables.
    pub fn key(&self) -> &'static str {
        match self {
            GameEvent::PuzzleSolved => "puzzle_solved",
            GameEvent::CheckpointSaved { .. } => "checkpoint_saved",
            GameEvent::FellAndReset { entity: EntityKind::Player, .. } => "player_fell",
            GameEvent::FellAndReset { entity: EntityKind::Crate, .. } => "crate_fell",
            GameEvent::RoomTransitionStarted { .. } => "room_transition",
            GameEvent::LoadRequested { .. } => "load_requested",
            GameEvent::RoomEntered { .. } => "room_entered",
            GameEvent::LoadFailed { .. } => "load_failed",
            GameEvent::KeyCollected => "key_collected",
            GameEvent::PowerActivated => "power_activated",
            GameEvent::PlateActivated => "plate_activated",
            GameEvent::BridgeRevealed => "bridge_revealed",
            GameEvent::Won => "won",
            GameEvent::Restarted { .. } => "restarted",
            GameEvent::RuntimeError { .. } => "runtime_error",
        }
    }
}
