//! Gameplay core for the rolling-sphere room puzzle.
//!
//! Everything that decides *what happens* lives here; the client only loads scenes,
//! forwards input, and draws what the session publishes.
//!
//! - `collider`: static box colliders derived from loaded scene geometry
//! - `physics`: rapier3d world wrapper (fixed-step accumulator, bodies, teleports)
//! - `materials`: contact material pair rules applied through physics hooks
//! - `player`: movement/jump/push controller
//! - `props`: crate spawning and visual toggle props
//! - `checkpoint`: checkpoint capture and fall recovery
//! - `room`: room content and the room state enum
//! - `puzzle`: key → power → plate → bridge flags
//! - `session`: the per-frame orchestrator owning all mutable game state

pub mod checkpoint;
pub mod collider;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod input;
pub mod materials;
pub mod physics;
pub mod player;
pub mod props;
pub mod puzzle;
pub mod registry;
pub mod room;
pub mod scene;
pub mod session;
pub mod snapshot;
pub mod types;

pub use config::GameConfig;
pub use error::{ConfigError, DeriveError, LoadError, SessionError};
pub use events::{EntityKind, EntityTransform, GameEvent};
pub use input::InputIntent;
pub use physics::{BodyHandle, PhysicsWorld};
pub use puzzle::PuzzleState;
pub use registry::{NodeRegistry, NodeRole};
pub use room::{RoomId, RoomState};
pub use scene::{NodeId, SceneGraph, SceneNode};
pub use session::GameSession;
pub use snapshot::Snapshot;
pub use types::{Aabb, Mat4, Quat, Vec3};
