//! Error types for the gameplay core.
//!
//! Nothing here is fatal: callers log and recover (skip a mesh, keep the previous room,
//! drop a frame).

use thiserror::Error;

use crate::room::RoomId;

/// A single scene node could not be turned into a collider.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeriveError {
    /// Node carries no mesh geometry (empty group, marker-only node).
    #[error("node `{name}` has no geometry")]
    NoGeometry { name: String },

    /// Local bounds contain NaN/inf or are inverted.
    #[error("node `{name}` has invalid local bounds")]
    InvalidBounds { name: String },

    /// World matrix is non-finite or collapses an axis to zero scale.
    #[error("node `{name}` has a degenerate world transform")]
    DegenerateTransform { name: String },
}

pub type DeriveResult<T> = std::result::Result<T, DeriveError>;

/// A room scene failed to load or convert.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("scene asset `{path}` failed to load: {reason}")]
    Asset { path: String, reason: String },

    #[error("scene for {room:?} contained no nodes")]
    EmptyScene { room: RoomId },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Failures inside a frame or a session-level operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// A body the session still references is gone from the physics set.
    #[error("{what} body is missing from the physics world")]
    MissingBody { what: &'static str },

    /// Non-finite state leaked out of the solver.
    #[error("{what} state became non-finite")]
    NonFinite { what: &'static str },

    #[error("snapshot belongs to {snapshot:?} but the session is in {current:?}")]
    SnapshotRoomMismatch { snapshot: RoomId, current: RoomId },
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Configuration could not be parsed or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
