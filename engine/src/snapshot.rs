//! Save snapshot.
//!
//! Plain serde data; storage (local storage, a file) is the caller's concern.

use serde::{Deserialize, Serialize};

use crate::room::RoomId;
use crate::types::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
}

impl BodySnapshot {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position: position.into(),
            velocity: velocity.into(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::from(self.velocity)
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|v| v.is_finite())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub room: RoomId,
    pub player: BodySnapshot,
    #[serde(rename = "crate", default, skip_serializing_if = "Option::is_none")]
    pub crate_body: Option<BodySnapshot>,
    pub solved: bool,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
