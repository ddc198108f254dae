//! Puzzle progression flags.
//!
//! Room 1: crate on `cubeend` marks the room solved.
//! Room 2: key → power → plate → bridge. Each step requires the previous one; every flag is
//! monotonic and `bridge_revealed` is set exactly when power and plate are both on.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleState {
    pub key_collected: bool,
    pub power_activated: bool,
    pub plate_activated: bool,
    pub bridge_revealed: bool,
    pub crate_at_goal: bool,
}

impl PuzzleState {
    /// Returns true only on the transition.
    pub fn collect_key(&mut self) -> bool {
        let changed = !self.key_collected;
        self.key_collected = true;
        changed
    }

    /// Needs the key.
    pub fn activate_power(&mut self) -> bool {
        if !self.key_collected || self.power_activated {
            return false;
        }
        self.power_activated = true;
        self.sync_bridge();
        true
    }

    /// Needs power.
    pub fn activate_plate(&mut self) -> bool {
        if !self.power_activated || self.plate_activated {
            return false;
        }
        self.plate_activated = true;
        self.sync_bridge();
        true
    }

    pub fn mark_crate_at_goal(&mut self) -> bool {
        let changed = !self.crate_at_goal;
        self.crate_at_goal = true;
        changed
    }

    #[inline]
    pub fn solved(&self) -> bool {
        self.crate_at_goal
    }

    fn sync_bridge(&mut self) {
        if self.power_activated && self.plate_activated {
            self.bridge_revealed = true;
        }
    }
}
