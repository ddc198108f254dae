//! Dynamic bodies (player sphere, puzzle crate) and visual toggle props.
//!
//! Toggle props only carry visibility; the client applies `PropSet::visibility()` to the
//! render nodes with matching names.

use log::info;

use crate::config::{CrateConfig, PlayerConfig};
use crate::materials::PhysicsMaterial;
use crate::physics::{BodyDesc, BodyHandle, BodyShape, PhysicsWorld};
use crate::player::PlayerController;
use crate::registry::{NodeRegistry, NodeRole};
use crate::types::{Aabb, Vec3};

pub fn spawn_player(world: &mut PhysicsWorld, cfg: &PlayerConfig, at: Vec3) -> PlayerController {
    let body = world.add_body(
        BodyDesc::dynamic(
            BodyShape::Sphere { radius: cfg.radius },
            cfg.mass,
            at,
            PhysicsMaterial::Player,
        )
        .with_damping(cfg.linear_damping, cfg.angular_damping),
    );
    PlayerController::new(body)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PuzzleCrate {
    pub body: BodyHandle,
    /// Respawn point (above the anchor it was first placed on).
    pub spawn: Vec3,
}

/// Just above the top surface of `target`, horizontally centered on it.
pub fn crate_spawn_point(target: &Aabb, cfg: &CrateConfig) -> Vec3 {
    let c = target.center();
    Vec3::new(c.x, target.max.y + cfg.half_extent + cfg.spawn_clearance, c.z)
}

pub fn spawn_crate_at(world: &mut PhysicsWorld, cfg: &CrateConfig, target: &Aabb) -> PuzzleCrate {
    let spawn = crate_spawn_point(target, cfg);
    let body = world.add_body(
        BodyDesc::dynamic(
            BodyShape::Cuboid {
                half_extents: Vec3::repeat(cfg.half_extent),
            },
            cfg.mass,
            spawn,
            PhysicsMaterial::Crate,
        )
        .with_damping(cfg.linear_damping, cfg.angular_damping)
        .with_locked_rotations(),
    );
    info!("crate spawned at ({:.2}, {:.2}, {:.2})", spawn.x, spawn.y, spawn.z);
    PuzzleCrate { body, spawn }
}

/// A group of named nodes shown or hidden together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualToggle {
    pub names: Vec<String>,
    pub visible: bool,
}

impl VisualToggle {
    pub fn new(names: Vec<String>, visible: bool) -> Self {
        Self { names, visible }
    }

    /// Returns true if the state changed.
    pub fn set(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    fn push_visibility(&self, out: &mut Vec<(String, bool)>) {
        out.extend(self.names.iter().map(|n| (n.clone(), self.visible)));
    }
}

/// Inactive/active visual pair. Exactly one side is visible at any time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TogglePair {
    pub inactive: Vec<String>,
    pub active: Vec<String>,
    activated: bool,
}

impl TogglePair {
    pub fn new(inactive: Vec<String>, active: Vec<String>) -> Self {
        Self {
            inactive,
            active,
            activated: false,
        }
    }

    /// Swap to the active visual. Returns true on the first call only.
    pub fn activate(&mut self) -> bool {
        let changed = !self.activated;
        self.activated = true;
        changed
    }

    fn push_visibility(&self, out: &mut Vec<(String, bool)>) {
        out.extend(self.inactive.iter().map(|n| (n.clone(), !self.activated)));
        out.extend(self.active.iter().map(|n| (n.clone(), self.activated)));
    }
}

/// Visual props of one room.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropSet {
    pub key: VisualToggle,
    pub power: TogglePair,
    pub plate: TogglePair,
    pub bridge: VisualToggle,
    pub end_platforms: VisualToggle,
    /// Explicit collision-only geometry; never shown.
    pub hidden: Vec<String>,
}

impl PropSet {
    pub fn from_registry(reg: &NodeRegistry) -> Self {
        let names = |role| reg.names(role).map(str::to_string).collect::<Vec<_>>();
        let toggle = |role: NodeRole| VisualToggle::new(names(role), !role.starts_hidden());
        Self {
            key: toggle(NodeRole::Key),
            power: TogglePair::new(names(NodeRole::PowerBoxInactive), names(NodeRole::PowerBoxActive)),
            plate: TogglePair::new(names(NodeRole::PlateInactive), names(NodeRole::PlateActive)),
            bridge: toggle(NodeRole::Bridge),
            end_platforms: toggle(NodeRole::EndPlatform),
            hidden: names(NodeRole::HiddenCollider),
        }
    }

    pub fn visibility(&self) -> Vec<(String, bool)> {
        let mut out = Vec::new();
        self.key.push_visibility(&mut out);
        self.power.push_visibility(&mut out);
        self.plate.push_visibility(&mut out);
        self.bridge.push_visibility(&mut out);
        self.end_platforms.push_visibility(&mut out);
        out.extend(self.hidden.iter().map(|n| (n.clone(), false)));
        out
    }
}
