//! Tunable gameplay configuration.
//!
//! Every field has a default from `crate::constants`, and `#[serde(default)]` lets a JSON
//! override file specify only the values it changes.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConfigError, ConfigResult};
use crate::materials::ContactParams;
use crate::types::Vec3;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    #[serde(rename = "crate")]
    pub puzzle_crate: CrateConfig,
    pub colliders: ColliderConfig,
    pub checkpoints: CheckpointConfig,
    pub rooms: RoomConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub fixed_dt: f32,
    pub max_substeps: u32,
    /// Magnitude along -Y.
    pub gravity: f32,
    pub solver_iterations: usize,
    pub solver_tolerance: f32,
    pub allow_sleep: bool,
    pub materials: MaterialConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            max_substeps: MAX_SUBSTEPS,
            gravity: GRAVITY_MPS2,
            solver_iterations: SOLVER_ITERATIONS,
            solver_tolerance: SOLVER_TOLERANCE,
            allow_sleep: true,
            materials: MaterialConfig::default(),
        }
    }
}

/// Contact parameters per material pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub ground_ground: ContactParams,
    pub player_ground: ContactParams,
    pub player_crate: ContactParams,
    pub crate_ground: ContactParams,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            ground_ground: ContactParams::new(0.9, 0.0),
            player_ground: ContactParams::new(0.9, 0.0),
            player_crate: ContactParams::new(0.3, 0.0),
            crate_ground: ContactParams::new(0.6, 0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub move_force: f32,
    pub max_ground_speed: f32,
    pub max_air_speed: f32,
    pub grounded_threshold: f32,
    pub jump_gate: f32,
    pub jump_speed: f32,
    pub push_epsilon: f32,
    pub push_force: f32,
    pub push_factor_min: f32,
    pub push_factor_max: f32,
    pub push_damping: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            mass: PLAYER_MASS,
            linear_damping: PLAYER_LINEAR_DAMPING,
            angular_damping: PLAYER_ANGULAR_DAMPING,
            move_force: MOVE_FORCE,
            max_ground_speed: MAX_GROUND_SPEED,
            max_air_speed: MAX_AIR_SPEED,
            grounded_threshold: GROUNDED_THRESHOLD,
            jump_gate: JUMP_GATE_THRESHOLD,
            jump_speed: JUMP_SPEED,
            push_epsilon: PUSH_CONTACT_EPSILON,
            push_force: PUSH_FORCE,
            push_factor_min: PUSH_FACTOR_MIN,
            push_factor_max: PUSH_FACTOR_MAX,
            push_damping: PUSH_DAMPING,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrateConfig {
    pub half_extent: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub spawn_clearance: f32,
    pub push_point_drop: f32,
}

impl Default for CrateConfig {
    fn default() -> Self {
        Self {
            half_extent: CRATE_HALF_EXTENT,
            mass: CRATE_MASS,
            linear_damping: CRATE_LINEAR_DAMPING,
            angular_damping: CRATE_ANGULAR_DAMPING,
            spawn_clearance: CRATE_SPAWN_CLEARANCE,
            push_point_drop: PUSH_POINT_DROP,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderConfig {
    pub min_half_xz: f32,
    pub min_half_y: f32,
    pub padding: f32,
    /// Lowercased substrings; any match skips the node.
    pub exclude_substrings: Vec<String>,
    /// Lowercased exact names that never get colliders.
    pub exclude_names: Vec<String>,
    /// Lowercased name prefixes that never get colliders.
    pub exclude_prefixes: Vec<String>,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            min_half_xz: COLLIDER_MIN_HALF_XZ,
            min_half_y: COLLIDER_MIN_HALF_Y,
            padding: COLLIDER_PADDING,
            exclude_substrings: owned(&["light", "torus"]),
            exclude_names: owned(&["goal", "end", "cubeend", "key"]),
            exclude_prefixes: owned(&["powerbox_", "plate_"]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub volume_height: f32,
    pub horizontal_pad: f32,
    pub margin: f32,
    pub fall_margin: f32,
    pub fall_cooldown: f32,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            volume_height: CHECKPOINT_VOLUME_HEIGHT,
            horizontal_pad: CHECKPOINT_HORIZONTAL_PAD,
            margin: CHECKPOINT_MARGIN,
            fall_margin: FALL_SAFETY_MARGIN,
            fall_cooldown: FALL_COOLDOWN_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub trigger_distance: f32,
    pub start_height_offset: f32,
    pub fallback_spawn: [f32; 3],
    /// Floor used for fall detection when a room has no geometry at all.
    pub default_min_y: f32,
    pub room1_asset: String,
    pub room2_asset: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            trigger_distance: TRIGGER_DISTANCE,
            start_height_offset: START_HEIGHT_OFFSET,
            fallback_spawn: FALLBACK_SPAWN,
            default_min_y: 0.0,
            room1_asset: ROOM1_ASSET.to_string(),
            room2_asset: ROOM2_ASSET.to_string(),
        }
    }
}

impl RoomConfig {
    #[inline]
    pub fn fallback(&self) -> Vec3 {
        Vec3::from(self.fallback_spawn)
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        fn positive(field: &'static str, v: f32) -> ConfigResult<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite and > 0, got {v}"),
                })
            }
        }
        fn non_negative(field: &'static str, v: f32) -> ConfigResult<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite and >= 0, got {v}"),
                })
            }
        }

        positive("physics.fixed_dt", self.physics.fixed_dt)?;
        if self.physics.max_substeps == 0 {
            return Err(ConfigError::Invalid {
                field: "physics.max_substeps",
                reason: "must be at least 1".into(),
            });
        }
        non_negative("physics.gravity", self.physics.gravity)?;

        let p = &self.player;
        positive("player.radius", p.radius)?;
        positive("player.mass", p.mass)?;
        non_negative("player.max_ground_speed", p.max_ground_speed)?;
        non_negative("player.max_air_speed", p.max_air_speed)?;
        if p.max_air_speed < p.max_ground_speed {
            return Err(ConfigError::Invalid {
                field: "player.max_air_speed",
                reason: "must not be below player.max_ground_speed".into(),
            });
        }
        positive("player.grounded_threshold", p.grounded_threshold)?;
        non_negative("player.jump_speed", p.jump_speed)?;
        if p.push_factor_min > p.push_factor_max {
            return Err(ConfigError::Invalid {
                field: "player.push_factor_min",
                reason: "must not exceed player.push_factor_max".into(),
            });
        }

        positive("crate.half_extent", self.puzzle_crate.half_extent)?;
        positive("crate.mass", self.puzzle_crate.mass)?;

        non_negative("colliders.min_half_xz", self.colliders.min_half_xz)?;
        non_negative("colliders.min_half_y", self.colliders.min_half_y)?;
        non_negative("colliders.padding", self.colliders.padding)?;

        non_negative("checkpoints.fall_margin", self.checkpoints.fall_margin)?;
        non_negative("checkpoints.fall_cooldown", self.checkpoints.fall_cooldown)?;
        positive("rooms.trigger_distance", self.rooms.trigger_distance)?;
        Ok(())
    }
}
