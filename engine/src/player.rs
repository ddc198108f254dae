/*!
Player sphere controller: steering, speed caps, jumping and crate pushing.

Notes
- Grounded means `|vy|` under a threshold. The sphere rolls on arbitrary geometry and a
  velocity check is stable across slopes, crate tops and platform seams without contact
  queries.
- Caps are per axis (X and Z independently), applied before and after the physics step.
- Pushing adds a force on top of the contact response so a light crate doesn't stall
  against a rolling sphere.
*/

use crate::config::{CrateConfig, PlayerConfig};
use crate::error::{SessionError, SessionResult};
use crate::input::InputIntent;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::types::{Vec3, horizontal, horizontal_distance};

#[inline]
pub fn is_grounded_velocity(v: &Vec3, threshold: f32) -> bool {
    v.y.abs() < threshold
}

/// Per-axis horizontal clamp; Y is left alone.
#[inline]
pub fn clamp_horizontal(v: Vec3, cap: f32) -> Vec3 {
    Vec3::new(v.x.clamp(-cap, cap), v.y, v.z.clamp(-cap, cap))
}

/// Post-jump velocity: horizontal kept, vertical replaced.
#[inline]
pub fn jump_velocity(v: Vec3, jump_speed: f32) -> Vec3 {
    Vec3::new(v.x, jump_speed, v.z)
}

#[inline]
pub fn push_factor(horizontal_speed: f32, cfg: &PlayerConfig) -> f32 {
    let ratio = if cfg.max_ground_speed > 0.0 {
        horizontal_speed / cfg.max_ground_speed
    } else {
        0.0
    };
    ratio.clamp(cfg.push_factor_min, cfg.push_factor_max)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerController {
    pub body: BodyHandle,
}

impl PlayerController {
    pub fn new(body: BodyHandle) -> Self {
        Self { body }
    }

    fn velocity(&self, world: &PhysicsWorld) -> SessionResult<Vec3> {
        let v = world
            .linvel(self.body)
            .ok_or(SessionError::MissingBody { what: "player" })?;
        if v.iter().all(|c| c.is_finite()) {
            Ok(v)
        } else {
            Err(SessionError::NonFinite { what: "player velocity" })
        }
    }

    pub fn position(&self, world: &PhysicsWorld) -> SessionResult<Vec3> {
        world
            .translation(self.body)
            .ok_or(SessionError::MissingBody { what: "player" })
    }

    pub fn is_grounded(&self, world: &PhysicsWorld, cfg: &PlayerConfig) -> SessionResult<bool> {
        Ok(is_grounded_velocity(&self.velocity(world)?, cfg.grounded_threshold))
    }

    /// Steering force (grounded only) followed by the speed caps.
    pub fn apply_movement_input(
        &self,
        world: &mut PhysicsWorld,
        cfg: &PlayerConfig,
        input: &InputIntent,
        camera_forward: Vec3,
    ) -> SessionResult<()> {
        let v = self.velocity(world)?;
        if is_grounded_velocity(&v, cfg.grounded_threshold) {
            let dir = input.direction(camera_forward);
            if dir != Vec3::zeros() {
                world.add_force(self.body, dir * cfg.move_force);
            }
        }
        self.enforce_speed_caps(world, cfg, input.has_direction())
    }

    /// Clamp horizontal speed to the ground or air cap; a grounded player without
    /// directional input stops dead.
    pub fn enforce_speed_caps(
        &self,
        world: &mut PhysicsWorld,
        cfg: &PlayerConfig,
        has_input: bool,
    ) -> SessionResult<()> {
        let v = self.velocity(world)?;
        let grounded = is_grounded_velocity(&v, cfg.grounded_threshold);
        let capped = if grounded && !has_input {
            Vec3::new(0.0, v.y, 0.0)
        } else if grounded {
            clamp_horizontal(v, cfg.max_ground_speed)
        } else {
            clamp_horizontal(v, cfg.max_air_speed)
        };
        if capped != v {
            world.set_linvel(self.body, capped);
        }
        Ok(())
    }

    /// Jump if grounded. Returns whether the jump happened.
    pub fn try_jump(&self, world: &mut PhysicsWorld, cfg: &PlayerConfig) -> SessionResult<bool> {
        let v = self.velocity(world)?;
        if v.y.abs() >= cfg.jump_gate {
            return Ok(false);
        }
        world.set_linvel(self.body, jump_velocity(v, cfg.jump_speed));
        Ok(true)
    }

    /// Push the crate when touching it with directional input held.
    /// Returns whether a push force was applied.
    pub fn try_push_crate(
        &self,
        world: &mut PhysicsWorld,
        cfg: &PlayerConfig,
        crate_cfg: &CrateConfig,
        crate_body: BodyHandle,
        input: &InputIntent,
    ) -> SessionResult<bool> {
        if !input.has_direction() {
            return Ok(false);
        }
        let player_pos = self.position(world)?;
        let Some(crate_pos) = world.translation(crate_body) else {
            return Err(SessionError::MissingBody { what: "crate" });
        };

        let reach = cfg.radius + crate_cfg.half_extent + cfg.push_epsilon;
        if horizontal_distance(&player_pos, &crate_pos) > reach {
            return Ok(false);
        }
        let Some(dir) = horizontal(&(crate_pos - player_pos)).try_normalize(1.0e-6) else {
            return Ok(false);
        };

        let player_vel = self.velocity(world)?;
        let factor = push_factor(horizontal(&player_vel).norm(), cfg);
        let point = crate_pos - Vec3::new(0.0, crate_cfg.half_extent * crate_cfg.push_point_drop, 0.0);
        world.add_force_at_point(crate_body, dir * cfg.push_force * factor, point);

        world.set_linvel(self.body, player_vel * cfg.push_damping);
        if let Some(cv) = world.linvel(crate_body) {
            world.set_linvel(crate_body, cv * cfg.push_damping);
        }
        Ok(true)
    }
}
