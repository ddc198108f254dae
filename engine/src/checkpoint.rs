/*!
Checkpoint capture and fall recovery.

Notes
- A checkpoint platform's activation volume sits on its top surface: `volume_height` tall,
  grown outward by `horizontal_pad` on X/Z. Only a grounded player inside it saves.
- Saved position is the platform's top center lifted by `margin`.
- Fall recovery runs per body with its own cooldown so a body still below the threshold
  right after a teleport isn't teleported again every frame.
*/

use crate::config::CheckpointConfig;
use crate::room::RoomId;
use crate::types::{Aabb, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    pub position: Vec3,
    pub room: RoomId,
}

/// World-space top surface of a checkpoint-eligible platform.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointPlatform {
    pub name: String,
    pub bounds: Aabb,
    /// Disabled platforms (unrevealed end platforms) never save.
    pub active: bool,
}

impl CheckpointPlatform {
    pub fn new(name: impl Into<String>, bounds: Aabb, active: bool) -> Self {
        Self {
            name: name.into(),
            bounds,
            active,
        }
    }

    pub fn activation_volume(&self, cfg: &CheckpointConfig) -> Aabb {
        let b = &self.bounds;
        Aabb::new(
            Vec3::new(b.min.x - cfg.horizontal_pad, b.max.y, b.min.z - cfg.horizontal_pad),
            Vec3::new(
                b.max.x + cfg.horizontal_pad,
                b.max.y + cfg.volume_height,
                b.max.z + cfg.horizontal_pad,
            ),
        )
    }

    pub fn save_point(&self, cfg: &CheckpointConfig) -> Vec3 {
        let c = self.bounds.center();
        Vec3::new(c.x, self.bounds.max.y + cfg.margin, c.z)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckpointManager {
    current: Option<Checkpoint>,
}

impl CheckpointManager {
    pub fn current(&self) -> Option<Checkpoint> {
        self.current
    }

    /// Save a checkpoint if the grounded player stands in an active platform's volume.
    /// Returns the new checkpoint only when it differs from the stored one.
    pub fn update_checkpoint(
        &mut self,
        player_pos: Vec3,
        grounded: bool,
        room: RoomId,
        platforms: &[CheckpointPlatform],
        cfg: &CheckpointConfig,
    ) -> Option<Checkpoint> {
        if !grounded {
            return None;
        }
        let platform = platforms
            .iter()
            .filter(|p| p.active)
            .find(|p| p.activation_volume(cfg).contains(&player_pos))?;
        let next = Checkpoint {
            position: platform.save_point(cfg),
            room,
        };
        if self.current == Some(next) {
            return None;
        }
        self.current = Some(next);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Y below which a body counts as fallen.
#[inline]
pub fn fall_threshold(room_min_y: f32, cfg: &CheckpointConfig) -> f32 {
    room_min_y - cfg.fall_margin
}

/// Player respawn priority: checkpoint in this room, then start marker, then fallback.
pub fn respawn_target(
    checkpoint: Option<Checkpoint>,
    room: RoomId,
    start: Option<Vec3>,
    fallback: Vec3,
) -> Vec3 {
    match (checkpoint, start) {
        (Some(cp), _) if cp.room == room => cp.position,
        (_, Some(s)) => s,
        _ => fallback,
    }
}

/// Per-body throttle for fall recovery.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FallGuard {
    cooldown: f32,
}

impl FallGuard {
    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt.max(0.0)).max(0.0);
    }

    /// True if `y` is below `threshold` and the guard is ready; arms the cooldown.
    pub fn check(&mut self, y: f32, threshold: f32, cfg: &CheckpointConfig) -> bool {
        if self.cooldown > 0.0 || y >= threshold {
            return false;
        }
        self.cooldown = cfg.fall_cooldown;
        true
    }

    pub fn reset(&mut self) {
        self.cooldown = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> CheckpointPlatform {
        CheckpointPlatform::new(
            "checkpoint_a",
            Aabb::new(Vec3::new(-1.0, -0.5, -1.0), Vec3::new(1.0, 0.5, 1.0)),
            true,
        )
    }

    #[test]
    fn saves_only_when_grounded_inside_volume() {
        let cfg = CheckpointConfig::default();
        let mut m = CheckpointManager::default();
        let plats = [platform()];

        assert!(m.update_checkpoint(Vec3::new(0.0, 1.0, 0.0), false, RoomId::Room1, &plats, &cfg).is_none());
        assert!(m.update_checkpoint(Vec3::new(0.0, 5.0, 0.0), true, RoomId::Room1, &plats, &cfg).is_none());
        // Inside the horizontal pad.
        let cp = m
            .update_checkpoint(Vec3::new(1.2, 1.0, 0.0), true, RoomId::Room1, &plats, &cfg)
            .unwrap();
        assert_eq!(cp.position, Vec3::new(0.0, 0.5 + cfg.margin, 0.0));
    }

    #[test]
    fn repeated_save_is_silent_and_stable() {
        let cfg = CheckpointConfig::default();
        let mut m = CheckpointManager::default();
        let plats = [platform()];
        let first = m.update_checkpoint(Vec3::new(0.0, 1.0, 0.0), true, RoomId::Room1, &plats, &cfg);
        assert!(first.is_some());
        for _ in 0..10 {
            assert!(m.update_checkpoint(Vec3::new(0.3, 1.0, 0.3), true, RoomId::Room1, &plats, &cfg).is_none());
            assert_eq!(m.current(), first);
        }
    }

    #[test]
    fn inactive_platforms_never_save() {
        let cfg = CheckpointConfig::default();
        let mut m = CheckpointManager::default();
        let mut p = platform();
        p.active = false;
        assert!(m.update_checkpoint(Vec3::new(0.0, 1.0, 0.0), true, RoomId::Room1, &[p], &cfg).is_none());
    }

    #[test]
    fn respawn_priority() {
        let fallback = Vec3::new(0.0, 10.0, 0.0);
        let start = Some(Vec3::new(1.0, 2.0, 3.0));
        let cp = Some(Checkpoint {
            position: Vec3::new(5.0, 5.0, 5.0),
            room: RoomId::Room1,
        });
        assert_eq!(respawn_target(cp, RoomId::Room1, start, fallback), Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(respawn_target(cp, RoomId::Room2, start, fallback), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(respawn_target(None, RoomId::Room1, None, fallback), fallback);
    }

    #[test]
    fn fall_guard_throttles() {
        let cfg = CheckpointConfig::default();
        let mut g = FallGuard::default();
        assert!(!g.check(0.0, -5.0, &cfg));
        assert!(g.check(-10.0, -5.0, &cfg));
        assert!(!g.check(-10.0, -5.0, &cfg));
        g.tick(cfg.fall_cooldown * 0.5);
        assert!(!g.check(-10.0, -5.0, &cfg));
        g.tick(cfg.fall_cooldown);
        assert!(g.check(-10.0, -5.0, &cfg));
    }
}
