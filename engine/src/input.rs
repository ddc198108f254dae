//! Per-frame input intents, independent of any device.

use crate::types::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub restart: bool,
    pub debug_skip: bool,
}

impl InputIntent {
    /// Any directional key held. Opposing keys still count as input.
    #[inline]
    pub fn has_direction(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    /// Composed horizontal direction relative to the camera, normalized.
    ///
    /// `camera_forward` is projected onto the XZ plane; a camera looking straight down
    /// falls back to world -Z. Returns zero when the keys cancel out.
    pub fn direction(&self, camera_forward: Vec3) -> Vec3 {
        let mut fwd = Vec3::new(camera_forward.x, 0.0, camera_forward.z);
        if fwd.norm_squared() < 1.0e-8 || !fwd.iter().all(|v| v.is_finite()) {
            fwd = Vec3::new(0.0, 0.0, -1.0);
        }
        let fwd = fwd.normalize();
        let right = fwd.cross(&Vec3::y());

        let mut dir = Vec3::zeros();
        if self.forward {
            dir += fwd;
        }
        if self.back {
            dir -= fwd;
        }
        if self.right {
            dir += right;
        }
        if self.left {
            dir -= right;
        }
        dir.try_normalize(1.0e-6).unwrap_or_else(Vec3::zeros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_follows_camera_heading() {
        let input = InputIntent {
            forward: true,
            ..Default::default()
        };
        let d = input.direction(Vec3::new(1.0, -0.7, 0.0));
        assert!((d - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn right_is_clockwise_from_forward() {
        let input = InputIntent {
            right: true,
            ..Default::default()
        };
        // Camera facing -Z: right is +X.
        let d = input.direction(Vec3::new(0.0, 0.0, -1.0));
        assert!((d - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn diagonal_is_normalized_and_opposites_cancel() {
        let diag = InputIntent {
            forward: true,
            left: true,
            ..Default::default()
        };
        assert!((diag.direction(Vec3::new(0.0, 0.0, -1.0)).norm() - 1.0).abs() < 1.0e-5);

        let cancel = InputIntent {
            forward: true,
            back: true,
            ..Default::default()
        };
        assert!(cancel.has_direction());
        assert_eq!(cancel.direction(Vec3::new(0.0, 0.0, -1.0)), Vec3::zeros());
    }

    #[test]
    fn vertical_camera_falls_back() {
        let input = InputIntent {
            forward: true,
            ..Default::default()
        };
        let d = input.direction(Vec3::new(0.0, -1.0, 0.0));
        assert!((d - Vec3::new(0.0, 0.0, -1.0)).norm() < 1.0e-5);
    }
}
