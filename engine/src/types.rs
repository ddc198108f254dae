/*!
Math aliases and the axis-aligned box type shared by the gameplay modules.

Notes
- Scene input arrives as column-major 4x4 world matrices (translation in the last column).
- `Aabb` is always axis-aligned in whatever space it was built in; `transformed` re-wraps
  the eight corners, so rotated boxes grow.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Mat4 = na::Matrix4<f32>;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents.abs();
        Self {
            min: center - h,
            max: center + h,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Finite and non-inverted on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    #[inline]
    pub fn contains(&self, p: &Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Bounds of this box after applying `m` (all eight corners, re-wrapped).
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = na::Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = m.transform_point(&corner).coords;
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Aabb { min, max }
    }

    /// Smallest box containing both.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }
}

/// Build a world matrix from translation, rotation and (possibly non-uniform) scale.
#[inline]
pub fn compose(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    na::Matrix4::new_translation(&translation)
        * rotation.to_homogeneous()
        * na::Matrix4::new_nonuniform_scaling(&scale)
}

/// Planar (XZ) distance between two world positions.
#[inline]
pub fn horizontal_distance(a: &Vec3, b: &Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Vector with the Y component removed.
#[inline]
pub fn horizontal(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transformed_box_tracks_translation() {
        let b = Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        let m = Mat4::new_translation(&Vec3::new(10.0, 0.0, -5.0));
        let t = b.transformed(&m);
        assert!((t.center() - Vec3::new(10.0, 0.0, -5.0)).norm() < 1.0e-5);
        assert!((t.size() - Vec3::new(2.0, 4.0, 6.0)).norm() < 1.0e-5);
    }

    #[test]
    fn rotated_box_grows_to_cover_corners() {
        let b = Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let rot = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_4);
        let t = b.transformed(&compose(Vec3::zeros(), rot, Vec3::repeat(1.0)));
        let expected = 2.0_f32.sqrt();
        assert!((t.max.x - expected).abs() < 1.0e-4);
        assert!((t.max.y - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn inverted_box_is_invalid() {
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
        assert!(!b.is_valid());
        let nan = Aabb::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::repeat(1.0));
        assert!(!nan.is_valid());
    }

    #[test]
    fn horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 100.0, 0.0);
        let b = Vec3::new(3.0, -4.0, 4.0);
        assert!((horizontal_distance(&a, &b) - 5.0).abs() < 1.0e-6);
    }
}
