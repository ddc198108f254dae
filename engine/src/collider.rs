/*!
Static box colliders derived from loaded scene geometry.

Each mesh node becomes one oriented box: the node's local AABB is scaled by the world scale,
padded, clamped to a per-axis floor, and placed at the world-space image of the local center
with the world rotation.

Notes
- The vertical floor is thicker than the horizontal one so thin floor slabs still stop a
  falling sphere within one step.
- Mirrored transforms (negative determinant) fold the sign into X scale; half-extents use
  the absolute value so the box is unaffected.
- Derivation is per-node fallible; `derive_colliders` logs and skips failures.
*/

use log::{debug, warn};
use nalgebra as na;

use crate::config::ColliderConfig;
use crate::error::{DeriveError, DeriveResult};
use crate::scene::{NodeId, SceneGraph, SceneNode};
use crate::types::{Mat4, Quat, Vec3};

/// Scales below this are treated as collapsed.
const MIN_SCALE: f32 = 1.0e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedCollider {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl DerivedCollider {
    /// Highest Y over the eight corners of the oriented box.
    pub fn top_y(&self) -> f32 {
        let h = self.half_extents;
        let mut top = f32::NEG_INFINITY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { -h.x } else { h.x },
                if i & 2 == 0 { -h.y } else { h.y },
                if i & 4 == 0 { -h.z } else { h.z },
            );
            top = top.max(self.center.y + (self.rotation * corner).y);
        }
        top
    }
}

/// World transform split into its parts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Split an affine world matrix into translation, rotation and scale.
///
/// Returns `None` for non-finite matrices or a collapsed axis.
pub fn decompose(m: &Mat4) -> Option<Decomposed> {
    if m.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let translation = Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let basis: na::Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();

    let mut scale = Vec3::new(
        basis.column(0).norm(),
        basis.column(1).norm(),
        basis.column(2).norm(),
    );
    if scale.iter().any(|s| *s < MIN_SCALE) {
        return None;
    }
    if basis.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    let mut rot = basis;
    for (i, s) in scale.iter().enumerate() {
        rot.column_mut(i).scale_mut(1.0 / s);
    }
    let rotation = Quat::from_matrix(&rot);

    Some(Decomposed {
        translation,
        rotation,
        scale,
    })
}

/// Derive one static box collider from a mesh node.
pub fn derive_collider(node: &SceneNode, cfg: &ColliderConfig) -> DeriveResult<DerivedCollider> {
    let local = node.local_bounds.ok_or_else(|| DeriveError::NoGeometry {
        name: node.name.clone(),
    })?;
    if !local.is_valid() {
        return Err(DeriveError::InvalidBounds {
            name: node.name.clone(),
        });
    }
    let parts = decompose(&node.world).ok_or_else(|| DeriveError::DegenerateTransform {
        name: node.name.clone(),
    })?;

    let size = local.size();
    let floors = Vec3::new(cfg.min_half_xz, cfg.min_half_y, cfg.min_half_xz);
    let half_extents = Vec3::from_fn(|i, _| {
        let scaled = (size[i] * parts.scale[i]).abs() * 0.5 + cfg.padding;
        scaled.max(floors[i])
    });

    let center = node
        .world
        .transform_point(&na::Point3::from(local.center()))
        .coords;

    Ok(DerivedCollider {
        center,
        rotation: parts.rotation,
        half_extents,
    })
}

/// Name-based exclusion (lights, decorative tori, markers and toggle props).
pub fn is_excluded(name: &str, cfg: &ColliderConfig) -> bool {
    let n = name.to_ascii_lowercase();
    cfg.exclude_substrings.iter().any(|s| n.contains(s.as_str()))
        || cfg.exclude_names.iter().any(|s| n == *s)
        || cfg.exclude_prefixes.iter().any(|s| n.starts_with(s.as_str()))
}

/// Derive colliders for every eligible node in `graph`.
///
/// Excluded names and geometry-less nodes are skipped quietly; any other failure is logged
/// and the node is skipped.
pub fn derive_colliders(graph: &SceneGraph, cfg: &ColliderConfig) -> Vec<(NodeId, DerivedCollider)> {
    let mut out = Vec::new();
    for (id, node) in graph.iter() {
        if is_excluded(&node.name, cfg) {
            continue;
        }
        match derive_collider(node, cfg) {
            Ok(c) => {
                debug!(
                    "collider `{}` center=({:.2},{:.2},{:.2}) half=({:.2},{:.2},{:.2})",
                    node.name,
                    c.center.x,
                    c.center.y,
                    c.center.z,
                    c.half_extents.x,
                    c.half_extents.y,
                    c.half_extents.z
                );
                out.push((id, c));
            }
            Err(DeriveError::NoGeometry { .. }) => {}
            Err(e) => warn!("skipping collider: {e}"),
        }
    }
    out
}
