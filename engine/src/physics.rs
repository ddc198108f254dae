/*!
Rapier-backed dynamics world.

Owns every rapier set plus a fixed-step accumulator. Gameplay code talks to bodies through
`BodyHandle` and plain `Vec3`/`Quat` values; rapier types stay inside this module.

Design notes
- `step` advances in whole `fixed_dt` increments, at most `max_substeps` per call. Backlog
  beyond the cap is discarded so a long stall never turns into a burst of catch-up steps.
- User forces are one-shot: they are cleared after every internal step, so a force added
  before `step` acts on exactly one substep.
- Contact pair rules are installed once at construction and run as pipeline hooks.
*/

use log::warn;
use rapier3d::prelude::*;

use crate::config::PhysicsConfig;
use crate::materials::{ContactRules, PhysicsMaterial};
use crate::types::{Quat, Vec3};

pub type BodyHandle = RigidBodyHandle;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyKind {
    Fixed,
    Dynamic { mass: f32 },
}

/// Everything needed to create one body with a single attached collider.
#[derive(Clone, Copy, Debug)]
pub struct BodyDesc {
    pub shape: BodyShape,
    pub kind: BodyKind,
    pub translation: Vec3,
    pub rotation: Quat,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub material: PhysicsMaterial,
    pub lock_rotations: bool,
    /// Collision response; a disabled collider is ignored by the solver.
    pub enabled: bool,
}

impl BodyDesc {
    pub fn fixed_box(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            shape: BodyShape::Cuboid { half_extents },
            kind: BodyKind::Fixed,
            translation: center,
            rotation,
            linear_damping: 0.0,
            angular_damping: 0.0,
            material: PhysicsMaterial::Ground,
            lock_rotations: false,
            enabled: true,
        }
    }

    pub fn dynamic(shape: BodyShape, mass: f32, translation: Vec3, material: PhysicsMaterial) -> Self {
        Self {
            shape,
            kind: BodyKind::Dynamic { mass },
            translation,
            rotation: Quat::identity(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            material,
            lock_rotations: false,
            enabled: true,
        }
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_locked_rotations(mut self) -> Self {
        self.lock_rotations = true;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

pub struct PhysicsWorld {
    gravity: Vector<f32>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    rules: ContactRules,
    allow_sleep: bool,
    accumulator: f32,
}

impl PhysicsWorld {
    pub fn new(cfg: &PhysicsConfig) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = cfg.fixed_dt;
        params.num_solver_iterations = cfg
            .solver_iterations
            .max(1)
            .try_into()
            .unwrap_or(params.num_solver_iterations);
        params.normalized_allowed_linear_error = cfg.solver_tolerance;

        Self {
            gravity: vector![0.0, -cfg.gravity, 0.0],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rules: ContactRules::from_config(&cfg.materials),
            allow_sleep: cfg.allow_sleep,
            accumulator: 0.0,
        }
    }

    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let iso = Isometry::from_parts(to_na(desc.translation).into(), to_rot(desc.rotation));
        let mut builder = match desc.kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic { .. } => RigidBodyBuilder::dynamic(),
        }
        .pose(iso)
        .linear_damping(desc.linear_damping)
        .angular_damping(desc.angular_damping)
        .can_sleep(self.allow_sleep);
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        let handle = self.bodies.insert(builder.build());

        let mut collider = match desc.shape {
            BodyShape::Sphere { radius } => ColliderBuilder::ball(radius),
            BodyShape::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
        }
        .user_data(desc.material.to_user_data())
        .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
        .enabled(desc.enabled);
        if let BodyKind::Dynamic { mass } = desc.kind {
            collider = collider.mass(mass);
        }
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);
        handle
    }

    /// Remove a body and its collider. Returns whether the body existed.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Remove every body for which `keep` returns false.
    pub fn retain_bodies(&mut self, mut keep: impl FnMut(BodyHandle) -> bool) {
        let doomed: Vec<BodyHandle> = self
            .bodies
            .iter()
            .map(|(h, _)| h)
            .filter(|h| !keep(*h))
            .collect();
        for h in doomed {
            self.remove_body(h);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Advance by whole fixed steps covering `wall_dt` (plus carried remainder).
    /// Returns the number of internal steps taken.
    pub fn step(&mut self, fixed_dt: f32, wall_dt: f32, max_substeps: u32) -> u32 {
        if fixed_dt.is_nan() || fixed_dt <= 0.0 || !wall_dt.is_finite() || wall_dt <= 0.0 {
            return 0;
        }
        self.params.dt = fixed_dt;
        self.accumulator += wall_dt;

        let mut steps = 0;
        while self.accumulator >= fixed_dt && steps < max_substeps {
            self.pipeline.step(
                &self.gravity,
                &self.params,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                &self.rules,
                &(),
            );
            for (_, body) in self.bodies.iter_mut() {
                body.reset_forces(false);
            }
            self.accumulator -= fixed_dt;
            steps += 1;
        }
        if self.accumulator >= fixed_dt {
            warn!(
                "physics fell behind; dropping {:.3}s of simulation",
                self.accumulator - self.accumulator % fixed_dt
            );
            self.accumulator %= fixed_dt;
        }
        steps
    }

    pub fn translation(&self, h: BodyHandle) -> Option<Vec3> {
        self.bodies.get(h).map(|b| from_na(b.translation()))
    }

    pub fn rotation(&self, h: BodyHandle) -> Option<Quat> {
        self.bodies.get(h).map(|b| from_rot(b.rotation()))
    }

    pub fn linvel(&self, h: BodyHandle) -> Option<Vec3> {
        self.bodies.get(h).map(|b| from_na(b.linvel()))
    }

    pub fn set_linvel(&mut self, h: BodyHandle, v: Vec3) {
        if let Some(b) = self.bodies.get_mut(h) {
            b.set_linvel(to_na(v), true);
        }
    }

    pub fn add_force(&mut self, h: BodyHandle, force: Vec3) {
        if let Some(b) = self.bodies.get_mut(h) {
            b.add_force(to_na(force), true);
        }
    }

    pub fn add_force_at_point(&mut self, h: BodyHandle, force: Vec3, point: Vec3) {
        if let Some(b) = self.bodies.get_mut(h) {
            b.add_force_at_point(to_na(force), to_na(point).into(), true);
        }
    }

    /// Move a body, clearing linear and angular velocity and waking it.
    pub fn teleport(&mut self, h: BodyHandle, to: Vec3) {
        if let Some(b) = self.bodies.get_mut(h) {
            b.set_translation(to_na(to), true);
            b.set_linvel(Vector::zeros(), true);
            b.set_angvel(Vector::zeros(), true);
            b.reset_forces(true);
            b.wake_up(true);
        }
    }

    /// Toggle collision response for every collider attached to `h`.
    pub fn set_collision_enabled(&mut self, h: BodyHandle, enabled: bool) {
        let Some(body) = self.bodies.get(h) else {
            return;
        };
        let attached: Vec<ColliderHandle> = body.colliders().to_vec();
        for ch in attached {
            if let Some(c) = self.colliders.get_mut(ch) {
                c.set_enabled(enabled);
            }
        }
    }

    pub fn collision_enabled(&self, h: BodyHandle) -> Option<bool> {
        let body = self.bodies.get(h)?;
        let ch = body.colliders().first()?;
        self.colliders.get(*ch).map(|c| c.is_enabled())
    }

    pub fn is_sleeping(&self, h: BodyHandle) -> Option<bool> {
        self.bodies.get(h).map(|b| b.is_sleeping())
    }
}

#[inline]
fn to_na(v: Vec3) -> Vector<f32> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn from_na(v: &Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
fn to_rot(q: Quat) -> Rotation<f32> {
    let q = q.into_inner();
    Rotation::from_quaternion(rapier3d::na::Quaternion::new(q.w, q.i, q.j, q.k))
}

#[inline]
fn from_rot(r: &Rotation<f32>) -> Quat {
    let q = r.into_inner();
    Quat::from_quaternion(nalgebra::Quaternion::new(q.w, q.i, q.j, q.k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::ContactParams;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsConfig::default())
    }

    fn ball(world: &mut PhysicsWorld, at: Vec3) -> BodyHandle {
        world.add_body(
            BodyDesc::dynamic(BodyShape::Sphere { radius: 0.5 }, 1.0, at, PhysicsMaterial::Player)
                .with_damping(0.4, 0.6),
        )
    }

    #[test]
    fn accumulator_caps_and_drops_backlog() {
        let mut w = world();
        let dt = 1.0 / 60.0;
        assert_eq!(w.step(dt, dt * 0.5, 10), 0);
        assert_eq!(w.step(dt, dt * 0.6, 10), 1);
        assert_eq!(w.step(dt, 5.0, 10), 10);
        // Backlog dropped: a tiny frame afterwards takes no extra steps.
        assert_eq!(w.step(dt, dt * 0.01, 10), 0);
    }

    #[test]
    fn step_rejects_nonsense_input() {
        let mut w = world();
        assert_eq!(w.step(0.0, 1.0, 10), 0);
        assert_eq!(w.step(1.0 / 60.0, f32::NAN, 10), 0);
        assert_eq!(w.step(1.0 / 60.0, -1.0, 10), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_bodies() {
        let mut w = world();
        let h = ball(&mut w, Vec3::new(0.0, 10.0, 0.0));
        w.step(1.0 / 60.0, 0.5, 60);
        let p = w.translation(h).unwrap();
        assert!(p.y < 10.0);
        assert!(w.linvel(h).unwrap().y < 0.0);
    }

    #[test]
    fn ball_rests_on_fixed_box() {
        let mut w = world();
        w.add_body(BodyDesc::fixed_box(Vec3::zeros(), Quat::identity(), Vec3::new(5.0, 0.5, 5.0)));
        let h = ball(&mut w, Vec3::new(0.0, 2.0, 0.0));
        for _ in 0..180 {
            w.step(1.0 / 60.0, 1.0 / 60.0, 10);
        }
        let p = w.translation(h).unwrap();
        assert!((p.y - 1.0).abs() < 0.1, "y = {}", p.y);
    }

    #[test]
    fn disabled_collider_lets_bodies_through() {
        let mut w = world();
        let floor = w.add_body(
            BodyDesc::fixed_box(Vec3::zeros(), Quat::identity(), Vec3::new(5.0, 0.5, 5.0)).with_enabled(false),
        );
        assert_eq!(w.collision_enabled(floor), Some(false));
        let h = ball(&mut w, Vec3::new(0.0, 2.0, 0.0));
        for _ in 0..120 {
            w.step(1.0 / 60.0, 1.0 / 60.0, 10);
        }
        assert!(w.translation(h).unwrap().y < -1.0);

        w.set_collision_enabled(floor, true);
        assert_eq!(w.collision_enabled(floor), Some(true));
    }

    fn slide_distance(crate_ground_friction: f32) -> f32 {
        let mut cfg = PhysicsConfig::default();
        cfg.materials.crate_ground = ContactParams::new(crate_ground_friction, 0.0);
        let mut w = PhysicsWorld::new(&cfg);
        w.add_body(BodyDesc::fixed_box(Vec3::zeros(), Quat::identity(), Vec3::new(20.0, 0.5, 20.0)));
        let h = w.add_body(
            BodyDesc::dynamic(
                BodyShape::Cuboid {
                    half_extents: Vec3::repeat(0.5),
                },
                0.3,
                Vec3::new(0.0, 1.0, 0.0),
                PhysicsMaterial::Crate,
            )
            .with_locked_rotations(),
        );
        for _ in 0..10 {
            w.step(1.0 / 60.0, 1.0 / 60.0, 10);
        }
        w.set_linvel(h, Vec3::new(4.0, 0.0, 0.0));
        for _ in 0..120 {
            w.step(1.0 / 60.0, 1.0 / 60.0, 10);
        }
        w.translation(h).unwrap().x
    }

    #[test]
    fn crate_ground_friction_changes_slide() {
        let slippery = slide_distance(0.05);
        let grippy = slide_distance(1.0);
        assert!(grippy < 1.5, "grippy slid {grippy}");
        assert!(slippery > grippy * 2.0, "slippery {slippery} vs grippy {grippy}");
    }

    #[test]
    fn teleport_resets_motion() {
        let mut w = world();
        let h = ball(&mut w, Vec3::new(0.0, 10.0, 0.0));
        w.set_linvel(h, Vec3::new(3.0, -20.0, 1.0));
        w.teleport(h, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(w.translation(h).unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(w.linvel(h).unwrap(), Vec3::zeros());
        assert_eq!(w.is_sleeping(h), Some(false));
    }

    #[test]
    fn retain_keeps_only_selected() {
        let mut w = world();
        let keep = ball(&mut w, Vec3::zeros());
        ball(&mut w, Vec3::new(3.0, 0.0, 0.0));
        w.add_body(BodyDesc::fixed_box(Vec3::zeros(), Quat::identity(), Vec3::repeat(1.0)));
        w.retain_bodies(|h| h == keep);
        assert_eq!(w.body_count(), 1);
        assert!(w.contains(keep));
        assert!(!w.remove_body(RigidBodyHandle::invalid()));
    }
}
