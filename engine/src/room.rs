/*!
Room identity, the room state enum, and the per-room content bundle.

`RoomContent` is everything a loaded room adds to the session: the node registry, the static
bodies derived from its geometry, visual props, the optional puzzle crate and the checkpoint
platforms. It is built in one call from a `SceneGraph` and swapped into the session whole.

Notes
- Exit platforms (`end1..end4`) and the bridge get bodies immediately but with collision
  disabled; revealing enables them.
- Exit platforms double as checkpoint platforms once revealed.
*/

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::checkpoint::CheckpointPlatform;
use crate::collider::{DerivedCollider, derive_colliders};
use crate::config::GameConfig;
use crate::physics::{BodyDesc, BodyHandle, PhysicsWorld};
use crate::props::{PropSet, PuzzleCrate, spawn_crate_at};
use crate::registry::{NodeRegistry, NodeRole};
use crate::scene::{NodeId, SceneGraph};
use crate::types::{Aabb, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomId {
    Room1,
    Room2,
}

impl RoomId {
    pub fn asset<'a>(&self, cfg: &'a GameConfig) -> &'a str {
        match self {
            RoomId::Room1 => &cfg.rooms.room1_asset,
            RoomId::Room2 => &cfg.rooms.room2_asset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomState {
    Room1Active,
    TransitioningToRoom2,
    Room2Active,
    /// Terminal; physics keeps running.
    Room2Won,
}

impl RoomState {
    /// Room whose content is (or is about to be) live.
    pub fn room(self) -> RoomId {
        match self {
            RoomState::Room1Active => RoomId::Room1,
            _ => RoomId::Room2,
        }
    }
}

/// One static body derived from a scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomCollider {
    pub node: NodeId,
    pub name: String,
    pub role: Option<NodeRole>,
    pub body: BodyHandle,
    pub shape: DerivedCollider,
    pub enabled: bool,
}

#[derive(Clone, Debug)]
pub struct RoomContent {
    pub room: RoomId,
    pub registry: NodeRegistry,
    pub colliders: Vec<RoomCollider>,
    pub props: PropSet,
    pub puzzle_crate: Option<PuzzleCrate>,
    pub checkpoints: Vec<CheckpointPlatform>,
    /// Lowest geometry Y; fall detection is relative to this.
    pub min_y: f32,
    /// False for placeholder content (not loaded yet, or the load failed).
    pub loaded: bool,
}

impl RoomContent {
    /// Content for a room that failed to load or hasn't loaded yet.
    pub fn empty(room: RoomId, cfg: &GameConfig) -> Self {
        Self {
            room,
            registry: NodeRegistry::default(),
            colliders: Vec::new(),
            props: PropSet::default(),
            puzzle_crate: None,
            checkpoints: Vec::new(),
            min_y: cfg.rooms.default_min_y,
            loaded: false,
        }
    }

    /// Derive colliders, props, crate and checkpoint platforms for `graph`, inserting the
    /// bodies into `world`.
    pub fn build(room: RoomId, graph: &SceneGraph, world: &mut PhysicsWorld, cfg: &GameConfig) -> Self {
        let registry = NodeRegistry::build(graph);

        let mut colliders = Vec::new();
        for (node, shape) in derive_colliders(graph, &cfg.colliders) {
            let Some(scene_node) = graph.get(node) else {
                continue;
            };
            let role = NodeRole::from_name(&scene_node.name);
            let enabled = !matches!(role, Some(NodeRole::EndPlatform | NodeRole::Bridge));
            let body = world.add_body(
                BodyDesc::fixed_box(shape.center, shape.rotation, shape.half_extents).with_enabled(enabled),
            );
            colliders.push(RoomCollider {
                node,
                name: scene_node.name.clone(),
                role,
                body,
                shape,
                enabled,
            });
        }

        let puzzle_crate = registry.first(NodeRole::CrateAnchor).and_then(|id| {
            let node = graph.get(id)?;
            let target = node
                .world_bounds()
                .filter(Aabb::is_valid)
                .unwrap_or_else(|| Aabb::new(node.world_position(), node.world_position()));
            Some(spawn_crate_at(world, &cfg.puzzle_crate, &target))
        });
        if room == RoomId::Room1 && !registry.has(NodeRole::CrateAnchor) {
            warn!("{room:?} has no `cubestart`; crate not spawned");
        }

        let checkpoints = graph
            .iter()
            .filter_map(|(_, node)| {
                let role = NodeRole::from_name(&node.name)?;
                let active = match role {
                    NodeRole::CheckpointPlatform => true,
                    NodeRole::EndPlatform => false,
                    _ => return None,
                };
                let bounds = node.world_bounds().filter(Aabb::is_valid)?;
                Some(CheckpointPlatform::new(node.name.clone(), bounds, active))
            })
            .collect();

        let min_y = graph.min_y().unwrap_or(cfg.rooms.default_min_y);
        let props = PropSet::from_registry(&registry);

        info!(
            "{room:?} built: {} colliders, crate={}, min_y={min_y:.2}",
            colliders.len(),
            puzzle_crate.is_some()
        );

        Self {
            room,
            registry,
            colliders,
            props,
            puzzle_crate,
            checkpoints,
            min_y,
            loaded: true,
        }
    }

    #[inline]
    pub fn marker(&self, role: NodeRole) -> Option<Vec3> {
        self.registry.position(role)
    }

    /// Player spawn: `start2` (room 2 only), then `start`, lifted by the start offset.
    pub fn start_position(&self, cfg: &GameConfig) -> Option<Vec3> {
        let base = match self.room {
            RoomId::Room2 => self.marker(NodeRole::Start2).or_else(|| self.marker(NodeRole::Start)),
            RoomId::Room1 => self.marker(NodeRole::Start),
        }?;
        Some(base + Vec3::new(0.0, cfg.rooms.start_height_offset, 0.0))
    }

    /// Show exit platforms, enable their colliders and make them checkpoint-eligible.
    /// Returns false if already revealed.
    pub fn reveal_end_platforms(&mut self, world: &mut PhysicsWorld) -> bool {
        if !self.props.end_platforms.set(true) {
            return false;
        }
        self.enable_role(world, NodeRole::EndPlatform);
        let names: Vec<&str> = self.registry.names(NodeRole::EndPlatform).collect();
        for cp in self.checkpoints.iter_mut() {
            if names.contains(&cp.name.as_str()) {
                cp.active = true;
            }
        }
        true
    }

    /// Show the bridge and make it solid. Returns false if already revealed.
    pub fn reveal_bridge(&mut self, world: &mut PhysicsWorld) -> bool {
        if !self.props.bridge.set(true) {
            return false;
        }
        self.enable_role(world, NodeRole::Bridge);
        true
    }

    fn enable_role(&mut self, world: &mut PhysicsWorld, role: NodeRole) {
        for c in self.colliders.iter_mut().filter(|c| c.role == Some(role)) {
            world.set_collision_enabled(c.body, true);
            c.enabled = true;
        }
    }

    /// Every body this content owns.
    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.colliders
            .iter()
            .map(|c| c.body)
            .chain(self.puzzle_crate.iter().map(|c| c.body))
    }

    /// Remove every body this content owns from `world`.
    pub fn teardown(self, world: &mut PhysicsWorld) {
        let handles: Vec<BodyHandle> = self.bodies().collect();
        for h in handles {
            world.remove_body(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::scene::SceneNode;

    fn room1_graph() -> SceneGraph {
        [
            SceneNode::boxed("floor", Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 1.0, 20.0)),
            SceneNode::marker("start", Vec3::new(0.0, 0.0, 5.0)),
            SceneNode::boxed("cubestart", Vec3::new(3.0, 0.25, 0.0), Vec3::new(1.0, 0.5, 1.0)),
            SceneNode::boxed("cubeend", Vec3::new(-3.0, 0.05, 0.0), Vec3::new(1.0, 0.1, 1.0)),
            SceneNode::boxed("end1", Vec3::new(0.0, 1.0, -12.0), Vec3::new(2.0, 0.5, 2.0)),
            SceneNode::boxed("checkpoint_mid", Vec3::new(0.0, 0.5, -5.0), Vec3::new(2.0, 1.0, 2.0)),
            SceneNode::boxed("ceiling_light", Vec3::new(0.0, 8.0, 0.0), Vec3::repeat(0.3)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn build_derives_everything_at_once() {
        let cfg = GameConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let content = RoomContent::build(RoomId::Room1, &room1_graph(), &mut world, &cfg);

        // floor, cubestart, end1, checkpoint_mid (cubeend and the light are excluded).
        assert_eq!(content.colliders.len(), 4);
        assert!(content.puzzle_crate.is_some());
        assert_eq!(world.body_count(), 5);
        assert!((content.min_y + 1.0).abs() < 1.0e-5);
        assert_eq!(content.start_position(&cfg), Some(Vec3::new(0.0, 2.0, 5.0)));

        let end1 = content.colliders.iter().find(|c| c.name == "end1").unwrap();
        assert!(!end1.enabled);
        assert_eq!(world.collision_enabled(end1.body), Some(false));
        assert_eq!(content.checkpoints.iter().filter(|c| c.active).count(), 1);
    }

    #[test]
    fn reveal_is_idempotent_and_enables_colliders() {
        let cfg = GameConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut content = RoomContent::build(RoomId::Room1, &room1_graph(), &mut world, &cfg);

        assert!(content.reveal_end_platforms(&mut world));
        assert!(!content.reveal_end_platforms(&mut world));
        let end1 = content.colliders.iter().find(|c| c.name == "end1").unwrap();
        assert_eq!(world.collision_enabled(end1.body), Some(true));
        assert!(content.checkpoints.iter().all(|c| c.active));
    }

    #[test]
    fn teardown_removes_owned_bodies() {
        let cfg = GameConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let content = RoomContent::build(RoomId::Room1, &room1_graph(), &mut world, &cfg);
        content.teardown(&mut world);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn room2_prefers_start2() {
        let cfg = GameConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let graph: SceneGraph = [
            SceneNode::marker("start", Vec3::new(1.0, 0.0, 0.0)),
            SceneNode::marker("start2", Vec3::new(9.0, 0.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let c = RoomContent::build(RoomId::Room2, &graph, &mut world, &cfg);
        assert_eq!(c.start_position(&cfg), Some(Vec3::new(9.0, 2.0, 0.0)));
        assert_eq!(c.min_y, cfg.rooms.default_min_y);
    }
}
