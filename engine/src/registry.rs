/*!
Typed lookup of the named nodes gameplay cares about.

Built in a single pass over a `SceneGraph` when a room loads. Name matching is
case-insensitive; the first node carrying a role wins for `first`, `all` returns every match
in scene order.

Notes
- `end` (the room-2 win marker) and `end1..end4` (room-1 exit platforms) are distinct roles.
- `bridge` is matched as a prefix so split meshes (`bridge`, `bridge_rail`, ...) reveal together.
*/

use std::collections::HashMap;

use crate::scene::{NodeId, SceneGraph, SceneNode};
use crate::types::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Start,
    Start2,
    CrateAnchor,
    CrateGoal,
    EndPlatform,
    Goal,
    Key,
    PowerBoxInactive,
    PowerBoxActive,
    PlateInactive,
    PlateActive,
    Bridge,
    End,
    HiddenCollider,
    CheckpointPlatform,
}

impl NodeRole {
    /// Classify a node name. `None` means plain room geometry.
    pub fn from_name(name: &str) -> Option<NodeRole> {
        let n = name.to_ascii_lowercase();
        let role = match n.as_str() {
            "start" => NodeRole::Start,
            "start2" => NodeRole::Start2,
            "cubestart" => NodeRole::CrateAnchor,
            "cubeend" => NodeRole::CrateGoal,
            "end1" | "end2" | "end3" | "end4" => NodeRole::EndPlatform,
            "goal" => NodeRole::Goal,
            "key" => NodeRole::Key,
            "powerbox_inactive" => NodeRole::PowerBoxInactive,
            "powerbox_active" => NodeRole::PowerBoxActive,
            "plate_inactive" => NodeRole::PlateInactive,
            "plate_active" => NodeRole::PlateActive,
            "end" => NodeRole::End,
            _ if n.starts_with("col_") => NodeRole::HiddenCollider,
            _ if n.starts_with("checkpoint") => NodeRole::CheckpointPlatform,
            _ if n.starts_with("bridge") => NodeRole::Bridge,
            _ => return None,
        };
        Some(role)
    }

    /// Nodes with these roles are not shown when the room is entered.
    pub fn starts_hidden(self) -> bool {
        matches!(
            self,
            NodeRole::EndPlatform
                | NodeRole::Bridge
                | NodeRole::HiddenCollider
                | NodeRole::PowerBoxActive
                | NodeRole::PlateActive
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct NodeRegistry {
    by_role: HashMap<NodeRole, Vec<NodeId>>,
    positions: HashMap<NodeId, Vec3>,
    names: HashMap<NodeId, String>,
}

impl NodeRegistry {
    pub fn build(graph: &SceneGraph) -> Self {
        let mut reg = NodeRegistry::default();
        for (id, node) in graph.iter() {
            let Some(role) = NodeRole::from_name(&node.name) else {
                continue;
            };
            reg.insert(id, role, node);
        }
        reg
    }

    fn insert(&mut self, id: NodeId, role: NodeRole, node: &SceneNode) {
        self.by_role.entry(role).or_default().push(id);
        self.positions.insert(id, node.world_position());
        self.names.insert(id, node.name.clone());
    }

    pub fn first(&self, role: NodeRole) -> Option<NodeId> {
        self.by_role.get(&role).and_then(|v| v.first().copied())
    }

    pub fn all(&self, role: NodeRole) -> &[NodeId] {
        self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// World position of the first node with `role`.
    pub fn position(&self, role: NodeRole) -> Option<Vec3> {
        self.first(role).and_then(|id| self.positions.get(&id).copied())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn names(&self, role: NodeRole) -> impl Iterator<Item = &str> + '_ {
        self.all(role).iter().filter_map(|id| self.name(*id))
    }

    pub fn has(&self, role: NodeRole) -> bool {
        !self.all(role).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_names_case_insensitively() {
        assert_eq!(NodeRole::from_name("Start"), Some(NodeRole::Start));
        assert_eq!(NodeRole::from_name("CUBEEND"), Some(NodeRole::CrateGoal));
        assert_eq!(NodeRole::from_name("end3"), Some(NodeRole::EndPlatform));
        assert_eq!(NodeRole::from_name("end"), Some(NodeRole::End));
        assert_eq!(NodeRole::from_name("col_wall"), Some(NodeRole::HiddenCollider));
        assert_eq!(NodeRole::from_name("checkpoint_a"), Some(NodeRole::CheckpointPlatform));
        assert_eq!(NodeRole::from_name("bridge_rail"), Some(NodeRole::Bridge));
        assert_eq!(NodeRole::from_name("floor"), None);
        assert_eq!(NodeRole::from_name("end5"), None);
    }

    #[test]
    fn build_collects_roles_in_scene_order() {
        let graph: SceneGraph = [
            SceneNode::marker("start", Vec3::new(1.0, 0.0, 0.0)),
            SceneNode::boxed("end1", Vec3::zeros(), Vec3::repeat(1.0)),
            SceneNode::boxed("floor", Vec3::zeros(), Vec3::repeat(1.0)),
            SceneNode::boxed("end2", Vec3::zeros(), Vec3::repeat(1.0)),
        ]
        .into_iter()
        .collect();
        let reg = NodeRegistry::build(&graph);
        assert_eq!(reg.position(NodeRole::Start), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(reg.all(NodeRole::EndPlatform), &[NodeId(1), NodeId(3)]);
        assert_eq!(reg.names(NodeRole::EndPlatform).collect::<Vec<_>>(), vec!["end1", "end2"]);
        assert!(!reg.has(NodeRole::Goal));
        assert!(reg.position(NodeRole::Goal).is_none());
    }
}
