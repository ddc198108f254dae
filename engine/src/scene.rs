//! Scene-graph input model.
//!
//! The client flattens a loaded glTF scene into a `SceneGraph`: one `SceneNode` per node,
//! carrying its name, its composed world matrix, and (if it has mesh geometry) the
//! local-space AABB of that geometry. The core never sees render handles.

use crate::types::{Aabb, Mat4, Vec3};

/// Index of a node inside its `SceneGraph`. Only meaningful for the graph it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Column-major world matrix (parent chain already composed).
    pub world: Mat4,
    /// Local-space bounds of the node's geometry; `None` for empties and markers.
    pub local_bounds: Option<Aabb>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, world: Mat4, local_bounds: Option<Aabb>) -> Self {
        Self {
            name: name.into(),
            world,
            local_bounds,
        }
    }

    /// Marker/empty node placed at `position`.
    pub fn marker(name: impl Into<String>, position: Vec3) -> Self {
        Self::new(name, Mat4::new_translation(&position), None)
    }

    /// Unit-cube mesh node stretched to `size` and centered at `center`.
    pub fn boxed(name: impl Into<String>, center: Vec3, size: Vec3) -> Self {
        let world = Mat4::new_translation(&center) * Mat4::new_nonuniform_scaling(&size);
        let unit = Aabb::from_center_half_extents(Vec3::zeros(), Vec3::repeat(0.5));
        Self::new(name, world, Some(unit))
    }

    #[inline]
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.world[(0, 3)], self.world[(1, 3)], self.world[(2, 3)])
    }

    /// World-space AABB of the geometry, if any.
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.local_bounds.map(|b| b.transformed(&self.world))
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Lowest world-space Y over all geometry, ignoring invalid bounds.
    pub fn min_y(&self) -> Option<f32> {
        self.nodes
            .iter()
            .filter_map(SceneNode::world_bounds)
            .filter(Aabb::is_valid)
            .map(|b| b.min.y)
            .reduce(f32::min)
    }
}

impl FromIterator<SceneNode> for SceneGraph {
    fn from_iter<I: IntoIterator<Item = SceneNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
