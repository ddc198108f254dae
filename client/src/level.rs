//! Room scene loading.
//!
//! A room is a glTF file. Once it (and every dependency) is loaded, its node tree is flattened
//! into an `engine::SceneGraph` for the session, and the glTF scene is spawned for rendering.
//!
//! Notes
//! - World matrices are composed from node transforms root-down, so the session sees the
//!   same placement the renderer does.
//! - A node's local bounds are the union of its primitives' mesh AABBs.

use bevy::{
    camera::primitives::MeshAabb,
    gltf::{Gltf, GltfMesh, GltfNode},
    platform::collections::HashSet,
    prelude::*,
};
use engine::{LoadError, RoomId, SceneGraph, SceneNode};
use nalgebra as na;

use crate::FrameSet;
use crate::session::Session;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<RoomLoader>();
    app.add_systems(Update, poll_room_load.in_set(FrameSet::Load));
}

/// Marks the root entity of the rendered room scene.
#[derive(Component)]
pub struct RoomScene;

#[derive(Resource, Default)]
pub struct RoomLoader {
    pending: Option<PendingRoom>,
    scene: Option<Entity>,
}

struct PendingRoom {
    room: RoomId,
    handle: Handle<Gltf>,
}

impl RoomLoader {
    pub fn request(&mut self, room: RoomId, handle: Handle<Gltf>) {
        self.pending = Some(PendingRoom { room, handle });
    }

    /// Despawn the currently rendered room, if any.
    pub fn clear_scene(&mut self, commands: &mut Commands) {
        if let Some(entity) = self.scene.take() {
            commands.entity(entity).despawn();
        }
    }
}

fn poll_room_load(
    mut commands: Commands,
    mut loader: ResMut<RoomLoader>,
    mut session: ResMut<Session>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    nodes: Res<Assets<GltfNode>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    meshes: Res<Assets<Mesh>>,
) {
    let Some(pending) = loader.pending.as_ref() else {
        return;
    };
    let room = pending.room;
    let path = pending
        .handle
        .path()
        .map(|p| p.to_string())
        .unwrap_or_default();

    let result = match asset_server.recursive_dependency_load_state(&pending.handle) {
        bevy::asset::RecursiveDependencyLoadState::Loaded => match gltfs.get(&pending.handle) {
            Some(gltf) => scene_graph(room, gltf, &nodes, &gltf_meshes, &meshes)
                .map(|graph| (graph, scene_handle(gltf))),
            None => Err(LoadError::Asset {
                path,
                reason: "loaded asset is not a glTF document".into(),
            }),
        },
        bevy::asset::RecursiveDependencyLoadState::Failed(err) => Err(LoadError::Asset {
            path,
            reason: err.to_string(),
        }),
        _ => return,
    };
    loader.pending = None;

    match result {
        Ok((graph, scene)) => {
            info!("{room:?}: {} scene nodes", graph.len());
            if session.on_room_loaded(room, Ok(graph)) {
                loader.clear_scene(&mut commands);
                if let Some(scene) = scene {
                    loader.scene = Some(commands.spawn((RoomScene, SceneRoot(scene))).id());
                }
            }
        }
        Err(e) => {
            session.on_room_loaded(room, Err(e));
        }
    }
}

fn scene_handle(gltf: &Gltf) -> Option<Handle<Scene>> {
    gltf.default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
}

/// Flatten the glTF node hierarchy into world-space scene nodes.
fn scene_graph(
    room: RoomId,
    gltf: &Gltf,
    nodes: &Assets<GltfNode>,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
) -> Result<SceneGraph, LoadError> {
    let children: HashSet<AssetId<GltfNode>> = gltf
        .nodes
        .iter()
        .filter_map(|h| nodes.get(h))
        .flat_map(|n| n.children.iter().map(|c| c.id()))
        .collect();

    let mut graph = SceneGraph::new();
    let mut stack: Vec<(Handle<GltfNode>, Mat4)> = gltf
        .nodes
        .iter()
        .filter(|h| !children.contains(&h.id()))
        .map(|h| (h.clone(), Mat4::IDENTITY))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let Some(node) = nodes.get(&handle) else {
            warn!("glTF node {:?} missing; skipped", handle.id());
            continue;
        };
        let t = node.transform;
        let world = parent * Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.translation);
        let bounds = node
            .mesh
            .as_ref()
            .and_then(|m| gltf_meshes.get(m))
            .and_then(|m| local_bounds(m, meshes));

        graph.push(SceneNode::new(
            node.name.clone(),
            na::Matrix4::from_column_slice(&world.to_cols_array()),
            bounds,
        ));
        stack.extend(node.children.iter().map(|c| (c.clone(), world)));
    }

    if graph.is_empty() {
        return Err(LoadError::EmptyScene { room });
    }
    Ok(graph)
}

fn local_bounds(mesh: &GltfMesh, meshes: &Assets<Mesh>) -> Option<engine::Aabb> {
    mesh.primitives
        .iter()
        .filter_map(|p| meshes.get(&p.mesh))
        .filter_map(|m| m.compute_aabb())
        .map(|aabb| {
            let c = aabb.center;
            let h = aabb.half_extents;
            engine::Aabb::from_center_half_extents(
                engine::Vec3::new(c.x, c.y, c.z),
                engine::Vec3::new(h.x, h.y, h.z),
            )
        })
        .reduce(|a, b| a.union(&b))
}
