//! Scene graph: CPU-side hierarchy of nodes.
//!
//! The scene graph organizes meshes with parent/child relationships and owns
//! the resource pool they reference. Each frame, `flatten()` walks the tree
//! from the root and produces a flat `Vec<RenderItem>` for the renderer.
//! Nodes created but not yet attached are invisible to `flatten()`.

use std::collections::HashMap;

use glam::Mat4;

use crate::procgen::{GeometryDesc, MaterialDesc};

use super::flatten::RenderItem;
use super::host::SceneHost;
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
use super::resources::{GeometryId, MaterialId, ResourcePool};

/// CPU-side scene graph.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    resources: ResourcePool,
    /// World transforms are stale
    dirty: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            resources: ResourcePool::new(),
            dirty: true,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Allocate a fresh node ID.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a parentless node. It stays out of `flatten()` until attached.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        transform: LocalTransform,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.local_transform = transform;
        self.nodes.insert(id, node);
        id
    }

    /// Attach `id` under `new_parent`, detaching it from any previous parent.
    /// Cannot move the root or create a cycle.
    pub fn attach(&mut self, id: SceneNodeId, new_parent: SceneNodeId) {
        if id == self.root || !self.nodes.contains_key(&id) || !self.nodes.contains_key(&new_parent) {
            log::warn!("Ignoring attach of {:?} under {:?}", id, new_parent);
            return;
        }
        if self.is_ancestor(id, new_parent) {
            log::warn!("Ignoring attach of {:?} under its own descendant {:?}", id, new_parent);
            return;
        }

        // Detach from old parent
        if let Some(old_parent_id) = self.nodes[&id].parent {
            if let Some(old_parent) = self.nodes.get_mut(&old_parent_id) {
                old_parent.children.retain(|c| *c != id);
            }
        }

        // Attach to new parent
        if let Some(new_parent_node) = self.nodes.get_mut(&new_parent) {
            new_parent_node.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
        }

        self.dirty = true;
    }

    /// True if `ancestor` is `id` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: SceneNodeId, id: SceneNodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    /// True if the node is reachable from the root.
    pub fn is_attached(&self, id: SceneNodeId) -> bool {
        self.nodes.contains_key(&id) && self.is_ancestor(self.root, id)
    }

    /// Remove a node and its entire subtree. Cannot remove the root.
    pub fn remove(&mut self, id: SceneNodeId) {
        if id == self.root {
            return;
        }

        // Collect subtree IDs (BFS)
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            let current = to_remove[i];
            if let Some(node) = self.nodes.get(&current) {
                to_remove.extend_from_slice(&node.children);
            }
            i += 1;
        }

        // Detach from parent
        if let Some(parent_id) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        // Remove all nodes in subtree
        for nid in to_remove {
            self.nodes.remove(&nid);
        }

        self.dirty = true;
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Total number of nodes in the graph, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourcePool {
        &mut self.resources
    }

    /// Walk the tree, propagate transforms, and collect all visible meshes.
    /// Transforms are only re-propagated after the hierarchy changed.
    pub fn flatten(&mut self) -> Vec<RenderItem> {
        if self.dirty {
            self.propagate_transforms(self.root, Mat4::IDENTITY);
            self.dirty = false;
        }

        let mut out = Vec::new();
        self.collect_visible(self.root, &mut out);
        out
    }

    /// Recursively propagate world transforms.
    fn propagate_transforms(&mut self, node_id: SceneNodeId, parent_world: Mat4) {
        let (local_mat, children) = {
            let node = match self.nodes.get(&node_id) {
                Some(n) => n,
                None => return,
            };
            (node.local_transform.to_mat4(), node.children.clone())
        };

        let world = parent_world * local_mat;

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.world_transform = world;
        }

        for child_id in children {
            self.propagate_transforms(child_id, world);
        }
    }

    /// Recursively collect visible meshes. Hidden nodes hide their subtree.
    fn collect_visible(&self, node_id: SceneNodeId, out: &mut Vec<RenderItem>) {
        let node = match self.nodes.get(&node_id) {
            Some(n) => n,
            None => return,
        };

        if !node.visible {
            return;
        }

        if let NodeContent::Mesh { geometry, material } = &node.content {
            out.push(RenderItem {
                node: node.id,
                world: node.world_transform,
                geometry: *geometry,
                materials: material.ids().to_vec(),
            });
        }

        for &child_id in &node.children {
            self.collect_visible(child_id, out);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for SceneGraph {
    fn root(&self) -> SceneNodeId {
        self.root
    }

    fn create_node(&mut self, name: &str, transform: LocalTransform, content: NodeContent) -> SceneNodeId {
        SceneGraph::create_node(self, name, transform, content)
    }

    fn attach(&mut self, node: SceneNodeId, parent: SceneNodeId) {
        SceneGraph::attach(self, node, parent);
    }

    fn detach(&mut self, node: SceneNodeId) {
        self.remove(node);
    }

    fn allocate_geometry(&mut self, desc: &GeometryDesc) -> GeometryId {
        self.resources.allocate_geometry(desc)
    }

    fn allocate_material(&mut self, desc: &MaterialDesc) -> MaterialId {
        self.resources.allocate_material(desc)
    }

    fn dispose_geometry(&mut self, id: GeometryId) -> bool {
        self.resources.dispose_geometry(id)
    }

    fn dispose_material(&mut self, id: MaterialId) -> bool {
        self.resources.dispose_material(id)
    }
}
