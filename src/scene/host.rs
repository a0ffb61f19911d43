//! The scene-graph contract the tree lifecycle drives.
//!
//! Anything that can hold nodes and hand out geometry/material resources can
//! host generated trees. [`SceneGraph`](super::SceneGraph) is the in-process
//! implementation; a renderer binding would implement the same trait.

use crate::procgen::{GeometryDesc, MaterialDesc};

use super::node::{LocalTransform, NodeContent, SceneNodeId};
use super::resources::{GeometryId, MaterialId};

pub trait SceneHost {
    /// Node that attached content hangs under.
    fn root(&self) -> SceneNodeId;

    /// Create a node that is not yet part of the visible hierarchy.
    fn create_node(&mut self, name: &str, transform: LocalTransform, content: NodeContent) -> SceneNodeId;

    /// Make `node` a child of `parent`, moving it if it already had one.
    fn attach(&mut self, node: SceneNodeId, parent: SceneNodeId);

    /// Unlink `node` from its parent and drop it together with its subtree.
    /// Resources referenced by the subtree are not released.
    fn detach(&mut self, node: SceneNodeId);

    fn allocate_geometry(&mut self, desc: &GeometryDesc) -> GeometryId;

    fn allocate_material(&mut self, desc: &MaterialDesc) -> MaterialId;

    /// Release a geometry. Must be a no-op (returning false) if already released.
    fn dispose_geometry(&mut self, id: GeometryId) -> bool;

    /// Release a material. Must be a no-op (returning false) if already released.
    fn dispose_material(&mut self, id: MaterialId) -> bool;
}
