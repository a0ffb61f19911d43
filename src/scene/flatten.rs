//! Flattened scene graph output for the renderer.
//!
//! `RenderItem` is the result of walking the scene graph: one entry per
//! visible mesh reachable from the root, with its accumulated world matrix.

use glam::Mat4;

use super::node::SceneNodeId;
use super::resources::{GeometryId, MaterialId};

/// One entry in the flattened visible set.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    /// Scene node this item came from.
    pub node: SceneNodeId,
    /// World transform after propagation.
    pub world: Mat4,
    pub geometry: GeometryId,
    pub materials: Vec<MaterialId>,
}

impl RenderItem {
    /// World-space origin of the mesh.
    pub fn position(&self) -> glam::Vec3 {
        self.world.transform_point3(glam::Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_render_item_position() {
        let item = RenderItem {
            node: SceneNodeId(3),
            world: Mat4::from_translation(Vec3::new(4.0, 0.0, 8.0)),
            geometry: GeometryId(1),
            materials: vec![MaterialId(2)],
        };
        assert_eq!(item.position(), Vec3::new(4.0, 0.0, 8.0));
    }
}
