//! Tree lifecycle: owns the mounted tree and swaps it on parameter changes.
//!
//! `regenerate` always runs dispose-then-build:
//! 1. walk the current tree post-order, releasing every node's geometry and
//!    material(s), then detach its group from the host;
//! 2. grow a fresh [`TreeGroup`] at the fixed placement;
//! 3. allocate resources, build the scene subtree under an unattached group,
//!    and attach that group under the host root as the very last step.
//!
//! At most one generation's resources are live at a time, and the host never
//! sees a half-built tree attached.

use std::collections::HashMap;

use crate::math::RandomSource;
use crate::procgen::{generate_placed, MaterialDesc, MaterialSlot, NodeKind, Placement, TreeGroup, TreeNodeId, TreeParams};

use super::host::SceneHost;
use super::node::{LocalTransform, MaterialBinding, NodeContent, SceneNodeId};
use super::resources::{GeometryId, MaterialId};

/// Receives the full parameter set whenever any panel value changes.
pub trait ParameterObserver {
    fn on_parameters_changed(&mut self, params: &TreeParams);
}

/// Scene-side handles for one tree node.
#[derive(Clone, Debug)]
struct NodeBinding {
    scene: SceneNodeId,
    geometry: GeometryId,
    material: MaterialBinding,
}

/// A generated tree and the host resources backing it.
struct MountedTree {
    group: TreeGroup,
    scene_group: SceneNodeId,
    /// Indexed by `TreeNodeId`
    bindings: Vec<NodeBinding>,
    /// One per slot, shared by every node of this generation
    materials: Vec<MaterialId>,
}

/// Owns the single live tree in a scene host.
pub struct TreeLifecycle<H, R> {
    host: H,
    placement: Placement,
    rng: R,
    current: Option<MountedTree>,
    generation: u64,
    capped_branches: bool,
}

impl<H: SceneHost, R: RandomSource> TreeLifecycle<H, R> {
    /// Nothing is generated until the first `regenerate`.
    pub fn new(host: H, placement: Placement, rng: R) -> Self {
        Self {
            host,
            placement,
            rng,
            current: None,
            generation: 0,
            capped_branches: false,
        }
    }

    /// Bind branches to three materials: the branch color on the side and
    /// the root color on the top and bottom caps.
    pub fn with_capped_branches(mut self, enabled: bool) -> Self {
        self.capped_branches = enabled;
        self
    }

    /// Replace the current tree with one grown from `params`.
    /// Returns the scene node of the newly attached group.
    pub fn regenerate(&mut self, params: &TreeParams) -> SceneNodeId {
        self.dispose();

        let group = generate_placed(&self.placement, params, &mut self.rng);
        let mounted = self.mount(group, params);
        let scene_group = mounted.scene_group;

        self.generation += 1;
        let vertices: u32 = mounted.group.nodes().iter().map(|n| n.geometry.vertex_estimate()).sum();
        log::info!(
            "Tree generation {}: {} trees, {} branches, {} leaves ({} nodes, ~{} vertices)",
            self.generation,
            mounted.group.roots().len(),
            mounted.group.branch_count(),
            mounted.group.leaf_count(),
            mounted.group.len(),
            vertices,
        );

        self.current = Some(mounted);
        scene_group
    }

    /// Release and detach the current tree. Returns false if there was none.
    pub fn dispose(&mut self) -> bool {
        let Some(mounted) = self.current.take() else {
            return false;
        };

        let mut geometry_released = 0usize;
        let mut materials_released = 0usize;
        for id in mounted.group.post_order() {
            let binding = &mounted.bindings[id.index()];
            if self.host.dispose_geometry(binding.geometry) {
                geometry_released += 1;
            }
            // Materials are shared per generation; repeats are no-ops
            for material in binding.material.ids() {
                if self.host.dispose_material(*material) {
                    materials_released += 1;
                }
            }
        }
        // Slots no node used are still live
        for material in &mounted.materials {
            if self.host.dispose_material(*material) {
                materials_released += 1;
            }
        }
        self.host.detach(mounted.scene_group);

        log::debug!(
            "Disposed tree generation {}: {} geometries, {} materials",
            self.generation,
            geometry_released,
            materials_released
        );
        true
    }

    fn mount(&mut self, group: TreeGroup, params: &TreeParams) -> MountedTree {
        let materials: HashMap<MaterialSlot, MaterialId> = MaterialSlot::ALL
            .iter()
            .map(|slot| (*slot, self.host.allocate_material(&MaterialDesc::for_slot(*slot, params))))
            .collect();

        let scene_group = self.host.create_node("tree_group", LocalTransform::identity(), NodeContent::Group);

        // Parents precede children in the arena, so their scene nodes already exist
        let mut bindings: Vec<NodeBinding> = Vec::with_capacity(group.len());
        for node in group.nodes() {
            let geometry = self.host.allocate_geometry(&node.geometry);
            let material = match node.kind {
                NodeKind::Branch { .. } if self.capped_branches => MaterialBinding::Multi(vec![
                    materials[&MaterialSlot::Branch],
                    materials[&MaterialSlot::Root],
                    materials[&MaterialSlot::Root],
                ]),
                _ => MaterialBinding::Single(materials[&node.material]),
            };
            let name = match node.kind {
                NodeKind::Root => "root".to_string(),
                NodeKind::Branch { .. } => format!("branch_{}", node.level),
                NodeKind::Anchor => format!("anchor_{}", node.level),
                NodeKind::Leaf { .. } => "leaf".to_string(),
            };
            let scene = self.host.create_node(
                &name,
                LocalTransform::from_rotation_translation(node.rotation, node.translation),
                NodeContent::Mesh {
                    geometry,
                    material: material.clone(),
                },
            );
            let parent = node.parent.map_or(scene_group, |p| bindings[p.index()].scene);
            self.host.attach(scene, parent);
            bindings.push(NodeBinding { scene, geometry, material });
        }

        let root = self.host.root();
        self.host.attach(scene_group, root);

        MountedTree {
            group,
            scene_group,
            bindings,
            materials: materials.into_values().collect(),
        }
    }

    /// The live tree, if any.
    pub fn current(&self) -> Option<&TreeGroup> {
        self.current.as_ref().map(|m| &m.group)
    }

    /// Scene node holding the live tree.
    pub fn current_group(&self) -> Option<SceneNodeId> {
        self.current.as_ref().map(|m| m.scene_group)
    }

    /// Scene node created for a tree node of the live tree.
    pub fn scene_node_of(&self, id: TreeNodeId) -> Option<SceneNodeId> {
        self.current.as_ref()?.bindings.get(id.index()).map(|b| b.scene)
    }

    /// Number of completed regenerations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

impl<H: SceneHost, R: RandomSource> ParameterObserver for TreeLifecycle<H, R> {
    fn on_parameters_changed(&mut self, params: &TreeParams) {
        self.regenerate(params);
    }
}
