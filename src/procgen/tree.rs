//! Recursive branching tree generation
//!
//! A tree is grown top-down from a root anchor. Every branch is a
//! base-anchored cylinder hung off its parent's tip anchor, tilted away from
//! the parent axis and spun to a random azimuth. Each branch ends in a new
//! anchor which either carries a cluster of leaves (terminal) or the next
//! level of branches.
//!
//! The result is a flat arena ([`TreeGroup`]) of nodes indexed by
//! [`TreeNodeId`], with parent/child links as id lists. Parents are always
//! stored before their children, which lets world transforms and bounds be
//! computed in a single forward pass.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Serialize;

use crate::math::{Aabb, RandomSource};
use crate::procgen::mesh::{GeometryDesc, MaterialSlot};
use crate::procgen::params::TreeParams;

/// Branch lengths at or below zero are replaced by this to avoid degenerate geometry.
pub const MIN_BRANCH_LENGTH: f32 = 1e-3;

/// Index of a node inside its [`TreeGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TreeNodeId(pub u32);

impl TreeNodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node represents in the skeleton
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    /// Trunk base of one tree, at level 0
    Root,
    /// Segment from the parent anchor to its own tip anchor
    Branch { length: f32, tilt: f32, azimuth: f32 },
    /// Attachment point at the far end of a branch
    Anchor,
    /// Ornament on a terminal anchor
    Leaf { angle: f32 },
}

/// A positioned, oriented node in the tree arena
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: TreeNodeId,
    pub parent: Option<TreeNodeId>,
    pub children: Vec<TreeNodeId>,
    pub kind: NodeKind,
    /// Recursion level: 0 for the root, `n` for a level-`n` branch and
    /// everything hung on its tip.
    pub level: u32,
    /// Local translation relative to the parent
    pub translation: Vec3,
    /// Local rotation relative to the parent
    pub rotation: Quat,
    pub geometry: GeometryDesc,
    pub material: MaterialSlot,
}

impl TreeNode {
    /// Local transform relative to the parent node.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Root or tip anchor
    pub fn is_anchor(&self) -> bool {
        matches!(self.kind, NodeKind::Root | NodeKind::Anchor)
    }

    /// Branch length, if this is a branch.
    pub fn branch_length(&self) -> Option<f32> {
        match self.kind {
            NodeKind::Branch { length, .. } => Some(length),
            _ => None,
        }
    }
}

/// Summary of a generated group
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub trees: usize,
    pub nodes: usize,
    pub branches: usize,
    pub anchors: usize,
    pub leaves: usize,
    pub terminal_anchors: usize,
    pub max_level: u32,
    pub bounds: Option<Aabb>,
}

/// One generated set of trees, owned by whoever mounts it into a scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeGroup {
    nodes: Vec<TreeNode>,
    roots: Vec<TreeNodeId>,
}

impl TreeGroup {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        parent: Option<TreeNodeId>,
        kind: NodeKind,
        level: u32,
        translation: Vec3,
        rotation: Quat,
        geometry: GeometryDesc,
        material: MaterialSlot,
    ) -> TreeNodeId {
        let id = TreeNodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            id,
            parent,
            children: Vec::new(),
            kind,
            level,
            translation,
            rotation,
            geometry,
            material,
        });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Root node of every tree in the group, in generation order.
    pub fn roots(&self) -> &[TreeNodeId] {
        &self.roots
    }

    /// Panics if `id` does not belong to this group.
    pub fn node(&self, id: TreeNodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: TreeNodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    /// All nodes, parents before children.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn branch_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_branch()).count()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Deepest level reached by any node.
    pub fn max_level(&self) -> u32 {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// Branches created at recursion level `level`.
    pub fn branches_at_level(&self, level: u32) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes.iter().filter(move |n| n.is_branch() && n.level == level)
    }

    /// Tip anchor of a branch.
    pub fn tip_of(&self, branch: TreeNodeId) -> Option<TreeNodeId> {
        self.node(branch)
            .children
            .iter()
            .copied()
            .find(|c| matches!(self.node(*c).kind, NodeKind::Anchor))
    }

    /// Leaves hung directly on an anchor.
    pub fn leaves_of(&self, anchor: TreeNodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        self.node(anchor)
            .children
            .iter()
            .map(|c| self.node(*c))
            .filter(|n| n.is_leaf())
    }

    /// Anchor where recursion stopped (no child branches).
    pub fn is_terminal(&self, anchor: TreeNodeId) -> bool {
        let node = self.node(anchor);
        node.is_anchor() && !node.children.iter().any(|c| self.node(*c).is_branch())
    }

    /// Depth-first post-order over every tree: children before parents.
    pub fn post_order(&self) -> Vec<TreeNodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(TreeNodeId, bool)> = self.roots.iter().rev().map(|r| (*r, false)).collect();

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for child in self.node(id).children.iter().rev() {
                stack.push((*child, false));
            }
        }
        out
    }

    /// Accumulated world transform of every node, indexed like [`Self::nodes`].
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let parent = node.parent.map_or(Mat4::IDENTITY, |p| world[p.index()]);
            world.push(parent * node.local_matrix());
        }
        world
    }

    /// World transform of a single node (walks up the parent chain).
    pub fn world_transform(&self, id: TreeNodeId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            m = node.local_matrix() * m;
            cursor = node.parent;
        }
        m
    }

    pub fn world_position(&self, id: TreeNodeId) -> Vec3 {
        self.world_transform(id).transform_point3(Vec3::ZERO)
    }

    /// Bounds of every node origin (roots, tips and leaves).
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.world_transforms().iter().map(|m| m.transform_point3(Vec3::ZERO)))
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            trees: self.roots.len(),
            nodes: self.nodes.len(),
            max_level: self.max_level(),
            bounds: self.bounds(),
            ..Default::default()
        };
        for node in &self.nodes {
            match node.kind {
                NodeKind::Branch { .. } => stats.branches += 1,
                NodeKind::Leaf { .. } => stats.leaves += 1,
                NodeKind::Root | NodeKind::Anchor => {
                    stats.anchors += 1;
                    if self.is_terminal(node.id) {
                        stats.terminal_anchors += 1;
                    }
                }
            }
        }
        stats
    }
}

/// Grows trees into a [`TreeGroup`] from a parameter snapshot and a random source.
pub struct TreeGenerator<'p, R> {
    params: &'p TreeParams,
    rng: R,
}

impl<'p, R: RandomSource> TreeGenerator<'p, R> {
    pub fn new(params: &'p TreeParams, rng: R) -> Self {
        Self { params, rng }
    }

    /// Generate a single tree rooted at `root_position`.
    pub fn generate(&mut self, root_position: Vec3) -> TreeGroup {
        let mut group = TreeGroup::new();
        self.grow(&mut group, root_position);
        group
    }

    /// Add one tree to an existing group and return its root.
    pub fn grow(&mut self, group: &mut TreeGroup, root_position: Vec3) -> TreeNodeId {
        let root = group.push(
            None,
            NodeKind::Root,
            0,
            root_position,
            Quat::IDENTITY,
            self.anchor_geometry(),
            MaterialSlot::Root,
        );
        self.create_branches(group, root, 1);
        root
    }

    fn create_branches(&mut self, group: &mut TreeGroup, parent: TreeNodeId, level: u32) {
        let p = self.params;
        if level > p.branch_levels {
            return;
        }

        let count = p.branch_count.saturating_add(self.rng.random_int(p.branch_count_variance));
        for _ in 0..count {
            let length = (p.branch_length + self.rng.centered(p.branch_length_variance)).max(MIN_BRANCH_LENGTH);
            let tilt = p.branch_angle + self.rng.centered(p.branch_angle_variance);
            let azimuth = self.rng.angle();

            let branch = group.push(
                Some(parent),
                NodeKind::Branch { length, tilt, azimuth },
                level,
                Vec3::ZERO,
                Quat::from_euler(EulerRot::XYZ, tilt, azimuth, 0.0),
                self.branch_geometry(level, length),
                MaterialSlot::Branch,
            );

            let tip = group.push(
                Some(branch),
                NodeKind::Anchor,
                level,
                Vec3::new(0.0, length, 0.0),
                Quat::IDENTITY,
                self.anchor_geometry(),
                MaterialSlot::Root,
            );

            let terminate_early = level.saturating_add(self.rng.random_int(p.branch_levels_variance));
            if terminate_early >= p.branch_levels {
                self.hang_leaves(group, tip, level);
            } else {
                self.create_branches(group, tip, level + 1);
            }
        }
    }

    fn hang_leaves(&mut self, group: &mut TreeGroup, anchor: TreeNodeId, level: u32) {
        let p = self.params;
        let shape = &p.shape;
        for _ in 0..p.leaf_count {
            // Jitter width is leaf_angle itself, not a separate variance
            let angle = p.leaf_angle + self.rng.centered(p.leaf_angle);
            let position = Vec3::new(
                angle.sin() * shape.leaf_offset_radius,
                shape.leaf_offset_height,
                angle.cos() * shape.leaf_offset_radius,
            );
            group.push(
                Some(anchor),
                NodeKind::Leaf { angle },
                level,
                position,
                Quat::IDENTITY,
                GeometryDesc::Sphere {
                    radius: shape.leaf_radius,
                    segments: shape.radial_segments,
                },
                MaterialSlot::Leaf,
            );
        }
    }

    fn anchor_geometry(&self) -> GeometryDesc {
        GeometryDesc::Sphere {
            radius: self.params.shape.anchor_radius,
            segments: self.params.shape.radial_segments,
        }
    }

    fn branch_geometry(&self, level: u32, length: f32) -> GeometryDesc {
        let shape = &self.params.shape;
        // Level-1 branches form the trunk and taper
        let (radius_bottom, radius_top) = if level == 1 {
            (shape.trunk_radius_bottom, shape.trunk_radius_top)
        } else {
            (shape.branch_radius, shape.branch_radius)
        };
        GeometryDesc::Cylinder {
            radius_top,
            radius_bottom,
            height: length,
            radial_segments: shape.radial_segments,
            base_anchored: true,
        }
    }
}

/// Generate one tree at `root_position`.
///
/// Pass the random source by `&mut` to keep drawing from it afterwards.
pub fn generate<R: RandomSource>(root_position: Vec3, params: &TreeParams, rng: R) -> TreeGroup {
    TreeGenerator::new(params, rng).generate(root_position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{SequenceRng, SimpleRng};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn fixed_params() -> TreeParams {
        TreeParams {
            branch_count: 3,
            branch_count_variance: 0,
            branch_length: 1.5,
            branch_length_variance: 0.0,
            branch_angle: 0.4,
            branch_angle_variance: 0.0,
            branch_levels: 3,
            branch_levels_variance: 0,
            leaf_count: 2,
            ..TreeParams::blossom()
        }
    }

    #[test]
    fn test_single_level_tree() {
        let params = TreeParams {
            branch_levels: 1,
            branch_count: 3,
            branch_count_variance: 0,
            branch_levels_variance: 0,
            leaf_count: 2,
            ..TreeParams::blossom()
        };
        let tree = generate(Vec3::ZERO, &params, SimpleRng::new(1));

        assert_eq!(tree.branches_at_level(1).count(), 3);
        assert_eq!(tree.branches_at_level(2).count(), 0);
        for branch in tree.branches_at_level(1) {
            let tip = tree.tip_of(branch.id).unwrap();
            assert!(tree.is_terminal(tip));
            assert_eq!(tree.leaves_of(tip).count(), 2);
        }
        assert_eq!(tree.leaf_count(), 6);
    }

    #[test]
    fn test_zero_levels_is_root_only() {
        let params = TreeParams { branch_levels: 0, ..TreeParams::blossom() };
        let tree = generate(Vec3::new(1.0, 0.0, 2.0), &params, SimpleRng::new(3));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.branch_count(), 0);
        assert_eq!(tree.leaf_count(), 0);
        let root = tree.node(tree.roots()[0]);
        assert_eq!(root.kind, NodeKind::Root);
        assert_eq!(root.translation, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_zero_branch_count_is_root_only() {
        let params = TreeParams {
            branch_count: 0,
            branch_count_variance: 0,
            ..TreeParams::blossom()
        };
        let tree = generate(Vec3::ZERO, &params, SimpleRng::new(3));
        assert_eq!(tree.len(), 1);
        assert!(tree.is_terminal(tree.roots()[0]));
    }

    #[test]
    fn test_depth_never_exceeds_levels() {
        for levels in 0..5 {
            for seed in 0..20 {
                let params = TreeParams {
                    branch_count: 2,
                    branch_count_variance: 2,
                    branch_levels: levels,
                    branch_levels_variance: 3,
                    ..TreeParams::blossom()
                };
                let tree = generate(Vec3::ZERO, &params, SimpleRng::new(seed));
                assert!(tree.max_level() <= levels, "levels={levels} seed={seed}");
            }
        }
    }

    #[test]
    fn test_full_depth_without_level_variance() {
        let tree = generate(Vec3::ZERO, &fixed_params(), SimpleRng::new(5));
        // 3 + 9 + 27 branches
        assert_eq!(tree.branches_at_level(1).count(), 3);
        assert_eq!(tree.branches_at_level(2).count(), 9);
        assert_eq!(tree.branches_at_level(3).count(), 27);
        assert_eq!(tree.leaf_count(), 27 * 2);
        assert_eq!(tree.max_level(), 3);
    }

    #[test]
    fn test_identical_sequences_give_identical_trees() {
        let params = TreeParams::blossom();
        let draws = vec![0.1, 0.7, 0.35, 0.9, 0.5, 0.05, 0.66];
        let a = generate(Vec3::ZERO, &params, SequenceRng::new(draws.clone()));
        let b = generate(Vec3::ZERO, &params, SequenceRng::new(draws));
        assert_eq!(a, b);

        let c = generate(Vec3::ZERO, &params, SimpleRng::new(77));
        let d = generate(Vec3::ZERO, &params, SimpleRng::new(77));
        assert_eq!(c, d);
    }

    #[test]
    fn test_zero_variance_branches_match_per_level() {
        let tree = generate(Vec3::ZERO, &fixed_params(), SimpleRng::new(11));
        for level in 1..=3 {
            let branches: Vec<_> = tree.branches_at_level(level).collect();
            let NodeKind::Branch { length: l0, tilt: t0, .. } = branches[0].kind else {
                unreachable!()
            };
            let mut azimuths = Vec::new();
            for b in &branches {
                let NodeKind::Branch { length, tilt, azimuth } = b.kind else { unreachable!() };
                assert_eq!(length, l0);
                assert_eq!(tilt.abs(), t0.abs());
                azimuths.push(azimuth);
            }
            assert!(azimuths.windows(2).any(|w| w[0] != w[1]), "azimuths should vary");
        }
    }

    #[test]
    fn test_negative_length_is_clamped() {
        let params = TreeParams {
            branch_length: -1.0,
            branch_length_variance: 0.0,
            branch_levels: 1,
            ..fixed_params()
        };
        let tree = generate(Vec3::ZERO, &params, SimpleRng::new(2));
        for b in tree.branches_at_level(1) {
            assert_eq!(b.branch_length(), Some(MIN_BRANCH_LENGTH));
        }
    }

    #[test]
    fn test_leaf_jitter_scales_with_leaf_angle() {
        let params = TreeParams {
            branch_levels: 1,
            branch_count: 1,
            leaf_count: 1,
            leaf_angle: 0.8,
            ..fixed_params()
        };
        // Every draw is 0.75, so jitter = 0.25 * leaf_angle
        let tree = generate(Vec3::ZERO, &params, SequenceRng::constant(0.75));
        let leaf = tree.nodes().iter().find(|n| n.is_leaf()).unwrap();
        let NodeKind::Leaf { angle } = leaf.kind else { unreachable!() };
        assert!(approx(angle, 0.8 * 1.25));

        let shape = &params.shape;
        assert!(approx(leaf.translation.x, angle.sin() * shape.leaf_offset_radius));
        assert!(approx(leaf.translation.y, shape.leaf_offset_height));
        assert!(approx(leaf.translation.z, angle.cos() * shape.leaf_offset_radius));
    }

    #[test]
    fn test_branch_geometry_is_base_anchored() {
        let tree = generate(Vec3::ZERO, &fixed_params(), SimpleRng::new(8));
        for b in tree.nodes().iter().filter(|n| n.is_branch()) {
            let length = b.branch_length().unwrap();
            match b.geometry {
                GeometryDesc::Cylinder { height, base_anchored, .. } => {
                    assert_eq!(height, length);
                    assert!(base_anchored);
                }
                _ => panic!("branch should be a cylinder"),
            }
            let tip = tree.node(tree.tip_of(b.id).unwrap());
            assert_eq!(tip.translation, Vec3::new(0.0, length, 0.0));
        }
    }

    #[test]
    fn test_trunk_tapers_and_branches_do_not() {
        let params = fixed_params();
        let tree = generate(Vec3::ZERO, &params, SimpleRng::new(8));
        let shape = &params.shape;
        for b in tree.nodes().iter().filter(|n| n.is_branch()) {
            let GeometryDesc::Cylinder { radius_top, radius_bottom, .. } = b.geometry else {
                unreachable!()
            };
            if b.level == 1 {
                assert_eq!((radius_bottom, radius_top), (shape.trunk_radius_bottom, shape.trunk_radius_top));
            } else {
                assert_eq!((radius_bottom, radius_top), (shape.branch_radius, shape.branch_radius));
            }
        }
    }

    #[test]
    fn test_upright_chain_stacks_lengths() {
        let params = TreeParams {
            branch_angle: 0.0,
            branch_count: 1,
            ..fixed_params()
        };
        let tree = generate(Vec3::new(0.0, 2.0, 0.0), &params, SimpleRng::new(4));
        for node in tree.nodes().iter().filter(|n| matches!(n.kind, NodeKind::Anchor)) {
            let p = tree.world_position(node.id);
            assert!(approx(p.y, 2.0 + 1.5 * node.level as f32), "{p:?}");
            assert!(approx(p.x, 0.0) && approx(p.z, 0.0));
        }
    }

    #[test]
    fn test_tilt_pivots_at_branch_base() {
        let params = TreeParams {
            branch_angle: std::f32::consts::FRAC_PI_2,
            branch_count: 1,
            branch_levels: 1,
            ..fixed_params()
        };
        // Zero draws: azimuth 0, no jitter
        let tree = generate(Vec3::ZERO, &params, SequenceRng::constant(0.0));
        let branch = tree.branches_at_level(1).next().unwrap();
        let tip = tree.world_position(tree.tip_of(branch.id).unwrap());
        assert!(approx(tip.x, 0.0));
        assert!(approx(tip.y, 0.0));
        assert!(approx(tip.z, 1.5));
    }

    #[test]
    fn test_world_transforms_match_single_lookup() {
        let tree = generate(Vec3::new(3.0, 0.0, -1.0), &TreeParams::blossom(), SimpleRng::new(21));
        let all = tree.world_transforms();
        for node in tree.nodes().iter().step_by(7) {
            let single = tree.world_transform(node.id);
            assert!(all[node.id.index()].abs_diff_eq(single, 1e-4));
        }
    }

    #[test]
    fn test_post_order_visits_children_first() {
        let tree = generate(Vec3::ZERO, &TreeParams::blossom(), SimpleRng::new(9));
        let order = tree.post_order();
        assert_eq!(order.len(), tree.len());

        let mut seen = vec![false; tree.len()];
        for id in order {
            for child in &tree.node(id).children {
                assert!(seen[child.index()], "child visited after parent");
            }
            seen[id.index()] = true;
        }
    }

    #[test]
    fn test_stats_counts() {
        let tree = generate(Vec3::ZERO, &fixed_params(), SimpleRng::new(5));
        let stats = tree.stats();
        assert_eq!(stats.trees, 1);
        assert_eq!(stats.branches, 39);
        assert_eq!(stats.anchors, 40);
        assert_eq!(stats.terminal_anchors, 27);
        assert_eq!(stats.leaves, 54);
        assert_eq!(stats.nodes, 39 + 40 + 54);
        assert!(stats.bounds.is_some());
    }

    #[test]
    fn test_serializes_to_json() {
        let params = TreeParams { branch_levels: 1, ..fixed_params() };
        let tree = generate(Vec3::ZERO, &params, SimpleRng::new(1));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["roots"], serde_json::json!([0]));
        assert_eq!(json["nodes"][1]["kind"]["kind"], "branch");
    }
}
