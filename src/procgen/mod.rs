//! Procedural tree generation

pub mod forest;
pub mod mesh;
pub mod params;
pub mod tree;

pub use forest::{generate_forest, generate_placed, ForestLayout, Placement};
pub use mesh::{GeometryDesc, MaterialDesc, MaterialSlot};
pub use params::{ParamsEdit, SegmentShape, TreeParams};
pub use tree::{generate, NodeKind, TreeGenerator, TreeGroup, TreeNode, TreeNodeId, TreeStats, MIN_BRANCH_LENGTH};
