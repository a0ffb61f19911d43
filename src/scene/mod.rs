//! Scene side of the generator: a reference scene graph, its resource pool,
//! and the lifecycle manager that keeps exactly one tree mounted in it.

pub mod flatten;
pub mod graph;
pub mod host;
pub mod lifecycle;
pub mod node;
pub mod resources;

pub use flatten::RenderItem;
pub use graph::SceneGraph;
pub use host::SceneHost;
pub use lifecycle::{ParameterObserver, TreeLifecycle};
pub use node::{LocalTransform, MaterialBinding, NodeContent, SceneNode, SceneNodeId};
pub use resources::{GeometryId, MaterialId, ResourcePool, ResourceStats};
