//! Arbor - recursive procedural trees with a managed scene lifecycle

pub mod core;
pub mod math;
pub mod procgen;
pub mod scene;
pub mod render;
pub mod sketch;
