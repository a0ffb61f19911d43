//! Math utilities: bounds and random sources

pub mod aabb;
pub mod rng;

pub use aabb::Aabb;
pub use rng::{RandomSource, SequenceRng, SimpleRng};
