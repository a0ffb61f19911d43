//! Engine-free mesh descriptions attached to tree nodes.
//!
//! The generator only records *what* each node should look like. A scene host
//! turns these into real geometry/material resources when the tree is mounted.

use serde::{Deserialize, Serialize};

use crate::core::Color;
use crate::procgen::params::TreeParams;

/// Shape of a node's geometry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GeometryDesc {
    /// Capped cylinder along +Y
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
        /// Translated up by `height / 2` so the base sits at the local origin
        /// and rotations pivot there.
        base_anchored: bool,
    },
    Sphere {
        radius: f32,
        segments: u32,
    },
}

impl GeometryDesc {
    /// Rough vertex count, used for resource accounting in logs.
    pub fn vertex_estimate(&self) -> u32 {
        match *self {
            GeometryDesc::Cylinder { radial_segments, .. } => (radial_segments + 1) * 2 + 2,
            GeometryDesc::Sphere { segments, .. } => (segments + 1) * (segments + 1),
        }
    }
}

/// Which of the three per-tree materials a node uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialSlot {
    /// Root and tip anchors
    Root,
    Branch,
    Leaf,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 3] = [MaterialSlot::Root, MaterialSlot::Branch, MaterialSlot::Leaf];

    /// Color for this slot under the given parameters
    pub fn color(self, params: &TreeParams) -> Color {
        match self {
            MaterialSlot::Root => params.root_color,
            MaterialSlot::Branch => params.branch_color,
            MaterialSlot::Leaf => params.leaf_color,
        }
    }
}

/// Material request handed to a scene host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub slot: MaterialSlot,
    pub color: Color,
}

impl MaterialDesc {
    pub fn for_slot(slot: MaterialSlot, params: &TreeParams) -> Self {
        Self { slot, color: slot.color(params) }
    }
}
