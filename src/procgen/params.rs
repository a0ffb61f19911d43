//! Tree parameters as exposed on the parameter panel.
//!
//! The panel owns ranges and validation. Generation reads a snapshot of
//! [`TreeParams`] on every regeneration and tolerates out-of-range values by
//! clamping (see `procgen::tree`).

use std::f32::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Color, Result};

/// Geometry sizes for the meshes hung on the skeleton.
///
/// Not exposed on the panel, but they differ between presets, so they
/// travel with the parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentShape {
    /// Sphere radius of the root and of every tip anchor
    pub anchor_radius: f32,
    /// Base radius of level-1 branches (the visible trunk)
    pub trunk_radius_bottom: f32,
    /// Top radius of level-1 branches
    pub trunk_radius_top: f32,
    /// Radius of every deeper branch
    pub branch_radius: f32,
    /// Cylinder/sphere tessellation
    pub radial_segments: u32,
    /// Leaf sphere radius
    pub leaf_radius: f32,
    /// Horizontal distance of a leaf from its anchor
    pub leaf_offset_radius: f32,
    /// Height of a leaf above its anchor
    pub leaf_offset_height: f32,
}

impl Default for SegmentShape {
    fn default() -> Self {
        Self::blossom()
    }
}

impl SegmentShape {
    /// Thick tapered trunk with large blossoms
    pub fn blossom() -> Self {
        Self {
            anchor_radius: 0.1,
            trunk_radius_bottom: 0.35,
            trunk_radius_top: 0.21,
            branch_radius: 0.1,
            radial_segments: 8,
            leaf_radius: 0.2,
            leaf_offset_radius: 0.5,
            leaf_offset_height: 0.1,
        }
    }

    /// Thin wiry branches with small leaves
    pub fn grove() -> Self {
        Self {
            anchor_radius: 0.04,
            trunk_radius_bottom: 0.01,
            trunk_radius_top: 0.01,
            branch_radius: 0.01,
            radial_segments: 8,
            leaf_radius: 0.05,
            leaf_offset_radius: 0.2,
            leaf_offset_height: 0.4,
        }
    }
}

/// Parameters for recursive tree generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeParams {
    pub root_color: Color,
    pub branch_color: Color,
    pub leaf_color: Color,

    /// Minimum children per node
    pub branch_count: u32,
    /// Extra children drawn from `0..variance`
    pub branch_count_variance: u32,
    /// Mean branch length
    pub branch_length: f32,
    /// Full width of the uniform length jitter
    pub branch_length_variance: f32,
    /// Mean tilt away from the parent axis (radians)
    pub branch_angle: f32,
    /// Full width of the uniform tilt jitter (radians)
    pub branch_angle_variance: f32,
    /// Maximum recursion depth
    pub branch_levels: u32,
    /// Randomized early termination offset drawn from `0..variance`
    pub branch_levels_variance: u32,
    /// Panel-only; generation never reads it
    pub branch_min_angle: f32,

    /// Leaves per terminal anchor
    pub leaf_count: u32,
    /// Leaf placement angle; also the width of its own jitter
    pub leaf_angle: f32,

    pub shape: SegmentShape,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::blossom()
    }
}

impl TreeParams {
    /// Single flowering tree: wide crown, thick trunk
    pub fn blossom() -> Self {
        Self {
            root_color: Color::BARK,
            branch_color: Color::BARK,
            leaf_color: Color::BLOSSOM,
            branch_count: 5,
            branch_count_variance: 1,
            branch_length: 2.0,
            branch_length_variance: 0.5,
            branch_angle: 0.55,
            branch_angle_variance: 0.26,
            branch_levels: 4,
            branch_levels_variance: 2,
            branch_min_angle: PI / 6.0,
            leaf_count: 5,
            leaf_angle: PI / 6.0,
            shape: SegmentShape::blossom(),
        }
    }

    /// Grove tree: upright, sparse, thin branches
    pub fn grove() -> Self {
        Self {
            root_color: Color::BARK,
            branch_color: Color::BARK,
            leaf_color: Color::BLOSSOM,
            branch_count: 3,
            branch_count_variance: 1,
            branch_length: 0.5,
            branch_length_variance: 0.0,
            branch_angle: 0.0,
            branch_angle_variance: 0.9,
            branch_levels: 4,
            branch_levels_variance: 2,
            branch_min_angle: PI / 6.0,
            leaf_count: 5,
            leaf_angle: PI / 6.0,
            shape: SegmentShape::grove(),
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "blossom" => Some(Self::blossom()),
            "grove" => Some(Self::grove()),
            _ => None,
        }
    }

    /// Load from a JSON file. Missing fields fall back to the blossom preset.
    pub fn load_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Partial parameter update, one optional field per panel control.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamsEdit {
    pub root_color: Option<Color>,
    pub branch_color: Option<Color>,
    pub leaf_color: Option<Color>,
    pub branch_count: Option<u32>,
    pub branch_count_variance: Option<u32>,
    pub branch_length: Option<f32>,
    pub branch_length_variance: Option<f32>,
    pub branch_angle: Option<f32>,
    pub branch_angle_variance: Option<f32>,
    pub branch_levels: Option<u32>,
    pub branch_levels_variance: Option<u32>,
    pub branch_min_angle: Option<f32>,
    pub leaf_count: Option<u32>,
    pub leaf_angle: Option<f32>,
}

impl ParamsEdit {
    /// Write every present field into `params`. Returns true if any value changed.
    pub fn apply(&self, params: &mut TreeParams) -> bool {
        fn set<T: PartialEq + Copy>(slot: &mut T, value: Option<T>) -> bool {
            match value {
                Some(v) if *slot != v => {
                    *slot = v;
                    true
                }
                _ => false,
            }
        }

        let mut changed = false;
        changed |= set(&mut params.root_color, self.root_color);
        changed |= set(&mut params.branch_color, self.branch_color);
        changed |= set(&mut params.leaf_color, self.leaf_color);
        changed |= set(&mut params.branch_count, self.branch_count);
        changed |= set(&mut params.branch_count_variance, self.branch_count_variance);
        changed |= set(&mut params.branch_length, self.branch_length);
        changed |= set(&mut params.branch_length_variance, self.branch_length_variance);
        changed |= set(&mut params.branch_angle, self.branch_angle);
        changed |= set(&mut params.branch_angle_variance, self.branch_angle_variance);
        changed |= set(&mut params.branch_levels, self.branch_levels);
        changed |= set(&mut params.branch_levels_variance, self.branch_levels_variance);
        changed |= set(&mut params.branch_min_angle, self.branch_min_angle);
        changed |= set(&mut params.leaf_count, self.leaf_count);
        changed |= set(&mut params.leaf_angle, self.leaf_angle);
        changed
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
