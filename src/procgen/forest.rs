//! Tree placement: a single tree or a centered grid of trees sharing one group.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::RandomSource;
use crate::procgen::params::TreeParams;
use crate::procgen::tree::{TreeGenerator, TreeGroup};

/// Rectangular grid of trees centered on `origin`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForestLayout {
    /// Cells along X
    pub rows: u32,
    /// Cells along Z
    pub columns: u32,
    pub spacing_x: f32,
    pub spacing_z: f32,
    pub origin: Vec3,
}

impl Default for ForestLayout {
    fn default() -> Self {
        Self {
            rows: 3,
            columns: 2,
            spacing_x: 12.0,
            spacing_z: 5.0,
            origin: Vec3::ZERO,
        }
    }
}

impl ForestLayout {
    /// Root position of every cell, row-major.
    pub fn positions(&self) -> Vec<Vec3> {
        let half_rows = (self.rows as f32 - 1.0) / 2.0;
        let half_cols = (self.columns as f32 - 1.0) / 2.0;
        let mut out = Vec::with_capacity(self.cell_count());
        for i in 0..self.rows {
            for j in 0..self.columns {
                let x = (i as f32 - half_rows) * self.spacing_x;
                let z = (j as f32 - half_cols) * self.spacing_z;
                out.push(self.origin + Vec3::new(x, 0.0, z));
            }
        }
        out
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Reject grids whose tree count does not fit in a `u32`.
    pub fn validate(&self) -> Result<()> {
        if self.rows.checked_mul(self.columns).is_none() {
            return Err(Error::Config(format!("grid {}x{} has too many cells", self.rows, self.columns)));
        }
        Ok(())
    }
}

/// Where trees are rooted. Fixed for the lifetime of a sketch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Placement {
    Single { root: Vec3 },
    Grid(ForestLayout),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Single { root: Vec3::ZERO }
    }
}

impl Placement {
    pub fn single(root: Vec3) -> Self {
        Placement::Single { root }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Placement::Single { .. } => Ok(()),
            Placement::Grid(layout) => layout.validate(),
        }
    }

    pub fn root_positions(&self) -> Vec<Vec3> {
        match self {
            Placement::Single { root } => vec![*root],
            Placement::Grid(layout) => layout.positions(),
        }
    }
}

/// Grow one tree per grid cell into a single group.
pub fn generate_forest<R: RandomSource>(layout: &ForestLayout, params: &TreeParams, rng: R) -> TreeGroup {
    generate_placed(&Placement::Grid(layout.clone()), params, rng)
}

/// Grow one tree per root of `placement` into a single group.
pub fn generate_placed<R: RandomSource>(placement: &Placement, params: &TreeParams, rng: R) -> TreeGroup {
    let mut generator = TreeGenerator::new(params, rng);
    let mut group = TreeGroup::new();
    for root in placement.root_positions() {
        generator.grow(&mut group, root);
    }
    group
}
