//! Top-level driver: one tree lifecycle, the live parameter set, and the
//! per-frame monument uniforms.

pub mod config;
pub mod debug;

pub use config::SketchConfig;
pub use debug::SketchDebugHandler;

use serde::Serialize;

use crate::math::SimpleRng;
use crate::procgen::{ParamsEdit, TreeParams, TreeStats};
use crate::render::MonumentUniforms;
use crate::scene::{ParameterObserver, RenderItem, ResourceStats, SceneGraph, TreeLifecycle};

/// What one tick produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStats {
    pub frame: u64,
    pub elapsed: f32,
    pub render_items: usize,
    pub generation: u64,
    /// Size of the uniform block staged this frame
    pub uniform_bytes: usize,
}

/// Snapshot of the live tree and its resources.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchStats {
    pub seed: u64,
    pub generation: u64,
    pub tree: TreeStats,
    pub resources: ResourceStats,
    pub live_geometry: usize,
    pub live_materials: usize,
}

pub struct Sketch {
    lifecycle: TreeLifecycle<SceneGraph, SimpleRng>,
    params: TreeParams,
    uniforms: MonumentUniforms,
    seed: u64,
    frame: u64,
    last_frame: Vec<RenderItem>,
    /// Monument uniform bytes as last written for upload
    staging: Vec<u8>,
}

impl Sketch {
    /// Build the scene and grow the first tree.
    pub fn from_config(config: &SketchConfig) -> Self {
        let mut lifecycle = TreeLifecycle::new(SceneGraph::new(), config.placement.clone(), SimpleRng::new(config.seed))
            .with_capped_branches(config.capped_branches);
        lifecycle.regenerate(&config.params);

        Self {
            lifecycle,
            params: config.params.clone(),
            uniforms: MonumentUniforms::new(config.light.clone()),
            seed: config.seed,
            frame: 0,
            last_frame: Vec::new(),
            staging: Vec::new(),
        }
    }

    /// Advance to `elapsed` seconds, stage the uniform block and rebuild
    /// the render list.
    pub fn tick(&mut self, elapsed: f32) -> FrameStats {
        self.uniforms.tick(elapsed);
        self.staging.clear();
        self.staging.extend_from_slice(self.uniforms.as_bytes());
        self.last_frame = self.lifecycle.host_mut().flatten();
        self.frame += 1;

        FrameStats {
            frame: self.frame,
            elapsed,
            render_items: self.last_frame.len(),
            generation: self.lifecycle.generation(),
            uniform_bytes: self.staging.len(),
        }
    }

    /// Replace the parameter set. Regenerates and returns true if anything changed.
    pub fn set_params(&mut self, params: TreeParams) -> bool {
        if params == self.params {
            return false;
        }
        self.params = params;
        self.lifecycle.on_parameters_changed(&self.params);
        true
    }

    /// Apply a partial update from the panel.
    pub fn apply_edit(&mut self, edit: &ParamsEdit) -> bool {
        let mut params = self.params.clone();
        if edit.apply(&mut params) {
            self.set_params(params)
        } else {
            false
        }
    }

    /// Restart the random source and regenerate with the current parameters.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.lifecycle.rng_mut().reseed(seed);
        self.lifecycle.regenerate(&self.params);
    }

    /// Grow a new tree from the same parameters, continuing the random stream.
    pub fn regenerate(&mut self) {
        self.lifecycle.regenerate(&self.params);
    }

    pub fn stats(&self) -> SketchStats {
        let pool = self.lifecycle.host().resources();
        SketchStats {
            seed: self.seed,
            generation: self.lifecycle.generation(),
            tree: self.lifecycle.current().map(|t| t.stats()).unwrap_or_default(),
            resources: pool.stats(),
            live_geometry: pool.live_geometry_count(),
            live_materials: pool.live_material_count(),
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn uniforms(&self) -> &MonumentUniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut MonumentUniforms {
        &mut self.uniforms
    }

    pub fn lifecycle(&self) -> &TreeLifecycle<SceneGraph, SimpleRng> {
        &self.lifecycle
    }

    /// Render list built by the last `tick`.
    pub fn render_items(&self) -> &[RenderItem] {
        &self.last_frame
    }

    /// Uniform block bytes staged by the last `tick`.
    pub fn staged_uniforms(&self) -> &[u8] {
        &self.staging
    }
}
