//! Per-frame uniforms for the shadow-receiving monument material.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::shadow::ShadowLight;

/// Opaque handle to a host-owned texture (the light's shadow map).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// GPU uniform block. Must match `MonumentUniforms` in the monument shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MonumentUniform {
    pub shadow_matrix: [[f32; 4]; 4],
    // -- 64 bytes --
    pub time: f32,
    pub shadow_map_bound: u32,
    pub _pad: [f32; 2],
    // -- 16 bytes --
    // Total: 80 bytes
}

/// CPU-side owner of the monument uniform block.
#[derive(Clone, Debug)]
pub struct MonumentUniforms {
    light: ShadowLight,
    shadow_map: Option<TextureId>,
    data: MonumentUniform,
}

impl MonumentUniforms {
    pub fn new(light: ShadowLight) -> Self {
        let data = MonumentUniform {
            shadow_matrix: light.shadow_matrix().to_cols_array_2d(),
            ..MonumentUniform::zeroed()
        };
        Self {
            light,
            shadow_map: None,
            data,
        }
    }

    /// Advance to `elapsed` seconds since start and refresh the shadow matrix.
    pub fn tick(&mut self, elapsed: f32) {
        self.data.time = elapsed;
        self.data.shadow_matrix = self.light.shadow_matrix().to_cols_array_2d();
    }

    /// The shadow map only exists once the host has rendered a shadow pass.
    pub fn bind_shadow_map(&mut self, texture: Option<TextureId>) {
        self.shadow_map = texture;
        self.data.shadow_map_bound = texture.is_some() as u32;
    }

    pub fn shadow_map(&self) -> Option<TextureId> {
        self.shadow_map
    }

    pub fn light(&self) -> &ShadowLight {
        &self.light
    }

    pub fn time(&self) -> f32 {
        self.data.time
    }

    pub fn shadow_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.data.shadow_matrix)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.data)
    }
}
