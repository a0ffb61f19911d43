//! Directional light shadow camera.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Orthographic shadow camera of a directional light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowLight {
    pub position: Vec3,
    pub target: Vec3,
    pub near: f32,
    pub far: f32,
    /// Half-width of the orthographic frustum
    pub extent: f32,
    /// Shadow map resolution (square)
    pub map_size: u32,
}

impl Default for ShadowLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(300.0, 50.0, 50.0),
            target: Vec3::ZERO,
            near: 0.5,
            far: 500.0,
            extent: 5.0,
            map_size: 1024,
        }
    }
}

impl ShadowLight {
    /// Unit vector from the light toward its target.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).try_normalize().unwrap_or(Vec3::NEG_Y)
    }

    /// World-to-light transform.
    pub fn view(&self) -> Mat4 {
        // Straight down/up views need a different up axis
        let up = if self.direction().cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    pub fn projection(&self) -> Mat4 {
        let e = self.extent;
        Mat4::orthographic_rh(-e, e, -e, e, self.near, self.far)
    }

    /// World space to shadow clip space.
    pub fn shadow_matrix(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
