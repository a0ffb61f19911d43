//! CPU-side render state: shadow camera and per-frame uniforms for the monument shader

pub mod monument;
pub mod shadow;

pub use monument::{MonumentUniform, MonumentUniforms, TextureId};
pub use shadow::ShadowLight;
