//! Rendering backend for speculo-rs.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - GPU resource management (buffers, textures, pipelines)
//! - The two-pass mirror reflection resources and pipelines (WGSL)
//! - Skybox, screen-quad debug presenter, and mip-chain generation
//! - Camera, lights, and frame capture

pub mod buffer;
pub mod camera;
pub mod engine;
pub mod error;
pub mod lights;
pub mod mesh;
pub mod mipmap;
pub mod mirror_pass;
pub mod reflection;
pub mod screen_quad;
pub mod screenshot;
pub mod skybox;

pub use camera::{Camera, CameraMovement};
pub use engine::{CameraUniforms, RenderEngine, DEPTH_FORMAT};
pub use error::{RenderError, RenderResult};
pub use lights::LightsBuffer;
pub use mesh::{
    create_white_texture, MaterialUniforms, MeshRenderData, ModelRenderData, ModelUniforms, Vertex,
};
pub use mipmap::{mip_level_count, MipChainGenerator};
pub use mirror_pass::{
    MirrorPassResources, ReflectParamsUniforms, MASK_FORMAT, REFLECT_FORMAT,
};
pub use reflection::{reflect_direction, reflect_point, reflection_matrix};
pub use screen_quad::ScreenQuad;
pub use screenshot::{read_texture, rgba16f_to_rgba8, save_image, ScreenshotError};
pub use skybox::{create_solid_cubemap, Skybox};
