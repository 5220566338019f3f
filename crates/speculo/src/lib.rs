//! A wgpu renderer for scenes with real-time planar mirror reflections.
//!
//! The core of the crate is the two-pass mirror subsystem: a mask pass that
//! attributes each screen pixel to at most one mirror plane, a reflection
//! pass that renders the scene mirrored about every active plane, and a
//! composite draw that shades the physical mirror surfaces from the
//! resulting targets and a per-plane parameter buffer.
//!
//! Windowed rendering runs through [`App`]; [`HeadlessRenderer`] drives the
//! same frame sequence into an offscreen target for tests and captures.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod frame;
pub mod headless;

pub use app::{App, Scene};
pub use headless::HeadlessRenderer;

pub use speculo_core::{
    LightManager, MirrorConfig, MirrorMaterial, MirrorPlaneUniforms, Options, Result,
    SpeculoError, MAX_MIRROR_PLANES,
};
pub use speculo_render::{
    save_image, Camera, CameraMovement, RenderEngine, RenderError, RenderResult, ScreenQuad,
    Skybox,
};
pub use speculo_scene::{MirrorManager, MirrorPlane, Model};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Initializes env_logger with sensible defaults for demos and tools.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
