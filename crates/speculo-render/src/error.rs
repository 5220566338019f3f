//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
///
/// Creation failures for GPU resources are fatal initialization errors:
/// they surface from constructors and are not locally recoverable.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// Surface configuration failed.
    #[error("surface configuration failed")]
    SurfaceConfigurationFailed,

    /// Texture creation failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// An image file for a texture could not be loaded.
    #[error("image load failed: {0}")]
    ImageLoadFailed(#[from] image::ImageError),

    /// Surface lost.
    #[error("surface lost")]
    SurfaceLost,

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
