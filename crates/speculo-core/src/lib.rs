//! Core abstractions for speculo-rs.
//!
//! This crate provides the GPU-agnostic foundation of the mirror renderer:
//! - Error types shared across the workspace
//! - Configuration for the window and the reflection targets
//! - The scene light collection and its GPU-visible packing
//! - Mirror-plane materials, the per-plane GPU parameter record, and the
//!   ordered capacity-bounded container that owns the plane-index invariant

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod light;
pub mod mirror;
pub mod options;

pub use error::{Result, SpeculoError};
pub use light::{
    GpuLight, LightBlockUniforms, LightManager, PointLight, SpotLight, MAX_LIGHTS,
};
pub use mirror::{
    world_normal, MirrorMaterial, MirrorPlaneUniforms, PlaneList, MAX_MIRROR_PLANES,
    MIRROR_PLANE_BUFFER_BINDING,
};
pub use options::{MirrorConfig, Options};

// Re-export glam types for convenience
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
