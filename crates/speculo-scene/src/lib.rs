//! Scene entities for speculo-rs.
//!
//! This crate provides the renderable [`Model`] (procedural geometry or OBJ
//! import) and the mirror subsystem's scene-side types: the [`MirrorPlane`]
//! entity and the [`MirrorManager`] that owns the two-pass reflection
//! algorithm.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod mirror;
pub mod model;

pub use mirror::{MirrorManager, MirrorPlane};
pub use model::{Mesh, MeshGeometry, Model};
