//! Error types for speculo-rs.

use thiserror::Error;

/// The main error type for speculo-rs operations.
#[derive(Error, Debug)]
pub enum SpeculoError {
    /// A model used to build a mirror plane has no vertices to infer a
    /// surface normal from.
    #[error("model '{0}' has no geometry to derive a mirror normal from")]
    NoGeometry(String),

    /// The mirror-plane collection is full.
    #[error("mirror plane capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// The fixed capacity of the plane collection.
        capacity: usize,
    },

    /// An asset (mesh or texture) failed to load.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// Rendering error, wrapped at the crate boundary.
    #[error("render error: {0}")]
    Render(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for speculo-rs operations.
pub type Result<T> = std::result::Result<T, SpeculoError>;
