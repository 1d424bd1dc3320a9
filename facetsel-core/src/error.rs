//! Error types for mesh loading and region growing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh construction and loading.
pub type MeshResult<T> = Result<T, MeshError>;

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;

/// Errors raised while decoding STL data.
#[derive(Debug, Error)]
pub enum StlError {
    /// Binary data is shorter than the 84-byte header.
    #[error("file too small to be a valid STL ({len} bytes)")]
    TooShort {
        /// Length of the data that was supplied.
        len: usize,
    },

    /// The triangle count in the header promises more records than exist.
    #[error("unexpected end of file: header declares {expected} triangles, found {found}")]
    Truncated {
        /// Triangles declared in the header.
        expected: usize,
        /// Complete triangle records present.
        found: usize,
    },

    /// ASCII grammar error.
    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),

    /// Writer failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building or loading a [`Mesh`](crate::Mesh).
#[derive(Debug, Error)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: u32,
    },

    /// The STL payload could not be decoded.
    #[error(transparent)]
    Stl(#[from] StlError),

    /// The mesh file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised by region growing and picking.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RegionError {
    /// The seed is not a face of the mesh.
    #[error("invalid seed face {seed} (mesh has {face_count} faces)")]
    InvalidSeed {
        /// The requested seed, as supplied by the caller.
        seed: i64,
        /// Total number of faces in the mesh.
        face_count: usize,
    },

    /// The seed face has no area, so there is no reference direction.
    #[error("seed face {face} is degenerate (zero-length normal)")]
    DegenerateMesh {
        /// The degenerate seed face.
        face: u32,
    },

    /// The mesh has no faces at all.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// The angular tolerance is negative or not a finite number.
    #[error("invalid angle threshold {value} (must be a finite number >= 0 degrees)")]
    InvalidTolerance {
        /// The rejected tolerance in degrees.
        value: f64,
    },

    /// A pick ray did not intersect any face.
    #[error("ray does not hit the mesh")]
    NoHit,

    /// Growth was cancelled through a [`CancelToken`](crate::CancelToken).
    #[error("region growing was cancelled")]
    Cancelled,
}
