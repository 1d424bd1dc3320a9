//! facetsel core library - face-region selection on triangle meshes
//!
//! Loads STL meshes into an indexed, immutable [`Mesh`], derives face
//! normals and edge adjacency, and grows connected regions of similarly
//! oriented faces from a seed face (optionally picked with a ray).

pub mod adjacency;
pub mod cancel;
pub mod error;
pub mod geometry;
pub mod normals;
pub mod pick;
pub mod progress;
pub mod region;
pub mod stl;

// Re-export commonly used types
pub use adjacency::AdjacencyIndex;
pub use cancel::CancelToken;
pub use error::{MeshError, MeshResult, RegionError, RegionResult, StlError};
pub use geometry::{Mesh, Triangle};
pub use normals::FaceNormals;
pub use pick::{grow_from_ray, pick_face, Hit, Ray};
pub use progress::Progress;
pub use region::{
    face_id_from_signed, grow_region, GrowParams, Region, RegionGrower,
    DEFAULT_ANGLE_THRESHOLD_DEGREES,
};
