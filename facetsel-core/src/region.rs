//! Region growing: select the connected "logical face" around a seed
//! triangle.
//!
//! Faceted solids exported to STL split each flat side into many triangles.
//! Growing a region from one of them collects every triangle reachable
//! through shared edges whose normal stays within an angular tolerance of the
//! seed's normal.
//!
//! ```
//! use facetsel_core::{grow_region, Mesh};
//!
//! let cube = Mesh::cube(2.0);
//! let side = grow_region(&cube, 0, 5.0).unwrap();
//! assert_eq!(side.sorted_faces(), vec![0, 1]);
//! ```

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::{RegionError, RegionResult};
use crate::geometry::{Mesh, Triangle};
use crate::normals::within_angle;
use crate::progress::Progress;

/// Tolerance used when the caller does not choose one.
pub const DEFAULT_ANGLE_THRESHOLD_DEGREES: f64 = 5.0;

/// Accepted faces between two progress reports.
pub const PROGRESS_INTERVAL: usize = 4096;

/// Tunable parameters for region growing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowParams {
    /// Maximum angle, in degrees, between a face normal and the seed normal.
    pub angle_threshold_degrees: f64,
}

impl Default for GrowParams {
    fn default() -> Self {
        Self {
            angle_threshold_degrees: DEFAULT_ANGLE_THRESHOLD_DEGREES,
        }
    }
}

impl GrowParams {
    pub fn new(angle_threshold_degrees: f64) -> Self {
        Self {
            angle_threshold_degrees,
        }
    }

    /// Reject tolerances that are negative, NaN or infinite.
    pub fn validate(&self) -> RegionResult<()> {
        let value = self.angle_threshold_degrees;
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(RegionError::InvalidTolerance { value })
        }
    }
}

/// A set of face ids selected from one seed.
///
/// Regions are owned by the caller; the mesh keeps no record of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    seed: u32,
    angle_threshold_degrees: f64,
    faces: HashSet<u32>,
}

impl Region {
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn angle_threshold_degrees(&self) -> f64 {
        self.angle_threshold_degrees
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn contains(&self, face: u32) -> bool {
        self.faces.contains(&face)
    }

    /// Face ids in unspecified order.
    pub fn faces(&self) -> impl Iterator<Item = u32> + '_ {
        self.faces.iter().copied()
    }

    /// Face ids in ascending order.
    pub fn sorted_faces(&self) -> Vec<u32> {
        let mut faces: Vec<u32> = self.faces.iter().copied().collect();
        faces.sort_unstable();
        faces
    }

    pub fn is_subset(&self, other: &Region) -> bool {
        self.faces.is_subset(&other.faces)
    }

    /// Copy the selected faces out of `mesh` as STL facets, in face order.
    pub fn extract(&self, mesh: &Mesh) -> Vec<Triangle> {
        self.sorted_faces()
            .into_iter()
            .filter_map(|face| mesh.triangle(face))
            .collect()
    }
}

/// Convert a face id from an untyped source (command line, JavaScript).
///
/// Negative ids and ids past the last face are both `InvalidSeed`.
pub fn face_id_from_signed(raw: i64, face_count: usize) -> RegionResult<u32> {
    u32::try_from(raw)
        .ok()
        .filter(|&face| (face as usize) < face_count)
        .ok_or(RegionError::InvalidSeed {
            seed: raw,
            face_count,
        })
}

/// Grow a region from `seed` with the given tolerance in degrees.
///
/// Shorthand for [`RegionGrower`] without cancellation or progress.
pub fn grow_region(mesh: &Mesh, seed: u32, angle_threshold_degrees: f64) -> RegionResult<Region> {
    RegionGrower::new(GrowParams::new(angle_threshold_degrees)).grow(mesh, seed)
}

/// Configurable region grower.
#[derive(Debug, Default)]
pub struct RegionGrower {
    params: GrowParams,
    cancel: Option<CancelToken>,
    progress: Progress,
}

impl RegionGrower {
    pub fn new(params: GrowParams) -> Self {
        Self {
            params,
            cancel: None,
            progress: Progress::none(),
        }
    }

    /// Stop with [`RegionError::Cancelled`] once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn params(&self) -> &GrowParams {
        &self.params
    }

    /// Collect the faces connected to `seed` through edge-adjacent faces
    /// whose normals lie within the tolerance of the seed normal.
    ///
    /// A face outside the tolerance ends growth along that path even if
    /// faces beyond it would match. Degenerate faces are never selected and
    /// never propagate.
    ///
    /// # Errors
    ///
    /// - [`RegionError::InvalidTolerance`] for a negative or non-finite tolerance
    /// - [`RegionError::EmptyMesh`] if the mesh has no faces
    /// - [`RegionError::InvalidSeed`] if `seed` is not a face
    /// - [`RegionError::DegenerateMesh`] if the seed face has no area
    /// - [`RegionError::Cancelled`] if the cancel token fires mid-traversal
    pub fn grow(&self, mesh: &Mesh, seed: u32) -> RegionResult<Region> {
        self.params.validate()?;
        let threshold = self.params.angle_threshold_degrees;

        let face_count = mesh.face_count();
        if face_count == 0 {
            return Err(RegionError::EmptyMesh);
        }
        if seed as usize >= face_count {
            return Err(RegionError::InvalidSeed {
                seed: i64::from(seed),
                face_count,
            });
        }

        let normals = mesh.face_normals();
        let adjacency = mesh.adjacency();
        let reference = normals
            .get(seed)
            .ok_or(RegionError::DegenerateMesh { face: seed })?;

        debug!(seed, threshold, face_count, "growing region");

        let mut visited = vec![false; face_count];
        let mut faces = HashSet::new();
        let mut worklist = vec![seed];
        let mut evaluated = 0usize;

        while let Some(face) = worklist.pop() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                debug!(seed, evaluated, "region growing cancelled");
                return Err(RegionError::Cancelled);
            }

            let seen = &mut visited[face as usize];
            if *seen {
                continue;
            }
            *seen = true;
            evaluated += 1;

            let Some(normal) = normals.get(face) else {
                trace!(face, "skipping degenerate face");
                continue;
            };
            if !within_angle(&normal, &reference, threshold) {
                continue;
            }

            faces.insert(face);
            if faces.len() % PROGRESS_INTERVAL == 0 {
                self.progress
                    .report(faces.len(), face_count, "growing region");
            }
            worklist.extend_from_slice(adjacency.neighbors(face));
        }

        debug!(seed, accepted = faces.len(), evaluated, "region grown");

        Ok(Region {
            seed,
            angle_threshold_degrees: threshold,
            faces,
        })
    }
}
