//! Per-face unit normals and the angle predicate used by region growing.

use nalgebra::{Point3, Vector3};

/// Cross products at or below this length mark a face as degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// One unit normal per face.
///
/// Degenerate (zero-area) faces store the zero vector as a sentinel; use
/// [`FaceNormals::get`] to see them as `None`.
#[derive(Debug, Clone, Default)]
pub struct FaceNormals {
    normals: Vec<Vector3<f64>>,
}

impl FaceNormals {
    /// Compute normals from vertex positions using the right-hand rule on
    /// the face winding.
    pub fn compute(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> Self {
        let normals = faces
            .iter()
            .map(|&[a, b, c]| {
                let corner = |v: u32| vertices.get(v as usize).copied();
                let normal = match (corner(a), corner(b), corner(c)) {
                    (Some(p0), Some(p1), Some(p2)) => face_normal(&p0, &p1, &p2),
                    _ => None,
                };
                normal.unwrap_or_else(Vector3::zeros)
            })
            .collect();

        Self { normals }
    }

    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    /// The unit normal of `face`, or `None` if the face is degenerate or
    /// does not exist.
    #[inline]
    pub fn get(&self, face: u32) -> Option<Vector3<f64>> {
        self.normals
            .get(face as usize)
            .filter(|n| *n != &Vector3::zeros())
            .copied()
    }

    /// The stored vector for `face`, including the zero sentinel.
    pub fn raw(&self, face: u32) -> Option<&Vector3<f64>> {
        self.normals.get(face as usize)
    }

    /// Number of faces whose normal is the zero sentinel.
    pub fn degenerate_count(&self) -> usize {
        self.normals.iter().filter(|n| **n == Vector3::zeros()).count()
    }
}

/// Unit normal of the triangle `p0 p1 p2`, or `None` if it has no area or
/// non-finite corners.
pub fn face_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<Vector3<f64>> {
    (p1 - p0)
        .cross(&(p2 - p0))
        .try_normalize(DEGENERATE_EPSILON)
        .filter(|n| n.iter().all(|c| c.is_finite()))
}

/// Angle in degrees between two unit vectors.
///
/// The dot product is clamped to `[-1, 1]` before `acos`, since rounding can
/// push it slightly outside that range for (anti)parallel vectors.
#[inline]
pub fn angle_between_degrees(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Slack, in degrees, absorbed when comparing an angle against a threshold.
pub const ANGLE_EPSILON_DEGREES: f64 = 1e-9;

/// Whether the angle between two unit vectors is at most `threshold` degrees.
///
/// `acos` followed by `to_degrees` is off by a few ulps for most angles
/// (45 degrees comes out as 45.000000000000007), so the inclusive bound is
/// widened by [`ANGLE_EPSILON_DEGREES`].
#[inline]
pub fn within_angle(a: &Vector3<f64>, b: &Vector3<f64>, threshold: f64) -> bool {
    angle_between_degrees(a, b) <= threshold + ANGLE_EPSILON_DEGREES
}
