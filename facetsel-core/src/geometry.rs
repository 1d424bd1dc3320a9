//! Geometry primitives: STL facets and the welded, indexed mesh
use std::sync::OnceLock;

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

use crate::adjacency::AdjacencyIndex;
use crate::error::{MeshError, MeshResult};
use crate::normals::FaceNormals;

/// One STL facet: three corners plus the normal recorded in the file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub normal: Vector3<f32>,
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        let mut triangle = Self {
            vertices: [v0, v1, v2],
            normal: Vector3::zeros(),
        };
        triangle.normal = triangle.calculate_normal();
        triangle
    }

    /// Build a facet keeping the normal stored in the file, even if it disagrees with the winding
    pub fn with_normal(vertices: [Point3<f32>; 3], normal: Vector3<f32>) -> Self {
        Self { vertices, normal }
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Zero-area triangles yield the zero vector instead of NaNs.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0];
        let v1 = self.vertices[1];
        let v2 = self.vertices[2];

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// An indexed triangle mesh.
///
/// Faces are `[u32; 3]` triples into the vertex list. The mesh is immutable
/// after construction; face normals and the adjacency index are derived on
/// first use and cached for the lifetime of the instance.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
    normals: OnceLock<FaceNormals>,
    adjacency: OnceLock<AdjacencyIndex>,
}

impl Mesh {
    /// Build a mesh, checking that every face index names an existing vertex.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> MeshResult<Self> {
        let vertex_count = vertices.len();
        for (face, indices) in faces.iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(MeshError::InvalidVertexIndex { face, vertex });
            }
        }

        Ok(Self {
            vertices,
            faces,
            normals: OnceLock::new(),
            adjacency: OnceLock::new(),
        })
    }

    /// Weld a triangle soup into an indexed mesh.
    ///
    /// Corners with bit-identical coordinates become one vertex (`-0.0` and
    /// `0.0` are treated as equal). Face `i` is facet `i` of the input.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::with_capacity(triangles.len());
        let mut vertices = Vec::with_capacity(triangles.len() / 2 + 3);
        let mut faces = Vec::with_capacity(triangles.len());

        for triangle in triangles {
            let mut face = [0u32; 3];
            for (slot, corner) in face.iter_mut().zip(&triangle.vertices) {
                *slot = *lookup.entry(weld_key(corner)).or_insert_with(|| {
                    vertices.push(corner.cast::<f64>());
                    (vertices.len() - 1) as u32
                });
            }
            faces.push(face);
        }

        Self {
            vertices,
            faces,
            normals: OnceLock::new(),
            adjacency: OnceLock::new(),
        }
    }

    /// Create an axis-aligned cube centred on the origin.
    ///
    /// 8 shared vertices and 12 outward-wound triangles, two per side, in
    /// the order front (+Z), back, top (+Y), bottom, right (+X), left.
    pub fn cube(size: f64) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Point3::new(-half, -half, -half),
            Point3::new(half, -half, -half),
            Point3::new(half, half, -half),
            Point3::new(-half, half, -half),
            Point3::new(-half, -half, half),
            Point3::new(half, -half, half),
            Point3::new(half, half, half),
            Point3::new(-half, half, half),
        ];
        let faces = vec![
            // Front face
            [4, 5, 6],
            [4, 6, 7],
            // Back face
            [0, 3, 2],
            [0, 2, 1],
            // Top face
            [3, 7, 6],
            [3, 6, 2],
            // Bottom face
            [0, 1, 5],
            [0, 5, 4],
            // Right face
            [1, 2, 6],
            [1, 6, 5],
            // Left face
            [0, 4, 7],
            [0, 7, 3],
        ];

        Self {
            vertices,
            faces,
            normals: OnceLock::new(),
            adjacency: OnceLock::new(),
        }
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Unit normal per face, computed on first call
    pub fn face_normals(&self) -> &FaceNormals {
        self.normals
            .get_or_init(|| FaceNormals::compute(&self.vertices, &self.faces))
    }

    /// Edge adjacency between faces, built on first call
    pub fn adjacency(&self) -> &AdjacencyIndex {
        self.adjacency
            .get_or_init(|| AdjacencyIndex::build(&self.faces))
    }

    /// The corners of `face` as an STL facet, or `None` if out of range.
    pub fn triangle(&self, face: u32) -> Option<Triangle> {
        let [a, b, c] = *self.faces.get(face as usize)?;
        let corner = |v: u32| self.vertices[v as usize].cast::<f32>();
        Some(Triangle::new(corner(a), corner(b), corner(c)))
    }

    /// Every face as an STL facet, in face order.
    pub fn triangles(&self) -> Vec<Triangle> {
        (0..self.faces.len() as u32)
            .filter_map(|face| self.triangle(face))
            .collect()
    }
}

fn weld_key(p: &Point3<f32>) -> [u32; 3] {
    // +0.0 for -0.0 so mirrored zeros weld
    let bits = |c: f32| if c == 0.0 { 0 } else { c.to_bits() };
    [bits(p.x), bits(p.y), bits(p.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_rejects_bad_index() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        let err = Mesh::new(vertices, vec![[0, 1, 2], [0, 1, 3]]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { face: 1, vertex: 3 }));
    }

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
        assert!(cube.adjacency().is_watertight());
        assert!(cube.adjacency().is_manifold());
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube(2.0);
        let normals = cube.face_normals();
        for (face, indices) in cube.faces().iter().enumerate() {
            let centroid = indices
                .iter()
                .fold(Vector3::zeros(), |acc, &v| acc + cube.vertices()[v as usize].coords)
                / 3.0;
            let normal = normals.get(face as u32).unwrap();
            assert!(normal.dot(&centroid) > 0.0, "face {face} points inward");
        }
    }

    #[test]
    fn test_weld_shared_corners() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 1.0, 0.0);
        let d = Point3::new(-0.0, 1.0, 0.0);
        let mesh = Mesh::from_triangles(&[Triangle::new(a, b, c), Triangle::new(a, c, d)]);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.adjacency().neighbors(0), &[1]);
    }

    #[test]
    fn test_triangle_roundtrip_keeps_order() {
        let cube = Mesh::cube(1.0);
        let triangles = cube.triangles();
        assert_eq!(triangles.len(), 12);

        let rewelded = Mesh::from_triangles(&triangles);
        assert_eq!(rewelded.face_count(), 12);
        assert_eq!(rewelded.vertex_count(), 8);
        assert_relative_eq!(triangles[0].normal.z, 1.0);
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let triangle = Triangle::new(p, p, Point3::new(2.0, 2.0, 2.0));
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }
}
