//! Face adjacency derived from shared edges.

use hashbrown::HashMap;

/// Edge-based adjacency between the faces of a triangle mesh.
///
/// Two faces are neighbours when they share an undirected edge. Faces that
/// only touch at a vertex are not neighbours.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    /// Maps edge (v0, v1) to the faces using it. v0 < v1.
    edge_to_faces: HashMap<(u32, u32), Vec<u32>>,
    /// Sorted, deduplicated neighbour list per face.
    neighbors: Vec<Vec<u32>>,
}

impl AdjacencyIndex {
    /// Build the index from triangle faces given as vertex index triplets.
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<u32>> = HashMap::new();

        for (face_idx, &[v0, v1, v2]) in faces.iter().enumerate() {
            let face_idx = face_idx as u32;
            for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
                // Collapsed edge of a degenerate face
                if a == b {
                    continue;
                }
                let users = edge_to_faces.entry(normalize_edge(a, b)).or_default();
                if users.last() != Some(&face_idx) {
                    users.push(face_idx);
                }
            }
        }

        let mut neighbors = vec![Vec::new(); faces.len()];
        for users in edge_to_faces.values() {
            for &face in users {
                neighbors[face as usize].extend(users.iter().copied().filter(|&other| other != face));
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            edge_to_faces,
            neighbors,
        }
    }

    /// Faces sharing an edge with `face`, in ascending order.
    ///
    /// Returns an empty slice for an unknown face.
    #[inline]
    pub fn neighbors(&self, face: u32) -> &[u32] {
        self.neighbors
            .get(face as usize)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Faces using the edge `(v0, v1)` in either direction.
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[u32]> {
        self.edge_to_faces
            .get(&normalize_edge(v0, v1))
            .map(Vec::as_slice)
    }

    pub fn face_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Edges used by exactly one face.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Edges used by more than two faces.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }
}

#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_edge() {
        let adj = AdjacencyIndex::build(&[[0, 1, 2], [1, 3, 2]]);

        assert_eq!(adj.neighbors(0), &[1]);
        assert_eq!(adj.neighbors(1), &[0]);
        assert_eq!(adj.faces_for_edge(2, 1), Some(&[0, 1][..]));
        assert_eq!(adj.edge_count(), 5);
        assert_eq!(adj.boundary_edge_count(), 4);
        assert!(adj.is_manifold());
        assert!(!adj.is_watertight());
    }

    #[test]
    fn test_vertex_contact_is_not_adjacency() {
        // Two triangles meeting only at vertex 2
        let adj = AdjacencyIndex::build(&[[0, 1, 2], [2, 3, 4]]);
        assert!(adj.neighbors(0).is_empty());
        assert!(adj.neighbors(1).is_empty());
    }

    #[test]
    fn test_non_manifold_fan() {
        let adj = AdjacencyIndex::build(&[[0, 1, 2], [0, 1, 3], [1, 0, 4]]);

        assert_eq!(adj.non_manifold_edge_count(), 1);
        assert!(!adj.is_manifold());
        assert_eq!(adj.neighbors(0), &[1, 2]);
        assert_eq!(adj.neighbors(2), &[0, 1]);
    }

    #[test]
    fn test_neighbors_deduplicated() {
        // Faces 0 and 1 are the same triangle listed twice, sharing three edges
        let adj = AdjacencyIndex::build(&[[0, 1, 2], [2, 1, 0]]);
        assert_eq!(adj.neighbors(0), &[1]);
    }

    #[test]
    fn test_degenerate_face_skips_collapsed_edge() {
        let adj = AdjacencyIndex::build(&[[0, 0, 1], [0, 1, 2]]);

        assert_eq!(adj.faces_for_edge(0, 0), None);
        assert_eq!(adj.faces_for_edge(0, 1), Some(&[0, 1][..]));
        assert_eq!(adj.neighbors(0), &[1]);
    }

    #[test]
    fn test_unknown_face() {
        let adj = AdjacencyIndex::build(&[[0, 1, 2]]);
        assert!(adj.neighbors(42).is_empty());
        assert_eq!(adj.face_count(), 1);
    }
}
