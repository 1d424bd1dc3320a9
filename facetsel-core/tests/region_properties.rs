//! Property-based tests for region growing.
//!
//! Meshes are triangulated height fields over a regular grid, so every face
//! has positive area and shared edges follow the grid.

use facetsel_core::normals::within_angle;
use facetsel_core::{grow_region, Mesh, RegionError};
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Mesh builders
// =============================================================================

/// Grid of `cols x rows` quads, each split into two triangles, with vertex
/// heights taken row-major from `heights` (`(cols + 1) * (rows + 1)` values).
/// `x_offset` shifts the whole patch and `index_offset` is added to every
/// vertex index so patches can be concatenated.
fn grid_patch(
    cols: u32,
    rows: u32,
    heights: &[f64],
    x_offset: f64,
    index_offset: u32,
) -> (Vec<Point3<f64>>, Vec<[u32; 3]>) {
    let mut vertices = Vec::new();
    for j in 0..=rows {
        for i in 0..=cols {
            let h = heights[(j * (cols + 1) + i) as usize];
            vertices.push(Point3::new(f64::from(i) + x_offset, f64::from(j), h));
        }
    }

    let at = |i: u32, j: u32| index_offset + j * (cols + 1) + i;
    let mut faces = Vec::new();
    for j in 0..rows {
        for i in 0..cols {
            faces.push([at(i, j), at(i + 1, j), at(i + 1, j + 1)]);
            faces.push([at(i, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }
    (vertices, faces)
}

fn height_field(cols: u32, rows: u32, heights: &[f64]) -> Mesh {
    let (vertices, faces) = grid_patch(cols, rows, heights, 0.0, 0);
    Mesh::new(vertices, faces).unwrap()
}

fn flat(cols: u32, rows: u32) -> Mesh {
    height_field(cols, rows, &vec![0.0; ((cols + 1) * (rows + 1)) as usize])
}

// =============================================================================
// Strategies
// =============================================================================

/// A bumpy height field with a few plateaus so regions are non-trivial.
fn arb_height_field() -> impl Strategy<Value = Mesh> {
    (1u32..6, 1u32..6).prop_flat_map(|(cols, rows)| {
        let n = ((cols + 1) * (rows + 1)) as usize;
        let height = prop_oneof![3 => Just(0.0), 1 => -1.0..1.0f64];
        prop::collection::vec(height, n)
            .prop_map(move |heights| height_field(cols, rows, &heights))
    })
}

fn arb_mesh_and_seed() -> impl Strategy<Value = (Mesh, u32)> {
    arb_height_field().prop_flat_map(|mesh| {
        let faces = mesh.face_count() as u32;
        (Just(mesh), 0..faces)
    })
}

fn arb_tolerance() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(5.0), 0.0..180.0f64]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn grow_is_idempotent((mesh, seed) in arb_mesh_and_seed(), t in arb_tolerance()) {
        let first = grow_region(&mesh, seed, t).unwrap();
        let second = grow_region(&mesh, seed, t).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn seed_always_included((mesh, seed) in arb_mesh_and_seed(), t in arb_tolerance()) {
        let region = grow_region(&mesh, seed, t).unwrap();
        prop_assert!(region.contains(seed));
        prop_assert!(!region.is_empty());
    }

    #[test]
    fn larger_tolerance_never_shrinks(
        (mesh, seed) in arb_mesh_and_seed(),
        a in 0.0..90.0f64,
        b in 0.0..90.0f64,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let small = grow_region(&mesh, seed, low).unwrap();
        let large = grow_region(&mesh, seed, high).unwrap();
        prop_assert!(small.is_subset(&large));
    }

    #[test]
    fn region_is_the_tolerance_component(
        (mesh, seed) in arb_mesh_and_seed(),
        t in arb_tolerance(),
    ) {
        let region = grow_region(&mesh, seed, t).unwrap();
        let normals = mesh.face_normals();
        let adjacency = mesh.adjacency();
        let reference = normals.get(seed).unwrap();
        let within = |face: u32| {
            normals
                .get(face)
                .is_some_and(|n| within_angle(&n, &reference, t))
        };

        for face in region.faces() {
            // Every member passes the test...
            prop_assert!(within(face));
            // ...is linked to the rest of the region...
            if face != seed {
                prop_assert!(adjacency.neighbors(face).iter().any(|&n| region.contains(n)));
            }
            // ...and nothing adjacent that passes was left out
            for &n in adjacency.neighbors(face) {
                prop_assert!(region.contains(n) || !within(n));
            }
        }
    }

    #[test]
    fn flat_mesh_selects_everything(
        cols in 1u32..8,
        rows in 1u32..8,
        seed_pick in any::<prop::sample::Index>(),
        t in arb_tolerance(),
    ) {
        let mesh = flat(cols, rows);
        let seed = seed_pick.index(mesh.face_count()) as u32;
        let region = grow_region(&mesh, seed, t).unwrap();
        prop_assert_eq!(region.len(), mesh.face_count());
    }

    #[test]
    fn disconnected_patches_stay_apart(
        cols in 1u32..5,
        rows in 1u32..5,
        seed_pick in any::<prop::sample::Index>(),
    ) {
        let n = ((cols + 1) * (rows + 1)) as usize;
        let zeros = vec![0.0; n];
        let (mut vertices, mut faces) = grid_patch(cols, rows, &zeros, 0.0, 0);
        let (far_vertices, far_faces) = grid_patch(cols, rows, &zeros, 100.0, n as u32);
        let left_faces = faces.len();
        vertices.extend(far_vertices);
        faces.extend(far_faces);
        let mesh = Mesh::new(vertices, faces).unwrap();

        let seed = seed_pick.index(left_faces) as u32;
        let region = grow_region(&mesh, seed, 180.0).unwrap();
        prop_assert_eq!(region.len(), left_faces);
        prop_assert!(region.faces().all(|face| (face as usize) < left_faces));
    }

    #[test]
    fn out_of_range_seed_rejected(mesh in arb_height_field(), past in 0u32..10) {
        let seed = mesh.face_count() as u32 + past;
        let is_invalid_seed = matches!(
            grow_region(&mesh, seed, 5.0),
            Err(RegionError::InvalidSeed { .. })
        );
        prop_assert!(is_invalid_seed);
    }
}

#[test]
fn concurrent_growth_shares_caches() {
    let heights: Vec<f64> = (0..49).map(|i| if i % 7 < 3 { 0.0 } else { 0.5 }).collect();
    let mesh = height_field(6, 6, &heights);
    let expected: Vec<_> = (0..mesh.face_count() as u32)
        .map(|seed| grow_region(&mesh, seed, 5.0).unwrap())
        .collect();

    let fresh = height_field(6, 6, &heights);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..fresh.face_count() as u32)
                        .map(|seed| grow_region(&fresh, seed, 5.0).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
