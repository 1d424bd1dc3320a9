//! Example: Load an STL file and select the logical face around a triangle
//!
//! Usage: cargo run --example load_stl -- path/to/file.stl [seed] [angle]
use std::env;

use anyhow::Context;
use facetsel_core::{face_id_from_signed, grow_region, stl, Mesh, DEFAULT_ANGLE_THRESHOLD_DEGREES};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mesh = match args.get(1) {
        Some(path) => {
            println!("Loading STL file: {path}");
            stl::load_mesh(path).with_context(|| format!("Failed to load {path}"))?
        }
        None => {
            eprintln!("Usage: {} <stl-file> [seed] [angle]", args[0]);
            eprintln!("\nNo STL file provided, using default cube...");
            Mesh::cube(2.0)
        }
    };

    let seed: i64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(0);
    let angle: f64 = args
        .get(3)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(DEFAULT_ANGLE_THRESHOLD_DEGREES);

    println!(
        "Loaded {} triangles ({} welded vertices)",
        mesh.face_count(),
        mesh.vertex_count()
    );

    let seed = face_id_from_signed(seed, mesh.face_count())?;
    let region = grow_region(&mesh, seed, angle)?;

    println!(
        "Face {seed} belongs to a region of {} triangles within {angle}°: {:?}",
        region.len(),
        region.sorted_faces()
    );
    Ok(())
}
