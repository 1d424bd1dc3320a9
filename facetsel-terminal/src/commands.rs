//! Subcommand implementations.
//!
//! Every command writes its user-facing output to the supplied writer so the
//! binary can pass stdout and tests can pass a buffer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use facetsel_core::{
    face_id_from_signed, pick_face, stl, Hit, Mesh, Ray, Region, RegionError, RegionGrower,
};
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use tracing::info;

use crate::cli::{Commands, GrowArgs, InfoArgs, PickArgs, SelectionArgs};
use crate::config::Config;

/// Serialised form of a selection, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct RegionReport {
    pub seed: u32,
    pub angle_threshold_degrees: f64,
    /// Number of selected faces
    pub face_count: usize,
    /// Number of faces in the whole mesh
    pub mesh_face_count: usize,
    pub faces: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit: Option<HitReport>,
}

#[derive(Debug, Serialize)]
pub struct HitReport {
    pub distance: f64,
    pub point: [f64; 3],
}

impl RegionReport {
    pub fn new(mesh: &Mesh, region: &Region, hit: Option<&Hit>) -> Self {
        Self {
            seed: region.seed(),
            angle_threshold_degrees: region.angle_threshold_degrees(),
            face_count: region.len(),
            mesh_face_count: mesh.face_count(),
            faces: region.sorted_faces(),
            hit: hit.map(|hit| HitReport {
                distance: hit.distance,
                point: [hit.point.x, hit.point.y, hit.point.z],
            }),
        }
    }
}

/// Run `command`, writing its report to `out`. `color` enables ANSI styling
/// of the summary.
pub fn execute<W: Write>(command: Commands, out: &mut W, color: bool) -> Result<()> {
    match command {
        Commands::Info(args) => run_info(&args, out),
        Commands::Grow(args) => run_grow(&args, out, color),
        Commands::Pick(args) => run_pick(&args, out, color),
    }
}

fn load(path: &Path) -> Result<Mesh> {
    let mesh = stl::load_mesh(path).with_context(|| format!("failed to load {}", path.display()))?;
    info!(
        triangles = mesh.face_count(),
        vertices = mesh.vertex_count(),
        "loaded {}",
        path.display()
    );
    Ok(mesh)
}

fn run_info<W: Write>(args: &InfoArgs, out: &mut W) -> Result<()> {
    let mesh = load(&args.input)?;
    let adjacency = mesh.adjacency();
    let normals = mesh.face_normals();

    writeln!(out, "File:              {}", args.input.display())?;
    writeln!(out, "Triangles:         {}", mesh.face_count())?;
    writeln!(out, "Welded vertices:   {}", mesh.vertex_count())?;
    writeln!(out, "Edges:             {}", adjacency.edge_count())?;
    writeln!(out, "Boundary edges:    {}", adjacency.boundary_edge_count())?;
    writeln!(out, "Non-manifold edges: {}", adjacency.non_manifold_edge_count())?;
    writeln!(out, "Watertight:        {}", adjacency.is_watertight())?;
    writeln!(out, "Degenerate faces:  {}", normals.degenerate_count())?;
    Ok(())
}

fn run_grow<W: Write>(args: &GrowArgs, out: &mut W, color: bool) -> Result<()> {
    let config = Config::resolve(args.selection.config.as_deref(), args.selection.angle)?;
    let mesh = load(&args.input)?;

    let seed = face_id_from_signed(args.seed, mesh.face_count())?;
    let region = RegionGrower::new(config.grow).grow(&mesh, seed)?;

    finish(&mesh, &region, None, &args.selection, out, color)
}

fn run_pick<W: Write>(args: &PickArgs, out: &mut W, color: bool) -> Result<()> {
    let config = Config::resolve(args.selection.config.as_deref(), args.selection.angle)?;
    let mesh = load(&args.input)?;

    let [ox, oy, oz] = args.origin;
    let [dx, dy, dz] = args.direction;
    let ray = Ray::new(Point3::new(ox, oy, oz), Vector3::new(dx, dy, dz))
        .context("ray direction must not be zero")?;
    let hit = pick_face(&mesh, &ray).ok_or(RegionError::NoHit)?;
    info!(face = hit.face, distance = hit.distance, "picked seed face");

    let region = RegionGrower::new(config.grow).grow(&mesh, hit.face)?;
    finish(&mesh, &region, Some(&hit), &args.selection, out, color)
}

fn finish<W: Write>(
    mesh: &Mesh,
    region: &Region,
    hit: Option<&Hit>,
    selection: &SelectionArgs,
    out: &mut W,
    color: bool,
) -> Result<()> {
    if let Some(path) = &selection.output {
        export(mesh, region, path, selection.ascii)?;
    }

    let report = RegionReport::new(mesh, region, hit);
    if selection.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        print_summary(&report, out, color)?;
    }
    Ok(())
}

fn export(mesh: &Mesh, region: &Region, path: &Path, ascii: bool) -> Result<()> {
    let triangles = region.extract(mesh);
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);

    if ascii {
        stl::write_ascii_stl(&triangles, "region", writer)?;
    } else {
        stl::write_binary_stl(&triangles, writer)?;
    }
    info!(triangles = triangles.len(), "wrote {}", path.display());
    Ok(())
}

fn print_summary<W: Write>(report: &RegionReport, out: &mut W, color: bool) -> Result<()> {
    if let Some(hit) = &report.hit {
        queue!(
            out,
            Print(format!(
                "Ray hit face {} at distance {:.4}\n",
                report.seed, hit.distance
            ))
        )?;
    }

    let tint = |c: Color| color.then_some(c);
    print_styled(
        out,
        tint(Color::Green),
        format!(
            "Selected {} of {} faces",
            report.face_count, report.mesh_face_count
        ),
    )?;
    print_styled(
        out,
        None,
        format!(
            " (seed {}, tolerance {}°)\n",
            report.seed, report.angle_threshold_degrees
        ),
    )?;
    print_styled(
        out,
        tint(Color::Yellow),
        format!("Faces: {}\n", format_ids(&report.faces)),
    )?;
    out.flush()?;
    Ok(())
}

fn print_styled<W: Write>(out: &mut W, tint: Option<Color>, text: String) -> std::io::Result<()> {
    match tint {
        Some(color) => queue!(out, SetForegroundColor(color), Print(text), ResetColor),
        None => queue!(out, Print(text)),
    }
}

/// Compress sorted ids into runs, e.g. `0-3, 7, 9-10`
fn format_ids(ids: &[u32]) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut iter = ids.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        runs.push(if start == end {
            start.to_string()
        } else {
            format!("{start}-{end}")
        });
    }
    runs.join(", ")
}
