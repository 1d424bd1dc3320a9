//! STL reading and writing for binary and ASCII formats
use std::io::Write;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::all_consuming,
    multi::{many0, many1},
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult, StlError};
use crate::geometry::{Mesh, Triangle};

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Vec<Triangle>, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooShort { len: data.len() });
    }

    // Triangle count follows the 80-byte header (4 bytes, little-endian)
    let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;

    let records = &data[HEADER_LEN + 4..];
    let found = records.len() / RECORD_LEN;
    if found < count {
        return Err(StlError::Truncated {
            expected: count,
            found,
        });
    }

    // Each record: normal, 3 vertices, then a 2-byte attribute count we ignore
    let triangles = records
        .chunks_exact(RECORD_LEN)
        .take(count)
        .map(|record| {
            let normal = read_vec3(record, 0);
            let v0 = read_vec3(record, 12);
            let v1 = read_vec3(record, 24);
            let v2 = read_vec3(record, 36);
            Triangle::with_normal(
                [Point3::from(v0), Point3::from(v1), Point3::from(v2)],
                normal,
            )
        })
        .collect();

    Ok(triangles)
}

fn read_vec3(record: &[u8], offset: usize) -> Vector3<f32> {
    let at = |i: usize| {
        let o = offset + i * 4;
        f32::from_le_bytes([record[o], record[o + 1], record[o + 2], record[o + 3]])
    };
    Vector3::new(at(0), at(1), at(2))
}

/// Parse an ASCII STL file.
///
/// Files holding several `solid ... endsolid` blocks yield the facets of all
/// of them. Anything other than whitespace after the last block is an error.
pub fn parse_ascii_stl(input: &str) -> Result<Vec<Triangle>, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, solids)) => Ok(solids.into_iter().flatten().collect()),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            let offset = input.len() - e.input.len();
            let line = input[..offset].matches('\n').count() + 1;
            Err(StlError::Ascii(format!("{:?} at line {line}", e.code)))
        }
        Err(e) => Err(StlError::Ascii(e.to_string())),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Vec<Vec<Triangle>>> {
    all_consuming(terminated(many1(parse_solid), multispace0))(input)
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;

    Ok((input, triangles))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        Triangle::with_normal(
            [Point3::from(v1), Point3::from(v2), Point3::from(v3)],
            normal,
        ),
    ))
}

fn parse_vertex(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle>, StlError> {
    // Binary exporters sometimes start the header with "solid" too
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            return match parse_ascii_stl(text) {
                Ok(triangles) => Ok(triangles),
                // Text that fails as ASCII and as binary reports the ASCII error
                Err(ascii) => parse_binary_stl(data).map_err(|_| ascii),
            };
        }
    }

    parse_binary_stl(data)
}

/// Write triangles as binary STL. Normals are recomputed from the corners.
pub fn write_binary_stl<W: Write>(triangles: &[Triangle], mut writer: W) -> Result<(), StlError> {
    let count = u32::try_from(triangles.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "binary STL holds at most u32::MAX triangles",
        )
    })?;

    let mut header = [0u8; HEADER_LEN];
    let label = b"facetsel binary STL";
    header[..label.len()].copy_from_slice(label);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    let mut record = Vec::with_capacity(RECORD_LEN);
    for triangle in triangles {
        record.clear();
        let normal = triangle.calculate_normal();
        for value in normal
            .iter()
            .chain(triangle.vertices.iter().flat_map(|v| v.coords.iter()))
        {
            record.extend_from_slice(&value.to_le_bytes());
        }
        record.extend_from_slice(&[0, 0]);
        writer.write_all(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write triangles as ASCII STL. Normals are recomputed from the corners.
pub fn write_ascii_stl<W: Write>(
    triangles: &[Triangle],
    name: &str,
    mut writer: W,
) -> Result<(), StlError> {
    writeln!(writer, "solid {name}")?;
    for triangle in triangles {
        let n = triangle.calculate_normal();
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in &triangle.vertices {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    writer.flush()?;
    Ok(())
}

/// Read an STL file from disk and weld it into an indexed [`Mesh`].
pub fn load_mesh(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let triangles = parse_stl(&data)?;
    let mesh = Mesh::from_triangles(&triangles);
    debug!(
        path = %path.display(),
        triangles = mesh.face_count(),
        vertices = mesh.vertex_count(),
        "loaded STL"
    );

    let non_manifold = mesh.adjacency().non_manifold_edge_count();
    if non_manifold > 0 {
        warn!(
            path = %path.display(),
            non_manifold,
            "mesh has edges shared by more than two faces"
        );
    }

    Ok(mesh)
}
