//! Ray picking: turn a pointer ray into a seed face.

use nalgebra::{Point3, Vector3};

use crate::error::{RegionError, RegionResult};
use crate::geometry::Mesh;
use crate::region::{Region, RegionGrower};

/// Hits closer than this, and rays this close to parallel, are ignored.
pub const PICK_EPSILON: f64 = 1e-9;

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Returns `None` if `direction` has zero length.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        let direction = direction.try_normalize(0.0)?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, distance: f64) -> Point3<f64> {
        self.origin + self.direction * distance
    }
}

/// The nearest face along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub face: u32,
    /// Distance from the ray origin.
    pub distance: f64,
    pub point: Point3<f64>,
}

/// Find the closest face hit by `ray`. Ties go to the lowest face id.
pub fn pick_face(mesh: &Mesh, ray: &Ray) -> Option<Hit> {
    let vertices = mesh.vertices();
    let mut best: Option<(u32, f64)> = None;

    for (face, &[a, b, c]) in mesh.faces().iter().enumerate() {
        let corners = [vertices[a as usize], vertices[b as usize], vertices[c as usize]];
        let Some(t) = ray_triangle_intersect(ray, &corners) else {
            continue;
        };
        if best.map_or(true, |(_, closest)| t < closest) {
            best = Some((face as u32, t));
        }
    }

    best.map(|(face, distance)| Hit {
        face,
        distance,
        point: ray.at(distance),
    })
}

/// Pick the seed with `ray` and grow a region from it.
///
/// # Errors
///
/// [`RegionError::NoHit`] if the ray misses, otherwise whatever
/// [`RegionGrower::grow`] reports.
pub fn grow_from_ray(mesh: &Mesh, ray: &Ray, grower: &RegionGrower) -> RegionResult<Region> {
    let hit = pick_face(mesh, ray).ok_or(RegionError::NoHit)?;
    grower.grow(mesh, hit.face)
}

/// Möller–Trumbore intersection; returns the distance along the ray.
fn ray_triangle_intersect(ray: &Ray, [v0, v1, v2]: &[Point3<f64>; 3]) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Parallel to the plane, or a zero-area triangle
    if a.abs() < PICK_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > PICK_EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::GrowParams;
    use approx::assert_relative_eq;

    #[test]
    fn test_pick_nearest_side() {
        let cube = Mesh::cube(2.0);
        let ray = Ray::new(Point3::new(0.2, 0.3, 10.0), -Vector3::z()).unwrap();

        let hit = pick_face(&cube, &ray).unwrap();
        // Front side (+Z) is faces 0 and 1; the back side is further away
        assert!(hit.face < 2);
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-12);
        assert_relative_eq!(hit.point.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_miss() {
        let cube = Mesh::cube(2.0);
        let ray = Ray::new(Point3::new(5.0, 5.0, 10.0), -Vector3::z()).unwrap();
        assert_eq!(pick_face(&cube, &ray), None);

        let away = Ray::new(Point3::new(0.0, 0.0, 10.0), Vector3::z()).unwrap();
        assert_eq!(pick_face(&cube, &away), None);
    }

    #[test]
    fn test_ray_from_inside_hits_far_wall() {
        let cube = Mesh::cube(2.0);
        let ray = Ray::new(Point3::origin(), Vector3::x()).unwrap();
        let hit = pick_face(&cube, &ray).unwrap();
        assert!(hit.face == 8 || hit.face == 9);
        assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn test_grow_from_ray() {
        let cube = Mesh::cube(2.0);
        let grower = RegionGrower::new(GrowParams::default());

        let ray = Ray::new(Point3::new(0.1, 10.0, -0.4), -Vector3::y()).unwrap();
        let region = grow_from_ray(&cube, &ray, &grower).unwrap();
        assert_eq!(region.sorted_faces(), vec![4, 5]);

        let miss = Ray::new(Point3::new(9.0, 10.0, 0.0), -Vector3::y()).unwrap();
        assert_eq!(grow_from_ray(&cube, &miss, &grower), Err(RegionError::NoHit));
    }
}
