//! facetsel Web - WASM binding for face-region selection
//!
//! Exposes mesh loading, ray picking and region growing to JavaScript. The
//! host page owns rendering; it passes the STL bytes once and then asks for
//! face ids to highlight.

use facetsel_core::{
    face_id_from_signed, pick_face, stl, GrowParams, Mesh, Ray, RegionGrower, RegionResult,
};
use nalgebra::{Point3, Vector3};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct FacetSelector {
    mesh: Mesh,
}

#[wasm_bindgen]
impl FacetSelector {
    /// Parse an STL file (binary or ASCII) and weld it into an indexed mesh
    #[wasm_bindgen(constructor)]
    pub fn new(stl_bytes: &[u8]) -> Result<FacetSelector, JsValue> {
        let triangles = stl::parse_stl(stl_bytes).map_err(to_js)?;
        Ok(FacetSelector {
            mesh: Mesh::from_triangles(&triangles),
        })
    }

    #[wasm_bindgen(js_name = faceCount)]
    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }

    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Sorted ids of the faces in the region grown from `seed`
    pub fn grow(&self, seed: i64, angle: f64) -> Result<Vec<u32>, JsValue> {
        self.grow_ids(seed, angle).map_err(to_js)
    }

    /// Face hit by the ray, if any
    pub fn pick(&self, ox: f64, oy: f64, oz: f64, dx: f64, dy: f64, dz: f64) -> Option<u32> {
        let ray = Ray::new(Point3::new(ox, oy, oz), Vector3::new(dx, dy, dz))?;
        pick_face(&self.mesh, &ray).map(|hit| hit.face)
    }
}

impl FacetSelector {
    fn grow_ids(&self, seed: i64, angle: f64) -> RegionResult<Vec<u32>> {
        let seed = face_id_from_signed(seed, self.mesh.face_count())?;
        let region = RegionGrower::new(GrowParams::new(angle)).grow(&self.mesh, seed)?;
        Ok(region.sorted_faces())
    }
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
