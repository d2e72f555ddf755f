//! Tessellation wrapper producing `RenderMesh` with per-face ranges.

use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

use crate::types::*;

type TruckSolid = truck_modeling::Solid;

/// Append one polygon mesh to the flat buffers, returning its index range.
fn append_mesh(
    mesh: &PolygonMesh,
    vertices: &mut Vec<f32>,
    normals: &mut Vec<f32>,
    indices: &mut Vec<u32>,
) -> (u32, u32) {
    let start_index = indices.len() as u32;
    let base_vertex = (vertices.len() / 3) as u32;

    for pos in mesh.positions() {
        vertices.extend_from_slice(&[pos[0] as f32, pos[1] as f32, pos[2] as f32]);
    }
    if mesh.normals().len() == mesh.positions().len() {
        for n in mesh.normals() {
            normals.extend_from_slice(&[n[0] as f32, n[1] as f32, n[2] as f32]);
        }
    } else {
        for _ in mesh.positions() {
            normals.extend_from_slice(&[0.0, 0.0, 1.0]);
        }
    }

    for tri in mesh.tri_faces() {
        for v in tri.iter() {
            indices.push(v.pos as u32 + base_vertex);
        }
    }
    for quad in mesh.quad_faces() {
        for k in [0, 1, 2, 0, 2, 3] {
            indices.push(quad[k].pos as u32 + base_vertex);
        }
    }
    (start_index, indices.len() as u32)
}

/// Tessellate a truck Solid, one face range per B-rep face.
pub fn tessellate_solid(
    solid: &TruckSolid,
    tolerance: f64,
    next_id: &mut u64,
) -> std::result::Result<RenderMesh, KernelError> {
    let meshed = solid.triangulation(tolerance);

    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();
    let mut face_ranges = Vec::new();

    for shell in meshed.boundaries().iter() {
        for face in shell.face_iter() {
            let Some(mut face_mesh) = face.surface() else {
                continue;
            };
            // If face is inverted, the mesh needs inversion too
            if !face.orientation() {
                face_mesh.invert();
            }
            let (start_index, end_index) =
                append_mesh(&face_mesh, &mut vertices, &mut normals, &mut indices);
            if end_index > start_index {
                face_ranges.push(FaceRange {
                    face_id: KernelId(*next_id),
                    start_index,
                    end_index,
                });
                *next_id += 1;
            }
        }
    }

    if indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid produced no triangles".to_string(),
        });
    }

    Ok(RenderMesh {
        vertices,
        normals,
        indices,
        face_ranges,
    })
}

/// Whole-solid polygon mesh, used for volume integration.
pub fn solid_polygon(solid: &TruckSolid, tolerance: f64) -> PolygonMesh {
    solid.triangulation(tolerance).to_polygon()
}
