//! Binary and ASCII STL writers for tessellated parts.
//!
//! Facet normals are recomputed from the winding; the per-vertex normals in
//! a [`RenderMesh`] are ignored.

use std::fmt::Write;

use solid_kernel::RenderMesh;

use crate::errors::ExportError;

const HEADER_LEN: usize = 80;

type Triangle = [[f32; 3]; 3];

fn triangles(mesh: &RenderMesh) -> Result<Vec<Triangle>, ExportError> {
    if mesh.vertices.len() % 3 != 0 {
        return Err(ExportError::InvalidMesh(format!(
            "vertex buffer length {} is not a multiple of 3",
            mesh.vertices.len()
        )));
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(ExportError::InvalidMesh(format!(
            "index buffer length {} is not a multiple of 3",
            mesh.indices.len()
        )));
    }
    if mesh.indices.is_empty() {
        return Err(ExportError::InvalidMesh("mesh has no triangles".to_string()));
    }

    let count = mesh.vertices.len() / 3;
    let vertex = |i: u32| -> Result<[f32; 3], ExportError> {
        let i = i as usize;
        if i >= count {
            return Err(ExportError::InvalidMesh(format!(
                "index {} out of range for {} vertices",
                i, count
            )));
        }
        let v = &mesh.vertices[i * 3..i * 3 + 3];
        Ok([v[0], v[1], v[2]])
    };

    mesh.indices
        .chunks(3)
        .map(|t| -> Result<Triangle, ExportError> {
            Ok([vertex(t[0])?, vertex(t[1])?, vertex(t[2])?])
        })
        .collect()
}

fn facet_normal(t: &Triangle) -> [f32; 3] {
    let e1 = [t[1][0] - t[0][0], t[1][1] - t[0][1], t[1][2] - t[0][2]];
    let e2 = [t[2][0] - t[0][0], t[2][1] - t[0][1], t[2][2] - t[0][2]];
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-10 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

/// Binary STL bytes: 80-byte header, triangle count, 50 bytes per facet.
pub fn export_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let tris = triangles(mesh)?;
    let mut data = Vec::with_capacity(HEADER_LEN + 4 + tris.len() * 50);

    let mut header = [b' '; HEADER_LEN];
    let tag = name.as_bytes();
    let n = tag.len().min(HEADER_LEN);
    header[..n].copy_from_slice(&tag[..n]);
    // A header starting with "solid" makes readers guess ASCII.
    if header.starts_with(b"solid") {
        header[..5].copy_from_slice(b"part ");
    }
    data.extend_from_slice(&header);
    data.extend_from_slice(&(tris.len() as u32).to_le_bytes());

    for t in &tris {
        for c in facet_normal(t) {
            data.extend_from_slice(&c.to_le_bytes());
        }
        for v in t {
            for c in v {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        data.extend_from_slice(&0u16.to_le_bytes());
    }
    Ok(data)
}

/// ASCII STL text.
pub fn export_ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, ExportError> {
    let tris = triangles(mesh)?;
    let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::new();
    let fmt_err = |e: std::fmt::Error| ExportError::Serialize(e.to_string());

    writeln!(out, "solid {}", name).map_err(fmt_err)?;
    for t in &tris {
        let n = facet_normal(t);
        writeln!(out, "  facet normal {:e} {:e} {:e}", n[0], n[1], n[2]).map_err(fmt_err)?;
        writeln!(out, "    outer loop").map_err(fmt_err)?;
        for v in t {
            writeln!(out, "      vertex {:e} {:e} {:e}", v[0], v[1], v[2]).map_err(fmt_err)?;
        }
        writeln!(out, "    endloop").map_err(fmt_err)?;
        writeln!(out, "  endfacet").map_err(fmt_err)?;
    }
    writeln!(out, "endsolid {}", name).map_err(fmt_err)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_triangle() -> RenderMesh {
        RenderMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0; 9],
            indices: vec![0, 1, 2],
            face_ranges: vec![],
        }
    }

    #[test]
    fn test_binary_layout() {
        let data = export_binary_stl(&one_triangle(), "tri").unwrap();
        assert_eq!(data.len(), 84 + 50);
        assert_eq!(&data[..3], b"tri");
        assert_eq!(u32::from_le_bytes([data[80], data[81], data[82], data[83]]), 1);
        let nz = f32::from_le_bytes([data[92], data[93], data[94], data[95]]);
        assert_eq!(nz, 1.0);
    }

    #[test]
    fn test_binary_header_never_says_solid() {
        let data = export_binary_stl(&one_triangle(), "solid_part").unwrap();
        assert!(!data.starts_with(b"solid"));
    }

    #[test]
    fn test_ascii_layout() {
        let text = export_ascii_stl(&one_triangle(), "gf bin").unwrap();
        assert!(text.starts_with("solid gfbin\n"));
        assert!(text.trim_end().ends_with("endsolid gfbin"));
        assert_eq!(text.matches("facet normal").count(), 1);
        assert_eq!(text.matches("vertex").count(), 3);
    }

    #[test]
    fn test_bad_index_rejected() {
        let mut mesh = one_triangle();
        mesh.indices = vec![0, 1, 7];
        assert!(matches!(
            export_binary_stl(&mesh, "x"),
            Err(ExportError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mut mesh = one_triangle();
        mesh.indices.clear();
        assert!(export_ascii_stl(&mesh, "x").is_err());
    }
}
