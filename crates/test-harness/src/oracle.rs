//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so a scenario can collect every failure in one pass.

use std::collections::HashMap;

use grid_ops::constants::PITCH;
use grid_types::BoundingBox;
use solid_kernel::RenderMesh;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

// ── Part Oracles ────────────────────────────────────────────────────────────

/// Check the bounding box size against `expected` on every axis.
pub fn check_envelope(bbox: &BoundingBox, expected: [f64; 3], tol: f64) -> OracleVerdict {
    let size = bbox.size();
    let off: Vec<String> = (0..3)
        .filter(|&i| (size[i] - expected[i]).abs() > tol)
        .map(|i| format!("axis {}: expected {:.3}, got {:.3}", i, expected[i], size[i]))
        .collect();
    if off.is_empty() {
        OracleVerdict::pass(
            "envelope",
            format!("{:.3} x {:.3} x {:.3}", size[0], size[1], size[2]),
        )
    } else {
        OracleVerdict::fail("envelope", off.join("; "))
    }
}

/// Check the footprint fits `length_u` × `width_u` grid cells.
pub fn check_fits_grid(bbox: &BoundingBox, length_u: u32, width_u: u32) -> OracleVerdict {
    let size = bbox.size();
    let limit = [length_u as f64 * PITCH, width_u as f64 * PITCH];
    if size[0] <= limit[0] + 1e-6 && size[1] <= limit[1] + 1e-6 {
        OracleVerdict::pass(
            "fits_grid",
            format!("{:.2} x {:.2} within {}x{} cells", size[0], size[1], length_u, width_u),
        )
    } else {
        OracleVerdict::fail(
            "fits_grid",
            format!(
                "{:.2} x {:.2} exceeds {:.1} x {:.1}",
                size[0], size[1], limit[0], limit[1]
            ),
        )
    }
}

/// Check the part sits on the build plate.
pub fn check_on_plate(bbox: &BoundingBox, tol: f64) -> OracleVerdict {
    if bbox.min[2].abs() <= tol {
        OracleVerdict::pass("on_plate", "bottom at z=0".to_string()).with_value(bbox.min[2])
    } else {
        OracleVerdict::fail("on_plate", format!("bottom at z={:.4}", bbox.min[2]))
            .with_value(bbox.min[2])
    }
}

// ── Mesh Oracles ────────────────────────────────────────────────────────────

/// Check every edge is shared by exactly two triangles.
///
/// Vertices are matched by quantised position, so per-face vertex copies
/// still pair up.
pub fn check_watertight_mesh(mesh: &RenderMesh) -> OracleVerdict {
    fn quantize(v: f32) -> i64 {
        (v as f64 * 10000.0).round() as i64
    }

    type Key = (i64, i64, i64);

    let key = |idx: u32| -> Option<Key> {
        let i = idx as usize * 3;
        let v = mesh.vertices.get(i..i + 3)?;
        Some((quantize(v[0]), quantize(v[1]), quantize(v[2])))
    };

    let mut edge_counts: HashMap<(Key, Key), usize> = HashMap::new();
    for tri in mesh.indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (key(tri[0]), key(tri[1]), key(tri[2])) else {
            return OracleVerdict::fail("watertight_mesh", "index out of range".to_string());
        };
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let edge = if p <= q { (p, q) } else { (q, p) };
            *edge_counts.entry(edge).or_insert(0) += 1;
        }
    }

    let unpaired = edge_counts.values().filter(|&&c| c != 2).count();
    if unpaired == 0 && !edge_counts.is_empty() {
        OracleVerdict::pass(
            "watertight_mesh",
            format!("all {} edges paired", edge_counts.len()),
        )
    } else {
        OracleVerdict::fail(
            "watertight_mesh",
            format!("{} unpaired edges out of {} total", unpaired, edge_counts.len()),
        )
        .with_value(unpaired as f64)
    }
}

/// Check no triangle has (near) zero area.
pub fn check_no_degenerate_triangles(mesh: &RenderMesh) -> OracleVerdict {
    let v = |i: u32| {
        let i = i as usize * 3;
        mesh.vertices
            .get(i..i + 3)
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
    };
    let mut degenerate = 0usize;
    for tri in mesh.indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (v(tri[0]), v(tri[1]), v(tri[2])) else {
            degenerate += 1;
            continue;
        };
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        let area = 0.5 * (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if area < 1e-12 {
            degenerate += 1;
        }
    }
    if degenerate == 0 {
        OracleVerdict::pass(
            "no_degenerate_triangles",
            format!("{} triangles", mesh.triangle_count()),
        )
    } else {
        OracleVerdict::fail(
            "no_degenerate_triangles",
            format!("{} degenerate triangles", degenerate),
        )
        .with_value(degenerate as f64)
    }
}

/// Check the index buffer is whole triangles inside the vertex buffer.
pub fn check_valid_indices(mesh: &RenderMesh) -> OracleVerdict {
    let count = (mesh.vertices.len() / 3) as u32;
    if mesh.indices.len() % 3 != 0 {
        return OracleVerdict::fail(
            "valid_indices",
            format!("{} indices is not whole triangles", mesh.indices.len()),
        );
    }
    match mesh.indices.iter().find(|&&i| i >= count) {
        Some(bad) => OracleVerdict::fail(
            "valid_indices",
            format!("index {} out of range for {} vertices", bad, count),
        ),
        None => OracleVerdict::pass("valid_indices", format!("{} vertices", count)),
    }
}

// ── Composite ───────────────────────────────────────────────────────────────

/// Run every mesh oracle.
pub fn run_all_mesh_checks(mesh: &RenderMesh) -> Vec<OracleVerdict> {
    vec![
        check_valid_indices(mesh),
        check_watertight_mesh(mesh),
        check_no_degenerate_triangles(mesh),
    ]
}
