//! Oracle unit checks on hand-built meshes and boxes.

use grid_types::BoundingBox;
use solid_kernel::RenderMesh;
use test_harness::assertions::assert_verdicts;
use test_harness::oracle::*;

// ── Helper Functions ─────────────────────────────────────────────────────

/// Unit cube with shared vertices, outward winding.
fn cube() -> RenderMesh {
    let vertices = vec![
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
    ];
    let quads: [[u32; 4]; 6] = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [3, 0, 4, 7],
        [1, 2, 6, 5],
    ];
    let mut indices = Vec::new();
    for q in quads {
        indices.extend_from_slice(&[q[0], q[1], q[2], q[0], q[2], q[3]]);
    }
    RenderMesh {
        normals: vec![0.0; vertices.len()],
        vertices,
        indices,
        face_ranges: vec![],
    }
}

// ── Mesh Oracles ─────────────────────────────────────────────────────────

#[test]
fn test_cube_passes_all_mesh_checks() {
    let verdicts = run_all_mesh_checks(&cube());
    assert_eq!(verdicts.len(), 3);
    assert_verdicts(&verdicts, "cube").unwrap();
}

#[test]
fn test_open_mesh_is_not_watertight() {
    let mut m = cube();
    m.indices.truncate(m.indices.len() - 6);
    let v = check_watertight_mesh(&m);
    assert!(!v.passed);
    assert_eq!(v.value, Some(4.0));
}

#[test]
fn test_degenerate_triangle_detected() {
    let mut m = cube();
    m.indices.extend_from_slice(&[0, 1, 1]);
    assert!(!check_no_degenerate_triangles(&m).passed);
}

#[test]
fn test_out_of_range_index_detected() {
    let mut m = cube();
    m.indices.extend_from_slice(&[0, 1, 99]);
    let v = check_valid_indices(&m);
    assert!(!v.passed);
    assert!(v.detail.contains("99"));
    assert!(!check_watertight_mesh(&m).passed);
}

// ── Part Oracles ─────────────────────────────────────────────────────────

#[test]
fn test_envelope_and_grid_fit() {
    let bb = BoundingBox::new([-41.75, -20.75, 0.0], [41.75, 20.75, 24.8]);
    assert!(check_envelope(&bb, [83.5, 41.5, 24.8], 1e-9).passed);
    assert!(!check_envelope(&bb, [83.5, 41.5, 31.8], 1e-9).passed);
    assert!(check_fits_grid(&bb, 2, 1).passed);
    assert!(!check_fits_grid(&bb, 1, 1).passed);
    assert!(check_on_plate(&bb, 1e-9).passed);
}

#[test]
fn test_failures_are_collected() {
    let bb = BoundingBox::new([0.0, 0.0, 1.0], [50.0, 50.0, 2.0]);
    let verdicts = vec![
        check_fits_grid(&bb, 1, 1),
        check_on_plate(&bb, 1e-9),
        check_envelope(&bb, [50.0, 50.0, 1.0], 1e-9),
    ];
    let err = assert_verdicts(&verdicts, "plate").unwrap_err().to_string();
    assert!(err.contains("fits_grid"));
    assert!(err.contains("on_plate"));
    assert!(!err.contains("envelope"));
}
