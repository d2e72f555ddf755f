//! Helper functions: error type, tracing setup, mesh math.

use part_engine::EngineError;
use part_format::ExportError;
use solid_kernel::{KernelError, RenderMesh};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("part not found: {name}")]
    PartNotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

// ── Tracing ─────────────────────────────────────────────────────────────────

/// Install a test-friendly subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to warnings from the part crates. Later calls
/// are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grid_ops=warn,part_engine=warn,part_format=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

// ── Mesh Math Utilities ─────────────────────────────────────────────────────

/// Axis-aligned bounds of the mesh vertices, or `None` for an empty mesh.
pub fn mesh_bounding_box(mesh: &RenderMesh) -> Option<([f32; 3], [f32; 3])> {
    if mesh.vertices.len() < 3 {
        return None;
    }
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for chunk in mesh.vertices.chunks_exact(3) {
        for i in 0..3 {
            min[i] = min[i].min(chunk[i]);
            max[i] = max[i].max(chunk[i]);
        }
    }
    Some((min, max))
}

/// Enclosed volume by the divergence theorem. Assumes a closed mesh.
pub fn mesh_volume(mesh: &RenderMesh) -> f64 {
    let verts = &mesh.vertices;
    let mut volume = 0.0f64;

    for tri in mesh.indices.chunks_exact(3) {
        let (i0, i1, i2) = (
            tri[0] as usize * 3,
            tri[1] as usize * 3,
            tri[2] as usize * 3,
        );
        if i0 + 2 >= verts.len() || i1 + 2 >= verts.len() || i2 + 2 >= verts.len() {
            continue;
        }

        let (x0, y0, z0) = (verts[i0] as f64, verts[i0 + 1] as f64, verts[i0 + 2] as f64);
        let (x1, y1, z1) = (verts[i1] as f64, verts[i1 + 1] as f64, verts[i1 + 2] as f64);
        let (x2, y2, z2) = (verts[i2] as f64, verts[i2 + 1] as f64, verts[i2 + 2] as f64);

        // Signed volume of the tetrahedron with the origin
        volume += x0 * (y1 * z2 - y2 * z1) + x1 * (y2 * z0 - y0 * z2) + x2 * (y0 * z1 - y1 * z0);
    }

    (volume / 6.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetra() -> RenderMesh {
        RenderMesh {
            vertices: vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0,
            ],
            normals: vec![0.0; 12],
            indices: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
            face_ranges: vec![],
        }
    }

    #[test]
    fn test_tetra_volume_and_bounds() {
        let m = tetra();
        assert!((mesh_volume(&m) - 1.0 / 6.0).abs() < 1e-9);
        let (min, max) = mesh_bounding_box(&m).unwrap();
        assert_eq!(min, [0.0; 3]);
        assert_eq!(max, [1.0; 3]);
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        let mut m = tetra();
        m.vertices.clear();
        assert!(mesh_bounding_box(&m).is_none());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
