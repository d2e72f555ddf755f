//! PartBench: fluent API for rendering and checking parts in tests.
//!
//! Parts are rendered through the real [`Renderer`] and kept under a name so
//! later steps can measure, tessellate or export them.

use std::collections::HashMap;

use grid_types::BoundingBox;
use part_engine::{ComponentSpec, RenderOptions, Rendered, Renderer};
use part_format::{export_ascii_stl, export_binary_stl, STL_TOLERANCE};
use serde_json::{Map, Value};
use solid_kernel::{KernelBundle, MockKernel, RenderMesh, TaperConvention, TruckKernel};
use tracing::debug;

use crate::assertions;
use crate::helpers::{init_tracing, HarnessError};
use crate::oracle::{self, OracleVerdict};

/// Renders named parts against one kernel.
pub struct PartBench<K: KernelBundle> {
    pub kernel: K,
    pub renderer: Renderer,
    parts: HashMap<String, Rendered>,
    history: Vec<(String, String)>,
}

impl PartBench<MockKernel> {
    /// Bench on the mock kernel with a fixed vertical taper convention.
    pub fn mock() -> Self {
        Self::with_kernel(
            MockKernel::new(),
            Renderer::with_convention(RenderOptions::default(), TaperConvention::Vertical),
        )
    }
}

impl PartBench<TruckKernel> {
    /// Bench on the B-rep kernel; the taper convention is probed.
    pub fn truck() -> Self {
        Self::with_kernel(TruckKernel::new(), Renderer::new(RenderOptions::default()))
    }
}

impl<K: KernelBundle> PartBench<K> {
    pub fn with_kernel(kernel: K, renderer: Renderer) -> Self {
        init_tracing();
        Self {
            kernel,
            renderer,
            parts: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Fail skipped cosmetic operations instead of reporting them.
    pub fn strict(mut self) -> Self {
        self.renderer.options.strict_cosmetics = true;
        self
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Render `spec` and keep it under `name`.
    pub fn render(
        &mut self,
        name: &str,
        spec: impl Into<ComponentSpec>,
    ) -> Result<&Rendered, HarnessError> {
        if self.parts.contains_key(name) {
            return Err(HarnessError::DuplicateName {
                name: name.to_string(),
            });
        }
        let spec = spec.into();
        let rendered = self.renderer.render(self.kernel.as_kernel(), &spec)?;
        debug!(name, filename = %rendered.filename, "bench part rendered");
        self.history
            .push((name.to_string(), rendered.filename.clone()));
        Ok(self.parts.entry(name.to_string()).or_insert(rendered))
    }

    /// Render `spec` with named overrides applied first.
    pub fn render_with(
        &mut self,
        name: &str,
        spec: impl Into<ComponentSpec>,
        overrides: &Map<String, Value>,
    ) -> Result<&Rendered, HarnessError> {
        let spec = spec.into().with_overrides(overrides)?;
        self.render(name, spec)
    }

    pub fn part(&self, name: &str) -> Result<&Rendered, HarnessError> {
        self.parts.get(name).ok_or_else(|| HarnessError::PartNotFound {
            name: name.to_string(),
        })
    }

    /// `(name, filename)` of every rendered part, oldest first.
    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    // ── Measurement ─────────────────────────────────────────────────────

    pub fn bbox(&self, name: &str) -> Result<BoundingBox, HarnessError> {
        Ok(self.part(name)?.bbox)
    }

    pub fn volume(&self, name: &str) -> Result<f64, HarnessError> {
        let solid = &self.part(name)?.solid;
        Ok(self.kernel.volume(solid)?)
    }

    pub fn tessellate(&mut self, name: &str) -> Result<RenderMesh, HarnessError> {
        let solid = self.part(name)?.solid.clone();
        Ok(self.kernel.tessellate(&solid, STL_TOLERANCE)?)
    }

    // ── Export ──────────────────────────────────────────────────────────

    pub fn binary_stl(&mut self, name: &str) -> Result<Vec<u8>, HarnessError> {
        let mesh = self.tessellate(name)?;
        let filename = self.part(name)?.filename.clone();
        Ok(export_binary_stl(&mesh, &filename)?)
    }

    pub fn ascii_stl(&mut self, name: &str) -> Result<String, HarnessError> {
        let mesh = self.tessellate(name)?;
        let filename = self.part(name)?.filename.clone();
        Ok(export_ascii_stl(&mesh, &filename)?)
    }

    // ── Checks ──────────────────────────────────────────────────────────

    pub fn assert_envelope(&self, name: &str, expected: [f64; 3], tol: f64) -> Result<(), HarnessError> {
        assertions::assert_envelope(&self.bbox(name)?, expected, tol, name)
    }

    /// Part-level and mesh-level oracles for one part.
    pub fn check(&mut self, name: &str) -> Result<Vec<OracleVerdict>, HarnessError> {
        let bbox = self.bbox(name)?;
        let mesh = self.tessellate(name)?;
        let mut verdicts = vec![oracle::check_on_plate(&bbox, 1e-6)];
        verdicts.extend(oracle::run_all_mesh_checks(&mesh));
        Ok(verdicts)
    }

    /// Run [`Self::check`] and fail on any failed verdict.
    pub fn assert_checks_pass(&mut self, name: &str) -> Result<(), HarnessError> {
        let verdicts = self.check(name)?;
        assertions::assert_verdicts(&verdicts, name)
    }
}
