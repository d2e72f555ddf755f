use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use grid_ops::{execute_plan, init_taper_convention, taper_convention, OpError, OperationPlan};
use solid_kernel::{Kernel, TaperConvention};
use tracing::{debug, info, instrument};

use crate::component::ComponentSpec;
use crate::types::{EngineError, RenderOptions, Rendered};

/// Renders component specs into solids.
///
/// Plans are memoised by a hash of the normalised spec and the taper
/// convention, so re-rendering an unchanged spec skips planning.
#[derive(Debug, Default)]
pub struct Renderer {
    pub options: RenderOptions,
    /// Fixed convention; otherwise the process-wide probe result is used.
    convention: Option<TaperConvention>,
    cache: HashMap<u64, OperationPlan>,
    hits: usize,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Renderer that never probes the kernel.
    pub fn with_convention(options: RenderOptions, convention: TaperConvention) -> Self {
        Self {
            options,
            convention: Some(convention),
            ..Self::default()
        }
    }

    pub fn cache_hits(&self) -> usize {
        self.hits
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.hits = 0;
    }

    fn convention(&self, kernel: &mut dyn Kernel) -> Result<TaperConvention, EngineError> {
        if let Some(c) = self.convention.or_else(taper_convention) {
            return Ok(c);
        }
        init_taper_convention(kernel).map_err(|e| EngineError::geometry("calibration", e))
    }

    /// Plan for a normalised, validated spec, from the cache when possible.
    pub fn plan(
        &mut self,
        spec: &ComponentSpec,
        convention: TaperConvention,
    ) -> Result<OperationPlan, EngineError> {
        let key = cache_key(spec, convention)?;
        if let Some(plan) = self.cache.get(&key) {
            self.hits += 1;
            debug!(kind = spec.kind(), "plan cache hit");
            return Ok(plan.clone());
        }
        let plan = spec.plan(convention)?;
        self.cache.insert(key, plan.clone());
        Ok(plan)
    }

    /// Normalise, validate, plan and execute one part.
    ///
    /// Configuration errors are raised before any kernel call.
    #[instrument(skip(self, kernel, spec), fields(kind = spec.kind()))]
    pub fn render(
        &mut self,
        kernel: &mut dyn Kernel,
        spec: &ComponentSpec,
    ) -> Result<Rendered, EngineError> {
        let spec = spec.normalized();
        spec.validate()?;
        let convention = self.convention(kernel)?;
        let plan = self.plan(&spec, convention)?;

        let kind = spec.kind();
        let exec = execute_plan(kernel, &plan, self.options.strict_cosmetics)
            .map_err(|e| EngineError::geometry(kind, e))?;
        let bbox = kernel
            .bounding_box(&exec.solid)
            .map_err(|e| EngineError::geometry(kind, OpError::from(e)))?;
        let filename = spec.filename();
        info!(
            %filename,
            nodes = plan.len(),
            skipped = exec.skipped.len(),
            "rendered"
        );
        Ok(Rendered {
            solid: exec.solid,
            filename,
            bbox,
            skipped: exec.skipped,
            warnings: exec.warnings,
        })
    }

    /// Render every spec; one failure does not stop the rest.
    pub fn render_all(
        &mut self,
        kernel: &mut dyn Kernel,
        specs: &[ComponentSpec],
    ) -> Vec<Result<Rendered, EngineError>> {
        specs.iter().map(|s| self.render(kernel, s)).collect()
    }
}

/// Render with default options and no plan reuse.
pub fn render(kernel: &mut dyn Kernel, spec: &ComponentSpec) -> Result<Rendered, EngineError> {
    Renderer::default().render(kernel, spec)
}

fn cache_key(spec: &ComponentSpec, convention: TaperConvention) -> Result<u64, EngineError> {
    let json = serde_json::to_string(spec).map_err(|e| EngineError::Override {
        key: spec.kind().to_string(),
        reason: e.to_string(),
    })?;
    let mut h = DefaultHasher::new();
    json.hash(&mut h);
    convention.hash(&mut h);
    Ok(h.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_tracks_spec_and_convention() {
        let a = ComponentSpec::bin(2, 2, 3);
        let b = ComponentSpec::bin(2, 2, 4);
        let k = cache_key(&a, TaperConvention::Vertical).unwrap();
        assert_eq!(k, cache_key(&a.clone(), TaperConvention::Vertical).unwrap());
        assert_ne!(k, cache_key(&b, TaperConvention::Vertical).unwrap());
        assert_ne!(k, cache_key(&a, TaperConvention::AlongTaper).unwrap());
    }
}
