//! Detects how a kernel measures tapered extrusion length.
//!
//! Some kernels treat the requested length of a tapered extrusion as the
//! vertical rise, others as the distance along the slanted side wall. A
//! 4x4 square is extruded by 1 at 45 degrees and the resulting height is
//! compared to 1. The square is wide enough that neither reading collapses
//! the top face to a point.

use std::sync::OnceLock;

use grid_types::{Footprint, Sketch};
use solid_kernel::{Kernel, TaperConvention};
use tracing::{debug, info};

use crate::types::OpError;

const PROBE_SIDE: f64 = 4.0;
const PROBE_LENGTH: f64 = 1.0;
const PROBE_TAPER: f64 = 45.0;
const PROBE_TOL: f64 = 1e-3;

static TAPER_CONVENTION: OnceLock<TaperConvention> = OnceLock::new();

/// Run the probe against `kernel` without touching process state.
pub fn probe_taper_convention(kernel: &mut dyn Kernel) -> Result<TaperConvention, OpError> {
    let sketch = Sketch::xy(Footprint::rect(PROBE_SIDE, PROBE_SIDE));
    let probe = kernel.extrude(&sketch, [0.0; 3], PROBE_LENGTH, PROBE_TAPER)?;
    let height = kernel.bounding_box(&probe)?.size()[2];
    debug!(height, "taper probe");
    Ok(if (height - PROBE_LENGTH).abs() < PROBE_TOL {
        TaperConvention::Vertical
    } else {
        TaperConvention::AlongTaper
    })
}

/// Probe once per process; later calls return the first result.
pub fn init_taper_convention(kernel: &mut dyn Kernel) -> Result<TaperConvention, OpError> {
    if let Some(c) = TAPER_CONVENTION.get() {
        return Ok(*c);
    }
    let detected = probe_taper_convention(kernel)?;
    let c = *TAPER_CONVENTION.get_or_init(|| detected);
    info!(convention = ?c, "taper convention initialised");
    Ok(c)
}

/// The process-wide convention, if it has been initialised.
pub fn taper_convention() -> Option<TaperConvention> {
    TAPER_CONVENTION.get().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solid_kernel::MockKernel;

    #[test]
    fn test_probe_detects_vertical() {
        let mut k = MockKernel::new();
        assert_eq!(
            probe_taper_convention(&mut k).unwrap(),
            TaperConvention::Vertical
        );
    }

    #[test]
    fn test_probe_detects_along_taper() {
        let mut k = MockKernel::with_convention(TaperConvention::AlongTaper);
        assert_eq!(
            probe_taper_convention(&mut k).unwrap(),
            TaperConvention::AlongTaper
        );
    }

    #[test]
    fn test_probe_propagates_kernel_failure() {
        let mut k = MockKernel::new();
        k.fail_operation("extrude");
        assert!(probe_taper_convention(&mut k).is_err());
    }
}
