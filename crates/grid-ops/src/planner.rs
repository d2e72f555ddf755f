//! Profile-based extrusion planning.
//!
//! A profile is expanded into one extrusion per segment. Each segment starts
//! from the contour the previous one ended on, so the outline is carried as a
//! footprint rather than recomputed from accumulated numbers.

use grid_types::{Profile, Sketch};
use solid_kernel::TaperConvention;

use crate::types::OpError;

/// One planned extrusion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudeStep {
    pub sketch: Sketch,
    pub origin: [f64; 3],
    /// Length handed to the kernel, already corrected for its taper convention.
    pub length: f64,
    pub taper_deg: f64,
    /// Vertical rise the step must produce.
    pub rise: f64,
}

/// Length to request from a kernel so a segment rises exactly `rise`.
pub fn corrected_length(rise: f64, taper_deg: f64, convention: TaperConvention) -> f64 {
    match convention {
        TaperConvention::AlongTaper if taper_deg.abs() > 1e-12 => {
            rise / taper_deg.to_radians().cos()
        }
        _ => rise,
    }
}

/// Expand `profile` into extrusion steps starting at `origin`.
///
/// Fails if the profile is malformed or an intermediate contour collapses.
pub fn plan_profile(
    sketch: &Sketch,
    origin: [f64; 3],
    profile: &Profile,
    convention: TaperConvention,
) -> Result<Vec<ExtrudeStep>, OpError> {
    profile.validate()?;
    let (_, _, n) = sketch.plane.frame();
    let mut steps = Vec::with_capacity(profile.segments.len());
    let mut current = sketch.clone();
    let mut at = origin;

    for (i, seg) in profile.segments.iter().enumerate() {
        steps.push(ExtrudeStep {
            sketch: current.clone(),
            origin: at,
            length: corrected_length(seg.rise, seg.taper_deg, convention),
            taper_deg: seg.taper_deg,
            rise: seg.rise,
        });
        let next = current
            .footprint
            .offset(-seg.inset())
            .ok_or_else(|| OpError::ProfileAborted {
                label: format!("segment {}", i),
                reason: format!("contour collapses after inset {:.3}", seg.inset()),
            })?;
        current = current.with_footprint(next);
        at = [
            at[0] + seg.rise * n[0],
            at[1] + seg.rise * n[1],
            at[2] + seg.rise * n[2],
        ];
    }
    Ok(steps)
}
