//! Hole tools: magnet recesses, screw holes and their options.
//!
//! A tool is built in a local frame with its open end on z = 0 and the hole
//! running up +Z. Callers place it and mirror it as needed. Optional parts
//! are always combined in the same order, so any subset composes the same
//! way: base, minus ribs, plus flare, plus bolt, minus bridge.

use std::f64::consts::PI;

use grid_types::{Axis, Footprint, Profile, Segment, Sketch, Transform};
use serde::{Deserialize, Serialize};
use solid_kernel::TaperConvention;

use crate::constants::*;
use crate::plan::{NodeId, OperationPlan};
use crate::types::OpError;

/// Conical widening at the open end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flare {
    /// Radius added at the opening.
    pub extra_radius: f64,
    /// Side angle from the hole axis.
    pub taper_deg: f64,
}

impl Flare {
    /// 45 degree entry chamfer.
    pub fn chamfer() -> Self {
        Self {
            extra_radius: FLARE_EXTRA_RAD,
            taper_deg: 45.0,
        }
    }

    /// Countersink for a flat head screw.
    pub fn countersink(hole_diam: f64) -> Self {
        Self {
            extra_radius: ((COUNTERSINK_DIAM - hole_diam) / 2.0).max(0.0),
            taper_deg: COUNTERSINK_ANGLE / 2.0,
        }
    }

    fn rise(&self) -> f64 {
        self.extra_radius / self.taper_deg.to_radians().tan()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bolt {
    pub diameter: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    pub diameter: f64,
    pub depth: f64,
    /// Crush ribs around the wall; 0 for a plain bore.
    pub ribs: u32,
    pub flare: Option<Flare>,
    /// Leave a thin printable layer at the closed end.
    pub bridge: bool,
    pub bolt: Option<Bolt>,
}

impl HoleSpec {
    pub fn magnet() -> Self {
        Self {
            diameter: HOLE_DIAM,
            depth: HOLE_DEPTH,
            ribs: 0,
            flare: None,
            bridge: false,
            bolt: None,
        }
    }

    /// Tighter press-fit magnet recess.
    pub fn refined() -> Self {
        Self {
            diameter: REFINED_HOLE_DIAM,
            depth: REFINED_HOLE_DEPTH,
            ..Self::magnet()
        }
    }

    pub fn screw(depth: f64) -> Self {
        Self {
            diameter: BOLT_DIAM,
            depth,
            ..Self::magnet()
        }
    }

    pub fn with_ribs(mut self, ribs: u32) -> Self {
        self.ribs = ribs;
        self
    }

    pub fn with_flare(mut self, flare: Flare) -> Self {
        self.flare = Some(flare);
        self
    }

    pub fn with_bridge(mut self) -> Self {
        self.bridge = true;
        self
    }

    pub fn with_bolt(mut self) -> Self {
        self.bolt = Some(Bolt {
            diameter: BOLT_DIAM,
            depth: BOLT_DEPTH,
        });
        self
    }

    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Deepest point the tool reaches.
    pub fn reach(&self) -> f64 {
        self.bolt.map_or(self.depth, |b| b.depth.max(self.depth))
    }
}

/// Add a hole tool to `plan` and return its node.
pub fn hole_tool(
    plan: &mut OperationPlan,
    spec: &HoleSpec,
    convention: TaperConvention,
    label: &str,
) -> Result<NodeId, OpError> {
    if !(spec.diameter > 0.0 && spec.depth > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!(
                "{}: hole needs positive diameter and depth, got {} x {}",
                label, spec.diameter, spec.depth
            ),
        });
    }
    let r = spec.radius();
    let mut tool = plan.extrude(
        Sketch::xy(Footprint::circle(r)),
        [0.0, 0.0, -EPS],
        spec.depth + EPS,
        format!("{} bore", label),
    );

    if spec.ribs > 0 {
        let notches = rib_notches(plan, r, spec.depth, spec.ribs, label);
        if let Some(n) = notches {
            tool = plan.cut(tool, n, format!("{} ribs", label));
        }
    }

    if let Some(flare) = spec.flare.filter(|f| f.extra_radius > 0.0) {
        let cone = plan.profile(
            &Sketch::xy(Footprint::circle(r + flare.extra_radius)),
            [0.0, 0.0, -EPS],
            &Profile::new(vec![Segment::tapered(flare.rise(), flare.taper_deg)]),
            convention,
            &format!("{} flare", label),
        )?;
        tool = plan.union(tool, cone, format!("{} flare", label));
    }

    if let Some(bolt) = spec.bolt {
        let b = plan.extrude(
            Sketch::xy(Footprint::circle(bolt.diameter / 2.0)),
            [0.0, 0.0, -EPS],
            bolt.depth + EPS,
            format!("{} bolt", label),
        );
        tool = plan.union(tool, b, format!("{} bolt", label));
    }

    if spec.bridge {
        let disc = plan.extrude(
            Sketch::xy(Footprint::circle(r + EPS)),
            [0.0, 0.0, spec.depth - BRIDGE_THICKNESS],
            BRIDGE_THICKNESS + EPS,
            format!("{} bridge", label),
        );
        tool = plan.cut(tool, disc, format!("{} bridge", label));
    }
    Ok(tool)
}

/// Rib notches spaced evenly around a bore of radius `r`.
fn rib_notches(
    plan: &mut OperationPlan,
    r: f64,
    depth: f64,
    ribs: u32,
    label: &str,
) -> Option<NodeId> {
    let slot = 2.0 * PI * r / ribs as f64;
    let radial = RIB_DEPTH + EPS;
    let notch = plan.extrude(
        Sketch::xy(Footprint::rect(radial, slot * RIB_NOTCH_SHARE)).at([r - RIB_DEPTH + radial / 2.0, 0.0]),
        [0.0, 0.0, -2.0 * EPS],
        depth + 3.0 * EPS,
        format!("{} rib notch", label),
    );
    let copies: Vec<NodeId> = (0..ribs)
        .map(|k| {
            plan.transform(
                notch,
                Transform::Rotate {
                    origin: [0.0; 3],
                    axis: Axis::Z,
                    degrees: 360.0 * k as f64 / ribs as f64,
                },
                format!("{} rib {}", label, k),
            )
        })
        .collect();
    plan.union_all(&copies, &format!("{} rib notches", label))
}

/// Unsupported-hole bridging slabs over a magnet recess, leaving a
/// bolt-wide slot across the middle.
pub fn bridge_slabs(
    plan: &mut OperationPlan,
    spec: &HoleSpec,
    label: &str,
) -> Option<NodeId> {
    let bolt = spec.bolt.map_or(BOLT_DIAM, |b| b.diameter);
    let w = (spec.diameter - bolt) / 2.0;
    if w <= 0.0 {
        return None;
    }
    let z = spec.depth - HOLE_SLICE;
    let slabs: Vec<NodeId> = [-1.0, 1.0]
        .iter()
        .map(|s| {
            plan.extrude(
                Sketch::xy(Footprint::rect(w, spec.diameter)).at([s * (bolt + w) / 2.0, 0.0]),
                [0.0, 0.0, z],
                HOLE_SLICE + EPS,
                format!("{} slab", label),
            )
        })
        .collect();
    plan.union_all(&slabs, &format!("{} slabs", label))
}
