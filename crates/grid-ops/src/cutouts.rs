//! Item pockets: round or rounded-rectangle cutouts in a packed array.

use grid_types::{Footprint, Profile, Segment, Sketch};
use serde::{Deserialize, Serialize};
use solid_kernel::TaperConvention;

use crate::constants::*;
use crate::constraints::clamp_to_limits;
use crate::layout::{PackStyle, PackedLayout};
use crate::plan::{NodeId, OperationPlan, Role};
use crate::types::OpError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum CutoutShape {
    Round { diameter: f64 },
    Rect { width: f64, depth: f64 },
}

impl CutoutShape {
    /// Hex packing suits round items, square packing suits rectangles.
    pub fn default_pack(&self) -> PackStyle {
        match self {
            CutoutShape::Round { .. } => PackStyle::Hex,
            CutoutShape::Rect { .. } => PackStyle::Square,
        }
    }
}

/// One pocket: nominal item size plus clearance and a top chamfer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cutout {
    pub shape: CutoutShape,
    pub height: f64,
    pub clearance: f64,
    pub chamfer: f64,
}

impl Cutout {
    pub fn new(shape: CutoutShape, height: f64) -> Self {
        Self {
            shape,
            height,
            clearance: ITEM_CLEARANCE,
            chamfer: ITEM_CHAMFER,
        }
    }

    /// Pocket outline including clearance.
    pub fn footprint(&self) -> Footprint {
        match self.shape {
            CutoutShape::Round { diameter } => {
                Footprint::circle(diameter / 2.0 + self.clearance)
            }
            CutoutShape::Rect { width, depth } => {
                let (w, d) = (width + 2.0 * self.clearance, depth + 2.0 * self.clearance);
                Footprint::rounded_rect(w, d, self.corner_radius())
            }
        }
    }

    pub fn extent(&self) -> [f64; 2] {
        self.footprint().extent()
    }

    pub fn corner_radius(&self) -> f64 {
        match self.shape {
            CutoutShape::Round { diameter } => diameter / 2.0 + self.clearance,
            CutoutShape::Rect { width, depth } => {
                let (w, d) = (width + 2.0 * self.clearance, depth + 2.0 * self.clearance);
                ITEM_CORNER_RAD.min(w / 2.0 - EPS).min(d / 2.0 - EPS).max(0.0)
            }
        }
    }

    /// Top chamfer after clamping to the pocket size; `None` disables it.
    pub fn effective_chamfer(&self) -> Option<f64> {
        let limits = match self.shape {
            CutoutShape::Round { .. } => {
                let r = self.extent()[0] / 2.0;
                [0.4 * r, 0.4 * r, 0.4 * self.height]
            }
            CutoutShape::Rect { .. } => {
                let [w, d] = self.extent();
                [w / 4.0, d / 4.0, 0.4 * self.height]
            }
        };
        clamp_to_limits(self.chamfer, &limits)
    }
}

/// Pocket tool with its open top at `z = height`, bottom at z = 0.
///
/// The chamfer is a widening taper at the opening, marked cosmetic.
pub fn cutout_tool(
    plan: &mut OperationPlan,
    cutout: &Cutout,
    convention: TaperConvention,
    label: &str,
) -> Result<NodeId, OpError> {
    if !(cutout.height > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("{}: pocket height must be positive", label),
        });
    }
    let fp = cutout.footprint();
    let body = plan.extrude(
        Sketch::xy(fp.clone()),
        [0.0; 3],
        cutout.height + EPS,
        format!("{} pocket", label),
    );
    let Some(ch) = cutout.effective_chamfer() else {
        return Ok(body);
    };
    let flare = plan.profile(
        &Sketch::xy(fp),
        [0.0, 0.0, cutout.height - ch],
        &Profile::new(vec![Segment::tapered(ch + EPS, -45.0)]),
        convention,
        &format!("{} chamfer", label),
    )?;
    plan.set_role(flare, Role::Cosmetic);
    let merged = plan.union(body, flare, format!("{} chamfer", label));
    plan.set_role(merged, Role::Cosmetic);
    Ok(merged)
}

/// One pocket per layout point, bottoms at `floor_z`.
pub fn place_cutouts(
    plan: &mut OperationPlan,
    tool: NodeId,
    layout: &PackedLayout,
    floor_z: f64,
    label: &str,
) -> NodeId {
    plan.pattern(tool, layout.points.at_height(floor_z), label)
}
