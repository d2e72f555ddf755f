//! Lids that sit on a bin's stacking lip.

use grid_ops::constants::*;
use grid_ops::constraints::below;
use grid_ops::dims::{outer_radius, outer_span};
use grid_ops::layout::cell_centres;
use grid_ops::{ConfigErrors, NodeId, OpError, OperationPlan, Violations};
use grid_types::{Footprint, Plane, Profile, Segment, Sketch};
use serde::{Deserialize, Serialize};
use solid_kernel::TaperConvention;

use crate::baseplate::receptacle_tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LidStyle {
    #[default]
    Flat,
    /// Receptacles on top so bins stack on the lid.
    Stackable,
}

impl LidStyle {
    fn tag(self) -> &'static str {
        match self {
            LidStyle::Flat => "flat",
            LidStyle::Stackable => "stackable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LidSpec {
    pub length_u: u32,
    pub width_u: u32,
    pub style: LidStyle,
    /// Plate thickness above the lip recess.
    pub thickness: f64,
    pub finger_slot: bool,
    pub finger_width: f64,
    pub finger_depth: f64,
    pub label: bool,
    pub label_width: f64,
    pub label_height: f64,
    pub label_depth: f64,
}

impl Default for LidSpec {
    fn default() -> Self {
        Self {
            length_u: 1,
            width_u: 1,
            style: LidStyle::Flat,
            thickness: LID_THICKNESS,
            finger_slot: false,
            finger_width: LID_FINGER_WIDTH,
            finger_depth: LID_FINGER_DEPTH,
            label: false,
            label_width: LID_LABEL_WIDTH,
            label_height: LID_LABEL_HEIGHT,
            label_depth: LID_LABEL_DEPTH,
        }
    }
}

impl LidSpec {
    pub fn new(length_u: u32, width_u: u32) -> Self {
        Self {
            length_u,
            width_u,
            ..Self::default()
        }
    }

    pub fn stackable(mut self) -> Self {
        self.style = LidStyle::Stackable;
        self
    }

    pub fn outer(&self) -> [f64; 2] {
        [outer_span(self.length_u), outer_span(self.width_u)]
    }

    /// Height of the plate including the lip recess.
    pub fn block_height(&self) -> f64 {
        LIP_HEIGHT + self.thickness
    }

    pub fn total_height(&self) -> f64 {
        match self.style {
            LidStyle::Flat => self.block_height(),
            LidStyle::Stackable => self.block_height() + BASE_HEIGHT,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut v = Violations::new();
        v.check_units("length_u", self.length_u);
        v.check_units("width_u", self.width_u);
        v.check_positive("thickness", self.thickness);
        let [ol, ow] = self.outer();
        if self.finger_slot {
            v.check_range("finger_width", self.finger_width, EPS, ol - 2.0 * CORNER_RAD);
            v.check_range("finger_depth", self.finger_depth, EPS, LIP_HEIGHT);
        }
        if self.label {
            v.exclusive(
                ("label", self.label),
                ("stackable", self.style == LidStyle::Stackable),
            );
            v.check_range("label_width", self.label_width, EPS, ol - 2.0 * CORNER_RAD);
            v.check_range("label_height", self.label_height, EPS, ow - 2.0 * CORNER_RAD);
            v.check_range("label_depth", self.label_depth, EPS, self.thickness);
        }
        v.into_result()
    }

    pub fn filename(&self) -> String {
        let mut f = format!(
            "gf_lid_{}x{}_{}",
            self.length_u,
            self.width_u,
            self.style.tag()
        );
        if self.finger_slot {
            f.push_str("_finger");
        }
        if self.label {
            f.push_str("_label");
        }
        f
    }

    pub fn plan(&self, convention: TaperConvention) -> Result<OperationPlan, OpError> {
        let [ol, ow] = self.outer();
        let mut plan = OperationPlan::new();
        let mut body = plan.extrude(
            Sketch::xy(Footprint::rounded_rect(ol, ow, outer_radius())),
            [0.0; 3],
            self.total_height(),
            "lid",
        );

        let recess = lip_recess(&mut plan, ol, ow, convention)?;
        body = plan.cut(body, recess, "lip recess");

        if self.style == LidStyle::Stackable {
            let tool = receptacle_tool(&mut plan, false, self.block_height(), convention)?;
            let cells = cell_centres(self.length_u, self.width_u, PITCH);
            let all = plan.pattern(tool, cells.at_height(0.0), "receptacles");
            body = plan.cut(body, all, "receptacles");
        }

        if self.finger_slot {
            let slot = plan.extrude(
                Sketch::on(
                    Plane::XZ,
                    Footprint::Slot {
                        length: self.finger_width,
                        width: 2.0 * self.finger_depth,
                    },
                ),
                [0.0, below(-ow / 2.0), 0.0],
                ow / 2.0,
                "finger slot",
            );
            body = plan.cut(body, slot, "finger slot");
        }

        if self.label {
            let top = self.total_height();
            let recess = plan.extrude(
                Sketch::xy(Footprint::rect(self.label_width, self.label_height)),
                [0.0, 0.0, top - self.label_depth],
                self.label_depth + EPS,
                "label recess",
            );
            body = plan.cut(body, recess, "label recess");
        }

        plan.set_output(body);
        Ok(plan)
    }
}

/// Underside recess matching a bin's stacking lip.
fn lip_recess(
    plan: &mut OperationPlan,
    ol: f64,
    ow: f64,
    convention: TaperConvention,
) -> Result<NodeId, OpError> {
    let fp = Footprint::rounded_rect(ol - 2.0 * WALL, ow - 2.0 * WALL, outer_radius() - WALL);
    plan.profile(
        &Sketch::xy(fp),
        [0.0, 0.0, below(0.0)],
        &lip_recess_profile(),
        convention,
        "lip recess",
    )
}

fn lip_recess_profile() -> Profile {
    Profile::new(vec![
        Segment::straight(EPS),
        Segment::tapered(UNDER_HEIGHT, 45.0),
        Segment::straight(TOPSIDE_HEIGHT),
        Segment::tapered(BASE_BOT_CHAMFER, -45.0),
        Segment::straight(STRAIGHT_HEIGHT),
        Segment::tapered(LIP_HEIGHT - UNDER_HEIGHT - TOPSIDE_HEIGHT - BASE_BOT_CHAMFER - STRAIGHT_HEIGHT, -45.0),
    ])
}
