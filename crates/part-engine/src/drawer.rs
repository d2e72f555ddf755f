//! Drawers with side rails and the chests that hold them.

use grid_ops::constants::*;
use grid_ops::constraints::{below, through};
use grid_ops::dims::units_for_drawer;
use grid_ops::layout::cell_centres;
use grid_ops::{ConfigErrors, NodeId, OpError, OperationPlan, Violations};
use grid_types::{EdgeSelector, Footprint, Plane, Segment, Sketch};
use serde::{Deserialize, Serialize};
use solid_kernel::TaperConvention;

use crate::shell::foot_profile;

/// Drawer interior sized to hold `l` x `w` cells of `h` height units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawerDims {
    pub length_u: u32,
    pub width_u: u32,
    pub height_u: u32,
}

impl DrawerDims {
    pub fn interior(&self) -> [f64; 3] {
        [
            self.length_u as f64 * PITCH,
            self.width_u as f64 * PITCH,
            self.height_u as f64 * HEIGHT_PITCH,
        ]
    }

    pub fn outer(&self) -> [f64; 3] {
        let [l, w, h] = self.interior();
        [l + 2.0 * DRAWER_WALL, w + 2.0 * DRAWER_WALL, h + DRAWER_FLOOR]
    }

    pub fn corner_radius(&self) -> f64 {
        let [ol, ow, _] = self.outer();
        2.0f64.min(ol / 4.0).min(ow / 4.0)
    }

    /// Outer length across both rails.
    pub fn rail_span(&self) -> f64 {
        self.outer()[0] + 2.0 * DRAWER_RAIL_HEIGHT - 2.0 * EPS
    }

    /// Z of the rail centreline above the drawer bottom.
    pub fn rail_centre(&self) -> f64 {
        self.outer()[2] / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawerSpec {
    pub length_u: u32,
    pub width_u: u32,
    pub height_u: u32,
    /// Cut a finger notch into the front wall.
    pub handle: bool,
}

impl Default for DrawerSpec {
    fn default() -> Self {
        Self {
            length_u: 1,
            width_u: 1,
            height_u: 2,
            handle: true,
        }
    }
}

impl DrawerSpec {
    pub fn new(length_u: u32, width_u: u32, height_u: u32) -> Self {
        Self {
            length_u,
            width_u,
            height_u,
            ..Self::default()
        }
    }

    pub fn dims(&self) -> DrawerDims {
        DrawerDims {
            length_u: self.length_u,
            width_u: self.width_u,
            height_u: self.height_u,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut v = Violations::new();
        v.check_units("length_u", self.length_u);
        v.check_units("width_u", self.width_u);
        v.check_units("height_u", self.height_u);
        v.into_result()
    }

    pub fn filename(&self) -> String {
        let mut f = format!(
            "gf_drawer_{}x{}x{}",
            self.length_u, self.width_u, self.height_u
        );
        if self.handle {
            f.push_str("_handle");
        }
        f
    }

    pub fn plan(&self) -> Result<OperationPlan, OpError> {
        let d = self.dims();
        let [ol, ow, oh] = d.outer();
        let [il, iw, _] = d.interior();
        let rad = d.corner_radius();
        let mut plan = OperationPlan::new();

        let mut body = plan.extrude(
            Sketch::xy(Footprint::rounded_rect(ol, ow, rad)),
            [0.0; 3],
            oh,
            "drawer",
        );
        let cavity = plan.extrude(
            Sketch::xy(Footprint::rounded_rect(il, iw, (rad - DRAWER_WALL).max(0.0))),
            [0.0, 0.0, DRAWER_FLOOR],
            oh - DRAWER_FLOOR + EPS,
            "drawer cavity",
        );
        body = plan.cut(body, cavity, "drawer cavity");

        let rails: Vec<NodeId> = [-1.0, 1.0]
            .iter()
            .map(|s| {
                plan.extrude(
                    Sketch::xy(Footprint::rect(DRAWER_RAIL_HEIGHT, ow - 4.0))
                        .at([s * (ol / 2.0 + DRAWER_RAIL_HEIGHT / 2.0 - EPS), 0.0]),
                    [0.0, 0.0, d.rail_centre() - DRAWER_RAIL_WIDTH / 2.0],
                    DRAWER_RAIL_WIDTH,
                    "rail",
                )
            })
            .collect();
        if let Some(r) = plan.union_all(&rails, "rails") {
            body = plan.union(body, r, "rails");
        }

        if self.handle {
            let notch = plan.extrude(
                Sketch::on(
                    Plane::XZ,
                    Footprint::rect(DRAWER_HANDLE_WIDTH, 2.0 * DRAWER_HANDLE_DEPTH),
                )
                .at([0.0, oh]),
                [0.0, below(-ow / 2.0), 0.0],
                through(DRAWER_WALL),
                "handle",
            );
            body = plan.cut(body, notch, "handle");
        }

        plan.set_output(body);
        Ok(plan)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChestSpec {
    pub length_u: u32,
    pub width_u: u32,
    pub drawers: u32,
    /// Height units of each drawer.
    pub drawer_height_u: u32,
    /// Grid feet under the carcass.
    pub base: bool,
}

impl Default for ChestSpec {
    fn default() -> Self {
        Self {
            length_u: 1,
            width_u: 1,
            drawers: 3,
            drawer_height_u: 2,
            base: false,
        }
    }
}

impl ChestSpec {
    pub fn new(length_u: u32, width_u: u32, drawers: u32, drawer_height_u: u32) -> Self {
        Self {
            length_u,
            width_u,
            drawers,
            drawer_height_u,
            ..Self::default()
        }
    }

    pub fn drawer(&self) -> DrawerDims {
        DrawerDims {
            length_u: self.length_u,
            width_u: self.width_u,
            height_u: self.drawer_height_u,
        }
    }

    /// Opening for one drawer: its outer box plus clearance.
    pub fn slot(&self) -> [f64; 3] {
        let [ol, ow, oh] = self.drawer().outer();
        [
            ol + 2.0 * DRAWER_RAIL_CLEAR,
            ow + DRAWER_RAIL_CLEAR,
            oh + 2.0 * DRAWER_RAIL_CLEAR,
        ]
    }

    /// Side wall: rail groove depth plus the solid outer skin.
    pub fn side_wall(&self) -> f64 {
        CHEST_RAIL_SPACE + CHEST_SIDE_ALLOWANCE
    }

    pub fn outer(&self) -> [f64; 3] {
        let [sl, sw, sh] = self.slot();
        let n = self.drawers as f64;
        [
            sl + 2.0 * self.side_wall(),
            sw + CHEST_DIVIDER,
            n * sh + (n + 1.0) * CHEST_DIVIDER,
        ]
    }

    fn carcass_z(&self) -> f64 {
        if self.base {
            FOOT_HEIGHT
        } else {
            0.0
        }
    }

    pub fn total_height(&self) -> f64 {
        self.carcass_z() + self.outer()[2]
    }

    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut v = Violations::new();
        v.check_units("length_u", self.length_u);
        v.check_units("width_u", self.width_u);
        v.check_units("drawer_height_u", self.drawer_height_u);
        v.require(
            (1..=10).contains(&self.drawers),
            "drawers",
            format!("{} is outside the valid range [1, 10]", self.drawers),
        );
        v.into_result()
    }

    pub fn filename(&self) -> String {
        let mut f = format!(
            "gf_chest_{}x{}_{}dx{}u",
            self.length_u, self.width_u, self.drawers, self.drawer_height_u
        );
        if self.base {
            f.push_str("_base");
        }
        f
    }

    pub fn plan(&self, convention: TaperConvention) -> Result<OperationPlan, OpError> {
        let [cl, cd, ch] = self.outer();
        let [sl, sd, sh] = self.slot();
        let z0 = self.carcass_z();
        let rad = 2.0f64.min(cl / 4.0).min(cd / 4.0);
        let mut plan = OperationPlan::new();

        let block = plan.extrude(
            Sketch::xy(Footprint::rounded_rect(cl, cd, rad)),
            [0.0, 0.0, z0],
            ch,
            "carcass",
        );
        let mut body = plan.chamfer(
            block,
            EdgeSelector::AtHeight { z: z0 },
            CHEST_CHAMFER.min(rad * 0.4),
            "carcass chamfer",
        );

        // Slots open at the front and stop at the back wall.
        let depth = sd + EPS;
        let y = -cd / 2.0 - EPS + depth / 2.0;
        let opening = plan.extrude(
            Sketch::xy(Footprint::rect(sl, depth)).at([0.0, y]),
            [0.0; 3],
            sh,
            "drawer slot",
        );
        let groove_h = DRAWER_RAIL_WIDTH + 2.0 * DRAWER_RAIL_CLEAR;
        let groove_z = self.drawer().rail_centre() - groove_h / 2.0;
        let grooves: Vec<NodeId> = [-1.0, 1.0]
            .iter()
            .map(|s| {
                plan.extrude(
                    Sketch::xy(Footprint::rect(CHEST_RAIL_SPACE + EPS, depth))
                        .at([s * (sl / 2.0 + (CHEST_RAIL_SPACE - EPS) / 2.0), y]),
                    [0.0, 0.0, groove_z],
                    groove_h,
                    "rail groove",
                )
            })
            .collect();
        let mut slot = opening;
        if let Some(g) = plan.union_all(&grooves, "rail grooves") {
            slot = plan.union(opening, g, "drawer slot");
        }
        let offsets = (0..self.drawers)
            .map(|i| [0.0, 0.0, z0 + CHEST_DIVIDER + i as f64 * (sh + CHEST_DIVIDER)])
            .collect();
        let slots = plan.pattern(slot, offsets, "drawer slots");
        body = plan.cut(body, slots, "drawer slots");

        if self.base {
            let [nx, ny] = units_for_drawer([cl, cd]);
            let foot = plan.profile(
                &Sketch::xy(Footprint::rounded_rect(FOOT_BOTTOM, FOOT_BOTTOM, FOOT_BOTTOM_RAD)),
                [0.0; 3],
                &foot_profile().then(Segment::straight(EPS)),
                convention,
                "chest foot",
            )?;
            let feet = plan.pattern(
                foot,
                cell_centres(nx.max(1), ny.max(1), PITCH).at_height(0.0),
                "chest feet",
            );
            body = plan.union(body, feet, "chest feet");
        }

        plan.set_output(body);
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_drawer_dims() {
        let d = DrawerSpec::new(2, 1, 3).dims();
        assert_eq!(d.interior(), [84.0, 42.0, 21.0]);
        let [ol, ow, oh] = d.outer();
        assert_relative_eq!(ol, 87.2, epsilon = 1e-12);
        assert_relative_eq!(ow, 45.2, epsilon = 1e-12);
        assert_relative_eq!(oh, 22.2, epsilon = 1e-12);
        assert_relative_eq!(d.corner_radius(), 2.0);
    }

    #[test]
    fn test_chest_slot_clears_drawer() {
        let c = ChestSpec::new(2, 1, 3, 2);
        let [ol, ow, oh] = c.drawer().outer();
        let [sl, sw, sh] = c.slot();
        assert!(sl > ol && sw > ow && sh > oh);
        // Rails reach into the grooves without breaking the outer skin.
        let rail_tip = c.drawer().rail_span() / 2.0;
        let groove_back = sl / 2.0 + CHEST_RAIL_SPACE;
        assert!(rail_tip < groove_back);
        assert_relative_eq!(c.outer()[0] / 2.0 - groove_back, CHEST_SIDE_ALLOWANCE, epsilon = 1e-9);
    }

    #[test]
    fn test_chest_height() {
        let c = ChestSpec::new(1, 1, 2, 1);
        let sh = 7.0 + DRAWER_FLOOR + 2.0 * DRAWER_RAIL_CLEAR;
        assert_relative_eq!(c.total_height(), 2.0 * sh + 3.0 * CHEST_DIVIDER, epsilon = 1e-9);
        let based = ChestSpec {
            base: true,
            ..c
        };
        assert_relative_eq!(
            based.total_height(),
            FOOT_HEIGHT + 2.0 * sh + 3.0 * CHEST_DIVIDER,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_filenames() {
        assert_eq!(DrawerSpec::new(2, 1, 3).filename(), "gf_drawer_2x1x3_handle");
        let mut d = DrawerSpec::new(2, 1, 3);
        d.handle = false;
        assert_eq!(d.filename(), "gf_drawer_2x1x3");
        let mut c = ChestSpec::new(2, 2, 4, 2);
        assert_eq!(c.filename(), "gf_chest_2x2_4dx2u");
        c.base = true;
        assert_eq!(c.filename(), "gf_chest_2x2_4dx2u_base");
    }

    #[test]
    fn test_chest_validation() {
        let err = ChestSpec::new(0, 1, 0, 1).validate().unwrap_err();
        assert!(err.mentions("length_u"));
        assert!(err.mentions("drawers"));
    }
}
