//! Baseplates: the receptacle grid bins sit in, with optional slab features
//! underneath.

use std::fmt::Write as _;

use grid_ops::constants::*;
use grid_ops::constraints::{below, slab_depth, through, BottomFeature};
use grid_ops::dims::{drawer_fit, BaseplateDims};
use grid_ops::holes::{hole_tool, Flare, HoleSpec};
use grid_ops::layout::{cell_centres, hole_quads};
use grid_ops::{ConfigErrors, NodeId, OpError, OperationPlan, Violations};
use grid_types::{Footprint, Plane, Profile, Segment, Sketch, Transform};
use serde::{Deserialize, Serialize};
use solid_kernel::TaperConvention;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseplateSpec {
    pub length_u: u32,
    pub width_u: u32,
    /// Requested slab depth below the receptacles.
    pub ext_depth: f64,
    /// Replace the bottom chamfer of each receptacle with a straight wall.
    pub straight_bottom: bool,
    pub magnet_holes: bool,
    pub refined_holes: bool,
    pub screw_holes: bool,
    /// Countersink the screw holes from below.
    pub countersink: bool,
    pub weighted: bool,
    pub skeleton: bool,
    pub corner_screws: bool,
    pub screw_together: bool,
    /// Connector screws per cell edge.
    pub n_screws: u32,
    /// Drawer interior to centre the grid in.
    pub fit_to_drawer: Option<[f64; 2]>,
}

impl Default for BaseplateSpec {
    fn default() -> Self {
        Self {
            length_u: 1,
            width_u: 1,
            ext_depth: 0.0,
            straight_bottom: false,
            magnet_holes: false,
            refined_holes: false,
            screw_holes: false,
            countersink: false,
            weighted: false,
            skeleton: false,
            corner_screws: false,
            screw_together: false,
            n_screws: 1,
            fit_to_drawer: None,
        }
    }
}

impl BaseplateSpec {
    pub fn new(length_u: u32, width_u: u32) -> Self {
        Self {
            length_u,
            width_u,
            ..Self::default()
        }
    }

    /// Pad the outline to fill a drawer of `width` x `depth`.
    pub fn fit_to_drawer(mut self, width: f64, depth: f64) -> Self {
        self.fit_to_drawer = Some([width, depth]);
        self
    }

    /// Skeleton relief already removes the weight pockets' material.
    pub fn normalized(&self) -> BaseplateSpec {
        let mut s = self.clone();
        if s.skeleton && s.weighted {
            warn!("skeleton baseplate ignores weighted");
            s.weighted = false;
        }
        s
    }

    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut v = Violations::new();
        v.check_units("length_u", self.length_u);
        v.check_units("width_u", self.width_u);
        v.require(
            self.ext_depth >= 0.0,
            "ext_depth",
            format!("{} must not be negative", self.ext_depth),
        );
        v.exclusive(("weighted", self.weighted), ("magnet_holes", self.magnet_holes));
        v.exclusive(("weighted", self.weighted), ("screw_holes", self.screw_holes));
        if self.screw_together {
            v.require(
                (1..=3).contains(&self.n_screws),
                "n_screws",
                format!("{} is outside the valid range [1, 3]", self.n_screws),
            );
        }
        if let Some(drawer) = self.fit_to_drawer {
            v.require(
                drawer_fit(self.length_u, self.width_u, drawer).is_some(),
                "fit_to_drawer",
                format!(
                    "{}x{} grid does not fit a {} x {} drawer",
                    self.length_u, self.width_u, drawer[0], drawer[1]
                ),
            );
        }
        v.into_result()
    }

    pub fn bottom_features(&self) -> Vec<BottomFeature> {
        let mut f = Vec::new();
        if self.magnet_holes {
            f.push(BottomFeature::Magnets {
                refined: self.refined_holes,
            });
        }
        if self.screw_holes {
            f.push(BottomFeature::Screws);
        }
        if self.weighted {
            f.push(BottomFeature::Weights);
        }
        if self.skeleton {
            f.push(BottomFeature::Skeleton {
                magnets: self.magnet_holes,
                refined: self.refined_holes,
            });
        }
        if self.corner_screws {
            f.push(BottomFeature::CornerScrews);
        }
        if self.screw_together {
            f.push(BottomFeature::ScrewTogether);
        }
        if self.ext_depth > 0.0 {
            f.push(BottomFeature::Explicit(self.ext_depth));
        }
        f
    }

    pub fn dims(&self) -> BaseplateDims {
        BaseplateDims {
            ext_depth: slab_depth(&self.bottom_features()),
            padding: self
                .fit_to_drawer
                .and_then(|d| drawer_fit(self.length_u, self.width_u, d))
                .unwrap_or([0.0; 4]),
            ..BaseplateDims::new(self.length_u, self.width_u)
        }
    }

    fn magnet_spec(&self) -> HoleSpec {
        if self.refined_holes {
            HoleSpec::refined()
        } else {
            HoleSpec::magnet()
        }
    }

    pub fn filename(&self) -> String {
        let mut f = format!("gf_baseplate_{}x{}", self.length_u, self.width_u);
        if self.skeleton {
            f.push_str("_skel");
        }
        match (self.magnet_holes, self.screw_holes) {
            (true, true) => f.push_str("_mag-screw"),
            (true, false) => f.push_str("_mag"),
            (false, true) => f.push_str("_screw"),
            (false, false) => {}
        }
        if self.screw_holes && self.countersink {
            f.push_str("_csk");
        }
        if self.weighted {
            f.push_str("_weighted");
        }
        if self.corner_screws {
            f.push_str("_corners");
        }
        if self.screw_together {
            f.push_str("_screwtog");
            if self.n_screws > 1 {
                let _ = write!(f, "{}", self.n_screws);
            }
        }
        f
    }

    pub fn plan(&self, convention: TaperConvention) -> Result<OperationPlan, OpError> {
        let d = self.dims();
        let ext = d.ext_depth;
        let cells = cell_centres(self.length_u, self.width_u, PITCH);
        let quads = hole_quads(&cells, HOLE_OFFSET);
        let mut plan = OperationPlan::new();

        let mut body = plan.extrude(
            Sketch::xy(Footprint::rounded_rect(d.outer_l(), d.outer_w(), CORNER_RAD))
                .at(d.outline_center()),
            [0.0; 3],
            d.total_height(),
            "plate",
        );

        let receptacle = receptacle_tool(&mut plan, self.straight_bottom, ext, convention)?;
        let receptacles = plan.pattern(receptacle, cells.at_height(0.0), "receptacles");
        body = plan.cut(body, receptacles, "receptacles");

        if self.weighted {
            let pocket = weight_pocket(&mut plan);
            let all = plan.pattern(pocket, cells.at_height(0.0), "weight pockets");
            body = plan.cut(body, all, "weight pockets");
        }

        if self.skeleton {
            let relief = skeleton_relief(&mut plan, ext);
            let all = plan.pattern(relief, cells.at_height(0.0), "skeleton");
            body = plan.cut(body, all, "skeleton");
        }

        if self.magnet_holes {
            let tool = hole_tool(&mut plan, &self.magnet_spec(), convention, "magnet hole")?;
            let flipped = plan.transform(tool, Transform::mirror(Plane::XY), "magnet hole");
            let all = plan.pattern(flipped, quads.at_height(ext), "magnet holes");
            body = plan.cut(body, all, "magnet holes");
        }

        if self.screw_holes {
            let top = if self.magnet_holes {
                ext - self.magnet_spec().depth
            } else {
                ext
            };
            let mut spec = HoleSpec::screw(top + EPS);
            if self.countersink {
                spec = spec.with_flare(Flare::countersink(BOLT_DIAM));
            }
            let tool = hole_tool(&mut plan, &spec, convention, "screw hole")?;
            let all = plan.pattern(tool, quads.at_height(0.0), "screw holes");
            body = plan.cut(body, all, "screw holes");
        }

        if self.corner_screws {
            body = self.corner_screw_holes(&mut plan, body, &d, convention)?;
        }

        if self.screw_together {
            if let Some(tool) = self.connector_holes(&mut plan, &d) {
                body = plan.cut(body, tool, "screw-together holes");
            }
        }

        plan.set_output(body);
        Ok(plan)
    }

    fn corner_screw_holes(
        &self,
        plan: &mut OperationPlan,
        body: NodeId,
        d: &BaseplateDims,
        convention: TaperConvention,
    ) -> Result<NodeId, OpError> {
        let ext = d.ext_depth;
        let spec = HoleSpec {
            diameter: CORNER_SCREW_HOLE,
            depth: ext + EPS,
            ..HoleSpec::magnet()
        }
        .with_flare(Flare {
            extra_radius: (CORNER_SCREW_HEAD - CORNER_SCREW_HOLE) / 2.0,
            taper_deg: CORNER_SCREW_ANGLE / 2.0,
        });
        let tool = hole_tool(plan, &spec, convention, "corner screw")?;
        let flipped = plan.transform(tool, Transform::mirror(Plane::XY), "corner screw");
        let (hx, hy) = (
            d.grid_l() / 2.0 - CORNER_TAB / 2.0,
            d.grid_w() / 2.0 - CORNER_TAB / 2.0,
        );
        let corners = vec![[-hx, -hy, ext], [hx, -hy, ext], [-hx, hy, ext], [hx, hy, ext]];
        let mut body = body;
        if self.skeleton {
            let tab = plan.extrude(
                Sketch::xy(Footprint::rect(CORNER_TAB, CORNER_TAB)),
                [0.0; 3],
                ext,
                "corner tab",
            );
            let tabs = plan.pattern(
                tab,
                corners.iter().map(|c| [c[0], c[1], 0.0]).collect(),
                "corner tabs",
            );
            body = plan.union(body, tabs, "corner tabs");
        }
        let all = plan.pattern(flipped, corners, "corner screws");
        Ok(plan.cut(body, all, "corner screws"))
    }

    /// Horizontal holes running in from every outer edge, `n_screws` per cell.
    fn connector_holes(&self, plan: &mut OperationPlan, d: &BaseplateDims) -> Option<NodeId> {
        let z = d.ext_depth / 2.0;
        let r = SCREW_TOGETHER_DIAM / 2.0;
        let len = CORNER_TAB + EPS;
        let n = self.n_screws;
        let offsets: Vec<f64> = (0..n)
            .map(|k| (k as f64 - (n - 1) as f64 / 2.0) * SCREW_TOGETHER_SPACING)
            .collect();
        let c = d.outline_center();
        let (front, back) = (c[1] - d.outer_w() / 2.0, c[1] + d.outer_w() / 2.0);
        let (left, right) = (c[0] - d.outer_l() / 2.0, c[0] + d.outer_l() / 2.0);
        let cells = cell_centres(self.length_u, self.width_u, PITCH);
        let (xs, ys) = axis_positions(&cells.points);

        let mut holes = Vec::new();
        for x in &xs {
            for o in &offsets {
                let sk = Sketch::on(Plane::XZ, Footprint::circle(r)).at([x + o, z]);
                holes.push(plan.extrude(sk.clone(), [0.0, below(front), 0.0], len, "front connector"));
                holes.push(plan.extrude(sk, [0.0, back - CORNER_TAB, 0.0], len, "back connector"));
            }
        }
        for y in &ys {
            for o in &offsets {
                let sk = Sketch::on(Plane::YZ, Footprint::circle(r)).at([y + o, z]);
                holes.push(plan.extrude(sk.clone(), [below(left), 0.0, 0.0], len, "left connector"));
                holes.push(plan.extrude(sk, [right - CORNER_TAB, 0.0, 0.0], len, "right connector"));
            }
        }
        plan.union_all(&holes, "connectors")
    }
}

/// One bin receptacle at the origin with its floor at `z`, open at the top.
pub(crate) fn receptacle_tool(
    plan: &mut OperationPlan,
    straight_bottom: bool,
    z: f64,
    convention: TaperConvention,
) -> Result<NodeId, OpError> {
    let base = Footprint::rounded_rect(RECEPTACLE_BOTTOM, RECEPTACLE_BOTTOM, RECEPTACLE_BOTTOM_RAD);
    let (footprint, first) = if straight_bottom {
        let fp = base.offset(BASE_BOT_CHAMFER).unwrap_or(base);
        (fp, Segment::straight(BASE_BOT_CHAMFER))
    } else {
        (base, Segment::tapered(BASE_BOT_CHAMFER, -45.0))
    };
    let mut profile = Profile::new(vec![
        first,
        Segment::straight(STRAIGHT_HEIGHT),
        Segment::tapered(BASE_TOP_CHAMFER, -45.0),
        Segment::straight(EPS),
    ]);
    let z = if z > 0.0 {
        z
    } else {
        profile = profile.after(Segment::straight(EPS));
        below(z)
    };
    plan.profile(&Sketch::xy(footprint), [0.0, 0.0, z], &profile, convention, "receptacle")
}

/// Distinct cell x and y coordinates.
fn axis_positions(points: &[[f64; 2]]) -> (Vec<f64>, Vec<f64>) {
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    for p in points {
        if !xs.iter().any(|x| (x - p[0]).abs() < 1e-9) {
            xs.push(p[0]);
        }
        if !ys.iter().any(|y| (y - p[1]).abs() < 1e-9) {
            ys.push(p[1]);
        }
    }
    (xs, ys)
}

/// Central weight pocket with two cross channels, open at the bottom.
fn weight_pocket(plan: &mut OperationPlan) -> NodeId {
    let long = 2.0 * BP_CHANNEL_LONG + BP_WEIGHT_POCKET;
    let pocket = plan.extrude(
        Sketch::xy(Footprint::rect(BP_WEIGHT_POCKET, BP_WEIGHT_POCKET)),
        [0.0, 0.0, below(0.0)],
        BP_WEIGHT_DEPTH + EPS,
        "weight pocket",
    );
    let cx = plan.extrude(
        Sketch::xy(Footprint::rect(long, BP_CHANNEL_WIDTH)),
        [0.0, 0.0, below(0.0)],
        BP_CHANNEL_DEPTH + EPS,
        "weight channel",
    );
    let cy = plan.extrude(
        Sketch::xy(Footprint::rect(BP_CHANNEL_WIDTH, long)),
        [0.0, 0.0, below(0.0)],
        BP_CHANNEL_DEPTH + EPS,
        "weight channel",
    );
    let channels = plan.union(cx, cy, "weight channels");
    plan.union(pocket, channels, "weight pocket")
}

/// Relief pocket under one cell, keeping solid pads around the hole sites.
fn skeleton_relief(plan: &mut OperationPlan, ext: f64) -> NodeId {
    let pocket = plan.extrude(
        Sketch::xy(Footprint::rounded_rect(SKELETON_INNER, SKELETON_INNER, SKELETON_RAD)),
        [0.0, 0.0, below(0.0)],
        ext - SKELETON_HEIGHT + EPS,
        "skeleton pocket",
    );
    let pad = plan.extrude(
        Sketch::xy(Footprint::rect(SKELETON_KEEPOUT, SKELETON_KEEPOUT)),
        [0.0, 0.0, below(below(0.0))],
        through(ext),
        "skeleton pad",
    );
    let pads = plan.pattern(
        pad,
        hole_quads(&cell_centres(1, 1, PITCH), HOLE_OFFSET).at_height(0.0),
        "skeleton pads",
    );
    plan.cut(pocket, pads, "skeleton relief")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slab_uses_max_rule() {
        let mut b = BaseplateSpec::new(4, 3);
        b.magnet_holes = true;
        b.screw_holes = true;
        assert_relative_eq!(b.dims().ext_depth, SCREW_DEPTH);
        b.ext_depth = 5.0;
        b.corner_screws = true;
        assert_relative_eq!(b.dims().total_height(), 9.75);
    }

    #[test]
    fn test_filenames() {
        assert_eq!(BaseplateSpec::new(4, 3).filename(), "gf_baseplate_4x3");
        let mut b = BaseplateSpec::new(4, 3);
        b.skeleton = true;
        b.magnet_holes = true;
        b.screw_holes = true;
        b.countersink = true;
        assert_eq!(b.filename(), "gf_baseplate_4x3_skel_mag-screw_csk");
        let mut b = BaseplateSpec::new(2, 2);
        b.screw_together = true;
        b.n_screws = 2;
        assert_eq!(b.filename(), "gf_baseplate_2x2_screwtog2");
    }

    #[test]
    fn test_skeleton_drops_weighted() {
        let mut b = BaseplateSpec::new(2, 2);
        b.skeleton = true;
        b.weighted = true;
        let n = b.normalized();
        assert!(n.skeleton && !n.weighted);
    }

    #[test]
    fn test_validation() {
        let mut b = BaseplateSpec::new(5, 2);
        b.screw_together = true;
        b.n_screws = 4;
        b.fit_to_drawer = Some([200.0, 200.0]);
        let err = b.validate().unwrap_err();
        assert!(err.mentions("n_screws"));
        assert!(err.mentions("fit_to_drawer"));
    }

    #[test]
    fn test_drawer_padding() {
        let b = BaseplateSpec::new(4, 3).fit_to_drawer(180.0, 130.0);
        let d = b.dims();
        assert_eq!(d.padding, [6.0, 6.0, 2.0, 2.0]);
        assert_relative_eq!(d.outer_l(), 180.0);
    }

    #[test]
    fn test_axis_positions() {
        let (xs, ys) = axis_positions(&cell_centres(3, 2, PITCH).points);
        assert_eq!(xs.len(), 3);
        assert_eq!(ys.len(), 2);
    }
}
