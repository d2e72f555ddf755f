//! The bin shell pipeline.
//!
//! Every bin-like part is built the same way: the footed outer body minus an
//! interior cavity, then a fixed sequence of extension points
//! (`add_dividers`, `add_scoops`, `add_labels`, `add_holes`) and finally the
//! part's own `post_steps`. Specialised parts implement [`ShellFeatures`] and
//! override only the steps they change.

use std::f64::consts::PI;

use grid_ops::constants::*;
use grid_ops::constraints::{below, clamp_fillet, clamp_scoop, through};
use grid_ops::cutouts::{cutout_tool, place_cutouts, Cutout, CutoutShape};
use grid_ops::dims::{BinDims, LipStyle};
use grid_ops::holes::{bridge_slabs, hole_tool, Flare, HoleSpec};
use grid_ops::layout::{cell_centres, hole_quads, pack, PackStyle};
use grid_ops::wall_pattern::pattern_tool;
use grid_ops::{NodeId, OpError, OperationPlan};
use grid_types::{BoundingBox, EdgeSelector, Footprint, Plane, Profile, Segment, Sketch};
use solid_kernel::TaperConvention;
use tracing::{debug, warn};

use crate::bin::{BinSpec, LabelStyle};

const SCOOP_ARC_STEPS: usize = 12;

/// Foot profile, bottom up: chamfer, straight, chamfer out to the full cell.
pub fn foot_profile() -> Profile {
    Profile::new(vec![
        Segment::tapered(FOOT_BOT_CHAMFER, -45.0),
        Segment::straight(STRAIGHT_HEIGHT),
        Segment::tapered(FOOT_TOP_CHAMFER, -45.0),
    ])
}

/// Bin body under construction.
pub struct ShellBuild {
    pub plan: OperationPlan,
    pub dims: BinDims,
    pub convention: TaperConvention,
    pub body: NodeId,
    /// Interior cutting solid, `None` when the bin is filled solid.
    pub cavity: Option<NodeId>,
    /// Compartment floor after any raise.
    pub floor_z: f64,
    /// Top of the fill block; equals `floor_z` without a solid fill.
    pub fill_top: f64,
    pending: Vec<NodeId>,
}

impl ShellBuild {
    /// Body and cavity of `spec`, already cut.
    pub fn new(spec: &BinSpec, convention: TaperConvention) -> Result<Self, OpError> {
        let dims = spec.dims();
        let mut plan = OperationPlan::new();
        let outer = outer_body(&mut plan, &dims, convention)?;
        let floor_top = dims.floor_top();

        if spec.vase_mode {
            let inner = plan.extrude(
                Sketch::xy(Footprint::rounded_rect(
                    dims.inner_l(),
                    dims.inner_w(),
                    dims.inner_rad(),
                )),
                [0.0, 0.0, floor_top],
                dims.height() - floor_top + EPS,
                "vase interior",
            );
            let body = plan.cut(outer, inner, "vase shell");
            return Ok(Self {
                plan,
                dims,
                convention,
                body,
                cavity: Some(inner),
                floor_z: floor_top,
                fill_top: floor_top,
                pending: Vec::new(),
            });
        }

        let raise = spec.floor_raise();
        let mut fill = raise;
        if spec.solid {
            fill = fill.max(dims.max_height() * spec.solid_ratio);
        }
        if spec.cylindrical {
            fill = fill.max(dims.max_height());
        }

        let mut build = Self {
            plan,
            dims,
            convention,
            body: outer,
            cavity: None,
            floor_z: floor_top + raise,
            fill_top: floor_top + fill,
            pending: Vec::new(),
        };
        if fill >= dims.cavity_height() - EPS {
            debug!(fill, "cavity filled solid");
            build.fill_top = dims.height();
            return Ok(build);
        }

        let mut cavity = build.plan.profile(
            &build.inner_sketch(),
            [0.0, 0.0, floor_top],
            &cavity_profile(&dims),
            convention,
            "cavity",
        )?;
        if fill > 0.0 {
            let block = build.plan.extrude(
                build.inner_sketch(),
                [0.0, 0.0, below(floor_top)],
                fill + EPS,
                "fill",
            );
            cavity = build.plan.cut(cavity, block, "filled cavity");
        }
        if spec.scoops && dims.lip.has_lip() && !dims.lite {
            let strip = build.plan.extrude(
                Sketch::xy(Footprint::rect(dims.inner_l(), 2.0 * dims.under_h()))
                    .at([0.0, -dims.inner_w() / 2.0]),
                [0.0, 0.0, below(floor_top)],
                dims.max_height() + EPS,
                "scoop backing",
            );
            cavity = build.plan.cut(cavity, strip, "cavity");
        }
        if dims.lite {
            let hollow = lite_feet(&mut build.plan, &dims, convention)?;
            cavity = build.plan.union(cavity, hollow, "cavity");
        }
        build.body = build.plan.cut(outer, cavity, "shell");
        build.cavity = Some(cavity);
        Ok(build)
    }

    pub fn inner_sketch(&self) -> Sketch {
        Sketch::xy(Footprint::rounded_rect(
            self.dims.inner_l(),
            self.dims.inner_w(),
            self.dims.inner_rad(),
        ))
    }

    /// True when the bin has an open interior to put features in.
    pub fn is_hollow(&self) -> bool {
        self.cavity.is_some()
    }

    /// Queue a solid to be unioned into the body.
    pub fn add(&mut self, node: NodeId) {
        self.pending.push(node);
    }

    /// Cut `tool` from the body after merging queued additions.
    pub fn cut(&mut self, tool: NodeId, label: &str) {
        self.flush();
        self.body = self.plan.cut(self.body, tool, label);
    }

    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for node in pending {
            self.body = self.plan.union(self.body, node, "feature");
        }
    }

    /// Height available above the compartment floor.
    pub fn usable_height(&self) -> f64 {
        self.dims.floor_top() + self.dims.max_height() - self.fill_top
    }

    pub fn finish(mut self) -> OperationPlan {
        self.flush();
        self.plan.set_output(self.body);
        self.plan
    }
}

/// Interior cavity profile for the lip style, from the floor to the rim.
fn cavity_profile(d: &BinDims) -> Profile {
    let cavity = d.cavity_height();
    let straight = d.int_height() + (d.wall - WALL);
    match d.lip {
        LipStyle::Normal if d.int_height() >= 0.0 && straight > EPS => Profile::new(vec![
            Segment::straight(straight),
            Segment::tapered(d.under_h(), 45.0),
            Segment::straight(TOPSIDE_HEIGHT),
            Segment::tapered(0.7, -45.0),
            Segment::straight(STRAIGHT_HEIGHT),
            Segment::tapered(1.3, -45.0),
            Segment::straight(EPS),
        ]),
        LipStyle::Reduced if d.int_height() >= 0.0 && d.wall - LIP_RIM > EPS => {
            let e = d.wall - LIP_RIM;
            Profile::new(vec![
                Segment::straight(cavity - e),
                Segment::tapered(e, -45.0),
                Segment::straight(EPS),
            ])
        }
        _ => Profile::straight(cavity + EPS),
    }
}

/// Feet patterned over the cells, clipped to the outline, plus the wall block.
fn outer_body(
    plan: &mut OperationPlan,
    d: &BinDims,
    convention: TaperConvention,
) -> Result<NodeId, OpError> {
    let cells = cell_centres(d.length_u, d.width_u, PITCH);
    let foot = plan.profile(
        &Sketch::xy(Footprint::rounded_rect(FOOT_BOTTOM, FOOT_BOTTOM, FOOT_BOTTOM_RAD)),
        [0.0; 3],
        &foot_profile(),
        convention,
        "foot",
    )?;
    let feet = plan.pattern(foot, cells.at_height(0.0), "feet");
    let outline = Sketch::xy(Footprint::rounded_rect(d.outer_l(), d.outer_w(), d.outer_rad()));
    let clip = plan.extrude(outline.clone(), [0.0, 0.0, below(0.0)], through(FOOT_HEIGHT), "foot clip");
    let feet = plan.intersect(feet, clip, "clipped feet");
    let walls = plan.extrude(
        outline,
        [0.0, 0.0, BASE_HEIGHT],
        d.height() - BASE_HEIGHT,
        "wall block",
    );
    Ok(plan.union(feet, walls, "body"))
}

/// Hollow interior of each foot for lite bins, reaching up into the cavity.
fn lite_feet(
    plan: &mut OperationPlan,
    d: &BinDims,
    convention: TaperConvention,
) -> Result<NodeId, OpError> {
    let fp = Footprint::rounded_rect(FOOT_BOTTOM, FOOT_BOTTOM, FOOT_BOTTOM_RAD)
        .offset(-d.wall)
        .ok_or_else(|| OpError::InvalidParameter {
            reason: format!("wall {} leaves no hollow foot", d.wall),
        })?;
    let mut profile = Profile::new(vec![
        Segment::tapered(FOOT_BOT_CHAMFER, -45.0),
        Segment::straight(STRAIGHT_HEIGHT),
        Segment::tapered(FOOT_TOP_CHAMFER - BASE_CLEARANCE, -45.0),
    ]);
    let top = d.wall + profile.total_height();
    let rest = d.floor_top() + EPS - top;
    if rest > EPS {
        profile = profile.then(Segment::straight(rest));
    }
    let hollow = plan.profile(&Sketch::xy(fp), [0.0, 0.0, d.wall], &profile, convention, "hollow foot")?;
    let cells = cell_centres(d.length_u, d.width_u, PITCH);
    Ok(plan.pattern(hollow, cells.at_height(0.0), "hollow feet"))
}

/// Extension points of the shell pipeline, run in declaration order.
pub trait ShellFeatures {
    fn bin(&self) -> &BinSpec;

    fn add_dividers(&self, shell: &mut ShellBuild) -> Result<(), OpError> {
        if self.bin().cylindrical {
            cylinder_pockets(self.bin(), shell)
        } else {
            dividers(self.bin(), shell);
            Ok(())
        }
    }

    fn add_scoops(&self, shell: &mut ShellBuild) -> Result<(), OpError> {
        scoops(self.bin(), shell);
        Ok(())
    }

    fn add_labels(&self, shell: &mut ShellBuild) -> Result<(), OpError> {
        labels(self.bin(), shell);
        Ok(())
    }

    fn add_holes(&self, shell: &mut ShellBuild) -> Result<(), OpError> {
        holes(self.bin(), shell)
    }

    fn post_steps(&self, shell: &mut ShellBuild) -> Result<(), OpError> {
        wall_patterns(self.bin(), shell);
        thumbscrews(self.bin(), shell);
        Ok(())
    }
}

impl ShellFeatures for BinSpec {
    fn bin(&self) -> &BinSpec {
        self
    }
}

/// Run the whole pipeline for one part.
pub fn build_shell(
    features: &dyn ShellFeatures,
    convention: TaperConvention,
) -> Result<OperationPlan, OpError> {
    let spec = features.bin();
    let mut shell = ShellBuild::new(spec, convention)?;
    if spec.vase_mode {
        return Ok(shell.finish());
    }
    features.add_dividers(&mut shell)?;
    features.add_scoops(&mut shell)?;
    features.add_labels(&mut shell)?;
    interior_fillet(spec, &mut shell);
    features.add_holes(&mut shell)?;
    features.post_steps(&mut shell)?;
    Ok(shell.finish())
}

fn open_interior(spec: &BinSpec, shell: &ShellBuild) -> Option<NodeId> {
    if spec.solid || spec.cylindrical {
        return None;
    }
    shell.cavity
}

/// Divider centres along one axis, relative to the part centre.
fn divider_positions(inner: f64, count: u32) -> Vec<f64> {
    let pitch = inner / (count + 1) as f64;
    (1..=count).map(|i| -inner / 2.0 + i as f64 * pitch).collect()
}

pub(crate) fn dividers(spec: &BinSpec, shell: &mut ShellBuild) {
    if open_interior(spec, shell).is_none() || !spec.has_dividers() {
        return;
    }
    let d = shell.dims;
    let top = d.floor_top() + d.max_height();
    let h = top - shell.fill_top + EPS;
    if h <= EPS {
        return;
    }
    let z = below(shell.fill_top);
    let mut walls = Vec::new();
    for x in divider_positions(d.inner_l(), spec.length_div) {
        walls.push(shell.plan.extrude(
            Sketch::xy(Footprint::rect(DIVIDER_WALL, d.outer_w())).at([x, 0.0]),
            [0.0, 0.0, z],
            h,
            "length divider",
        ));
    }
    for y in divider_positions(d.inner_w(), spec.width_div) {
        walls.push(shell.plan.extrude(
            Sketch::xy(Footprint::rect(d.outer_l(), DIVIDER_WALL)).at([0.0, y]),
            [0.0, 0.0, z],
            h,
            "width divider",
        ));
    }
    if let Some(all) = shell.plan.union_all(&walls, "dividers") {
        shell.add(all);
    }
}

/// One round pocket per compartment, cut down into the fill.
pub(crate) fn cylinder_pockets(spec: &BinSpec, shell: &mut ShellBuild) -> Result<(), OpError> {
    let d = shell.dims;
    let cl = d.inner_l() / (spec.length_div + 1) as f64;
    let cw = d.inner_w() / (spec.width_div + 1) as f64;
    let diameter = spec.cylinder_diam.min(cl.min(cw) - 2.0 * DIVIDER_WALL);
    let depth = shell.fill_top - shell.floor_z;
    if diameter <= 0.0 || depth <= 0.0 {
        warn!(diameter, depth, "no room for cylindrical compartments");
        return Ok(());
    }
    let cutout = Cutout {
        shape: CutoutShape::Round { diameter },
        height: depth,
        clearance: 0.0,
        chamfer: spec.cylinder_chamfer,
    };
    let Some(layout) = pack(
        [cl, cw],
        0.0,
        spec.length_div + 1,
        spec.width_div + 1,
        PackStyle::Square,
    ) else {
        return Ok(());
    };
    let tool = cutout_tool(&mut shell.plan, &cutout, shell.convention, "cylinder")?;
    let pockets = place_cutouts(&mut shell.plan, tool, &layout, shell.floor_z, "cylinders");
    shell.cut(pockets, "cylindrical compartments");
    Ok(())
}

/// Concave fillet profile: a square with a quarter circle removed from the
/// far corner, in (u, v) with the corner to keep at the origin.
fn scoop_outline(r: f64) -> Footprint {
    let mut points = vec![[0.0, 0.0], [r, 0.0]];
    for k in 1..SCOOP_ARC_STEPS {
        let a = 1.5 * PI - (k as f64 / SCOOP_ARC_STEPS as f64) * 0.5 * PI;
        points.push([r + r * a.cos(), r + r * a.sin()]);
    }
    points.push([0.0, r]);
    Footprint::Outline { points }
}

pub(crate) fn scoops(spec: &BinSpec, shell: &mut ShellBuild) {
    let Some(cavity) = open_interior(spec, shell) else {
        return;
    };
    if !spec.scoops {
        return;
    }
    let d = shell.dims;
    let int_h = shell.usable_height() - UNDER_HEIGHT - TOPSIDE_HEIGHT;
    let Some(r) = clamp_scoop(spec.scoop_rad, spec.scoop_scale, int_h) else {
        return;
    };
    let mut fronts = vec![-d.inner_w() / 2.0
        + if d.lip.has_lip() && !d.lite {
            d.under_h()
        } else {
            0.0
        }];
    fronts.extend(
        divider_positions(d.inner_w(), spec.width_div)
            .into_iter()
            .map(|y| y + DIVIDER_WALL / 2.0),
    );
    let pieces: Vec<NodeId> = fronts
        .into_iter()
        .map(|y| {
            shell.plan.extrude(
                Sketch::on(Plane::YZ, scoop_outline(r)),
                [-d.inner_l() / 2.0, y, shell.fill_top],
                d.inner_l(),
                "scoop",
            )
        })
        .collect();
    if let Some(all) = shell.plan.union_all(&pieces, "scoops") {
        let trimmed = shell.plan.intersect(all, cavity, "scoops");
        shell.add(trimmed);
    }
}

/// Label flange height, shortened so the flange clears the floor fillet.
pub fn safe_label_height(spec: &BinSpec, max_height: f64, backwall: bool) -> f64 {
    let d = spec.dims();
    let mut lw = spec.label_width;
    if backwall {
        lw += d.lip_width();
    }
    let mut lh = spec.label_height * (lw / spec.label_width);
    let mut yl = max_height - spec.label_height + spec.wall_th;
    if backwall {
        yl -= d.lip_width();
    }
    if yl < 0.0 {
        lh = max_height - 1.5 * FILLET_RAD - 0.1;
    } else if yl < 1.5 * FILLET_RAD {
        lh -= 1.5 * FILLET_RAD - yl + 0.1;
    }
    lh
}

/// X spans `(start, length)` covered by label flanges.
fn label_spans(style: LabelStyle, inner_l: f64, compartments: u32) -> Vec<(f64, f64)> {
    let c = inner_l / compartments as f64;
    let tw = LABEL_TAB_WIDTH.min(c);
    (0..compartments)
        .filter_map(|i| {
            let x0 = -inner_l / 2.0 + i as f64 * c;
            match style {
                LabelStyle::Left => Some((x0, tw)),
                LabelStyle::Center => Some((x0 + (c - tw) / 2.0, tw)),
                LabelStyle::Right => Some((x0 + c - tw, tw)),
                _ => None,
            }
        })
        .chain(
            matches!(style, LabelStyle::Full | LabelStyle::Auto)
                .then_some((-inner_l / 2.0, inner_l)),
        )
        .collect()
}

fn flange(width: f64, depth: f64, lip: f64) -> Footprint {
    Footprint::Outline {
        points: vec![[0.0, 0.0], [width, 0.0], [width, -depth], [0.0, -lip]],
    }
}

pub(crate) fn labels(spec: &BinSpec, shell: &mut ShellBuild) {
    let Some(cavity) = open_interior(spec, shell) else {
        return;
    };
    let style = spec.effective_label_style();
    if style == LabelStyle::None {
        return;
    }
    let d = shell.dims;
    let max_h = shell.usable_height();
    let z_top = d.floor_top() + d.max_height();
    let spans = label_spans(style, d.inner_l(), spec.length_div + 1);

    let back_w = spec.label_width + d.lip_width();
    let back_h = safe_label_height(spec, max_h, true);
    let div_h = safe_label_height(spec, max_h, false);
    if back_h <= 0.0 {
        warn!(back_h, "no room for label flanges");
        return;
    }
    let mut rows = vec![(
        flange(back_w, back_h, spec.label_lip_height),
        d.outer_w() / 2.0 + d.wall / 4.0 - back_w,
    )];
    if div_h > 0.0 {
        for y in divider_positions(d.inner_w(), spec.width_div) {
            rows.push((
                flange(spec.label_width, div_h, spec.label_lip_height),
                y + DIVIDER_WALL / 2.0 - spec.label_width,
            ));
        }
    }

    let mut pieces = Vec::new();
    for (outline, y) in &rows {
        for (x0, len) in &spans {
            pieces.push(shell.plan.extrude(
                Sketch::on(Plane::YZ, outline.clone()),
                [*x0, *y, z_top],
                *len,
                "label flange",
            ));
        }
    }
    if let Some(all) = shell.plan.union_all(&pieces, "labels") {
        let trimmed = shell.plan.intersect(all, cavity, "labels");
        shell.add(trimmed);
    }
}

fn interior_fillet(spec: &BinSpec, shell: &mut ShellBuild) {
    if open_interior(spec, shell).is_none() || !spec.fillet_interior {
        return;
    }
    let d = shell.dims;
    let Some(r) = clamp_fillet(spec.fillet_rad.unwrap_or(FILLET_RAD), d.inner_rad()) else {
        return;
    };
    shell.flush();
    let interior = BoundingBox::new(
        [-d.inner_l() / 2.0, -d.inner_w() / 2.0, shell.fill_top],
        [d.inner_l() / 2.0, d.inner_w() / 2.0, d.height()],
    );
    shell.body = shell.plan.fillet(
        shell.body,
        EdgeSelector::Vertical.and(EdgeSelector::Within { bbox: interior }),
        r,
        "interior fillet",
    );
}

/// Magnet recess spec for a bin foot with its options applied.
pub fn bin_hole_spec(spec: &BinSpec) -> HoleSpec {
    let mut h = if spec.refined_holes {
        HoleSpec::refined()
    } else {
        HoleSpec {
            diameter: spec.hole_diam,
            ..HoleSpec::magnet()
        }
    }
    .with_bolt();
    if spec.crush_ribs {
        h = h.with_ribs(RIB_COUNT);
    }
    if spec.chamfered_holes {
        h = h.with_flare(Flare::chamfer());
    }
    if spec.printable_hole_top {
        h = h.with_bridge();
    }
    if spec.unsupported_holes {
        h.depth += HOLE_SLICE;
    }
    h
}

pub(crate) fn holes(spec: &BinSpec, shell: &mut ShellBuild) -> Result<(), OpError> {
    if !spec.holes {
        return Ok(());
    }
    let d = shell.dims;
    let hs = bin_hole_spec(spec);
    let quads = hole_quads(&cell_centres(d.length_u, d.width_u, PITCH), HOLE_OFFSET);
    let tool = hole_tool(&mut shell.plan, &hs, shell.convention, "magnet hole")?;
    let all = shell.plan.pattern(tool, quads.at_height(0.0), "magnet holes");
    shell.cut(all, "magnet holes");

    if spec.unsupported_holes {
        if let Some(slab) = bridge_slabs(&mut shell.plan, &hs, "hole filler") {
            let fillers = shell.plan.pattern(slab, quads.at_height(0.0), "hole fillers");
            shell.add(fillers);
        }
    }
    Ok(())
}

pub(crate) fn wall_patterns(spec: &BinSpec, shell: &mut ShellBuild) {
    if open_interior(spec, shell).is_none() || !spec.wall_pattern {
        return;
    }
    let d = shell.dims;
    let z_bot = (BASE_HEIGHT + PATTERN_FLOOR_CLEAR).max(shell.fill_top);
    let z_top = d.height()
        - match d.lip {
            LipStyle::Normal => PATTERN_LIP_CLEAR,
            LipStyle::Reduced => PATTERN_LIP_CLEAR - LIP_RIM,
            LipStyle::None => 1.0,
        };
    let canvas_h = z_top - z_bot;
    let z_mid = (z_bot + z_top) / 2.0;
    let depth = through(d.wall);
    let pattern = spec.wall_pattern_spec();
    let walls = spec.wall_pattern_walls;
    let fb = [d.outer_l() - 2.0 * PATTERN_CORNER_INSET, canvas_h];
    let lr = [d.outer_w() - 2.0 * PATTERN_CORNER_INSET, canvas_h];

    let sides = [
        (walls.front, Plane::XZ, [0.0, below(-d.outer_w() / 2.0), z_mid], fb, "front pattern"),
        (walls.back, Plane::XZ, [0.0, below(d.outer_w() / 2.0 - d.wall), z_mid], fb, "back pattern"),
        (walls.left, Plane::YZ, [below(-d.outer_l() / 2.0), 0.0, z_mid], lr, "left pattern"),
        (walls.right, Plane::YZ, [below(d.outer_l() / 2.0 - d.wall), 0.0, z_mid], lr, "right pattern"),
    ];
    for (enabled, plane, center, canvas, label) in sides {
        if !enabled {
            continue;
        }
        match pattern_tool(&mut shell.plan, plane, center, canvas, depth, &pattern, label) {
            Some(tool) => shell.cut(tool, label),
            None => debug!(label, ?canvas, "wall too small for pattern"),
        }
    }
}

pub(crate) fn thumbscrews(spec: &BinSpec, shell: &mut ShellBuild) {
    if open_interior(spec, shell).is_none() || !spec.thumbscrew {
        return;
    }
    let d = shell.dims;
    let r = spec.thumbscrew_diam / 2.0;
    let z = shell.fill_top + r + 1.0;
    let n = d.length_u;
    let holes: Vec<NodeId> = (0..n)
        .map(|i| {
            let x = (i as f64 - (n - 1) as f64 / 2.0) * PITCH;
            shell.plan.extrude(
                Sketch::on(Plane::XZ, Footprint::circle(r)).at([x, z]),
                [0.0, below(-d.outer_w() / 2.0), 0.0],
                3.0 * d.wall,
                "thumbscrew",
            )
        })
        .collect();
    if let Some(all) = shell.plan.union_all(&holes, "thumbscrews") {
        shell.cut(all, "thumbscrews");
    }
}
