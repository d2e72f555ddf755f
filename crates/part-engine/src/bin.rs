//! Bin configuration: the full option set of a grid bin, its normalisation,
//! validation, derived dimensions and filename.

use std::fmt::Write as _;

use grid_ops::constants::*;
use grid_ops::constraints::{slab_depth, BottomFeature};
use grid_ops::dims::{BinDims, LipStyle};
use grid_ops::wall_pattern::{PatternStyle, WallPatternSpec};
use grid_ops::{ConfigErrors, Violations};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Label flange placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    #[default]
    None,
    /// One flange across the whole back wall.
    Full,
    /// Full for compartments up to one unit long, left tabs otherwise.
    Auto,
    Left,
    Center,
    Right,
}

impl LabelStyle {
    fn tag(self) -> &'static str {
        match self {
            LabelStyle::None => "none",
            LabelStyle::Full => "full",
            LabelStyle::Auto => "auto",
            LabelStyle::Left => "left",
            LabelStyle::Center => "center",
            LabelStyle::Right => "right",
        }
    }
}

/// Walls that receive a wall pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternWalls {
    pub front: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl Default for PatternWalls {
    fn default() -> Self {
        Self {
            front: true,
            back: true,
            left: true,
            right: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinSpec {
    pub length_u: u32,
    pub width_u: u32,
    pub height_u: u32,
    pub wall_th: f64,
    pub lip_style: LipStyle,
    /// Hollow feet and a thin floor.
    pub lite_style: bool,
    pub solid: bool,
    /// Share of the interior height filled when `solid`.
    pub solid_ratio: f64,
    pub length_div: u32,
    pub width_div: u32,
    pub scoops: bool,
    pub scoop_scale: f64,
    pub scoop_rad: f64,
    pub label_style: LabelStyle,
    pub label_width: f64,
    pub label_height: f64,
    pub label_lip_height: f64,
    pub holes: bool,
    pub hole_diam: f64,
    pub refined_holes: bool,
    pub crush_ribs: bool,
    pub chamfered_holes: bool,
    /// Printable bridge layer at the top of each magnet recess.
    pub printable_hole_top: bool,
    /// Print-in-place filler slabs over the recesses.
    pub unsupported_holes: bool,
    pub fillet_interior: bool,
    pub fillet_rad: Option<f64>,
    pub wall_pattern: bool,
    pub wall_pattern_style: PatternStyle,
    pub wall_pattern_cell: f64,
    pub wall_pattern_spacing: f64,
    pub wall_pattern_sides: u32,
    pub wall_pattern_walls: PatternWalls,
    pub thumbscrew: bool,
    pub thumbscrew_diam: f64,
    pub vase_mode: bool,
    /// Compartment depth below the interior top; 0 keeps the floor.
    pub compartment_depth: f64,
    /// Interior height above the raised floor; 0 keeps the floor.
    pub height_internal: f64,
    pub cylindrical: bool,
    pub cylinder_diam: f64,
    pub cylinder_chamfer: f64,
}

impl Default for BinSpec {
    fn default() -> Self {
        Self {
            length_u: 1,
            width_u: 1,
            height_u: 3,
            wall_th: WALL,
            lip_style: LipStyle::Normal,
            lite_style: false,
            solid: false,
            solid_ratio: 1.0,
            length_div: 0,
            width_div: 0,
            scoops: false,
            scoop_scale: 1.0,
            scoop_rad: SCOOP_RAD,
            label_style: LabelStyle::None,
            label_width: LABEL_WIDTH,
            label_height: LABEL_HEIGHT,
            label_lip_height: LABEL_LIP_HEIGHT,
            holes: false,
            hole_diam: HOLE_DIAM,
            refined_holes: false,
            crush_ribs: false,
            chamfered_holes: false,
            printable_hole_top: false,
            unsupported_holes: false,
            fillet_interior: true,
            fillet_rad: None,
            wall_pattern: false,
            wall_pattern_style: PatternStyle::Hexgrid,
            wall_pattern_cell: PATTERN_CELL,
            wall_pattern_spacing: PATTERN_SPACING,
            wall_pattern_sides: PATTERN_SIDES,
            wall_pattern_walls: PatternWalls::default(),
            thumbscrew: false,
            thumbscrew_diam: THUMBSCREW_DIAM,
            vase_mode: false,
            compartment_depth: 0.0,
            height_internal: 0.0,
            cylindrical: false,
            cylinder_diam: CYLINDER_DIAM,
            cylinder_chamfer: CYLINDER_CHAMFER,
        }
    }
}

impl BinSpec {
    pub fn new(length_u: u32, width_u: u32, height_u: u32) -> Self {
        Self {
            length_u,
            width_u,
            height_u,
            ..Self::default()
        }
    }

    /// Resolve option interactions that are not errors.
    ///
    /// Vase mode keeps only the outer shell. Lite bins force any requested
    /// dividers onto the cell boundaries.
    pub fn normalized(&self) -> BinSpec {
        let mut s = self.clone();
        if s.vase_mode {
            s.lip_style = LipStyle::None;
            s.scoops = false;
            s.label_style = LabelStyle::None;
            s.holes = false;
            s.length_div = 0;
            s.width_div = 0;
            s.solid = false;
            s.cylindrical = false;
            s.wall_pattern = false;
            s.thumbscrew = false;
        }
        if s.lite_style {
            if s.length_div > 0 {
                s.length_div = s.length_u.saturating_sub(1);
            }
            if s.width_div > 0 {
                s.width_div = s.width_u.saturating_sub(1);
            }
        }
        if s != *self {
            debug!("bin options normalised");
        }
        s
    }

    /// Check every parameter and report all violations at once.
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut v = Violations::new();
        self.check(&mut v);
        v.into_result()
    }

    pub(crate) fn check(&self, v: &mut Violations) {
        v.check_units("length_u", self.length_u);
        v.check_units("width_u", self.width_u);
        v.check_units("height_u", self.height_u);
        v.check_wall(self.wall_th, self.lite_style);
        v.exclusive(("solid", self.solid), ("lite_style", self.lite_style));
        v.exclusive(("holes", self.holes), ("lite_style", self.lite_style));
        v.exclusive(
            ("cylindrical", self.cylindrical),
            ("lite_style", self.lite_style),
        );
        v.exclusive(("vase_mode", self.vase_mode), ("lite_style", self.lite_style));
        v.exclusive(
            ("compartment_depth", self.compartment_depth > 0.0),
            ("height_internal", self.height_internal > 0.0),
        );
        if self.solid {
            v.require(
                self.solid_ratio > 0.0 && self.solid_ratio <= 1.0,
                "solid_ratio",
                format!("{} is outside the valid range (0, 1]", self.solid_ratio),
            );
        }
        v.check_range("scoop_scale", self.scoop_scale, 0.0, 1.0);
        if self.scoops {
            v.check_positive("scoop_rad", self.scoop_rad);
        }
        if self.label_style != LabelStyle::None {
            v.check_positive("label_width", self.label_width);
            v.check_positive("label_height", self.label_height);
            v.check_range("label_lip_height", self.label_lip_height, 0.0, self.label_height);
        }
        if self.holes {
            v.require(
                self.hole_diam > BOLT_DIAM,
                "hole_diam",
                format!("{} must exceed the bolt diameter {}", self.hole_diam, BOLT_DIAM),
            );
        }
        if let Some(r) = self.fillet_rad {
            v.require(r >= 0.0, "fillet_rad", format!("{} must not be negative", r));
        }
        if self.wall_pattern {
            v.check_positive("wall_pattern_cell", self.wall_pattern_cell);
            v.require(
                self.wall_pattern_spacing >= 0.0,
                "wall_pattern_spacing",
                format!("{} must not be negative", self.wall_pattern_spacing),
            );
            v.require(
                self.wall_pattern_sides >= 3,
                "wall_pattern_sides",
                format!("{} sides; a tile needs at least 3", self.wall_pattern_sides),
            );
        }
        if self.thumbscrew {
            v.check_positive("thumbscrew_diam", self.thumbscrew_diam);
        }
        v.require(
            self.compartment_depth >= 0.0,
            "compartment_depth",
            format!("{} must not be negative", self.compartment_depth),
        );
        v.require(
            self.height_internal >= 0.0,
            "height_internal",
            format!("{} must not be negative", self.height_internal),
        );
        if self.cylindrical {
            v.check_positive("cylinder_diam", self.cylinder_diam);
            v.require(
                self.cylinder_chamfer >= 0.0,
                "cylinder_chamfer",
                format!("{} must not be negative", self.cylinder_chamfer),
            );
        }
    }

    pub fn bottom_features(&self) -> Vec<BottomFeature> {
        let mut f = Vec::new();
        if self.holes {
            f.push(BottomFeature::BinHoles {
                refined: self.refined_holes,
                bridged: self.unsupported_holes,
            });
        }
        f
    }

    pub fn dims(&self) -> BinDims {
        BinDims {
            wall: self.wall_th,
            lip: self.lip_style,
            lite: self.lite_style,
            extra_depth: slab_depth(&self.bottom_features()),
            ..BinDims::new(self.length_u, self.width_u, self.height_u)
        }
    }

    /// How far the compartment floor is lifted above the regular floor.
    pub fn floor_raise(&self) -> f64 {
        let d = self.dims();
        if self.compartment_depth > 0.0 {
            (d.int_height() - self.compartment_depth).max(0.0)
        } else if self.height_internal > 0.0 {
            (d.cavity_height() - self.height_internal).max(0.0)
        } else {
            0.0
        }
    }

    pub fn has_dividers(&self) -> bool {
        self.length_div > 0 || self.width_div > 0
    }

    /// Label style after resolving `Auto` against the compartment length.
    pub fn effective_label_style(&self) -> LabelStyle {
        match self.label_style {
            LabelStyle::Auto => {
                let compartment = self.dims().inner_l() / (self.length_div + 1) as f64;
                if compartment <= PITCH {
                    LabelStyle::Full
                } else {
                    LabelStyle::Left
                }
            }
            s => s,
        }
    }

    pub fn wall_pattern_spec(&self) -> WallPatternSpec {
        WallPatternSpec {
            style: self.wall_pattern_style,
            cell: self.wall_pattern_cell,
            spacing: self.wall_pattern_spacing,
            sides: self.wall_pattern_sides,
        }
    }

    pub(crate) fn size_tag(&self) -> String {
        format!("{}x{}x{}", self.length_u, self.width_u, self.height_u)
    }

    /// `gf_bin_LxWxH` followed by one tag per enabled option.
    pub fn filename(&self) -> String {
        let mut f = format!("gf_bin_{}", self.size_tag());
        if !self.vase_mode {
            match self.lip_style {
                LipStyle::Normal => {}
                LipStyle::Reduced => f.push_str("_reduced"),
                LipStyle::None => f.push_str("_nolip"),
            }
        }
        if self.lite_style {
            f.push_str("_lite");
        }
        if self.solid {
            f.push_str("_solid");
        }
        if self.vase_mode {
            f.push_str("_vase");
        }
        if self.holes {
            f.push_str("_mag");
        }
        if self.scoops {
            if self.scoop_scale >= 1.0 {
                f.push_str("_scoops");
            } else {
                let _ = write!(f, "_scoop{}", self.scoop_scale);
            }
        }
        match self.label_style {
            LabelStyle::None => {}
            LabelStyle::Full => f.push_str("_labels"),
            s => {
                let _ = write!(f, "_label-{}", s.tag());
            }
        }
        if self.has_dividers() {
            let _ = write!(f, "_div{}x{}", self.length_div, self.width_div);
        }
        if self.wall_pattern {
            f.push_str(match self.wall_pattern_style {
                PatternStyle::Hexgrid => "_hex",
                PatternStyle::Grid => "_grid",
            });
        }
        if self.thumbscrew {
            f.push_str("_thumb");
        }
        if self.compartment_depth > 0.0 {
            let _ = write!(f, "_d{:.1}", self.compartment_depth);
        }
        if self.height_internal > 0.0 {
            let _ = write!(f, "_hi{:.1}", self.height_internal);
        }
        if self.cylindrical {
            let _ = write!(f, "_cyl{}", self.cylinder_diam);
        }
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_filename_grammar() {
        let mut b = BinSpec::new(2, 3, 5);
        b.lip_style = LipStyle::None;
        assert_eq!(b.filename(), "gf_bin_2x3x5_nolip");

        let mut b = BinSpec::new(4, 2, 5);
        b.holes = true;
        b.scoops = true;
        b.label_style = LabelStyle::Full;
        b.length_div = 2;
        b.width_div = 1;
        assert_eq!(b.filename(), "gf_bin_4x2x5_mag_scoops_labels_div2x1");

        let mut b = BinSpec::new(2, 2, 3);
        b.lip_style = LipStyle::Reduced;
        assert_eq!(b.filename(), "gf_bin_2x2x3_reduced");

        let mut b = BinSpec::new(3, 2, 5);
        b.wall_pattern = true;
        assert_eq!(b.filename(), "gf_bin_3x2x5_hex");

        let mut b = BinSpec::new(2, 2, 5);
        b.vase_mode = true;
        b.lip_style = LipStyle::None;
        assert_eq!(b.filename(), "gf_bin_2x2x5_vase");

        let mut b = BinSpec::new(2, 2, 5);
        b.cylindrical = true;
        b.scoops = true;
        b.scoop_scale = 0.5;
        assert_eq!(b.filename(), "gf_bin_2x2x5_scoop0.5_cyl10");

        let mut b = BinSpec::new(2, 2, 5);
        b.label_style = LabelStyle::Left;
        b.compartment_depth = 12.0;
        assert_eq!(b.filename(), "gf_bin_2x2x5_label-left_d12.0");
    }

    #[test]
    fn test_lite_forces_dividers_to_cells() {
        let mut b = BinSpec::new(3, 2, 4);
        b.lite_style = true;
        b.length_div = 5;
        let n = b.normalized();
        assert_eq!((n.length_div, n.width_div), (2, 0));
    }

    #[test]
    fn test_vase_clears_features() {
        let mut b = BinSpec::new(2, 2, 5);
        b.vase_mode = true;
        b.holes = true;
        b.scoops = true;
        let n = b.normalized();
        assert_eq!(n.lip_style, LipStyle::None);
        assert!(!n.holes && !n.scoops);
    }

    #[test]
    fn test_validation_collects_everything() {
        let mut b = BinSpec::new(0, 2, 3);
        b.solid = true;
        b.lite_style = true;
        b.wall_th = 2.0;
        let err = b.validate().unwrap_err();
        assert!(err.mentions("length_u"));
        assert!(err.mentions("solid"));
        assert!(err.mentions("wall_th"));
    }

    #[test]
    fn test_floor_raise() {
        let mut b = BinSpec::new(2, 2, 6);
        let int_h = b.dims().int_height();
        b.compartment_depth = 10.0;
        assert_relative_eq!(b.floor_raise(), int_h - 10.0);
        b.compartment_depth = 500.0;
        assert_eq!(b.floor_raise(), 0.0);
    }

    #[test]
    fn test_auto_labels() {
        let mut b = BinSpec::new(1, 2, 3);
        b.label_style = LabelStyle::Auto;
        assert_eq!(b.effective_label_style(), LabelStyle::Full);
        b.length_u = 3;
        assert_eq!(b.effective_label_style(), LabelStyle::Left);
        b.length_div = 2;
        assert_eq!(b.effective_label_style(), LabelStyle::Full);
    }
}
