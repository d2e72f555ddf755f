//! Dimensional model: grid counts and options to physical lengths.
//!
//! Every part's outer span subtracts the tolerance once, so adjacent parts
//! leave a combined 0.5 mm gap. All functions here are pure.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Stacking lip variant on top of a bin wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LipStyle {
    #[default]
    Normal,
    /// Chamfered rim without the overhang.
    Reduced,
    None,
}

impl LipStyle {
    pub fn has_lip(self) -> bool {
        self != LipStyle::None
    }
}

pub fn outer_span(units: u32) -> f64 {
    units as f64 * PITCH - TOLERANCE
}

/// Total height of a bin of `height_u` units, foot bottom to lip top.
pub fn bin_height(height_u: u32) -> f64 {
    HEIGHT_OFFSET + height_u as f64 * HEIGHT_PITCH
}

pub fn lip_width(lip: LipStyle, wall: f64) -> f64 {
    match lip {
        LipStyle::None => 0.0,
        _ => UNDER_HEIGHT + wall,
    }
}

/// Corner radius of a part's outer outline.
pub fn outer_radius() -> f64 {
    CORNER_RAD - TOLERANCE / 2.0
}

/// Derived lengths of a bin body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinDims {
    pub length_u: u32,
    pub width_u: u32,
    pub height_u: u32,
    pub wall: f64,
    pub lip: LipStyle,
    pub lite: bool,
    /// Extra slab depth demanded by bottom features.
    pub extra_depth: f64,
}

impl BinDims {
    pub fn new(length_u: u32, width_u: u32, height_u: u32) -> Self {
        Self {
            length_u,
            width_u,
            height_u,
            wall: WALL,
            lip: LipStyle::Normal,
            lite: false,
            extra_depth: 0.0,
        }
    }

    pub fn outer_l(&self) -> f64 {
        outer_span(self.length_u)
    }

    pub fn outer_w(&self) -> f64 {
        outer_span(self.width_u)
    }

    pub fn height(&self) -> f64 {
        bin_height(self.height_u)
    }

    pub fn outer_rad(&self) -> f64 {
        outer_radius()
    }

    pub fn inner_l(&self) -> f64 {
        self.outer_l() - 2.0 * self.wall
    }

    pub fn inner_w(&self) -> f64 {
        self.outer_w() - 2.0 * self.wall
    }

    pub fn inner_rad(&self) -> f64 {
        self.outer_rad() - self.wall
    }

    pub fn lip_width(&self) -> f64 {
        lip_width(self.lip, self.wall)
    }

    pub fn lip_height(&self) -> f64 {
        if self.lip.has_lip() {
            LIP_HEIGHT
        } else {
            0.0
        }
    }

    /// Floor thickness above the base.
    pub fn floor_h(&self) -> f64 {
        if self.lite {
            FLOOR - self.wall
        } else {
            FLOOR
        }
    }

    /// Height of the base stack: foot profile plus extra slab depth.
    pub fn base_stack_height(&self) -> f64 {
        BASE_HEIGHT + self.extra_depth
    }

    /// Z of the cavity floor, measured from the foot bottom.
    pub fn floor_top(&self) -> f64 {
        BASE_HEIGHT + self.floor_h().max(self.extra_depth)
    }

    /// Straight interior height below the lip.
    pub fn int_height(&self) -> f64 {
        self.height() - self.floor_top() - self.lip_height()
    }

    /// Height available to dividers and fills, measured from the floor.
    pub fn max_height(&self) -> f64 {
        self.int_height() + UNDER_HEIGHT + TOPSIDE_HEIGHT
    }

    /// Depth of the lip overhang, reduced by walls thicker than nominal.
    pub fn under_h(&self) -> f64 {
        UNDER_HEIGHT - (self.wall - WALL)
    }

    /// Interior height from floor to rim.
    pub fn cavity_height(&self) -> f64 {
        self.height() - self.floor_top()
    }

    pub fn interior_span(&self) -> [f64; 2] {
        [self.inner_l(), self.inner_w()]
    }
}

/// Derived lengths of a baseplate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseplateDims {
    pub length_u: u32,
    pub width_u: u32,
    /// Slab below the receptacles.
    pub ext_depth: f64,
    /// Extra material outside the grid: left, right, front, back.
    pub padding: [f64; 4],
}

impl BaseplateDims {
    pub fn new(length_u: u32, width_u: u32) -> Self {
        Self {
            length_u,
            width_u,
            ext_depth: 0.0,
            padding: [0.0; 4],
        }
    }

    /// Grid span without padding.
    pub fn grid_l(&self) -> f64 {
        self.length_u as f64 * PITCH
    }

    pub fn grid_w(&self) -> f64 {
        self.width_u as f64 * PITCH
    }

    pub fn outer_l(&self) -> f64 {
        self.grid_l() + self.padding[0] + self.padding[1]
    }

    pub fn outer_w(&self) -> f64 {
        self.grid_w() + self.padding[2] + self.padding[3]
    }

    /// Centre of the padded outline relative to the grid centre.
    pub fn outline_center(&self) -> [f64; 2] {
        [
            (self.padding[1] - self.padding[0]) / 2.0,
            (self.padding[3] - self.padding[2]) / 2.0,
        ]
    }

    pub fn total_height(&self) -> f64 {
        BASE_HEIGHT + self.ext_depth
    }

    pub fn is_padded(&self) -> bool {
        self.padding.iter().any(|p| *p > 0.0)
    }
}

/// Padding that centres an `l` x `w` grid inside a drawer, or `None` if it
/// does not fit.
pub fn drawer_fit(length_u: u32, width_u: u32, drawer: [f64; 2]) -> Option<[f64; 4]> {
    let pad_l = drawer[0] - length_u as f64 * PITCH;
    let pad_w = drawer[1] - width_u as f64 * PITCH;
    if pad_l < 0.0 || pad_w < 0.0 {
        return None;
    }
    Some([pad_l / 2.0, pad_l / 2.0, pad_w / 2.0, pad_w / 2.0])
}

/// Largest grid that fits a drawer interior.
pub fn units_for_drawer(drawer: [f64; 2]) -> [u32; 2] {
    [
        (drawer[0] / PITCH).floor().max(0.0) as u32,
        (drawer[1] / PITCH).floor().max(0.0) as u32,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_outer_span_subtracts_tolerance_once() {
        assert_relative_eq!(outer_span(1), 41.5);
        assert_relative_eq!(outer_span(3), 125.5, epsilon = 1e-12);
    }

    #[test]
    fn test_bin_heights() {
        assert_relative_eq!(bin_height(3), 24.8, epsilon = 1e-12);
        let d = BinDims::new(2, 2, 3);
        assert_relative_eq!(d.floor_top(), BOTTOM_HEIGHT);
        assert_relative_eq!(d.int_height(), 24.8 - 7.0 - 6.6, epsilon = 1e-12);
        assert_relative_eq!(d.max_height(), d.int_height() + 2.8, epsilon = 1e-12);
        assert_relative_eq!(d.cavity_height(), 17.8, epsilon = 1e-12);
    }

    #[test]
    fn test_interior_lengths() {
        let mut d = BinDims::new(1, 2, 3);
        d.wall = 1.5;
        assert_relative_eq!(d.inner_l(), 38.5, epsilon = 1e-12);
        assert_relative_eq!(d.inner_w(), 80.5, epsilon = 1e-12);
        assert_relative_eq!(d.inner_rad(), 2.25, epsilon = 1e-12);
        assert_relative_eq!(d.under_h(), 1.1, epsilon = 1e-12);
        assert_relative_eq!(d.lip_width(), 3.1, epsilon = 1e-12);
        d.lip = LipStyle::None;
        assert_relative_eq!(d.lip_width(), 0.0);
        assert_relative_eq!(d.int_height(), d.cavity_height());
    }

    #[test]
    fn test_extra_depth_raises_floor_only_past_nominal() {
        let mut d = BinDims::new(1, 1, 3);
        d.extra_depth = 2.0;
        assert_relative_eq!(d.floor_top(), BOTTOM_HEIGHT);
        d.extra_depth = 2.4;
        assert_relative_eq!(d.floor_top(), BASE_HEIGHT + 2.4);
        assert_relative_eq!(d.base_stack_height(), 7.15, epsilon = 1e-12);
    }

    #[test]
    fn test_lite_floor() {
        let mut d = BinDims::new(1, 1, 3);
        d.lite = true;
        d.wall = 0.8;
        assert_relative_eq!(d.floor_h(), 1.45, epsilon = 1e-12);
    }

    #[test]
    fn test_baseplate_padding() {
        let mut bp = BaseplateDims::new(3, 2);
        bp.padding = [1.0, 3.0, 0.0, 4.0];
        assert_relative_eq!(bp.outer_l(), 130.0, epsilon = 1e-12);
        assert_relative_eq!(bp.outer_w(), 88.0, epsilon = 1e-12);
        assert_eq!(bp.outline_center(), [1.0, 2.0]);
        assert!(bp.is_padded());
    }

    #[test]
    fn test_drawer_fit() {
        let pad = drawer_fit(3, 2, [130.0, 90.0]).unwrap();
        assert_eq!(pad, [2.0, 2.0, 3.0, 3.0]);
        assert!(drawer_fit(4, 2, [130.0, 90.0]).is_none());
        assert_eq!(units_for_drawer([130.0, 90.0]), [3, 2]);
    }
}
