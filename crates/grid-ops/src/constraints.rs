//! Parameter validation, clamps, and the slab-depth rule.
//!
//! Validation collects every violation before reporting, so one rejected
//! config tells the caller everything that is wrong with it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::*;

pub const WALL_MIN: f64 = 0.5;
pub const WALL_MAX: f64 = 2.5;
pub const WALL_MAX_LITE: f64 = 1.5;

/// One rejected parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub parameter: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.parameter, self.message)
    }
}

/// Every violation found in one config.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", join(.violations))]
pub struct ConfigErrors {
    pub violations: Vec<Violation>,
}

fn join(v: &[Violation]) -> String {
    v.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigErrors {
    pub fn mentions(&self, parameter: &str) -> bool {
        self.violations.iter().any(|v| v.parameter == parameter)
    }
}

/// Accumulator used by `validate()` implementations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parameter: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation {
            parameter: parameter.into(),
            message: message.into(),
        });
    }

    /// Reject `value` outside `[lo, hi]`.
    pub fn check_range(&mut self, parameter: &str, value: f64, lo: f64, hi: f64) {
        if !(value >= lo && value <= hi) {
            self.push(
                parameter,
                format!("{} is outside the valid range [{}, {}]", value, lo, hi),
            );
        }
    }

    /// Reject a grid count of zero.
    pub fn check_units(&mut self, parameter: &str, value: u32) {
        if value == 0 {
            self.push(parameter, "must be a positive number of grid units");
        }
    }

    pub fn check_positive(&mut self, parameter: &str, value: f64) {
        if !(value > 0.0) {
            self.push(parameter, format!("{} must be greater than 0", value));
        }
    }

    /// Reject two options enabled together.
    pub fn exclusive(&mut self, a: (&str, bool), b: (&str, bool)) {
        if a.1 && b.1 {
            self.push(a.0, format!("cannot be combined with {}", b.0));
        }
    }

    pub fn require(&mut self, ok: bool, parameter: &str, message: impl Into<String>) {
        if !ok {
            self.push(parameter, message);
        }
    }

    pub fn check_wall(&mut self, wall: f64, lite: bool) {
        let hi = if lite { WALL_MAX_LITE } else { WALL_MAX };
        self.check_range("wall_th", wall, WALL_MIN, hi);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ConfigErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ConfigErrors { violations: self.0 })
        }
    }
}

/// Features that need slab depth below a receptacle or bin floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BottomFeature {
    /// Magnet recesses in a bin foot.
    BinHoles { refined: bool, bridged: bool },
    Magnets { refined: bool },
    Screws,
    Weights,
    Skeleton { magnets: bool, refined: bool },
    CornerScrews,
    ScrewTogether,
    /// An explicitly requested depth.
    Explicit(f64),
}

impl BottomFeature {
    pub fn required_depth(&self) -> f64 {
        let magnet = |refined: bool| {
            if refined {
                REFINED_HOLE_DEPTH
            } else {
                HOLE_DEPTH
            }
        };
        match *self {
            BottomFeature::BinHoles { refined, bridged } => {
                magnet(refined) + if bridged { HOLE_SLICE } else { 0.0 }
            }
            BottomFeature::Magnets { refined } => magnet(refined),
            BottomFeature::Screws => SCREW_DEPTH,
            BottomFeature::Weights => BP_BOTTOM_HEIGHT,
            BottomFeature::Skeleton { magnets, refined } => {
                SKELETON_HEIGHT
                    + if magnets { magnet(refined) } else { 0.0 }
                    + SKELETON_SCREW_CLEAR
            }
            BottomFeature::CornerScrews => CORNER_SCREW_DEPTH,
            BottomFeature::ScrewTogether => SCREW_TOGETHER_DEPTH,
            BottomFeature::Explicit(d) => d.max(0.0),
        }
    }
}

/// Slab depth is the deepest single requirement, never the sum.
pub fn slab_depth(features: &[BottomFeature]) -> f64 {
    features
        .iter()
        .map(BottomFeature::required_depth)
        .fold(0.0, f64::max)
}

/// Interior fillet radius, kept strictly inside the inner corner radius.
///
/// `None` disables the fillet.
pub fn clamp_fillet(requested: f64, inner_rad: f64) -> Option<f64> {
    let r = requested.min(inner_rad - EPS);
    if r < requested {
        warn!(requested, clamped = r, "fillet radius clamped to inner corner");
    }
    (r > 0.0).then_some(r)
}

/// Scoop radius limited by the cavity height.
pub fn clamp_scoop(radius: f64, scale: f64, int_height: f64) -> Option<f64> {
    let r = (radius * scale.clamp(0.0, 1.0)).min(int_height - 0.1);
    (r > 0.0).then_some(r)
}

/// Smallest of a requested size and its geometric limits.
pub fn clamp_to_limits(requested: f64, limits: &[f64]) -> Option<f64> {
    let r = limits.iter().copied().fold(requested, f64::min);
    (r > EPS).then_some(r)
}

/// Start a tool `EPS` below a face it opens.
pub fn below(z: f64) -> f64 {
    z - EPS
}

/// Extend a tool length past both faces it passes through.
pub fn through(length: f64) -> f64 {
    length + 2.0 * EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_violations_collects_all() {
        let mut v = Violations::new();
        v.check_wall(3.0, false);
        v.check_units("length_u", 0);
        v.exclusive(("solid", true), ("lite_style", true));
        let err = v.into_result().unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert!(err.mentions("wall_th"));
        assert!(err.to_string().contains("length_u"));
    }

    #[test]
    fn test_lite_wall_limit() {
        let mut v = Violations::new();
        v.check_wall(2.0, true);
        assert!(!v.is_empty());
        let mut v = Violations::new();
        v.check_wall(2.0, false);
        assert!(v.is_empty());
    }

    #[test]
    fn test_nan_is_out_of_range() {
        let mut v = Violations::new();
        v.check_range("x", f64::NAN, 0.0, 1.0);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_slab_depth_magnet_and_screw() {
        let d = slab_depth(&[
            BottomFeature::Magnets { refined: false },
            BottomFeature::Screws,
        ]);
        assert_relative_eq!(d, SCREW_DEPTH);
    }

    #[test]
    fn test_slab_depth_empty_is_zero() {
        assert_eq!(slab_depth(&[]), 0.0);
    }

    #[test]
    fn test_skeleton_contains_its_magnets() {
        let d = BottomFeature::Skeleton {
            magnets: true,
            refined: false,
        }
        .required_depth();
        assert_relative_eq!(d, 1.0 + 2.4 + 3.35, epsilon = 1e-12);
    }

    #[test]
    fn test_fillet_clamp_disables_at_zero() {
        assert_eq!(clamp_fillet(1.1, 0.005), None);
        assert_relative_eq!(clamp_fillet(1.1, 2.75).unwrap(), 1.1);
        assert_relative_eq!(clamp_fillet(1.1, 1.0).unwrap(), 0.99, epsilon = 1e-12);
    }

    #[test]
    fn test_scoop_clamp() {
        assert_relative_eq!(clamp_scoop(14.0, 1.0, 10.0).unwrap(), 9.9, epsilon = 1e-12);
        assert_relative_eq!(clamp_scoop(14.0, 0.5, 30.0).unwrap(), 7.0);
        assert_eq!(clamp_scoop(14.0, 1.0, 0.05), None);
    }
}
