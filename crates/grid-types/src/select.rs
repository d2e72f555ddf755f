use serde::{Deserialize, Serialize};

use crate::geom::BoundingBox;

const SELECT_TOL: f64 = 1e-6;

/// Predicate over straight edge endpoints, evaluated by kernels in `select_edges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EdgeSelector {
    All,
    /// Parallel to Z.
    Vertical,
    /// Both endpoints at the same Z.
    Horizontal,
    /// Horizontal and lying at `z`.
    AtHeight { z: f64 },
    /// Both endpoints at or above `z`.
    Above { z: f64 },
    /// Both endpoints at or below `z`.
    Below { z: f64 },
    /// Both endpoints inside the box.
    Within { bbox: BoundingBox },
    And { all: Vec<EdgeSelector> },
    Or { any: Vec<EdgeSelector> },
    Not { inner: Box<EdgeSelector> },
}

impl EdgeSelector {
    pub fn and(self, other: EdgeSelector) -> EdgeSelector {
        EdgeSelector::And {
            all: vec![self, other],
        }
    }

    pub fn negate(self) -> EdgeSelector {
        EdgeSelector::Not {
            inner: Box::new(self),
        }
    }

    pub fn matches(&self, a: [f64; 3], b: [f64; 3]) -> bool {
        match self {
            EdgeSelector::All => true,
            EdgeSelector::Vertical => {
                (a[0] - b[0]).abs() < SELECT_TOL
                    && (a[1] - b[1]).abs() < SELECT_TOL
                    && (a[2] - b[2]).abs() > SELECT_TOL
            }
            EdgeSelector::Horizontal => (a[2] - b[2]).abs() < SELECT_TOL,
            EdgeSelector::AtHeight { z } => {
                (a[2] - z).abs() < SELECT_TOL && (b[2] - z).abs() < SELECT_TOL
            }
            EdgeSelector::Above { z } => a[2] >= z - SELECT_TOL && b[2] >= z - SELECT_TOL,
            EdgeSelector::Below { z } => a[2] <= z + SELECT_TOL && b[2] <= z + SELECT_TOL,
            EdgeSelector::Within { bbox } => [a, b].iter().all(|p| {
                (0..3).all(|i| p[i] >= bbox.min[i] - SELECT_TOL && p[i] <= bbox.max[i] + SELECT_TOL)
            }),
            EdgeSelector::And { all } => all.iter().all(|s| s.matches(a, b)),
            EdgeSelector::Or { any } => any.iter().any(|s| s.matches(a, b)),
            EdgeSelector::Not { inner } => !inner.matches(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_and_height_predicates() {
        let up = ([0.0, 0.0, 0.0], [0.0, 0.0, 5.0]);
        let flat = ([0.0, 0.0, 5.0], [3.0, 0.0, 5.0]);
        assert!(EdgeSelector::Vertical.matches(up.0, up.1));
        assert!(!EdgeSelector::Vertical.matches(flat.0, flat.1));
        assert!(EdgeSelector::AtHeight { z: 5.0 }.matches(flat.0, flat.1));
        assert!(!EdgeSelector::AtHeight { z: 5.0 }.matches(up.0, up.1));
    }

    #[test]
    fn test_combinators() {
        let sel = EdgeSelector::Vertical.and(EdgeSelector::Above { z: 1.0 }.negate());
        assert!(sel.matches([0.0, 0.0, 0.0], [0.0, 0.0, 0.5]));
        assert!(!sel.matches([0.0, 0.0, 2.0], [0.0, 0.0, 3.0]));
    }
}
