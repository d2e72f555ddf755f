//! Decorative or weight-saving tile patterns cut through a flat wall.

use grid_types::{Footprint, Plane, Sketch};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::layout::PlacementSet;
use crate::plan::{NodeId, OperationPlan};

/// Tile spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternStyle {
    #[default]
    Hexgrid,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WallPatternSpec {
    pub style: PatternStyle,
    /// Tile size across its circumscribed circle.
    pub cell: f64,
    pub spacing: f64,
    /// Polygon sides; 32 or more gives a circle.
    pub sides: u32,
}

impl Default for WallPatternSpec {
    fn default() -> Self {
        Self {
            style: PatternStyle::Hexgrid,
            cell: PATTERN_CELL,
            spacing: PATTERN_SPACING,
            sides: PATTERN_SIDES,
        }
    }
}

impl WallPatternSpec {
    pub fn tile(&self) -> Footprint {
        let r = self.cell / 2.0;
        match self.sides {
            0..=2 | 4 => Footprint::rect(self.cell, self.cell),
            s if s >= 32 => Footprint::circle(r),
            s => Footprint::Polygon {
                sides: s,
                circumradius: r,
                rotation_deg: if s == 6 { 30.0 } else { 90.0 },
            },
        }
    }
}

/// Tile centres on a `canvas` centred on the origin; `None` if not even one
/// tile fits.
pub fn pattern_centres(canvas: [f64; 2], spec: &WallPatternSpec) -> Option<PlacementSet> {
    let c = spec.cell;
    if !(c > 0.0) || canvas[0] < c || canvas[1] < c {
        return None;
    }
    let mut points = Vec::new();
    match spec.style {
        PatternStyle::Grid => {
            let p = c + spec.spacing;
            let nx = ((canvas[0] + spec.spacing) / p).floor().max(1.0) as u32;
            let ny = ((canvas[1] + spec.spacing) / p).floor().max(1.0) as u32;
            for i in 0..nx {
                for j in 0..ny {
                    points.push([i as f64 * p, j as f64 * p]);
                }
            }
        }
        PatternStyle::Hexgrid => {
            // Columns stagger by half a row; odd columns carry one tile fewer
            // and the column count is kept odd so the pattern is symmetric.
            let dy = c + spec.spacing;
            let dx = (dy * dy - (dy / 2.0) * (dy / 2.0)).sqrt();
            let mut nx = ((canvas[0] - c) / dx).floor() as u32 + 1;
            if nx % 2 == 0 {
                nx -= 1;
            }
            let ny = ((canvas[1] - c) / dy).floor() as u32 + 1;
            for i in 0..nx {
                let (count, shift) = if i % 2 == 1 {
                    (ny - 1, dy / 2.0)
                } else {
                    (ny, 0.0)
                };
                for j in 0..count {
                    points.push([i as f64 * dx, j as f64 * dy + shift]);
                }
            }
        }
    }
    Some(PlacementSet::new(points).recentred())
}

/// Pattern tool for one wall.
///
/// `center` is the canvas centre; the tiles are extruded along the plane
/// normal starting at `center` for `depth`. Returns `None` when the canvas is
/// too small.
pub fn pattern_tool(
    plan: &mut OperationPlan,
    plane: Plane,
    center: [f64; 3],
    canvas: [f64; 2],
    depth: f64,
    spec: &WallPatternSpec,
    label: &str,
) -> Option<NodeId> {
    let centres = pattern_centres(canvas, spec)?;
    let sketch = Sketch::on(plane, spec.tile());
    let tile = plan.extrude(sketch.clone(), [0.0; 3], depth, format!("{} tile", label));
    let offsets = centres.iter().map(|p| sketch.lift(*p, center)).collect();
    Some(plan.pattern(tile, offsets, label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_canvas_yields_nothing() {
        let spec = WallPatternSpec::default();
        assert!(pattern_centres([7.0, 20.0], &spec).is_none());
    }

    #[test]
    fn test_single_cell_canvas() {
        let spec = WallPatternSpec::default();
        let c = pattern_centres([8.0, 8.0], &spec).unwrap();
        assert_eq!(c.points, vec![[0.0, 0.0]]);
    }

    #[test]
    fn test_grid_counts() {
        let spec = WallPatternSpec {
            style: PatternStyle::Grid,
            ..Default::default()
        };
        // (38 + 2) / 10 = 4 columns, (18 + 2) / 10 = 2 rows
        let c = pattern_centres([38.0, 18.0], &spec).unwrap();
        assert_eq!(c.len(), 8);
        let cen = c.centroid();
        assert!(cen[0].abs() < 1e-9 && cen[1].abs() < 1e-9);
    }

    #[test]
    fn test_hex_points_stay_on_canvas() {
        let spec = WallPatternSpec::default();
        let canvas = [60.0, 25.0];
        let c = pattern_centres(canvas, &spec).unwrap();
        assert!(c.len() > 4);
        for p in c.iter() {
            assert!(p[0].abs() <= (canvas[0] - spec.cell) / 2.0 + 1e-9);
            assert!(p[1].abs() <= (canvas[1] - spec.cell) / 2.0 + 1e-9);
        }
    }

    #[test]
    fn test_hex_pattern_is_centred() {
        let spec = WallPatternSpec::default();
        for canvas in [[71.5, 20.0], [60.0, 25.0], [30.0, 8.0], [9.0, 40.0]] {
            let c = pattern_centres(canvas, &spec).unwrap();
            let cen = c.centroid();
            assert!(cen[0].abs() < 1e-9 && cen[1].abs() < 1e-9, "{:?}: {:?}", canvas, cen);
            for p in c.iter() {
                assert!(p[0].abs() <= (canvas[0] - spec.cell) / 2.0 + 1e-9);
                assert!(p[1].abs() <= (canvas[1] - spec.cell) / 2.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_tile_shapes() {
        let mut spec = WallPatternSpec::default();
        assert!(matches!(spec.tile(), Footprint::Polygon { sides: 6, .. }));
        spec.sides = 4;
        assert!(matches!(spec.tile(), Footprint::Rect { .. }));
        spec.sides = 40;
        assert!(matches!(spec.tile(), Footprint::Circle { .. }));
    }
}
