use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::geom::Plane;

/// Segments used to approximate a full circle.
pub const CIRCLE_SEGMENTS: usize = 32;
/// Segments used to approximate one rounded corner.
pub const CORNER_SEGMENTS: usize = 8;

/// A closed planar outline, centred on its own origin unless it is an `Outline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Footprint {
    Rect {
        width: f64,
        depth: f64,
    },
    RoundedRect {
        width: f64,
        depth: f64,
        radius: f64,
    },
    Circle {
        radius: f64,
    },
    /// Regular polygon. The first vertex sits at `rotation_deg` from +u.
    Polygon {
        sides: u32,
        circumradius: f64,
        rotation_deg: f64,
    },
    /// Stadium whose straight sides run along u.
    Slot {
        length: f64,
        width: f64,
    },
    /// Arbitrary simple polygon in sketch coordinates.
    Outline {
        points: Vec<[f64; 2]>,
    },
}

impl Footprint {
    pub fn rect(width: f64, depth: f64) -> Self {
        Footprint::Rect { width, depth }
    }

    /// Rounded rectangle; degenerates to a plain rectangle for a non-positive radius.
    pub fn rounded_rect(width: f64, depth: f64, radius: f64) -> Self {
        if radius <= 0.0 {
            Footprint::Rect { width, depth }
        } else {
            Footprint::RoundedRect {
                width,
                depth,
                radius: radius.min(width / 2.0).min(depth / 2.0),
            }
        }
    }

    pub fn circle(radius: f64) -> Self {
        Footprint::Circle { radius }
    }

    /// Lateral extent `(u, v)`.
    pub fn extent(&self) -> [f64; 2] {
        match self {
            Footprint::Rect { width, depth } | Footprint::RoundedRect { width, depth, .. } => {
                [*width, *depth]
            }
            Footprint::Circle { radius } => [2.0 * radius, 2.0 * radius],
            Footprint::Slot { length, width } => [*length, *width],
            Footprint::Polygon { .. } | Footprint::Outline { .. } => {
                let pts = self.polygonize();
                let (mut lo, mut hi) = ([f64::MAX; 2], [f64::MIN; 2]);
                for p in &pts {
                    for i in 0..2 {
                        lo[i] = lo[i].min(p[i]);
                        hi[i] = hi[i].max(p[i]);
                    }
                }
                if pts.is_empty() {
                    [0.0, 0.0]
                } else {
                    [hi[0] - lo[0], hi[1] - lo[1]]
                }
            }
        }
    }

    /// Exact area of the ideal shape.
    pub fn area(&self) -> f64 {
        match self {
            Footprint::Rect { width, depth } => width * depth,
            Footprint::RoundedRect {
                width,
                depth,
                radius,
            } => width * depth - (4.0 - PI) * radius * radius,
            Footprint::Circle { radius } => PI * radius * radius,
            Footprint::Polygon {
                sides,
                circumradius,
                ..
            } => {
                let n = *sides as f64;
                0.5 * n * circumradius * circumradius * (2.0 * PI / n).sin()
            }
            Footprint::Slot { length, width } => {
                let r = width / 2.0;
                (length - width).max(0.0) * width + PI * r * r
            }
            Footprint::Outline { points } => signed_area(points).abs(),
        }
    }

    /// Grow (positive) or shrink (negative) the outline by `d`.
    ///
    /// Straight edges move by exactly `d`; rounded corners change radius by `d`
    /// and sharpen at zero. Returns `None` when the outline collapses.
    pub fn offset(&self, d: f64) -> Option<Footprint> {
        let out = match self {
            Footprint::Rect { width, depth } => Footprint::Rect {
                width: width + 2.0 * d,
                depth: depth + 2.0 * d,
            },
            Footprint::RoundedRect {
                width,
                depth,
                radius,
            } => {
                let (w, dp) = (width + 2.0 * d, depth + 2.0 * d);
                let r = radius + d;
                if r > 1e-9 {
                    Footprint::RoundedRect {
                        width: w,
                        depth: dp,
                        radius: r.min(w / 2.0).min(dp / 2.0),
                    }
                } else {
                    Footprint::Rect {
                        width: w,
                        depth: dp,
                    }
                }
            }
            Footprint::Circle { radius } => Footprint::Circle { radius: radius + d },
            Footprint::Polygon {
                sides,
                circumradius,
                rotation_deg,
            } => Footprint::Polygon {
                sides: *sides,
                circumradius: circumradius + d / (PI / *sides as f64).cos(),
                rotation_deg: *rotation_deg,
            },
            Footprint::Slot { length, width } => Footprint::Slot {
                length: length + 2.0 * d,
                width: width + 2.0 * d,
            },
            Footprint::Outline { points } => {
                let ccw = ensure_ccw(points.clone());
                let moved = offset_polygon(&ccw, d);
                if signed_area(&moved) <= 1e-12 {
                    return None;
                }
                Footprint::Outline { points: moved }
            }
        };
        let [u, v] = out.extent();
        if u <= 1e-9 || v <= 1e-9 || !out.dimensions_positive() {
            return None;
        }
        Some(out)
    }

    fn dimensions_positive(&self) -> bool {
        match self {
            Footprint::Rect { width, depth } | Footprint::RoundedRect { width, depth, .. } => {
                *width > 0.0 && *depth > 0.0
            }
            Footprint::Circle { radius } => *radius > 0.0,
            Footprint::Polygon {
                sides,
                circumradius,
                ..
            } => *sides >= 3 && *circumradius > 0.0,
            Footprint::Slot { length, width } => *width > 0.0 && *length >= *width,
            Footprint::Outline { points } => points.len() >= 3,
        }
    }

    /// Counter-clockwise polygon approximation.
    pub fn polygonize(&self) -> Vec<[f64; 2]> {
        match self {
            Footprint::Rect { width, depth } => {
                let (hw, hd) = (width / 2.0, depth / 2.0);
                vec![[-hw, -hd], [hw, -hd], [hw, hd], [-hw, hd]]
            }
            Footprint::RoundedRect {
                width,
                depth,
                radius,
            } => {
                let (hw, hd) = (width / 2.0 - radius, depth / 2.0 - radius);
                let centres = [[hw, -hd], [hw, hd], [-hw, hd], [-hw, -hd]];
                let mut pts = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
                for (k, c) in centres.iter().enumerate() {
                    let start = -PI / 2.0 + k as f64 * PI / 2.0;
                    for s in 0..=CORNER_SEGMENTS {
                        let a = start + (PI / 2.0) * s as f64 / CORNER_SEGMENTS as f64;
                        pts.push([c[0] + radius * a.cos(), c[1] + radius * a.sin()]);
                    }
                }
                dedup_closed(pts)
            }
            Footprint::Circle { radius } => (0..CIRCLE_SEGMENTS)
                .map(|i| {
                    let a = 2.0 * PI * i as f64 / CIRCLE_SEGMENTS as f64;
                    [radius * a.cos(), radius * a.sin()]
                })
                .collect(),
            Footprint::Polygon {
                sides,
                circumradius,
                rotation_deg,
            } => {
                let n = (*sides).max(3) as usize;
                let a0 = rotation_deg.to_radians();
                (0..n)
                    .map(|i| {
                        let a = a0 + 2.0 * PI * i as f64 / n as f64;
                        [circumradius * a.cos(), circumradius * a.sin()]
                    })
                    .collect()
            }
            Footprint::Slot { length, width } => {
                let r = width / 2.0;
                let hl = (length / 2.0 - r).max(0.0);
                let half = CIRCLE_SEGMENTS / 2;
                let mut pts = Vec::with_capacity(2 * (half + 1));
                for s in 0..=half {
                    let a = -PI / 2.0 + PI * s as f64 / half as f64;
                    pts.push([hl + r * a.cos(), r * a.sin()]);
                }
                for s in 0..=half {
                    let a = PI / 2.0 + PI * s as f64 / half as f64;
                    pts.push([-hl + r * a.cos(), r * a.sin()]);
                }
                dedup_closed(pts)
            }
            Footprint::Outline { points } => ensure_ccw(points.clone()),
        }
    }
}

/// A footprint placed on a principal plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub plane: Plane,
    pub footprint: Footprint,
    /// In-plane offset of the footprint origin.
    #[serde(default)]
    pub center: [f64; 2],
}

impl Sketch {
    pub fn xy(footprint: Footprint) -> Self {
        Self {
            plane: Plane::XY,
            footprint,
            center: [0.0, 0.0],
        }
    }

    pub fn on(plane: Plane, footprint: Footprint) -> Self {
        Self {
            plane,
            footprint,
            center: [0.0, 0.0],
        }
    }

    pub fn at(mut self, center: [f64; 2]) -> Self {
        self.center = center;
        self
    }

    pub fn with_footprint(&self, footprint: Footprint) -> Self {
        Self {
            plane: self.plane,
            footprint,
            center: self.center,
        }
    }

    /// Lift an in-plane point to 3D relative to `origin`.
    pub fn lift(&self, uv: [f64; 2], origin: [f64; 3]) -> [f64; 3] {
        let (u, v, _) = self.plane.frame();
        let (a, b) = (uv[0] + self.center[0], uv[1] + self.center[1]);
        [
            origin[0] + a * u[0] + b * v[0],
            origin[1] + a * u[1] + b * v[1],
            origin[2] + a * u[2] + b * v[2],
        ]
    }
}

/// Shoelace signed area; positive for counter-clockwise order.
pub fn signed_area(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i][0] * points[j][1] - points[j][0] * points[i][1];
    }
    sum / 2.0
}

fn ensure_ccw(mut points: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    if signed_area(&points) < 0.0 {
        points.reverse();
    }
    points
}

fn dedup_closed(mut pts: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    pts.dedup_by(|a, b| (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9);
    if pts.len() > 1 {
        let (f, l) = (pts[0], pts[pts.len() - 1]);
        if (f[0] - l[0]).abs() < 1e-9 && (f[1] - l[1]).abs() < 1e-9 {
            pts.pop();
        }
    }
    pts
}

/// Mitred offset of a counter-clockwise polygon. Vertex count is preserved,
/// so bottom and top rings of a tapered prism stay in one-to-one correspondence.
pub fn offset_polygon(points: &[[f64; 2]], d: f64) -> Vec<[f64; 2]> {
    let n = points.len();
    let normal = |a: [f64; 2], b: [f64; 2]| {
        let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
        let len = (dx * dx + dy * dy).sqrt().max(1e-12);
        [dy / len, -dx / len]
    };
    (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let n1 = normal(prev, cur);
            let n2 = normal(cur, next);
            let denom = 1.0 + n1[0] * n2[0] + n1[1] * n2[1];
            if denom.abs() < 1e-9 {
                [cur[0] + d * n1[0], cur[1] + d * n1[1]]
            } else {
                [
                    cur[0] + d * (n1[0] + n2[0]) / denom,
                    cur[1] + d * (n1[1] + n2[1]) / denom,
                ]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rounded_rect_area_and_polygon() {
        let fp = Footprint::rounded_rect(42.0, 42.0, 4.0);
        assert_relative_eq!(fp.area(), 42.0 * 42.0 - (4.0 - PI) * 16.0, epsilon = 1e-9);
        let pts = fp.polygonize();
        assert_eq!(pts.len(), 4 * (CORNER_SEGMENTS + 1));
        assert!(signed_area(&pts) > 0.0, "polygon must be counter-clockwise");
        assert_relative_eq!(signed_area(&pts), fp.area(), max_relative = 0.01);
    }

    #[test]
    fn test_offset_shrinks_rounded_rect_to_sharp() {
        let fp = Footprint::rounded_rect(41.5, 41.5, 3.75);
        let inner = fp.offset(-4.0).unwrap();
        match inner {
            Footprint::Rect { width, depth } => {
                assert_relative_eq!(width, 33.5);
                assert_relative_eq!(depth, 33.5);
            }
            other => panic!("expected sharp rect, got {:?}", other),
        }
    }

    #[test]
    fn test_offset_collapse_returns_none() {
        assert!(Footprint::circle(1.0).offset(-1.5).is_none());
        assert!(Footprint::rect(2.0, 10.0).offset(-1.0).is_none());
    }

    #[test]
    fn test_offset_outline_square() {
        let sq = Footprint::Outline {
            points: vec![[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0]],
        };
        let grown = sq.offset(1.0).unwrap();
        assert_relative_eq!(grown.area(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polygon_offset_moves_edges_by_distance() {
        let hex = Footprint::Polygon {
            sides: 6,
            circumradius: 4.0,
            rotation_deg: 0.0,
        };
        let apothem = |fp: &Footprint| match fp {
            Footprint::Polygon {
                sides,
                circumradius,
                ..
            } => circumradius * (PI / *sides as f64).cos(),
            _ => unreachable!(),
        };
        let grown = hex.offset(0.5).unwrap();
        assert_relative_eq!(apothem(&grown) - apothem(&hex), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sketch_lift_on_yz() {
        let sk = Sketch::on(Plane::YZ, Footprint::rect(1.0, 1.0)).at([2.0, 3.0]);
        assert_eq!(sk.lift([0.0, 0.0], [10.0, 0.0, 0.0]), [10.0, 2.0, 3.0]);
    }

    #[test]
    fn test_footprint_serde_tagged() {
        let json = serde_json::to_string(&Footprint::circle(3.0)).unwrap();
        assert!(json.contains("\"type\":\"Circle\""));
    }
}
