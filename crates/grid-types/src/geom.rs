use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = [f64; 3]>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = Self::new(first, first);
        for p in iter {
            for i in 0..3 {
                bb.min[i] = bb.min[i].min(p[i]);
                bb.max[i] = bb.max[i].max(p[i]);
            }
        }
        Some(bb)
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s[0] * s[1] * s[2]
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    /// Overlapping region, or `None` when the boxes do not overlap with positive volume.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].max(other.min[i]);
            out.max[i] = out.max[i].min(other.max[i]);
            if out.max[i] <= out.min[i] {
                return None;
            }
        }
        Some(out)
    }

    /// Corner points, bottom four first.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [b[0], b[1], b[2]],
            [a[0], b[1], b[2]],
        ]
    }

    /// Bounding box of the transformed corners.
    pub fn transformed(&self, t: &Transform) -> BoundingBox {
        let pts = self.corners().map(|p| t.apply_point(p));
        let mut bb = BoundingBox::new(pts[0], pts[0]);
        for p in &pts[1..] {
            for i in 0..3 {
                bb.min[i] = bb.min[i].min(p[i]);
                bb.max[i] = bb.max[i].max(p[i]);
            }
        }
        bb
    }

    pub fn approx_eq(&self, other: &BoundingBox, tol: f64) -> bool {
        (0..3).all(|i| {
            (self.min[i] - other.min[i]).abs() <= tol && (self.max[i] - other.max[i]).abs() <= tol
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> [f64; 3] {
        let mut v = [0.0; 3];
        v[self.index()] = 1.0;
        v
    }
}

/// One of the three principal planes. Used both as a sketch plane and a mirror plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Plane {
    #[default]
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// In-plane axes `(u, v)` and the extrusion normal `n`.
    ///
    /// XZ extrudes along +Y, so its `(u, v, n)` frame is left-handed.
    pub fn frame(self) -> ([f64; 3], [f64; 3], [f64; 3]) {
        match self {
            Plane::XY => ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            Plane::XZ => ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            Plane::YZ => ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        }
    }

    /// The axis perpendicular to the plane.
    pub fn normal_axis(self) -> Axis {
        match self {
            Plane::XY => Axis::Z,
            Plane::XZ => Axis::Y,
            Plane::YZ => Axis::X,
        }
    }

    pub fn is_right_handed(self) -> bool {
        let (u, v, n) = self.frame();
        let c = cross(u, v);
        c[0] * n[0] + c[1] * n[1] + c[2] * n[2] > 0.0
    }
}

/// Rigid placement applied to a finished solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Transform {
    Translate {
        offset: [f64; 3],
    },
    Rotate {
        origin: [f64; 3],
        axis: Axis,
        degrees: f64,
    },
    Mirror {
        plane: Plane,
        origin: [f64; 3],
    },
}

impl Transform {
    pub fn translate(offset: [f64; 3]) -> Self {
        Transform::Translate { offset }
    }

    pub fn rotate_z(degrees: f64) -> Self {
        Transform::Rotate {
            origin: [0.0; 3],
            axis: Axis::Z,
            degrees,
        }
    }

    pub fn mirror(plane: Plane) -> Self {
        Transform::Mirror {
            plane,
            origin: [0.0; 3],
        }
    }

    /// Mirrors flip orientation, so kernels must re-orient faces afterwards.
    pub fn is_mirror(&self) -> bool {
        matches!(self, Transform::Mirror { .. })
    }

    pub fn apply_point(&self, p: [f64; 3]) -> [f64; 3] {
        match self {
            Transform::Translate { offset } => {
                [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]]
            }
            Transform::Rotate {
                origin,
                axis,
                degrees,
            } => {
                let (s, c) = degrees.to_radians().sin_cos();
                let q = [p[0] - origin[0], p[1] - origin[1], p[2] - origin[2]];
                let r = match axis {
                    Axis::X => [q[0], c * q[1] - s * q[2], s * q[1] + c * q[2]],
                    Axis::Y => [c * q[0] + s * q[2], q[1], -s * q[0] + c * q[2]],
                    Axis::Z => [c * q[0] - s * q[1], s * q[0] + c * q[1], q[2]],
                };
                [r[0] + origin[0], r[1] + origin[1], r[2] + origin[2]]
            }
            Transform::Mirror { plane, origin } => {
                let i = plane.normal_axis().index();
                let mut out = p;
                out[i] = 2.0 * origin[i] - p[i];
                out
            }
        }
    }
}

pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bbox_union_and_intersection() {
        let a = BoundingBox::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        let b = BoundingBox::new([1.0, 1.0, 1.0], [3.0, 3.0, 3.0]);
        assert_eq!(a.union(&b).size(), [3.0, 3.0, 3.0]);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.min, [1.0, 1.0, 1.0]);
        assert_eq!(i.max, [2.0, 2.0, 2.0]);

        let far = BoundingBox::new([5.0, 5.0, 5.0], [6.0, 6.0, 6.0]);
        assert!(a.intersection(&far).is_none());
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = Transform::rotate_z(90.0).apply_point([1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_flips_normal_axis() {
        let t = Transform::mirror(Plane::XY);
        assert_eq!(t.apply_point([1.0, 2.0, 3.0]), [1.0, 2.0, -3.0]);
        let bb = BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 2.0]).transformed(&t);
        assert_eq!(bb.min[2], -2.0);
        assert_eq!(bb.max[2], 0.0);
    }

    #[test]
    fn test_plane_handedness() {
        assert!(Plane::XY.is_right_handed());
        assert!(Plane::YZ.is_right_handed());
        assert!(!Plane::XZ.is_right_handed());
    }
}
