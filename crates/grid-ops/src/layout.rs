//! Grid layout and tiling.
//!
//! Point sets are always centred on their own centroid so that placing a
//! tool at each point lands it symmetrically inside the part.

use serde::{Deserialize, Serialize};

/// 2D positions in the part's XY frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlacementSet {
    pub points: Vec<[f64; 2]>,
}

impl PlacementSet {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64; 2]> {
        self.points.iter()
    }

    pub fn centroid(&self) -> [f64; 2] {
        if self.points.is_empty() {
            return [0.0, 0.0];
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        [sx / n, sy / n]
    }

    /// The same points shifted so their centroid is the origin.
    pub fn recentred(&self) -> PlacementSet {
        let c = self.centroid();
        self.translated([-c[0], -c[1]])
    }

    pub fn translated(&self, d: [f64; 2]) -> PlacementSet {
        PlacementSet::new(
            self.points
                .iter()
                .map(|p| [p[0] + d[0], p[1] + d[1]])
                .collect(),
        )
    }

    /// Points lifted to 3D at height `z`.
    pub fn at_height(&self, z: f64) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| [p[0], p[1], z]).collect()
    }
}

/// Centres of an `nx` x `ny` block of cells at `pitch`, centred on the origin.
pub fn cell_centres(nx: u32, ny: u32, pitch: f64) -> PlacementSet {
    let mut points = Vec::with_capacity((nx * ny) as usize);
    for i in 0..nx {
        for j in 0..ny {
            points.push([i as f64 * pitch, j as f64 * pitch]);
        }
    }
    PlacementSet::new(points).recentred()
}

/// Four points per cell at `(+-offset, +-offset)` from each centre.
pub fn hole_quads(cells: &PlacementSet, offset: f64) -> PlacementSet {
    let mut points = Vec::with_capacity(cells.len() * 4);
    for c in cells.iter() {
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                points.push([c[0] + sx * offset, c[1] + sy * offset]);
            }
        }
    }
    PlacementSet::new(points)
}

/// Arrangement of an auto-packed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackStyle {
    #[default]
    Square,
    /// Staggered rows; odd rows carry one item fewer. A single column has
    /// nothing to stagger against and packs as a square column.
    Hex,
}

/// Result of packing footprints into a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedLayout {
    pub style: PackStyle,
    pub nx: u32,
    pub ny: u32,
    /// Column and row pitch.
    pub pitch: [f64; 2],
    pub points: PlacementSet,
}

/// How many items of size `footprint` fit along `avail` at `pitch`.
pub fn fit_count(avail: f64, footprint: f64, pitch: f64) -> u32 {
    if footprint > avail || pitch <= 0.0 {
        return 0;
    }
    let mut n = (avail / pitch).floor() as u32 + 1;
    while n > 1 && (n - 1) as f64 * pitch + footprint > avail {
        n -= 1;
    }
    n
}

fn column_style(nx: u32, style: PackStyle) -> PackStyle {
    if nx == 1 {
        PackStyle::Square
    } else {
        style
    }
}

fn pitches(footprint: [f64; 2], spacing: f64, style: PackStyle) -> [f64; 2] {
    let px = footprint[0] + spacing;
    let py = footprint[1] + spacing;
    match style {
        PackStyle::Square => [px, py],
        PackStyle::Hex => [px, py * 3f64.sqrt() / 2.0],
    }
}

/// Lay out exactly `nx` x `ny` items; `None` for an empty request.
pub fn pack(
    footprint: [f64; 2],
    spacing: f64,
    nx: u32,
    ny: u32,
    style: PackStyle,
) -> Option<PackedLayout> {
    if nx == 0 || ny == 0 {
        return None;
    }
    let style = column_style(nx, style);
    let pitch = pitches(footprint, spacing, style);
    let mut points = Vec::new();
    for j in 0..ny {
        let odd = style == PackStyle::Hex && j % 2 == 1;
        let (count, shift) = if odd {
            (nx - 1, pitch[0] / 2.0)
        } else {
            (nx, 0.0)
        };
        for i in 0..count {
            points.push([i as f64 * pitch[0] + shift, j as f64 * pitch[1]]);
        }
    }
    Some(PackedLayout {
        style,
        nx,
        ny,
        pitch,
        points: PlacementSet::new(points).recentred(),
    })
}

/// Fit as many items as possible into `avail`; `None` when nothing fits.
pub fn auto_pack(
    footprint: [f64; 2],
    spacing: f64,
    avail: [f64; 2],
    style: PackStyle,
) -> Option<PackedLayout> {
    pack_within(footprint, spacing, avail, [None, None], style)
}

/// Like [`auto_pack`], but an axis with a fixed count keeps it and only the
/// open axes are fitted to `avail`.
pub fn pack_within(
    footprint: [f64; 2],
    spacing: f64,
    avail: [f64; 2],
    fixed: [Option<u32>; 2],
    style: PackStyle,
) -> Option<PackedLayout> {
    let nx = fixed[0]
        .unwrap_or_else(|| fit_count(avail[0], footprint[0], pitches(footprint, spacing, style)[0]));
    let pitch = pitches(footprint, spacing, column_style(nx, style));
    let ny = fixed[1].unwrap_or_else(|| fit_count(avail[1], footprint[1], pitch[1]));
    pack(footprint, spacing, nx, ny, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_centres_are_centred() {
        let c = cell_centres(3, 2, 42.0);
        assert_eq!(c.len(), 6);
        assert_eq!(c.points[0], [-42.0, -21.0]);
        assert_eq!(c.points[5], [42.0, 21.0]);
    }

    #[test]
    fn test_hole_quads() {
        let q = hole_quads(&cell_centres(1, 1, 42.0), 13.0);
        assert_eq!(
            q.points,
            vec![[-13.0, -13.0], [-13.0, 13.0], [13.0, -13.0], [13.0, 13.0]]
        );
    }

    #[test]
    fn test_fit_count() {
        assert_eq!(fit_count(100.0, 20.0, 22.0), 4);
        assert_eq!(fit_count(20.0, 20.0, 22.0), 1);
        assert_eq!(fit_count(19.0, 20.0, 22.0), 0);
        assert_eq!(fit_count(64.0, 20.0, 22.0), 3);
    }

    #[test]
    fn test_hex_odd_rows_shorter() {
        let l = pack([10.0, 10.0], 2.0, 3, 3, PackStyle::Hex).unwrap();
        assert_eq!(l.points.len(), 3 + 2 + 3);
        assert_relative_eq!(l.pitch[1], 12.0 * 3f64.sqrt() / 2.0);
    }

    #[test]
    fn test_hex_single_column_keeps_one_per_row() {
        let l = pack([10.0, 10.0], 2.0, 1, 2, PackStyle::Hex).unwrap();
        assert_eq!(l.points.len(), 2);
        assert_eq!(l.style, PackStyle::Square);
        assert!(l.points.iter().all(|p| p[0] == 0.0));
    }

    #[test]
    fn test_hex_single_column_fits_narrow_area() {
        let avail = [35.5, 77.5];
        let l = auto_pack([30.0, 30.0], 2.0, avail, PackStyle::Hex).unwrap();
        assert_eq!((l.nx, l.ny), (1, 2));
        assert_eq!(l.points.points, vec![[0.0, -16.0], [0.0, 16.0]]);
    }

    #[test]
    fn test_fixed_axis_keeps_its_count() {
        let l = pack_within([10.0, 10.0], 2.0, [80.0, 40.0], [Some(2), None], PackStyle::Square)
            .unwrap();
        assert_eq!((l.nx, l.ny), (2, 3));
        let l = pack_within([10.0, 10.0], 2.0, [80.0, 40.0], [None, Some(1)], PackStyle::Square)
            .unwrap();
        assert_eq!((l.nx, l.ny), (6, 1));
        assert_eq!(l.points.len(), 6);
    }

    #[test]
    fn test_infeasible_layout_is_none() {
        assert!(auto_pack([50.0, 10.0], 2.0, [40.0, 40.0], PackStyle::Square).is_none());
    }
}
