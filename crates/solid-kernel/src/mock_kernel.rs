//! MockKernel: analytic test double implementing Kernel + KernelExport.
//!
//! Each solid is tracked as a bounding box, a volume and the twelve edges of
//! that box. Extrusion volumes are exact (prismoidal formula over the offset
//! outline); boolean volumes are estimated from bounding-box overlap scaled by
//! fill ratio. Every call is counted, and any operation can be made to fail,
//! so planners can be tested without a B-rep kernel.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::f64::consts::PI;

use grid_types::{BoundingBox, EdgeSelector, Footprint, Sketch, Transform};

use crate::traits::{Kernel, KernelExport};
use crate::types::*;

/// Volumes at or below this are treated as an empty result.
const EMPTY_VOLUME: f64 = 1e-9;

#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    start: [f64; 3],
    end: [f64; 3],
}

impl MockEdge {
    fn length(&self) -> f64 {
        let d = [
            self.end[0] - self.start[0],
            self.end[1] - self.start[1],
            self.end[2] - self.start[2],
        ];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }
}

#[derive(Debug, Clone)]
struct MockSolid {
    bbox: BoundingBox,
    volume: f64,
    edges: Vec<MockEdge>,
}

impl MockSolid {
    fn fill_ratio(&self) -> f64 {
        let bv = self.bbox.volume();
        if bv > EMPTY_VOLUME {
            (self.volume / bv).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Deterministic, analytic stand-in for the geometry kernel.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
    convention: TaperConvention,
    failing: HashSet<String>,
    calls: RefCell<BTreeMap<&'static str, usize>>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            solids: HashMap::new(),
            convention: TaperConvention::Vertical,
            failing: HashSet::new(),
            calls: RefCell::new(BTreeMap::new()),
        }
    }

    /// A mock that measures tapered extrusion length along the side wall.
    pub fn with_convention(convention: TaperConvention) -> Self {
        Self {
            convention,
            ..Self::new()
        }
    }

    pub fn taper_convention(&self) -> TaperConvention {
        self.convention
    }

    /// Make every subsequent call of `operation` fail (e.g. `"fillet"`).
    pub fn fail_operation(&mut self, operation: &str) {
        self.failing.insert(operation.to_string());
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Number of calls made to one operation.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.borrow().get(operation).copied().unwrap_or(0)
    }

    /// Number of calls made to any operation.
    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }

    pub fn reset_counts(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn record(&self, operation: &'static str) -> Result<(), KernelError> {
        *self.calls.borrow_mut().entry(operation).or_insert(0) += 1;
        if self.failing.contains(operation) {
            return Err(KernelError::Other {
                message: format!("injected failure in {}", operation),
            });
        }
        Ok(())
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn get(&self, handle: &SolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::SolidNotFound { id: handle.id() })
    }

    fn store(&mut self, bbox: BoundingBox, volume: f64) -> SolidHandle {
        let edges = self.box_edges(&bbox);
        let handle = self.alloc_handle();
        self.solids.insert(
            handle.id(),
            MockSolid {
                bbox,
                volume: volume.max(0.0),
                edges,
            },
        );
        handle
    }

    /// The 12 edges of a box: 4 bottom, 4 top, 4 vertical.
    fn box_edges(&mut self, bbox: &BoundingBox) -> Vec<MockEdge> {
        let c = bbox.corners();
        let pairs = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        pairs
            .iter()
            .map(|&(s, e)| MockEdge {
                id: self.alloc_id(),
                start: c[s],
                end: c[e],
            })
            .collect()
    }

    /// Overlap volume estimate: bbox overlap scaled by the sparser fill ratio.
    fn overlap(a: &MockSolid, b: &MockSolid) -> f64 {
        a.bbox
            .intersection(&b.bbox)
            .map(|i| i.volume() * a.fill_ratio().min(b.fill_ratio()))
            .unwrap_or(0.0)
    }

    /// Shared precondition checks for fillet and chamfer.
    fn edge_lengths(
        &self,
        solid: &MockSolid,
        edges: &EdgeSet,
        size: f64,
        operation: &str,
    ) -> Result<Vec<f64>, KernelError> {
        let fail = |reason: String| match operation {
            "fillet" => KernelError::FilletFailed { reason },
            _ => KernelError::ChamferFailed { reason },
        };
        if !(size > 0.0) {
            return Err(fail(format!("size must be positive, got {}", size)));
        }
        if edges.is_empty() {
            return Err(fail("no edges selected".to_string()));
        }
        let mut lengths = Vec::with_capacity(edges.len());
        for id in &edges.edges {
            let edge = solid
                .edges
                .iter()
                .find(|e| e.id == *id)
                .ok_or(KernelError::EntityNotFound { id: *id })?;
            let len = edge.length();
            if size * 2.0 >= len {
                return Err(fail(format!(
                    "size {} too large for edge of length {:.3}",
                    size, len
                )));
            }
            lengths.push(len);
        }
        Ok(lengths)
    }

    /// Deterministic box mesh of the bounding box: 2 triangles per face.
    fn tessellate_bbox(&mut self, bbox: &BoundingBox) -> RenderMesh {
        let c = bbox.corners();
        // Outward-facing quads, counter-clockwise seen from outside.
        let quads: [([usize; 4], [f32; 3]); 6] = [
            ([0, 3, 2, 1], [0.0, 0.0, -1.0]),
            ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
            ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
            ([2, 3, 7, 6], [0.0, 1.0, 0.0]),
            ([3, 0, 4, 7], [-1.0, 0.0, 0.0]),
            ([1, 2, 6, 5], [1.0, 0.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(72);
        let mut normals = Vec::with_capacity(72);
        let mut indices = Vec::with_capacity(36);
        let mut face_ranges = Vec::with_capacity(6);

        for (quad, n) in quads.iter() {
            let start_index = indices.len() as u32;
            let base_vertex = (vertices.len() / 3) as u32;
            for &i in quad {
                vertices.extend_from_slice(&[c[i][0] as f32, c[i][1] as f32, c[i][2] as f32]);
                normals.extend_from_slice(n);
            }
            // Two triangles: 0-1-2 and 0-2-3
            indices.extend_from_slice(&[
                base_vertex,
                base_vertex + 1,
                base_vertex + 2,
                base_vertex,
                base_vertex + 2,
                base_vertex + 3,
            ]);
            face_ranges.push(FaceRange {
                face_id: self.alloc_id(),
                start_index,
                end_index: indices.len() as u32,
            });
        }

        RenderMesh {
            vertices,
            normals,
            indices,
            face_ranges,
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Outline after moving inward by `inset`, or an extrude error if it collapses.
fn inset_outline(fp: &Footprint, inset: f64) -> Result<Footprint, KernelError> {
    if inset.abs() < 1e-12 {
        return Ok(fp.clone());
    }
    fp.offset(-inset).ok_or_else(|| KernelError::ExtrudeFailed {
        reason: format!("taper inset {:.3} collapses the outline", inset),
    })
}

impl Kernel for MockKernel {
    fn extrude(
        &mut self,
        sketch: &Sketch,
        origin: [f64; 3],
        length: f64,
        taper_deg: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.record("extrude")?;
        if !(length > 0.0) {
            return Err(KernelError::ExtrudeFailed {
                reason: format!("length must be positive, got {}", length),
            });
        }
        let area = sketch.footprint.area();
        if !(area > 0.0) {
            return Err(KernelError::ExtrudeFailed {
                reason: "sketch has no area".to_string(),
            });
        }

        let taper = taper_deg.to_radians();
        let rise = match self.convention {
            TaperConvention::Vertical => length,
            TaperConvention::AlongTaper => length * taper.cos(),
        };
        let inset = rise * taper.tan();
        let mid = inset_outline(&sketch.footprint, inset / 2.0)?;
        let top = inset_outline(&sketch.footprint, inset)?;
        let volume = rise * (area + 4.0 * mid.area() + top.area()) / 6.0;

        let (_, _, n) = sketch.plane.frame();
        let top_origin = [
            origin[0] + rise * n[0],
            origin[1] + rise * n[1],
            origin[2] + rise * n[2],
        ];
        let top_sketch = sketch.with_footprint(top);
        let points = sketch
            .footprint
            .polygonize()
            .into_iter()
            .map(|p| sketch.lift(p, origin))
            .chain(
                top_sketch
                    .footprint
                    .polygonize()
                    .into_iter()
                    .map(|p| top_sketch.lift(p, top_origin)),
            );
        let bbox = BoundingBox::from_points(points).ok_or_else(|| KernelError::ExtrudeFailed {
            reason: "sketch outline has no points".to_string(),
        })?;

        Ok(self.store(bbox, volume))
    }

    fn boolean_union(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.record("boolean_union")?;
        let (sa, sb) = (self.get(a)?.clone(), self.get(b)?.clone());
        let shared = Self::overlap(&sa, &sb).min(sa.volume.min(sb.volume));
        let volume = (sa.volume + sb.volume - shared).max(sa.volume.max(sb.volume));
        Ok(self.store(sa.bbox.union(&sb.bbox), volume))
    }

    fn boolean_cut(
        &mut self,
        target: &SolidHandle,
        tool: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.record("boolean_cut")?;
        let (sa, sb) = (self.get(target)?.clone(), self.get(tool)?.clone());
        let removed = Self::overlap(&sa, &sb).min(sb.volume);
        Ok(self.store(sa.bbox, sa.volume - removed))
    }

    fn boolean_intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.record("boolean_intersect")?;
        let (sa, sb) = (self.get(a)?.clone(), self.get(b)?.clone());
        match sa.bbox.intersection(&sb.bbox) {
            Some(bbox) => {
                let volume = Self::overlap(&sa, &sb).min(sa.volume).min(sb.volume);
                Ok(self.store(bbox, volume))
            }
            None => Ok(self.store(BoundingBox::new(sa.bbox.min, sa.bbox.min), 0.0)),
        }
    }

    fn select_edges(
        &self,
        solid: &SolidHandle,
        selector: &EdgeSelector,
    ) -> Result<EdgeSet, KernelError> {
        self.record("select_edges")?;
        let s = self.get(solid)?;
        Ok(EdgeSet {
            edges: s
                .edges
                .iter()
                .filter(|e| selector.matches(e.start, e.end))
                .map(|e| e.id)
                .collect(),
        })
    }

    fn fillet(
        &mut self,
        solid: &SolidHandle,
        edges: &EdgeSet,
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.record("fillet")?;
        let s = self.get(solid)?.clone();
        let lengths = self.edge_lengths(&s, edges, radius, "fillet")?;
        let removed: f64 = lengths
            .iter()
            .map(|len| (1.0 - PI / 4.0) * radius * radius * len)
            .sum();
        Ok(self.store(s.bbox, s.volume - removed))
    }

    fn chamfer(
        &mut self,
        solid: &SolidHandle,
        edges: &EdgeSet,
        size: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.record("chamfer")?;
        let s = self.get(solid)?.clone();
        let lengths = self.edge_lengths(&s, edges, size, "chamfer")?;
        let removed: f64 = lengths.iter().map(|len| 0.5 * size * size * len).sum();
        Ok(self.store(s.bbox, s.volume - removed))
    }

    fn transform(
        &mut self,
        solid: &SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        self.record("transform")?;
        let s = self.get(solid)?.clone();
        Ok(self.store(s.bbox.transformed(transform), s.volume))
    }

    fn is_valid(&self, solid: &SolidHandle) -> bool {
        if self.record("is_valid").is_err() {
            return false;
        }
        self.get(solid)
            .map(|s| s.volume > EMPTY_VOLUME && s.bbox.volume() > EMPTY_VOLUME)
            .unwrap_or(false)
    }

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError> {
        self.record("volume")?;
        Ok(self.get(solid)?.volume)
    }

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError> {
        self.record("bounding_box")?;
        Ok(self.get(solid)?.bbox)
    }
}

impl KernelExport for MockKernel {
    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        _tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        self.record("tessellate")?;
        let bbox = self.get(solid)?.bbox;
        Ok(self.tessellate_bbox(&bbox))
    }

    fn export_step(&self, _solid: &SolidHandle, _name: &str) -> Result<String, KernelError> {
        Err(KernelError::NotSupported {
            operation: "export_step".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use grid_types::{Axis, Plane};

    fn square(k: &mut MockKernel, side: f64, h: f64) -> SolidHandle {
        k.extrude(&Sketch::xy(Footprint::rect(side, side)), [0.0; 3], h, 0.0)
            .unwrap()
    }

    #[test]
    fn test_extrude_box_volume_and_bbox() {
        let mut k = MockKernel::new();
        let h = square(&mut k, 10.0, 5.0);
        assert_relative_eq!(k.volume(&h).unwrap(), 500.0, epsilon = 1e-9);
        let bb = k.bounding_box(&h).unwrap();
        assert_eq!(bb.min, [-5.0, -5.0, 0.0]);
        assert_eq!(bb.max, [5.0, 5.0, 5.0]);
        assert!(k.is_valid(&h));
    }

    #[test]
    fn test_tapered_frustum_volume() {
        let mut k = MockKernel::new();
        // 4x4 base, inset 1 over rise 1 -> 2x2 top: V = h/3 (A1 + A2 + sqrt(A1 A2))
        let h = k
            .extrude(&Sketch::xy(Footprint::rect(4.0, 4.0)), [0.0; 3], 1.0, 45.0)
            .unwrap();
        assert_relative_eq!(k.volume(&h).unwrap(), (16.0 + 4.0 + 8.0) / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_along_taper_convention_shortens_rise() {
        let mut k = MockKernel::with_convention(TaperConvention::AlongTaper);
        let h = k
            .extrude(&Sketch::xy(Footprint::rect(2.0, 2.0)), [0.0; 3], 1.0, 45.0)
            .unwrap();
        let bb = k.bounding_box(&h).unwrap();
        assert_relative_eq!(bb.size()[2], 45f64.to_radians().cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_taper_collapse_fails() {
        let mut k = MockKernel::new();
        let err = k
            .extrude(&Sketch::xy(Footprint::rect(2.0, 2.0)), [0.0; 3], 2.0, 45.0)
            .unwrap_err();
        assert!(matches!(err, KernelError::ExtrudeFailed { .. }));
    }

    #[test]
    fn test_extrude_on_yz_plane_runs_along_x() {
        let mut k = MockKernel::new();
        let sk = Sketch::on(Plane::YZ, Footprint::rect(2.0, 4.0));
        let h = k.extrude(&sk, [1.0, 0.0, 0.0], 3.0, 0.0).unwrap();
        let bb = k.bounding_box(&h).unwrap();
        assert_eq!(bb.min, [1.0, -1.0, -2.0]);
        assert_eq!(bb.max, [4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_cut_reduces_volume_and_keeps_bbox() {
        let mut k = MockKernel::new();
        let block = square(&mut k, 10.0, 10.0);
        let tool = square(&mut k, 4.0, 20.0);
        let cut = k.boolean_cut(&block, &tool).unwrap();
        assert_relative_eq!(k.volume(&cut).unwrap(), 1000.0 - 160.0, epsilon = 1e-9);
        assert_eq!(
            k.bounding_box(&cut).unwrap(),
            k.bounding_box(&block).unwrap()
        );
    }

    #[test]
    fn test_cut_everything_is_invalid() {
        let mut k = MockKernel::new();
        let block = square(&mut k, 2.0, 2.0);
        let tool = square(&mut k, 4.0, 4.0);
        let cut = k.boolean_cut(&block, &tool).unwrap();
        assert!(!k.is_valid(&cut));
    }

    #[test]
    fn test_disjoint_intersect_is_empty() {
        let mut k = MockKernel::new();
        let a = square(&mut k, 2.0, 2.0);
        let b = k.translate(&a, [10.0, 0.0, 0.0]).unwrap();
        let i = k.boolean_intersect(&a, &b).unwrap();
        assert!(!k.is_valid(&i));
    }

    #[test]
    fn test_union_bbox_and_volume() {
        let mut k = MockKernel::new();
        let a = square(&mut k, 2.0, 2.0);
        let b = k.translate(&a, [4.0, 0.0, 0.0]).unwrap();
        let u = k.boolean_union(&a, &b).unwrap();
        assert_relative_eq!(k.volume(&u).unwrap(), 16.0, epsilon = 1e-9);
        assert_eq!(k.bounding_box(&u).unwrap().size(), [6.0, 2.0, 2.0]);
    }

    #[test]
    fn test_fillet_selected_vertical_edges() {
        let mut k = MockKernel::new();
        let b = square(&mut k, 10.0, 10.0);
        let edges = k.select_edges(&b, &EdgeSelector::Vertical).unwrap();
        assert_eq!(edges.len(), 4);
        let f = k.fillet(&b, &edges, 1.0).unwrap();
        assert!(k.volume(&f).unwrap() < 1000.0);

        let err = k.fillet(&b, &edges, 6.0).unwrap_err();
        assert!(matches!(err, KernelError::FilletFailed { .. }));
        let err = k.fillet(&b, &EdgeSet::default(), 1.0).unwrap_err();
        assert!(matches!(err, KernelError::FilletFailed { .. }));
    }

    #[test]
    fn test_mirror_and_rotate() {
        let mut k = MockKernel::new();
        let b = square(&mut k, 2.0, 3.0);
        let m = k.mirror(&b, Plane::XY).unwrap();
        assert_eq!(k.bounding_box(&m).unwrap().min[2], -3.0);
        let r = k.rotate(&b, Axis::X, 90.0).unwrap();
        let bb = k.bounding_box(&r).unwrap();
        assert_relative_eq!(bb.size()[1], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_call_counting_and_failure_injection() {
        let mut k = MockKernel::new();
        assert_eq!(k.total_calls(), 0);
        let b = square(&mut k, 1.0, 1.0);
        assert_eq!(k.call_count("extrude"), 1);

        k.fail_operation("boolean_union");
        assert!(k.boolean_union(&b, &b).is_err());
        assert_eq!(k.call_count("boolean_union"), 1);
        assert_eq!(k.total_calls(), 2);

        k.reset_counts();
        assert_eq!(k.total_calls(), 0);
    }

    #[test]
    fn test_tessellate_bbox_mesh() {
        let mut k = MockKernel::new();
        let b = square(&mut k, 1.0, 1.0);
        let mesh = k.tessellate(&b, 0.1).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.face_ranges.len(), 6);
        assert!(k.export_step(&b, "x").is_err());
    }
}
