//! TruckKernel: real geometry kernel wrapping truck's API.

use std::collections::{HashMap, HashSet};

use grid_types::{offset_polygon, signed_area, BoundingBox, EdgeSelector, Sketch, Transform};
use tracing::debug;
use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};
use truck_stepio::out;
use truck_topology::shell::ShellCondition;

use crate::primitives;
use crate::tessellation;
use crate::traits::{Kernel, KernelExport};
use crate::types::*;

/// Tolerance handed to truck-shapeops booleans.
const BOOLEAN_TOL: f64 = 0.05;
/// Chord tolerance for volume integration.
const MESH_TOL: f64 = 0.01;

/// Real geometry kernel backed by the truck BREP library.
///
/// Extrusion length is always the vertical rise ([`TaperConvention::Vertical`]).
/// Fillet and chamfer are not available in truck and report `NotSupported`.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &SolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::SolidNotFound { id: handle.id() })
    }

    fn pair(&self, a: &SolidHandle, b: &SolidHandle) -> Result<(Solid, Solid), KernelError> {
        Ok((self.get_solid(a)?.clone(), self.get_solid(b)?.clone()))
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

fn signed_tet(p: Point3, q: Point3, r: Point3) -> f64 {
    p.to_vec().dot(q.to_vec().cross(r.to_vec())) / 6.0
}

impl Kernel for TruckKernel {
    fn extrude(
        &mut self,
        sketch: &Sketch,
        origin: [f64; 3],
        length: f64,
        taper_deg: f64,
    ) -> Result<SolidHandle, KernelError> {
        if !(length > 0.0) {
            return Err(KernelError::ExtrudeFailed {
                reason: format!("length must be positive, got {}", length),
            });
        }
        let ring = sketch.footprint.polygonize();
        let inset = length * taper_deg.to_radians().tan();
        let top_ring = if inset.abs() > 1e-12 {
            offset_polygon(&ring, -inset)
        } else {
            ring.clone()
        };
        if signed_area(&top_ring) <= 1e-12 {
            return Err(KernelError::ExtrudeFailed {
                reason: format!("taper inset {:.3} collapses the outline", inset),
            });
        }

        let (_, _, n) = sketch.plane.frame();
        let top_origin = [
            origin[0] + length * n[0],
            origin[1] + length * n[1],
            origin[2] + length * n[2],
        ];
        let mut bottom: Vec<Point3> = ring.iter().map(|&p| point(sketch.lift(p, origin))).collect();
        let mut top: Vec<Point3> = top_ring
            .iter()
            .map(|&p| point(sketch.lift(p, top_origin)))
            .collect();
        if !sketch.plane.is_right_handed() {
            bottom.reverse();
            top.reverse();
        }

        debug!(plane = ?sketch.plane, length, taper_deg, vertices = bottom.len(), "extruding prism");
        let solid = primitives::make_prism(&bottom, &top)?;
        Ok(self.store_solid(solid))
    }

    fn boolean_union(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let (solid_a, solid_b) = self.pair(a, b)?;
        let result = truck_shapeops::or(&solid_a, &solid_b, BOOLEAN_TOL).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn boolean_cut(
        &mut self,
        target: &SolidHandle,
        tool: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let (solid_a, mut solid_b) = self.pair(target, tool)?;
        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOL).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn boolean_intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let (solid_a, solid_b) = self.pair(a, b)?;
        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOL).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn select_edges(
        &self,
        solid: &SolidHandle,
        selector: &EdgeSelector,
    ) -> Result<EdgeSet, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        let mut index = 0u64;
        for shell in truck_solid.boundaries().iter() {
            for edge in shell.edge_iter() {
                // Each edge appears once per adjacent face
                if !seen.insert(edge.id()) {
                    continue;
                }
                let (a, b) = (edge.front().point(), edge.back().point());
                if selector.matches([a.x, a.y, a.z], [b.x, b.y, b.z]) {
                    edges.push(KernelId(index));
                }
                index += 1;
            }
        }
        Ok(EdgeSet { edges })
    }

    fn fillet(
        &mut self,
        _solid: &SolidHandle,
        _edges: &EdgeSet,
        _radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet".to_string(),
        })
    }

    fn chamfer(
        &mut self,
        _solid: &SolidHandle,
        _edges: &EdgeSet,
        _size: f64,
    ) -> Result<SolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "chamfer".to_string(),
        })
    }

    fn transform(
        &mut self,
        solid: &SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        let moved = match transform {
            Transform::Translate { offset } => {
                builder::translated(truck_solid, Vector3::new(offset[0], offset[1], offset[2]))
            }
            Transform::Rotate {
                origin,
                axis,
                degrees,
            } => {
                let a = axis.unit();
                builder::rotated(
                    truck_solid,
                    point(*origin),
                    Vector3::new(a[0], a[1], a[2]),
                    Rad(degrees.to_radians()),
                )
            }
            Transform::Mirror { plane, origin } => {
                let mut scale = [1.0; 3];
                scale[plane.normal_axis().index()] = -1.0;
                let o = Vector3::new(origin[0], origin[1], origin[2]);
                let mat = Matrix4::from_translation(o)
                    * Matrix4::from_nonuniform_scale(scale[0], scale[1], scale[2])
                    * Matrix4::from_translation(-o);
                let mut mirrored = builder::transformed(truck_solid, mat);
                // Reflection flips orientation
                mirrored.not();
                mirrored
            }
        };
        Ok(self.store_solid(moved))
    }

    fn is_valid(&self, solid: &SolidHandle) -> bool {
        let Ok(truck_solid) = self.get_solid(solid) else {
            return false;
        };
        let shells = truck_solid.boundaries();
        !shells.is_empty()
            && shells
                .iter()
                .all(|s| s.shell_condition() == ShellCondition::Closed)
            && self.volume(solid).map(|v| v > 0.0).unwrap_or(false)
    }

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError> {
        let mesh = tessellation::solid_polygon(self.get_solid(solid)?, MESH_TOL);
        let pos = mesh.positions();
        let mut volume = 0.0;
        for tri in mesh.tri_faces() {
            volume += signed_tet(pos[tri[0].pos], pos[tri[1].pos], pos[tri[2].pos]);
        }
        for quad in mesh.quad_faces() {
            volume += signed_tet(pos[quad[0].pos], pos[quad[1].pos], pos[quad[2].pos]);
            volume += signed_tet(pos[quad[0].pos], pos[quad[2].pos], pos[quad[3].pos]);
        }
        for poly in mesh.other_faces() {
            for k in 1..poly.len().saturating_sub(1) {
                volume += signed_tet(pos[poly[0].pos], pos[poly[k].pos], pos[poly[k + 1].pos]);
            }
        }
        Ok(volume)
    }

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        let points = truck_solid.boundaries().iter().flat_map(|shell| {
            shell
                .vertex_iter()
                .map(|v| {
                    let p = v.point();
                    [p.x, p.y, p.z]
                })
                .collect::<Vec<_>>()
        });
        BoundingBox::from_points(points).ok_or(KernelError::Other {
            message: "solid has no vertices".to_string(),
        })
    }
}

impl KernelExport for TruckKernel {
    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        let truck_solid = self
            .solids
            .get(&solid.id())
            .ok_or(KernelError::SolidNotFound { id: solid.id() })?;
        tessellation::tessellate_solid(truck_solid, tolerance, &mut self.next_id)
    }

    fn export_step(&self, solid: &SolidHandle, name: &str) -> Result<String, KernelError> {
        let compressed = self.get_solid(solid)?.compress();
        debug!(name, "exporting STEP");
        Ok(out::CompleteStepDisplay::new(
            out::StepModel::from(&compressed),
            out::StepHeaderDescriptor {
                organization_system: "gridfinity-plan".to_owned(),
                ..Default::default()
            },
        )
        .to_string())
    }
}
