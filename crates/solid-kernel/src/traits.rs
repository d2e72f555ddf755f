use grid_types::{Axis, BoundingBox, EdgeSelector, Plane, Sketch, Transform};

use crate::types::*;

/// Core solid-modeling trait. Every planned operation is one of these calls.
/// Implemented by TruckKernel (real B-rep) and MockKernel (analytic test double).
pub trait Kernel {
    /// Extrude a sketch from `origin` along its plane normal.
    ///
    /// A non-zero `taper_deg` narrows (positive) or widens (negative) the
    /// outline. How `length` relates to the vertical rise for tapered
    /// extrusions is kernel specific, see [`TaperConvention`].
    fn extrude(
        &mut self,
        sketch: &Sketch,
        origin: [f64; 3],
        length: f64,
        taper_deg: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn boolean_union(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean subtraction: target minus tool.
    fn boolean_cut(
        &mut self,
        target: &SolidHandle,
        tool: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean intersection of two solids.
    fn boolean_intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Edges of `solid` whose endpoints satisfy the selector.
    fn select_edges(
        &self,
        solid: &SolidHandle,
        selector: &EdgeSelector,
    ) -> Result<EdgeSet, KernelError>;

    /// Round the given edges.
    fn fillet(
        &mut self,
        solid: &SolidHandle,
        edges: &EdgeSet,
        radius: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Bevel the given edges.
    fn chamfer(
        &mut self,
        solid: &SolidHandle,
        edges: &EdgeSet,
        size: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Apply a rigid transform, producing a new solid.
    fn transform(
        &mut self,
        solid: &SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError>;

    fn translate(
        &mut self,
        solid: &SolidHandle,
        offset: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        self.transform(solid, &Transform::Translate { offset })
    }

    fn rotate(
        &mut self,
        solid: &SolidHandle,
        axis: Axis,
        degrees: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.transform(
            solid,
            &Transform::Rotate {
                origin: [0.0; 3],
                axis,
                degrees,
            },
        )
    }

    fn mirror(&mut self, solid: &SolidHandle, plane: Plane) -> Result<SolidHandle, KernelError> {
        self.transform(solid, &Transform::mirror(plane))
    }

    /// True when the solid is closed, non-empty and well oriented.
    fn is_valid(&self, solid: &SolidHandle) -> bool;

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError>;

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError>;
}

/// Serialization side of a kernel: meshing and STEP output.
pub trait KernelExport {
    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError>;

    /// STEP (AP203) text for the solid.
    fn export_step(&self, solid: &SolidHandle, name: &str) -> Result<String, KernelError>;
}

/// Combined trait for callers that need modeling and export on one object.
pub trait KernelBundle: Kernel + KernelExport {
    fn as_kernel(&mut self) -> &mut dyn Kernel;
}

// Blanket implementation for any type that implements both traits
impl<T: Kernel + KernelExport> KernelBundle for T {
    fn as_kernel(&mut self) -> &mut dyn Kernel {
        self
    }
}
