//! Planning primitives for grid storage parts.
//!
//! Turns grid counts and feature options into an [`OperationPlan`] of kernel
//! calls, and executes plans against any [`solid_kernel::Kernel`].

pub mod calibration;
pub mod constants;
pub mod constraints;
pub mod cutouts;
pub mod dims;
pub mod execute;
pub mod holes;
pub mod layout;
pub mod plan;
pub mod planner;
pub mod types;
pub mod wall_pattern;

pub use calibration::{init_taper_convention, probe_taper_convention, taper_convention};
pub use constraints::{ConfigErrors, Violation, Violations};
pub use execute::{execute_plan, Execution};
pub use plan::{NodeId, OperationPlan, PlanNode, PlanOp, Role};
pub use types::*;
