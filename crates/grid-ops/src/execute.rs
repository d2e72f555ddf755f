//! Runs an [`OperationPlan`] against a kernel.

use solid_kernel::{Kernel, KernelError, SolidHandle};
use tracing::{debug, instrument, warn};

use crate::plan::{NodeId, OperationPlan, PlanNode, PlanOp, Role};
use crate::types::OpError;

/// Result of executing a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub solid: SolidHandle,
    pub warnings: Vec<String>,
    /// Labels of cosmetic nodes that were skipped.
    pub skipped: Vec<String>,
}

enum Outcome {
    Done(SolidHandle),
    Failed(KernelError),
    Invalid,
}

fn input(results: &[Option<SolidHandle>], id: NodeId) -> Result<&SolidHandle, OpError> {
    results
        .get(id.0)
        .and_then(Option::as_ref)
        .ok_or(OpError::MissingNode { id: id.0 })
}

fn run_node(
    kernel: &mut dyn Kernel,
    node: &PlanNode,
    results: &[Option<SolidHandle>],
) -> Result<Outcome, OpError> {
    let out = match &node.op {
        PlanOp::Extrude {
            sketch,
            origin,
            length,
            taper_deg,
        } => kernel.extrude(sketch, *origin, *length, *taper_deg),
        PlanOp::Union { a, b } => {
            let (a, b) = (input(results, *a)?.clone(), input(results, *b)?.clone());
            kernel.boolean_union(&a, &b)
        }
        PlanOp::Cut { target, tool } => {
            let (t, tool) = (
                input(results, *target)?.clone(),
                input(results, *tool)?.clone(),
            );
            kernel.boolean_cut(&t, &tool)
        }
        PlanOp::Intersect { a, b } => {
            let (a, b) = (input(results, *a)?.clone(), input(results, *b)?.clone());
            kernel.boolean_intersect(&a, &b)
        }
        PlanOp::Fillet {
            target,
            edges,
            radius,
        } => {
            let t = input(results, *target)?.clone();
            kernel
                .select_edges(&t, edges)
                .and_then(|set| kernel.fillet(&t, &set, *radius))
        }
        PlanOp::Chamfer {
            target,
            edges,
            size,
        } => {
            let t = input(results, *target)?.clone();
            kernel
                .select_edges(&t, edges)
                .and_then(|set| kernel.chamfer(&t, &set, *size))
        }
        PlanOp::Transform { target, transform } => {
            let t = input(results, *target)?.clone();
            kernel.transform(&t, transform)
        }
        PlanOp::Pattern { target, offsets } => {
            let t = input(results, *target)?.clone();
            pattern(kernel, &t, offsets)
        }
    };
    Ok(match out {
        Ok(h) if kernel.is_valid(&h) => Outcome::Done(h),
        Ok(_) => Outcome::Invalid,
        Err(e) => Outcome::Failed(e),
    })
}

/// Translate copies of `solid` to each offset and union them.
fn pattern(
    kernel: &mut dyn Kernel,
    solid: &SolidHandle,
    offsets: &[[f64; 3]],
) -> Result<SolidHandle, KernelError> {
    let mut acc: Option<SolidHandle> = None;
    for off in offsets {
        let copy = kernel.translate(solid, *off)?;
        acc = Some(match acc {
            None => copy,
            Some(prev) => kernel.boolean_union(&prev, &copy)?,
        });
    }
    acc.ok_or_else(|| KernelError::Other {
        message: "pattern has no placements".to_string(),
    })
}

/// Execute every node in order and return the output solid.
///
/// Structural failures abort. A failing profile segment aborts the profile
/// it belongs to. Cosmetic failures are skipped with a warning unless
/// `strict_cosmetics` is set.
#[instrument(skip(kernel, plan), fields(nodes = plan.len()))]
pub fn execute_plan(
    kernel: &mut dyn Kernel,
    plan: &OperationPlan,
    strict_cosmetics: bool,
) -> Result<Execution, OpError> {
    let output = plan.output().ok_or(OpError::EmptyPlan)?;
    let mut results: Vec<Option<SolidHandle>> = Vec::with_capacity(plan.len());
    let mut warnings = Vec::new();
    let mut skipped = Vec::new();

    for (i, node) in plan.nodes.iter().enumerate() {
        let cosmetic = node.role == Role::Cosmetic;
        // A cosmetic node whose inputs were skipped is skipped with them.
        let missing = node
            .op
            .inputs()
            .into_iter()
            .find(|id| results.get(id.0).map_or(true, Option::is_none));
        let outcome = match missing {
            Some(id) if cosmetic => Outcome::Failed(KernelError::Other {
                message: format!("input node {} was skipped", id.0),
            }),
            Some(id) => return Err(OpError::MissingNode { id: id.0 }),
            None => run_node(kernel, node, &results)?,
        };

        let result = match (outcome, node.role) {
            (Outcome::Done(h), _) => {
                debug!(node = i, op = node.op.kind(), label = %node.label, "executed");
                Some(h)
            }
            (Outcome::Failed(e), Role::Structural) => {
                return Err(OpError::Geometry {
                    label: node.label.clone(),
                    source: e,
                })
            }
            (Outcome::Invalid, Role::Structural) => {
                return Err(OpError::InvalidSolid {
                    label: node.label.clone(),
                })
            }
            (Outcome::Failed(e), Role::ProfileSegment) => {
                return Err(OpError::ProfileAborted {
                    label: node.label.clone(),
                    reason: e.to_string(),
                })
            }
            (Outcome::Invalid, Role::ProfileSegment) => {
                return Err(OpError::ProfileAborted {
                    label: node.label.clone(),
                    reason: "segment produced an invalid solid".to_string(),
                })
            }
            (outcome, Role::Cosmetic) => {
                let reason = match outcome {
                    Outcome::Failed(e) => e.to_string(),
                    _ => "invalid solid".to_string(),
                };
                if strict_cosmetics {
                    return Err(OpError::Geometry {
                        label: node.label.clone(),
                        source: KernelError::Other { message: reason },
                    });
                }
                warn!(label = %node.label, %reason, "skipping cosmetic operation");
                warnings.push(format!("{}: {}", node.label, reason));
                skipped.push(node.label.clone());
                node.op
                    .primary_input()
                    .and_then(|id| results.get(id.0).cloned().flatten())
            }
        };
        results.push(result);
    }

    let solid = results
        .get(output.0)
        .cloned()
        .flatten()
        .ok_or(OpError::MissingNode { id: output.0 })?;
    Ok(Execution {
        solid,
        warnings,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_types::{EdgeSelector, Footprint, Sketch};
    use solid_kernel::MockKernel;

    fn block_plan() -> (OperationPlan, NodeId) {
        let mut plan = OperationPlan::new();
        let a = plan.extrude(Sketch::xy(Footprint::rect(10.0, 10.0)), [0.0; 3], 5.0, "block");
        let f = plan.fillet(a, EdgeSelector::Vertical, 0.5, "round");
        (plan, f)
    }

    #[test]
    fn test_cosmetic_failure_is_skipped() {
        let (plan, _) = block_plan();
        let mut k = MockKernel::new();
        k.fail_operation("fillet");
        let ex = execute_plan(&mut k, &plan, false).unwrap();
        assert_eq!(ex.skipped, vec!["round".to_string()]);
        assert_eq!(ex.warnings.len(), 1);
        assert!(k.is_valid(&ex.solid));
    }

    #[test]
    fn test_strict_cosmetics_fail() {
        let (plan, _) = block_plan();
        let mut k = MockKernel::new();
        k.fail_operation("fillet");
        let err = execute_plan(&mut k, &plan, true).unwrap_err();
        assert!(matches!(err, OpError::Geometry { ref label, .. } if label == "round"));
    }

    #[test]
    fn test_structural_failure_aborts() {
        let (plan, _) = block_plan();
        let mut k = MockKernel::new();
        k.fail_operation("extrude");
        assert!(matches!(
            execute_plan(&mut k, &plan, false),
            Err(OpError::Geometry { .. })
        ));
    }

    #[test]
    fn test_empty_plan() {
        let mut k = MockKernel::new();
        assert_eq!(
            execute_plan(&mut k, &OperationPlan::new(), false),
            Err(OpError::EmptyPlan)
        );
    }

    #[test]
    fn test_pattern_unions_copies() {
        let mut plan = OperationPlan::new();
        let a = plan.extrude(Sketch::xy(Footprint::rect(2.0, 2.0)), [0.0; 3], 1.0, "peg");
        plan.pattern(a, vec![[-5.0, 0.0, 0.0], [5.0, 0.0, 0.0]], "pegs");
        let mut k = MockKernel::new();
        let ex = execute_plan(&mut k, &plan, false).unwrap();
        let bb = k.bounding_box(&ex.solid).unwrap();
        assert_eq!(bb.min[0], -6.0);
        assert_eq!(bb.max[0], 6.0);
        assert_eq!(k.call_count("transform"), 2);
        assert_eq!(k.call_count("boolean_union"), 1);
    }
}
