//! Operation plans: an ordered DAG of kernel calls.
//!
//! Nodes only reference earlier nodes, so executing them in order is a valid
//! topological order. Each node carries a role that decides how a failure is
//! handled.

use grid_types::{EdgeSelector, Profile, Sketch, Transform};
use serde::{Deserialize, Serialize};
use solid_kernel::TaperConvention;

use crate::planner::plan_profile;
use crate::types::OpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Failure policy of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Failure aborts the render.
    Structural,
    /// Failure is skipped and reported; the node passes its input through.
    Cosmetic,
    /// Part of one profile extrusion; failure aborts the whole profile.
    ProfileSegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum PlanOp {
    Extrude {
        sketch: Sketch,
        origin: [f64; 3],
        length: f64,
        taper_deg: f64,
    },
    Union {
        a: NodeId,
        b: NodeId,
    },
    Cut {
        target: NodeId,
        tool: NodeId,
    },
    Intersect {
        a: NodeId,
        b: NodeId,
    },
    Fillet {
        target: NodeId,
        edges: EdgeSelector,
        radius: f64,
    },
    Chamfer {
        target: NodeId,
        edges: EdgeSelector,
        size: f64,
    },
    Transform {
        target: NodeId,
        transform: Transform,
    },
    /// Copies of `target` translated to each offset, unioned.
    Pattern {
        target: NodeId,
        offsets: Vec<[f64; 3]>,
    },
}

impl PlanOp {
    /// Nodes this op reads.
    pub fn inputs(&self) -> Vec<NodeId> {
        match self {
            PlanOp::Extrude { .. } => Vec::new(),
            PlanOp::Union { a, b } | PlanOp::Intersect { a, b } => vec![*a, *b],
            PlanOp::Cut { target, tool } => vec![*target, *tool],
            PlanOp::Fillet { target, .. }
            | PlanOp::Chamfer { target, .. }
            | PlanOp::Transform { target, .. }
            | PlanOp::Pattern { target, .. } => vec![*target],
        }
    }

    /// The input a skipped node passes through.
    pub fn primary_input(&self) -> Option<NodeId> {
        self.inputs().first().copied()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlanOp::Extrude { .. } => "extrude",
            PlanOp::Union { .. } => "union",
            PlanOp::Cut { .. } => "cut",
            PlanOp::Intersect { .. } => "intersect",
            PlanOp::Fillet { .. } => "fillet",
            PlanOp::Chamfer { .. } => "chamfer",
            PlanOp::Transform { .. } => "transform",
            PlanOp::Pattern { .. } => "pattern",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    pub op: PlanOp,
    pub role: Role,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationPlan {
    pub nodes: Vec<PlanNode>,
    pub output: Option<NodeId>,
}

impl OperationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&PlanNode> {
        self.nodes.get(id.0)
    }

    pub fn push(&mut self, op: PlanOp, role: Role, label: impl Into<String>) -> NodeId {
        self.nodes.push(PlanNode {
            op,
            role,
            label: label.into(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn set_role(&mut self, id: NodeId, role: Role) {
        if let Some(n) = self.nodes.get_mut(id.0) {
            n.role = role;
        }
    }

    pub fn set_output(&mut self, id: NodeId) {
        self.output = Some(id);
    }

    /// Declared output, or the last node.
    pub fn output(&self) -> Option<NodeId> {
        self.output
            .or_else(|| self.nodes.len().checked_sub(1).map(NodeId))
    }

    pub fn extrude(
        &mut self,
        sketch: Sketch,
        origin: [f64; 3],
        length: f64,
        label: impl Into<String>,
    ) -> NodeId {
        self.push(
            PlanOp::Extrude {
                sketch,
                origin,
                length,
                taper_deg: 0.0,
            },
            Role::Structural,
            label,
        )
    }

    pub fn union(&mut self, a: NodeId, b: NodeId, label: impl Into<String>) -> NodeId {
        self.push(PlanOp::Union { a, b }, Role::Structural, label)
    }

    pub fn cut(&mut self, target: NodeId, tool: NodeId, label: impl Into<String>) -> NodeId {
        self.push(PlanOp::Cut { target, tool }, Role::Structural, label)
    }

    pub fn intersect(&mut self, a: NodeId, b: NodeId, label: impl Into<String>) -> NodeId {
        self.push(PlanOp::Intersect { a, b }, Role::Structural, label)
    }

    /// Fillets are always cosmetic.
    pub fn fillet(
        &mut self,
        target: NodeId,
        edges: EdgeSelector,
        radius: f64,
        label: impl Into<String>,
    ) -> NodeId {
        self.push(
            PlanOp::Fillet {
                target,
                edges,
                radius,
            },
            Role::Cosmetic,
            label,
        )
    }

    /// Chamfers are always cosmetic.
    pub fn chamfer(
        &mut self,
        target: NodeId,
        edges: EdgeSelector,
        size: f64,
        label: impl Into<String>,
    ) -> NodeId {
        self.push(
            PlanOp::Chamfer {
                target,
                edges,
                size,
            },
            Role::Cosmetic,
            label,
        )
    }

    pub fn transform(
        &mut self,
        target: NodeId,
        transform: Transform,
        label: impl Into<String>,
    ) -> NodeId {
        self.push(
            PlanOp::Transform { target, transform },
            Role::Structural,
            label,
        )
    }

    pub fn translate(
        &mut self,
        target: NodeId,
        offset: [f64; 3],
        label: impl Into<String>,
    ) -> NodeId {
        self.transform(target, Transform::translate(offset), label)
    }

    pub fn pattern(
        &mut self,
        target: NodeId,
        offsets: Vec<[f64; 3]>,
        label: impl Into<String>,
    ) -> NodeId {
        self.push(
            PlanOp::Pattern { target, offsets },
            Role::Structural,
            label,
        )
    }

    /// Union a list of nodes left to right; `None` for an empty list.
    pub fn union_all(&mut self, nodes: &[NodeId], label: &str) -> Option<NodeId> {
        let (first, rest) = nodes.split_first()?;
        let mut acc = *first;
        for n in rest {
            acc = self.union(acc, *n, label);
        }
        Some(acc)
    }

    /// Extrude a stacked profile, one node per segment, unioned bottom up.
    pub fn profile(
        &mut self,
        sketch: &Sketch,
        origin: [f64; 3],
        profile: &Profile,
        convention: TaperConvention,
        label: &str,
    ) -> Result<NodeId, OpError> {
        let steps = plan_profile(sketch, origin, profile, convention)?;
        let mut acc: Option<NodeId> = None;
        for (i, step) in steps.into_iter().enumerate() {
            let seg = self.push(
                PlanOp::Extrude {
                    sketch: step.sketch,
                    origin: step.origin,
                    length: step.length,
                    taper_deg: step.taper_deg,
                },
                Role::ProfileSegment,
                format!("{} [{}]", label, i),
            );
            acc = Some(match acc {
                None => seg,
                Some(prev) => self.push(
                    PlanOp::Union { a: prev, b: seg },
                    Role::ProfileSegment,
                    label,
                ),
            });
        }
        acc.ok_or(OpError::EmptyPlan)
    }

    /// Number of nodes of one kind, e.g. `"cut"`.
    pub fn count(&self, kind: &str) -> usize {
        self.nodes.iter().filter(|n| n.op.kind() == kind).count()
    }

    /// Labels of all nodes, in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.label.as_str())
    }
}
