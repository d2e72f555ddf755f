use grid_types::ProfileError;
use solid_kernel::KernelError;

/// Errors from planning or executing an operation plan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("{label}: {source}")]
    Geometry { label: String, source: KernelError },

    #[error("{label}: kernel produced an invalid or empty solid")]
    InvalidSolid { label: String },

    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("profile '{label}' aborted: {reason}")]
    ProfileAborted { label: String, reason: String },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("plan references node {id} before it has a result")]
    MissingNode { id: usize },

    #[error("plan is empty")]
    EmptyPlan,
}
