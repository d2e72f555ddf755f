use grid_ops::{ConfigErrors, OpError};
use grid_types::BoundingBox;
use serde::{Deserialize, Serialize};
use solid_kernel::SolidHandle;

/// Errors raised while configuring, planning or rendering a part.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigErrors),

    #[error("geometry failure in {component}: {source}")]
    Geometry { component: String, source: OpError },

    #[error("unknown item preset '{name}'. Available: {}", .available.join(", "))]
    UnknownPreset { name: String, available: Vec<String> },

    #[error("override '{key}' rejected: {reason}")]
    Override { key: String, reason: String },
}

impl EngineError {
    pub(crate) fn geometry(component: impl Into<String>, source: OpError) -> Self {
        EngineError::Geometry {
            component: component.into(),
            source,
        }
    }
}

/// Knobs that change how a plan is executed, not what it builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Turn skipped cosmetic operations into hard failures.
    pub strict_cosmetics: bool,
}

/// One rendered part.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub solid: SolidHandle,
    pub filename: String,
    pub bbox: BoundingBox,
    /// Labels of cosmetic operations that were skipped.
    pub skipped: Vec<String>,
    pub warnings: Vec<String>,
}
