//! Grid storage parts: typed specs, the bin shell pipeline and rendering.
//!
//! Every part is described by a serde spec, normalised and validated before
//! a kernel is touched, turned into an [`grid_ops::OperationPlan`] and
//! executed by a [`Renderer`].

pub mod baseplate;
pub mod bin;
pub mod component;
pub mod drawer;
pub mod item_holder;
pub mod lid;
pub mod overrides;
pub mod presets;
pub mod render;
pub mod shell;
pub mod tray;
pub mod types;

pub use baseplate::BaseplateSpec;
pub use bin::{BinSpec, LabelStyle, PatternWalls};
pub use component::ComponentSpec;
pub use drawer::{ChestSpec, DrawerSpec};
pub use item_holder::{GridStyle, ItemHolderSpec};
pub use lid::{LidSpec, LidStyle};
pub use overrides::apply_overrides;
pub use render::{render, Renderer};
pub use shell::{build_shell, ShellBuild, ShellFeatures};
pub use tray::TraySpec;
pub use types::{EngineError, RenderOptions, Rendered};
