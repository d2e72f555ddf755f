//! One enum over every part the engine can build.

use grid_ops::OperationPlan;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use solid_kernel::TaperConvention;

use crate::baseplate::BaseplateSpec;
use crate::bin::BinSpec;
use crate::drawer::{ChestSpec, DrawerSpec};
use crate::item_holder::ItemHolderSpec;
use crate::lid::LidSpec;
use crate::overrides::apply_overrides;
use crate::shell::build_shell;
use crate::tray::TraySpec;
use crate::types::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spec", rename_all = "snake_case")]
pub enum ComponentSpec {
    Bin(BinSpec),
    Baseplate(BaseplateSpec),
    Lid(LidSpec),
    Drawer(DrawerSpec),
    Chest(ChestSpec),
    Tray(TraySpec),
    ItemHolder(ItemHolderSpec),
}

impl ComponentSpec {
    pub fn bin(length_u: u32, width_u: u32, height_u: u32) -> Self {
        ComponentSpec::Bin(BinSpec::new(length_u, width_u, height_u))
    }

    pub fn baseplate(length_u: u32, width_u: u32) -> Self {
        ComponentSpec::Baseplate(BaseplateSpec::new(length_u, width_u))
    }

    pub fn lid(length_u: u32, width_u: u32) -> Self {
        ComponentSpec::Lid(LidSpec::new(length_u, width_u))
    }

    pub fn drawer(length_u: u32, width_u: u32, height_u: u32) -> Self {
        ComponentSpec::Drawer(DrawerSpec::new(length_u, width_u, height_u))
    }

    pub fn chest(length_u: u32, width_u: u32, drawers: u32, drawer_height_u: u32) -> Self {
        ComponentSpec::Chest(ChestSpec::new(length_u, width_u, drawers, drawer_height_u))
    }

    pub fn tray(length_u: u32, width_u: u32, height_u: u32) -> Self {
        ComponentSpec::Tray(TraySpec::new(length_u, width_u, height_u))
    }

    pub fn item_holder(holder: ItemHolderSpec) -> Self {
        ComponentSpec::ItemHolder(holder)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ComponentSpec::Bin(_) => "bin",
            ComponentSpec::Baseplate(_) => "baseplate",
            ComponentSpec::Lid(_) => "lid",
            ComponentSpec::Drawer(_) => "drawer",
            ComponentSpec::Chest(_) => "chest",
            ComponentSpec::Tray(_) => "tray",
            ComponentSpec::ItemHolder(_) => "item_holder",
        }
    }

    pub fn normalized(&self) -> ComponentSpec {
        match self {
            ComponentSpec::Bin(b) => ComponentSpec::Bin(b.normalized()),
            ComponentSpec::Baseplate(b) => ComponentSpec::Baseplate(b.normalized()),
            ComponentSpec::Tray(t) => ComponentSpec::Tray(t.normalized()),
            ComponentSpec::ItemHolder(h) => ComponentSpec::ItemHolder(h.normalized()),
            other => other.clone(),
        }
    }

    /// All violations at once; never touches a kernel.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self {
            ComponentSpec::Bin(b) => b.validate()?,
            ComponentSpec::Baseplate(b) => b.validate()?,
            ComponentSpec::Lid(l) => l.validate()?,
            ComponentSpec::Drawer(d) => d.validate()?,
            ComponentSpec::Chest(c) => c.validate()?,
            ComponentSpec::Tray(t) => t.validate()?,
            ComponentSpec::ItemHolder(h) => h.validate()?,
        }
        Ok(())
    }

    pub fn filename(&self) -> String {
        match self {
            ComponentSpec::Bin(b) => b.filename(),
            ComponentSpec::Baseplate(b) => b.filename(),
            ComponentSpec::Lid(l) => l.filename(),
            ComponentSpec::Drawer(d) => d.filename(),
            ComponentSpec::Chest(c) => c.filename(),
            ComponentSpec::Tray(t) => t.filename(),
            ComponentSpec::ItemHolder(h) => h.filename(),
        }
    }

    /// Build the operation plan. Expects a normalised, validated spec.
    pub fn plan(&self, convention: TaperConvention) -> Result<OperationPlan, EngineError> {
        let plan = match self {
            ComponentSpec::Bin(b) => build_shell(b, convention),
            ComponentSpec::Baseplate(b) => b.plan(convention),
            ComponentSpec::Lid(l) => l.plan(convention),
            ComponentSpec::Drawer(d) => d.plan(),
            ComponentSpec::Chest(c) => c.plan(convention),
            ComponentSpec::Tray(t) => build_shell(t, convention),
            ComponentSpec::ItemHolder(h) => build_shell(h, convention),
        };
        plan.map_err(|e| EngineError::geometry(self.kind(), e))
    }

    /// Copy with named parameters replaced.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self, EngineError> {
        Ok(match self {
            ComponentSpec::Bin(b) => ComponentSpec::Bin(apply_overrides(b, overrides)?),
            ComponentSpec::Baseplate(b) => {
                ComponentSpec::Baseplate(apply_overrides(b, overrides)?)
            }
            ComponentSpec::Lid(l) => ComponentSpec::Lid(apply_overrides(l, overrides)?),
            ComponentSpec::Drawer(d) => ComponentSpec::Drawer(apply_overrides(d, overrides)?),
            ComponentSpec::Chest(c) => ComponentSpec::Chest(apply_overrides(c, overrides)?),
            ComponentSpec::Tray(t) => ComponentSpec::Tray(apply_overrides(t, overrides)?),
            ComponentSpec::ItemHolder(h) => {
                ComponentSpec::ItemHolder(apply_overrides(h, overrides)?)
            }
        })
    }
}

macro_rules! impl_from_spec {
    ($($spec:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$spec> for ComponentSpec {
                fn from(s: $spec) -> Self {
                    ComponentSpec::$variant(s)
                }
            }
        )*
    };
}

impl_from_spec! {
    BinSpec => Bin,
    BaseplateSpec => Baseplate,
    LidSpec => Lid,
    DrawerSpec => Drawer,
    ChestSpec => Chest,
    TraySpec => Tray,
    ItemHolderSpec => ItemHolder,
}
