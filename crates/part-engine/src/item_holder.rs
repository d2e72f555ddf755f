//! Item holders: bins with an insert carrying one pocket per item.

use grid_ops::cutouts::{cutout_tool, place_cutouts, Cutout, CutoutShape};
use grid_ops::layout::{pack_within, PackStyle, PackedLayout};
use grid_ops::constants::*;
use grid_ops::{OpError, Violations};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bin::BinSpec;
use crate::presets::{find_preset, preset_names};
use crate::shell::{self, ShellBuild, ShellFeatures};
use crate::types::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    /// Hex for round items, square for rectangles.
    #[default]
    Auto,
    Square,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemHolderSpec {
    pub bin: BinSpec,
    pub item_preset: Option<String>,
    pub item_diameter: Option<f64>,
    pub item_width: Option<f64>,
    pub item_depth: Option<f64>,
    pub item_height: Option<f64>,
    pub item_clearance: f64,
    pub item_chamfer: f64,
    /// Explicit columns; 0 fits as many as the interior allows. Each axis is
    /// resolved on its own.
    pub grid_x: u32,
    pub grid_y: u32,
    pub grid_style: GridStyle,
    pub grid_spacing: f64,
}

impl Default for ItemHolderSpec {
    fn default() -> Self {
        Self {
            bin: BinSpec::default(),
            item_preset: None,
            item_diameter: None,
            item_width: None,
            item_depth: None,
            item_height: None,
            item_clearance: ITEM_CLEARANCE,
            item_chamfer: ITEM_CHAMFER,
            grid_x: 0,
            grid_y: 0,
            grid_style: GridStyle::Auto,
            grid_spacing: ITEM_SPACING,
        }
    }
}

impl ItemHolderSpec {
    pub fn preset(bin: BinSpec, name: &str) -> Self {
        Self {
            bin,
            item_preset: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn round(bin: BinSpec, diameter: f64) -> Self {
        Self {
            bin,
            item_diameter: Some(diameter),
            ..Self::default()
        }
    }

    pub fn rect(bin: BinSpec, width: f64, depth: f64) -> Self {
        Self {
            bin,
            item_width: Some(width),
            item_depth: Some(depth),
            ..Self::default()
        }
    }

    pub fn normalized(&self) -> ItemHolderSpec {
        ItemHolderSpec {
            bin: self.bin.normalized(),
            ..self.clone()
        }
    }

    /// Item shape and its nominal height, from the preset or explicit sizes.
    pub fn item(&self) -> Result<Option<(CutoutShape, Option<f64>)>, EngineError> {
        if let Some(name) = &self.item_preset {
            let p = find_preset(name).ok_or_else(|| EngineError::UnknownPreset {
                name: name.clone(),
                available: preset_names(),
            })?;
            return Ok(Some((p.shape, self.item_height.or(Some(p.height)))));
        }
        let shape = match (self.item_diameter, self.item_width, self.item_depth) {
            (Some(diameter), _, _) => CutoutShape::Round { diameter },
            (None, Some(width), Some(depth)) => CutoutShape::Rect { width, depth },
            _ => return Ok(None),
        };
        Ok(Some((shape, self.item_height)))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let item = self.item()?;
        let mut v = Violations::new();
        self.bin.check(&mut v);
        match item {
            None => v.push(
                "item_diameter",
                "an item holder needs item_preset, item_diameter or item_width and item_depth",
            ),
            Some((CutoutShape::Round { diameter }, _)) => {
                v.check_positive("item_diameter", diameter)
            }
            Some((CutoutShape::Rect { width, depth }, _)) => {
                v.check_positive("item_width", width);
                v.check_positive("item_depth", depth);
            }
        }
        if let Some(h) = self.item_height {
            v.check_positive("item_height", h);
        }
        v.require(
            self.item_clearance >= 0.0,
            "item_clearance",
            format!("{} must not be negative", self.item_clearance),
        );
        v.require(
            self.item_chamfer >= 0.0,
            "item_chamfer",
            format!("{} must not be negative", self.item_chamfer),
        );
        v.require(
            self.grid_spacing >= 0.0,
            "grid_spacing",
            format!("{} must not be negative", self.grid_spacing),
        );
        v.exclusive(("solid", self.bin.solid), ("item holder", true));
        v.exclusive(("cylindrical", self.bin.cylindrical), ("item holder", true));
        v.exclusive(("vase_mode", self.bin.vase_mode), ("item holder", true));
        Ok(v.into_result()?)
    }

    fn pack_style(&self, shape: &CutoutShape) -> PackStyle {
        match self.grid_style {
            GridStyle::Auto => shape.default_pack(),
            GridStyle::Square => PackStyle::Square,
            GridStyle::Hex => PackStyle::Hex,
        }
    }

    fn cutout(&self, shape: CutoutShape, height: f64) -> Cutout {
        Cutout {
            clearance: self.item_clearance,
            chamfer: self.item_chamfer,
            ..Cutout::new(shape, height)
        }
    }

    /// Pocket positions in the interior, or `None` when nothing fits.
    pub fn layout(&self) -> Result<Option<PackedLayout>, EngineError> {
        let Some((shape, _)) = self.item()? else {
            return Ok(None);
        };
        let fp = self.cutout(shape, 1.0).extent();
        let style = self.pack_style(&shape);
        let d = self.bin.dims();
        let avail = [
            d.inner_l() - 2.0 * self.grid_spacing,
            d.inner_w() - 2.0 * self.grid_spacing,
        ];
        let fixed = [
            (self.grid_x > 0).then_some(self.grid_x),
            (self.grid_y > 0).then_some(self.grid_y),
        ];
        Ok(pack_within(fp, self.grid_spacing, avail, fixed, style))
    }

    /// Pocket depth for an interior of height `int_h`.
    pub fn pocket_height(int_h: f64, requested: Option<f64>) -> f64 {
        match requested {
            None => (int_h - 1.0).max(1.0),
            Some(h) => h.min(int_h - 0.5).max(1.0),
        }
    }

    pub fn filename(&self) -> String {
        let item = match (&self.item_preset, self.item_diameter, self.item_width, self.item_depth) {
            (Some(p), ..) => p.clone(),
            (None, Some(d), ..) => format!("r{:.0}", d),
            (None, None, Some(w), Some(d)) => format!("{:.0}x{:.0}", w, d),
            _ => "none".to_string(),
        };
        let shape = self.item().ok().flatten().map(|(s, _)| s);
        let style = match shape.map(|s| self.pack_style(&s)) {
            Some(PackStyle::Hex) => "hex",
            _ => "square",
        };
        let (gx, gy) = match self.layout() {
            Ok(Some(l)) => (l.nx, l.ny),
            _ => (self.grid_x, self.grid_y),
        };
        format!(
            "gf_itemholder_{}_{}_{}_{}x{}",
            self.bin.size_tag(),
            item,
            style,
            gx,
            gy
        )
    }
}

impl ShellFeatures for ItemHolderSpec {
    fn bin(&self) -> &BinSpec {
        &self.bin
    }

    fn post_steps(&self, s: &mut ShellBuild) -> Result<(), OpError> {
        shell::wall_patterns(&self.bin, s);
        shell::thumbscrews(&self.bin, s);

        let item = self.item().map_err(|e| OpError::InvalidParameter {
            reason: e.to_string(),
        })?;
        let Some((shape, requested)) = item else {
            return Ok(());
        };
        let layout = self.layout().ok().flatten();
        let Some(layout) = layout else {
            warn!("no item pockets fit the interior");
            return Ok(());
        };
        let int_h = s.dims.floor_top() + s.dims.int_height() - s.fill_top;
        let pocket_h = Self::pocket_height(int_h, requested);
        debug!(count = layout.points.len(), pocket_h, "item pockets");

        let insert = s.plan.extrude(
            s.inner_sketch(),
            [0.0, 0.0, s.fill_top - EPS],
            pocket_h + EPS,
            "insert",
        );
        s.add(insert);
        let tool = cutout_tool(&mut s.plan, &self.cutout(shape, pocket_h), s.convention, "item")?;
        let pockets = place_cutouts(&mut s.plan, tool, &layout, s.fill_top, "item pockets");
        s.cut(pockets, "item pockets");
        Ok(())
    }
}
