//! Trays: low, lipless bins with scoops on by default.

use std::fmt::Write as _;

use grid_ops::dims::LipStyle;
use grid_ops::ConfigErrors;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::bin::{BinSpec, LabelStyle};
use crate::shell::ShellFeatures;

/// A bin with tray defaults. Every bin option is still available.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TraySpec(pub BinSpec);

impl Default for TraySpec {
    fn default() -> Self {
        TraySpec(BinSpec {
            height_u: 2,
            lip_style: LipStyle::None,
            scoops: true,
            ..BinSpec::default()
        })
    }
}

/// Missing fields fall back to the tray defaults, not the bin defaults.
impl<'de> Deserialize<'de> for TraySpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let given = serde_json::Value::deserialize(deserializer)?;
        let serde_json::Value::Object(given) = given else {
            return Err(de::Error::custom("tray spec must be an object"));
        };
        let mut merged = serde_json::to_value(TraySpec::default().0).map_err(de::Error::custom)?;
        if let serde_json::Value::Object(base) = &mut merged {
            base.extend(given);
        }
        serde_json::from_value(merged)
            .map(TraySpec)
            .map_err(de::Error::custom)
    }
}

impl TraySpec {
    pub fn new(length_u: u32, width_u: u32, height_u: u32) -> Self {
        let mut t = TraySpec::default();
        t.0.length_u = length_u;
        t.0.width_u = width_u;
        t.0.height_u = height_u;
        t
    }

    pub fn with_dividers(mut self, length_div: u32, width_div: u32) -> Self {
        self.0.length_div = length_div;
        self.0.width_div = width_div;
        self
    }

    pub fn normalized(&self) -> TraySpec {
        TraySpec(self.0.normalized())
    }

    pub fn validate(&self) -> Result<(), ConfigErrors> {
        self.0.validate()
    }

    pub fn filename(&self) -> String {
        let b = &self.0;
        let mut f = format!("gf_tray_{}", b.size_tag());
        if b.scoops {
            f.push_str("_scoops");
        }
        if b.holes {
            f.push_str("_mag");
        }
        if b.label_style != LabelStyle::None {
            f.push_str("_labels");
        }
        match (b.length_div, b.width_div) {
            (0, 0) => {}
            (l, 0) => {
                let _ = write!(f, "_div{}", l);
            }
            (0, w) => {
                let _ = write!(f, "_divx{}", w);
            }
            (l, w) => {
                let _ = write!(f, "_div{}x{}", l, w);
            }
        }
        f
    }
}

impl ShellFeatures for TraySpec {
    fn bin(&self) -> &BinSpec {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tray_defaults() {
        let t = TraySpec::new(3, 2, 2);
        assert_eq!(t.0.lip_style, LipStyle::None);
        assert!(t.0.scoops);
        assert_eq!(t.filename(), "gf_tray_3x2x2_scoops");
    }

    #[test]
    fn test_filename_dividers() {
        assert_eq!(
            TraySpec::new(3, 2, 2).with_dividers(2, 0).filename(),
            "gf_tray_3x2x2_scoops_div2"
        );
        assert_eq!(
            TraySpec::new(3, 2, 2).with_dividers(0, 1).filename(),
            "gf_tray_3x2x2_scoops_divx1"
        );
        let mut t = TraySpec::new(3, 2, 2).with_dividers(2, 1);
        t.0.label_style = LabelStyle::Full;
        assert_eq!(t.filename(), "gf_tray_3x2x2_scoops_labels_div2x1");
    }

    #[test]
    fn test_deserialize_keeps_tray_defaults() {
        let t: TraySpec = serde_json::from_str(r#"{"length_u": 4}"#).unwrap();
        assert_eq!(t.0.length_u, 4);
        assert_eq!(t.0.height_u, 2);
        assert_eq!(t.0.lip_style, LipStyle::None);

        let err = serde_json::from_str::<TraySpec>(r#"{"lenght_u": 4}"#).unwrap_err();
        assert!(err.to_string().contains("lenght_u"));
    }
}
