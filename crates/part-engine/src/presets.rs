//! Named item sizes for item holders: batteries, memory cards and bits.

use grid_ops::cutouts::CutoutShape;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPreset {
    pub name: &'static str,
    pub shape: CutoutShape,
    pub height: f64,
}

const fn round(name: &'static str, diameter: f64, height: f64) -> ItemPreset {
    ItemPreset {
        name,
        shape: CutoutShape::Round { diameter },
        height,
    }
}

const fn rect(name: &'static str, width: f64, depth: f64, height: f64) -> ItemPreset {
    ItemPreset {
        name,
        shape: CutoutShape::Rect { width, depth },
        height,
    }
}

pub const BATTERIES: &[ItemPreset] = &[
    round("AAA", 10.5, 44.5),
    round("AA", 14.5, 50.5),
    round("C", 26.2, 50.0),
    round("D", 34.2, 61.5),
    rect("9V", 17.5, 26.5, 48.5),
    round("CR123A", 17.0, 34.5),
    round("18650", 18.6, 65.2),
    round("21700", 21.7, 70.2),
    round("CR2032", 20.0, 3.2),
    round("CR2025", 20.0, 2.5),
];

pub const CARDS: &[ItemPreset] = &[
    rect("SD", 24.0, 2.1, 32.0),
    rect("microSD", 11.0, 1.0, 15.0),
    rect("CF", 36.4, 3.3, 42.8),
    rect("USB-A", 12.0, 4.5, 14.0),
    rect("USB-C", 8.4, 2.6, 10.0),
];

pub const BITS: &[ItemPreset] = &[
    round("hex_quarter", 6.35, 25.0),
    round("hex_4mm", 4.0, 25.0),
    round("hex_5mm", 5.0, 25.0),
    round("hex_6mm", 6.0, 25.0),
    round("screwdriver_small", 5.0, 30.0),
    round("screwdriver_medium", 7.0, 30.0),
    round("drill_3mm", 3.5, 35.0),
    round("drill_5mm", 5.5, 40.0),
    round("drill_8mm", 8.5, 50.0),
];

fn all() -> impl Iterator<Item = &'static ItemPreset> {
    BATTERIES.iter().chain(CARDS).chain(BITS)
}

pub fn find_preset(name: &str) -> Option<&'static ItemPreset> {
    all().find(|p| p.name == name)
}

/// Every preset name, sorted.
pub fn preset_names() -> Vec<String> {
    let mut names: Vec<String> = all().map(|p| p.name.to_string()).collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let aa = find_preset("AA").unwrap();
        assert_eq!(aa.shape, CutoutShape::Round { diameter: 14.5 });
        assert_eq!(aa.height, 50.5);
        assert!(matches!(
            find_preset("SD").unwrap().shape,
            CutoutShape::Rect { .. }
        ));
        assert!(find_preset("AAAA").is_none());
    }

    #[test]
    fn test_names_sorted_and_unique() {
        let names = preset_names();
        assert_eq!(names.len(), BATTERIES.len() + CARDS.len() + BITS.len());
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, names);
    }
}
