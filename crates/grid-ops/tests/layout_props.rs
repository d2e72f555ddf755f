//! Property tests for packing and clamping rules.

use proptest::prelude::*;

use grid_ops::constants::EPS;
use grid_ops::constraints::{clamp_fillet, slab_depth, BottomFeature};
use grid_ops::layout::{auto_pack, pack, PackStyle};
use grid_ops::wall_pattern::{pattern_centres, PatternStyle, WallPatternSpec};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_footprint() -> impl Strategy<Value = [f64; 2]> {
    (1.0f64..40.0, 1.0f64..40.0).prop_map(|(x, y)| [x, y])
}

fn arb_area() -> impl Strategy<Value = [f64; 2]> {
    (20.0f64..250.0, 20.0f64..250.0).prop_map(|(x, y)| [x, y])
}

fn arb_feature() -> impl Strategy<Value = BottomFeature> {
    prop_oneof![
        any::<bool>().prop_map(|refined| BottomFeature::Magnets { refined }),
        Just(BottomFeature::Screws),
        Just(BottomFeature::Weights),
        (any::<bool>(), any::<bool>())
            .prop_map(|(magnets, refined)| BottomFeature::Skeleton { magnets, refined }),
        Just(BottomFeature::CornerScrews),
        Just(BottomFeature::ScrewTogether),
        (0.0f64..10.0).prop_map(BottomFeature::Explicit),
    ]
}

// ---------------------------------------------------------------------------
// 1. Square packing never overflows the available span
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn square_layout_within_bounds(
        fp in arb_footprint(),
        avail in arb_area(),
        spacing in 0.0f64..5.0,
    ) {
        if let Some(l) = auto_pack(fp, spacing, avail, PackStyle::Square) {
            for i in 0..2 {
                let n = if i == 0 { l.nx } else { l.ny };
                let used = (n - 1) as f64 * (fp[i] + spacing) + fp[i];
                prop_assert!(used <= avail[i] + 1e-9, "axis {}: {} > {}", i, used, avail[i]);
            }
        } else {
            prop_assert!(fp[0] > avail[0] || fp[1] > avail[1]);
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Hex layouts are centred on their centroid
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn hex_layout_centroid_at_origin(
        fp in arb_footprint(),
        avail in arb_area(),
        spacing in 0.0f64..5.0,
    ) {
        if let Some(l) = auto_pack(fp, spacing, avail, PackStyle::Hex) {
            let c = l.points.centroid();
            prop_assert!(c[0].abs() < EPS && c[1].abs() < EPS, "centroid {:?}", c);
        }
    }
}

// ---------------------------------------------------------------------------
// 2b. Every hex placement's footprint stays inside the available area
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn hex_layout_within_bounds(
        fp in arb_footprint(),
        avail in arb_area(),
        spacing in 0.0f64..5.0,
    ) {
        if let Some(l) = auto_pack(fp, spacing, avail, PackStyle::Hex) {
            for i in 0..2 {
                let lo = l.points.iter().map(|p| p[i]).fold(f64::INFINITY, f64::min);
                let hi = l.points.iter().map(|p| p[i]).fold(f64::NEG_INFINITY, f64::max);
                let used = hi - lo + fp[i];
                prop_assert!(used <= avail[i] + 1e-9, "axis {}: {} > {}", i, used, avail[i]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Requesting the auto counts explicitly reproduces the same points
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn explicit_counts_match_auto(
        fp in arb_footprint(),
        avail in arb_area(),
        spacing in 0.0f64..5.0,
        hex in any::<bool>(),
    ) {
        let style = if hex { PackStyle::Hex } else { PackStyle::Square };
        if let Some(auto) = auto_pack(fp, spacing, avail, style) {
            let explicit = pack(fp, spacing, auto.nx, auto.ny, style).unwrap();
            prop_assert_eq!(explicit.points, auto.points);
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Slab depth is the max requirement, never a sum
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn slab_depth_is_max(features in prop::collection::vec(arb_feature(), 0..6)) {
        let d = slab_depth(&features);
        for f in &features {
            prop_assert!(d >= f.required_depth());
        }
        if !features.is_empty() {
            prop_assert!(features.iter().any(|f| f.required_depth() == d));
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Fillet radius stays inside the inner corner
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn fillet_clamp_inside_corner(requested in 0.0f64..5.0, wall in 0.5f64..2.5) {
        let inner = 3.75 - wall;
        if let Some(r) = clamp_fillet(requested, inner) {
            prop_assert!(r > 0.0 && r <= inner - EPS + 1e-12);
        }
    }
}

// ---------------------------------------------------------------------------
// 6. Wall patterns are centred and stay on their canvas
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn wall_pattern_centred_on_canvas(
        canvas in arb_area(),
        cell in 3.0f64..20.0,
        spacing in 0.5f64..4.0,
        hex in any::<bool>(),
    ) {
        let spec = WallPatternSpec {
            style: if hex { PatternStyle::Hexgrid } else { PatternStyle::Grid },
            cell,
            spacing,
            ..Default::default()
        };
        if let Some(c) = pattern_centres(canvas, &spec) {
            let cen = c.centroid();
            prop_assert!(cen[0].abs() < EPS && cen[1].abs() < EPS, "centroid {:?}", cen);
            for p in c.iter() {
                prop_assert!(p[0].abs() <= (canvas[0] - cell) / 2.0 + 1e-9);
                prop_assert!(p[1].abs() <= (canvas[1] - cell) / 2.0 + 1e-9);
            }
        }
    }
}
