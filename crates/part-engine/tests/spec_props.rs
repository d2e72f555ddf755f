//! Property tests over bin specs rendered against the mock kernel.

use proptest::prelude::*;
use serde_json::Map;

use part_engine::{BinSpec, ComponentSpec, RenderOptions, Renderer};
use solid_kernel::{MockKernel, TaperConvention};

fn arb_bin() -> impl Strategy<Value = BinSpec> {
    (1u32..5, 1u32..5, 1u32..9, any::<bool>(), any::<bool>(), 0u32..3)
        .prop_map(|(l, w, h, holes, scoops, div)| {
            let mut b = BinSpec::new(l, w, h);
            b.holes = holes;
            b.scoops = scoops;
            b.length_div = div.min(l);
            b
        })
}

proptest! {
    #[test]
    fn envelope_follows_grid(l in 1u32..6, w in 1u32..6, h in 1u32..10) {
        let mut k = MockKernel::new();
        let mut r = Renderer::with_convention(RenderOptions::default(), TaperConvention::Vertical);
        let out = r.render(&mut k, &ComponentSpec::bin(l, w, h)).unwrap();
        let size = out.bbox.size();
        prop_assert!((size[0] - (l as f64 * 42.0 - 0.5)).abs() < 1e-6);
        prop_assert!((size[1] - (w as f64 * 42.0 - 0.5)).abs() < 1e-6);
        prop_assert!((size[2] - (3.8 + 7.0 * h as f64)).abs() < 1e-6);
    }

    #[test]
    fn filenames_are_stable(b in arb_bin()) {
        let name = b.filename();
        prop_assert!(name.starts_with("gf_bin_"));
        let tag = format!("{}x{}x{}", b.length_u, b.width_u, b.height_u);
        prop_assert!(name.contains(&tag));
        prop_assert_eq!(name, b.clone().filename());
    }

    #[test]
    fn empty_overrides_are_identity(b in arb_bin()) {
        let spec = ComponentSpec::Bin(b);
        let out = spec.with_overrides(&Map::new()).unwrap();
        prop_assert_eq!(out, spec);
    }

    #[test]
    fn valid_bins_render(b in arb_bin()) {
        let spec = ComponentSpec::Bin(b);
        prop_assume!(spec.validate().is_ok());
        let mut k = MockKernel::new();
        let mut r = Renderer::with_convention(RenderOptions::default(), TaperConvention::Vertical);
        prop_assert!(r.render(&mut k, &spec).is_ok());
    }
}
