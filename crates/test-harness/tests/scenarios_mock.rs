//! Part scenarios against MockKernel.
//!
//! These run the full normalise → validate → plan → execute path and check
//! envelopes, mesh oracles and cosmetic-skip reporting.

use part_engine::{BinSpec, ComponentSpec, EngineError, ItemHolderSpec};
use serde_json::{json, Map, Value};
use test_harness::assertions::{assert_only_skipped, assert_skipped};
use test_harness::fixtures::{catalogue, fixture};
use test_harness::{HarnessError, PartBench};

fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("not an object"),
    }
}

// ── Scenario 1: Every catalogue part ────────────────────────────────────

#[test]
fn test_catalogue_envelopes_and_meshes() {
    let mut bench = PartBench::mock();
    for f in catalogue() {
        bench.render(f.name, f.spec.clone()).unwrap();
        if let Some(expected) = f.envelope {
            bench.assert_envelope(f.name, expected, 1e-6).unwrap();
        }
        bench.assert_checks_pass(f.name).unwrap();
    }
    assert_eq!(bench.history().len(), catalogue().len());
}

#[test]
fn test_chest_envelope_matches_outer() {
    let mut bench = PartBench::mock();
    let f = fixture("chest").unwrap();
    let ComponentSpec::Chest(chest) = f.spec.clone() else {
        panic!("chest fixture is not a chest");
    };
    bench.render("chest", f.spec).unwrap();
    bench.assert_envelope("chest", chest.outer(), 1e-6).unwrap();
}

// ── Scenario 2: Names and lookups ───────────────────────────────────────

#[test]
fn test_duplicate_name_rejected() {
    let mut bench = PartBench::mock();
    bench.render("a", ComponentSpec::bin(1, 1, 2)).unwrap();
    let err = bench.render("a", ComponentSpec::bin(1, 1, 3)).unwrap_err();
    assert!(matches!(err, HarnessError::DuplicateName { .. }));
    assert!(matches!(
        bench.part("b"),
        Err(HarnessError::PartNotFound { .. })
    ));
}

// ── Scenario 3: Configuration errors never reach the kernel ─────────────

#[test]
fn test_invalid_parts_do_not_touch_kernel() {
    let mut bench = PartBench::mock();
    let mut b = BinSpec::new(2, 2, 3);
    b.solid = true;
    b.lite_style = true;
    let err = bench.render("bad", b).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Engine(EngineError::Configuration(_))
    ));

    let holder = ItemHolderSpec::preset(BinSpec::new(2, 2, 6), "D-cell-ish");
    let err = bench
        .render("holder", ComponentSpec::item_holder(holder))
        .unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Engine(EngineError::UnknownPreset { .. })
    ));
    assert_eq!(bench.kernel.total_calls(), 0);
}

// ── Scenario 4: Overrides ───────────────────────────────────────────────

#[test]
fn test_overrides_change_the_part() {
    let mut bench = PartBench::mock();
    let r = bench
        .render_with(
            "tall",
            ComponentSpec::bin(2, 1, 3),
            &obj(json!({"height_u": 6, "no_lip": true})),
        )
        .unwrap();
    assert!(r.filename.starts_with("gf_bin_2x1x6"));

    let err = bench
        .render_with("typo", ComponentSpec::bin(1, 1, 3), &obj(json!({"hieght_u": 2})))
        .unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Engine(EngineError::Configuration(ref c)) if c.mentions("hieght_u")
    ));
}

// ── Scenario 5: Cosmetic operations ─────────────────────────────────────

#[test]
fn test_failed_fillet_is_skipped_not_fatal() {
    let mut bench = PartBench::mock();
    bench.kernel.fail_operation("fillet");
    let r = bench.render("bin", ComponentSpec::bin(2, 2, 3)).unwrap();
    assert_skipped(r, "interior fillet", "bin").unwrap();
    assert_only_skipped(r, &["interior fillet"], "bin").unwrap();
    bench
        .assert_envelope("bin", [83.5, 83.5, 24.8], 1e-6)
        .unwrap();
}

#[test]
fn test_strict_bench_fails_on_cosmetic() {
    let mut bench = PartBench::mock().strict();
    bench.kernel.fail_operation("fillet");
    let err = bench.render("bin", ComponentSpec::bin(2, 2, 3)).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Engine(EngineError::Geometry { .. })
    ));
}

#[test]
fn test_hard_failure_names_component() {
    let mut bench = PartBench::mock();
    bench.kernel.fail_operation("boolean_cut");
    let err = bench.render("plate", ComponentSpec::baseplate(2, 2)).unwrap_err();
    match err {
        HarnessError::Engine(EngineError::Geometry { component, .. }) => {
            assert_eq!(component, "baseplate")
        }
        other => panic!("unexpected {other:?}"),
    }
}

// ── Scenario 6: Export ──────────────────────────────────────────────────

#[test]
fn test_stl_from_bench() {
    let mut bench = PartBench::mock();
    bench.render("lid", ComponentSpec::lid(2, 2)).unwrap();
    let bytes = bench.binary_stl("lid").unwrap();
    assert_eq!(bytes.len(), 84 + 12 * 50);
    let text = bench.ascii_stl("lid").unwrap();
    assert!(text.starts_with("solid gf_lid_2x2_flat"));
}

// ── Scenario 7: Plan reuse across a bench ───────────────────────────────

#[test]
fn test_repeated_spec_hits_plan_cache() {
    let mut bench = PartBench::mock();
    bench.render("one", ComponentSpec::bin(1, 1, 3)).unwrap();
    bench.render("two", ComponentSpec::bin(1, 1, 3)).unwrap();
    assert_eq!(bench.renderer.cache_hits(), 1);
    assert_eq!(bench.renderer.cache_len(), 1);
    assert_eq!(bench.bbox("one").unwrap(), bench.bbox("two").unwrap());
}
