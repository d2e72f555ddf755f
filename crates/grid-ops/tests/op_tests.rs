use grid_ops::constants::*;
use grid_ops::constraints::{clamp_fillet, slab_depth, BottomFeature};
use grid_ops::holes::{hole_tool, HoleSpec};
use grid_ops::layout::{auto_pack, cell_centres, PackStyle};
use grid_ops::wall_pattern::{pattern_tool, WallPatternSpec};
use grid_ops::{execute_plan, probe_taper_convention, OperationPlan, Role};
use grid_types::{Footprint, Plane, Profile, Segment, Sketch};
use solid_kernel::{Kernel, MockKernel, TaperConvention};

fn foot_profile() -> Profile {
    Profile::new(vec![
        Segment::tapered(FOOT_BOT_CHAMFER, -45.0),
        Segment::straight(STRAIGHT_HEIGHT),
        Segment::tapered(FOOT_TOP_CHAMFER, -45.0),
    ])
}

// ── Profile Execution ──────────────────────────────────────────────────────

#[test]
fn profile_reaches_declared_height_under_both_conventions() {
    for convention in [TaperConvention::Vertical, TaperConvention::AlongTaper] {
        let mut k = MockKernel::with_convention(convention);
        let detected = probe_taper_convention(&mut k).unwrap();
        assert_eq!(detected, convention);

        let mut plan = OperationPlan::new();
        let sk = Sketch::xy(Footprint::rounded_rect(FOOT_BOTTOM, FOOT_BOTTOM, FOOT_BOTTOM_RAD));
        plan.profile(&sk, [0.0; 3], &foot_profile(), detected, "foot")
            .unwrap();
        let ex = execute_plan(&mut k, &plan, false).unwrap();
        let bb = k.bounding_box(&ex.solid).unwrap();
        assert!(
            (bb.size()[2] - FOOT_HEIGHT).abs() < 1e-9,
            "{:?}: height {}",
            convention,
            bb.size()[2]
        );
        assert!((bb.size()[0] - PITCH).abs() < 1e-9, "top outline {}", bb.size()[0]);
    }
}

#[test]
fn failing_segment_aborts_profile() {
    let mut k = MockKernel::new();
    k.fail_operation("boolean_union");
    let mut plan = OperationPlan::new();
    let sk = Sketch::xy(Footprint::rect(FOOT_BOTTOM, FOOT_BOTTOM));
    plan.profile(&sk, [0.0; 3], &foot_profile(), TaperConvention::Vertical, "foot")
        .unwrap();
    let err = execute_plan(&mut k, &plan, false).unwrap_err();
    assert!(err.to_string().contains("foot"), "{}", err);
}

// ── Holes In Place ─────────────────────────────────────────────────────────

#[test]
fn hole_tools_cut_every_quad() {
    let mut plan = OperationPlan::new();
    let slab = plan.extrude(
        Sketch::xy(Footprint::rect(2.0 * PITCH, PITCH)),
        [0.0; 3],
        5.0,
        "slab",
    );
    let tool = hole_tool(
        &mut plan,
        &HoleSpec::magnet(),
        TaperConvention::Vertical,
        "magnet",
    )
    .unwrap();
    let quads = grid_ops::layout::hole_quads(&cell_centres(2, 1, PITCH), HOLE_OFFSET);
    let placed = plan.pattern(tool, quads.at_height(0.0), "magnets");
    plan.cut(slab, placed, "holes");

    let mut k = MockKernel::new();
    let ex = execute_plan(&mut k, &plan, false).unwrap();
    assert_eq!(k.call_count("transform"), 8);
    let bb = k.bounding_box(&ex.solid).unwrap();
    assert_eq!(bb.size(), [84.0, 42.0, 5.0]);
}

// ── Wall Patterns ──────────────────────────────────────────────────────────

#[test]
fn pattern_too_small_leaves_wall_untouched() {
    let mut plan = OperationPlan::new();
    let wall = plan.extrude(
        Sketch::on(Plane::XZ, Footprint::rect(6.0, 6.0)),
        [0.0; 3],
        1.0,
        "wall",
    );
    let tool = pattern_tool(
        &mut plan,
        Plane::XZ,
        [0.0, -EPS, 0.0],
        [6.0, 6.0],
        1.0 + 2.0 * EPS,
        &WallPatternSpec::default(),
        "pattern",
    );
    assert!(tool.is_none());
    let mut k = MockKernel::new();
    let before = execute_plan(&mut k, &plan, false).unwrap();
    let bb = k.bounding_box(&before.solid).unwrap();
    assert_eq!(bb.size(), [6.0, 1.0, 6.0]);
    assert_eq!(plan.node(wall).unwrap().role, Role::Structural);
}

// ── Constraint Rules ───────────────────────────────────────────────────────

#[test]
fn fillet_clamp_over_wall_range() {
    let mut wall = 0.5;
    while wall <= 2.5 + 1e-9 {
        let inner_rad = 3.75 - wall;
        if let Some(r) = clamp_fillet(FILLET_RAD, inner_rad) {
            assert!(r <= inner_rad - EPS + 1e-12, "wall {}: r {}", wall, r);
        }
        wall += 0.05;
    }
}

#[test]
fn slab_depth_pairwise_is_max() {
    let features = [
        BottomFeature::Magnets { refined: false },
        BottomFeature::Magnets { refined: true },
        BottomFeature::Screws,
        BottomFeature::Weights,
        BottomFeature::Skeleton {
            magnets: true,
            refined: false,
        },
        BottomFeature::CornerScrews,
        BottomFeature::ScrewTogether,
        BottomFeature::Explicit(3.0),
    ];
    for a in &features {
        for b in &features {
            let d = slab_depth(&[*a, *b]);
            assert_eq!(d, a.required_depth().max(b.required_depth()));
        }
    }
}

#[test]
fn auto_pack_square_fits() {
    let l = auto_pack([10.0, 10.0], 2.0, [80.0, 38.0], PackStyle::Square).unwrap();
    assert_eq!((l.nx, l.ny), (6, 3));
    assert_eq!(l.points.len(), 18);
}
