//! Fixed dimensions of the grid system, in millimetres.

/// The physical pitch of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridUnit {
    /// Horizontal spacing of cells.
    pub pitch: f64,
    /// Vertical spacing of height units.
    pub height_pitch: f64,
    /// Outer corner radius of a cell.
    pub corner_radius: f64,
    /// Clearance subtracted once from each part's outer span.
    pub tolerance: f64,
}

pub const GRID: GridUnit = GridUnit {
    pitch: PITCH,
    height_pitch: HEIGHT_PITCH,
    corner_radius: CORNER_RAD,
    tolerance: TOLERANCE,
};

/// Coplanar-face nudge applied before booleans.
pub const EPS: f64 = 0.01;

// Pitch and tolerances
pub const PITCH: f64 = 42.0;
pub const HALF_PITCH: f64 = 21.0;
pub const HEIGHT_PITCH: f64 = 7.0;
pub const RECEPTACLE_PITCH: f64 = 42.2;
pub const TOLERANCE: f64 = 0.5;
pub const CORNER_RAD: f64 = 4.0;
/// Distance from the foot profile top to the first height unit.
pub const HEIGHT_OFFSET: f64 = 3.8;

// Walls and floor
pub const WALL: f64 = 1.0;
pub const DIVIDER_WALL: f64 = 1.2;
pub const FLOOR: f64 = 2.25;
pub const FILLET_RAD: f64 = 1.1;
pub const BASE_CLEARANCE: f64 = 0.25;
pub const BASE_HEIGHT: f64 = 4.75;
/// Base plus floor: top of a plain bin floor.
pub const BOTTOM_HEIGHT: f64 = 7.0;
pub const STRAIGHT_HEIGHT: f64 = 1.8;

// Receptacle profile, top chamfer first
pub const BASE_TOP_CHAMFER: f64 = 2.25;
pub const BASE_BOT_CHAMFER: f64 = 0.7;
pub const RECEPTACLE_BOTTOM: f64 = 36.3;
pub const RECEPTACLE_BOTTOM_RAD: f64 = 1.05;

// Bin foot profile, bottom first
pub const FOOT_BOT_CHAMFER: f64 = 0.8;
pub const FOOT_TOP_CHAMFER: f64 = 2.4;
pub const FOOT_HEIGHT: f64 = 5.0;
pub const FOOT_BOTTOM: f64 = 35.6;
pub const FOOT_BOTTOM_RAD: f64 = 0.8;

// Stacking lip
pub const LIP_HEIGHT: f64 = 6.6;
pub const UNDER_HEIGHT: f64 = 1.6;
pub const TOPSIDE_HEIGHT: f64 = 1.2;
pub const LIP_RIM: f64 = 0.6;

// Magnet and screw holes
pub const HOLE_DIAM: f64 = 6.5;
pub const HOLE_DEPTH: f64 = 2.4;
pub const BOLT_DIAM: f64 = 3.0;
pub const BOLT_DEPTH: f64 = 6.0;
pub const HOLE_OFFSET: f64 = 13.0;
pub const HOLE_SLICE: f64 = 0.25;
pub const REFINED_HOLE_DIAM: f64 = 5.86;
pub const REFINED_HOLE_DEPTH: f64 = 1.9;
pub const RIB_COUNT: u32 = 8;
/// Radial depth of one crush rib.
pub const RIB_DEPTH: f64 = 0.3;
/// Share of each rib slot removed from the tool.
pub const RIB_NOTCH_SHARE: f64 = 0.3;
pub const FLARE_EXTRA_RAD: f64 = 0.8;
pub const BRIDGE_THICKNESS: f64 = 0.4;
pub const SCREW_DEPTH: f64 = 4.0;
pub const COUNTERSINK_DIAM: f64 = 6.5;
/// Included angle of a countersink cone.
pub const COUNTERSINK_ANGLE: f64 = 82.0;

// Baseplate bottoms
pub const BP_BOTTOM_HEIGHT: f64 = 6.4;
pub const BP_WEIGHT_POCKET: f64 = 21.4;
pub const BP_WEIGHT_DEPTH: f64 = 4.0;
pub const BP_CHANNEL_LONG: f64 = 8.5;
pub const BP_CHANNEL_WIDTH: f64 = 4.25;
pub const BP_CHANNEL_DEPTH: f64 = 2.0;
pub const SKELETON_HEIGHT: f64 = 1.0;
pub const SKELETON_SCREW_CLEAR: f64 = 3.35;
pub const SKELETON_INNER: f64 = 36.3;
pub const SKELETON_RAD: f64 = 2.0;
pub const SKELETON_KEEPOUT: f64 = 10.0;
pub const SCREW_TOGETHER_DEPTH: f64 = 6.75;
pub const SCREW_TOGETHER_DIAM: f64 = 3.2;
pub const SCREW_TOGETHER_SPACING: f64 = 8.0;
pub const CORNER_TAB: f64 = 21.0;
pub const CORNER_SCREW_DEPTH: f64 = 5.0;
pub const CORNER_SCREW_HOLE: f64 = 5.0;
pub const CORNER_SCREW_HEAD: f64 = 10.0;
pub const CORNER_SCREW_ANGLE: f64 = 82.0;

// Wall patterns
pub const PATTERN_CELL: f64 = 8.0;
pub const PATTERN_SPACING: f64 = 2.0;
pub const PATTERN_SIDES: u32 = 6;
pub const PATTERN_FLOOR_CLEAR: f64 = 3.0;
pub const PATTERN_LIP_CLEAR: f64 = 7.0;
pub const PATTERN_CORNER_INSET: f64 = 6.0;

// Bin interior features
pub const SCOOP_RAD: f64 = 14.0;
pub const LABEL_WIDTH: f64 = 12.0;
pub const LABEL_HEIGHT: f64 = 10.0;
pub const LABEL_LIP_HEIGHT: f64 = 0.8;
pub const LABEL_TAB_WIDTH: f64 = 42.0;
pub const CYLINDER_DIAM: f64 = 10.0;
pub const CYLINDER_CHAMFER: f64 = 0.5;
pub const THUMBSCREW_DIAM: f64 = 4.0;

// Item pockets
pub const ITEM_CLEARANCE: f64 = 0.25;
pub const ITEM_CHAMFER: f64 = 0.5;
pub const ITEM_SPACING: f64 = 2.0;
pub const ITEM_CORNER_RAD: f64 = 0.5;

// Drawers and chests
pub const DRAWER_WALL: f64 = 1.6;
pub const DRAWER_FLOOR: f64 = 1.2;
pub const DRAWER_RAIL_WIDTH: f64 = 2.0;
pub const DRAWER_RAIL_HEIGHT: f64 = 3.0;
pub const DRAWER_RAIL_CLEAR: f64 = 0.3;
pub const DRAWER_HANDLE_WIDTH: f64 = 30.0;
pub const DRAWER_HANDLE_HEIGHT: f64 = 10.0;
pub const DRAWER_HANDLE_DEPTH: f64 = 5.0;
pub const CHEST_SIDE_ALLOWANCE: f64 = 3.2;
pub const CHEST_RAIL_SPACE: f64 = 3.3;
pub const CHEST_DIVIDER: f64 = 1.2;
pub const CHEST_CHAMFER: f64 = 1.0;

// Lids
pub const LID_THICKNESS: f64 = 1.2;
pub const LID_FINGER_WIDTH: f64 = 16.0;
pub const LID_FINGER_DEPTH: f64 = 2.5;
pub const LID_LABEL_DEPTH: f64 = 0.4;
pub const LID_LABEL_WIDTH: f64 = 30.0;
pub const LID_LABEL_HEIGHT: f64 = 12.0;
