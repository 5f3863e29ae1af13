//! Default sizes and settings (drawing-space units: one square = 1.0)

/// Approach-angle buckets per full turn
pub const SLOTS: u8 = 16;
/// Two slots at most this many buckets apart crowd a destination
pub const CROWD_DISTANCE: u8 = 3;

/// Endpoint pull-back for committed arrows
pub const MARGIN: f64 = 10.0 / 64.0;
/// Endpoint pull-back for the arrow being drawn
pub const MARGIN_CURRENT: f64 = 20.0 / 64.0;
/// Extra pull-back into a crowded destination, committed arrows
pub const CROWD_MARGIN: f64 = 10.0 / 64.0;
/// Extra pull-back into a crowded destination, arrow being drawn
pub const CROWD_MARGIN_CURRENT: f64 = 20.0 / 64.0;

/// Brush line widths are expressed in 64ths of a square
pub const LINE_WIDTH_UNIT: f64 = 64.0;
pub const CURRENT_LINE_FACTOR: f64 = 0.85;
pub const CURRENT_OPACITY: f64 = 0.9;
pub const PENDING_ERASE_OPACITY: f64 = 0.6;
/// Halo lines are this much wider than the crisp line
pub const HILITE_EXTRA_WIDTH: f64 = 4.0 / 64.0;
pub const BLUR_STD_DEVIATION: f64 = 0.019;
pub const BLUR_FILTER_ID: &str = "cg-filter-blur";

pub const CIRCLE_RADIUS: f64 = 0.5;
pub const CIRCLE_STROKE: f64 = 4.0 / 64.0;
pub const CIRCLE_STROKE_CURRENT: f64 = 3.0 / 64.0;

/// Arrowhead marker geometry, in stroke-width units
pub const MARKER_SIZE: f64 = 4.0;
pub const MARKER_REF_X: f64 = 2.05;
pub const MARKER_REF_Y: f64 = 2.0;
pub const MARKER_PATH: &str = "M0,0 V4 L3,2 Z";
/// Tip-to-base length of the marker path
pub const MARKER_LENGTH: f64 = 3.0;

/// Label badge diameter
pub const LABEL_SIZE: f64 = 0.4;
/// Font shrink per character
pub const LABEL_FONT_RATIO: f64 = 0.75;
pub const LABEL_BASELINE: f64 = 0.13;
pub const LABEL_STROKE: f64 = 0.03;
pub const LABEL_DEFAULT_FILL: &str = "#666";
/// Extra shaft shift for odd-slot labels with an occupied neighbor slot
pub const LABEL_ODD_SLOT_OFFSET: f64 = 0.4;
/// Offset toward the top-right corner for labels without a stroke
pub const LABEL_CORNER_OFFSET: f64 = 0.3;

/// Embedded markup is authored against this viewBox
pub const CUSTOM_VIEW_BOX: &str = "0 0 100 100";
pub const VIEW_BOX: &str = "-4 -4 8 8";

/// Attribute carrying a node's content hash
pub const HASH_ATTR: &str = "data-hash";
/// Attribute carrying a marker's brush identity
pub const BRUSH_ATTR: &str = "data-brush";
/// Ghost piece re-projection attributes
pub const KEY_ATTR: &str = "data-key";
pub const SCALE_ATTR: &str = "data-scale";
