//! Geometry functions: drawing-space projection, approach slots, crowding,
//! arrow shortening and label placement.
//!
//! Drawing space is centered on the board: squares are one unit wide and the
//! board spans [-4, 4] on both axes before aspect correction, y pointing down.

use std::collections::HashMap;
use std::f64::consts::PI;

use glam::{DVec2, dvec2};

use super::defaults;
use crate::types::{BoardView, Bounds, Square};

/// Per-axis scale keeping overlays undistorted on non-square boards
pub fn axis_scale(bounds: &Bounds) -> DVec2 {
    dvec2(
        (bounds.width() / bounds.height()).min(1.0),
        (bounds.height() / bounds.width()).min(1.0),
    )
}

/// Project an oriented board position (0..8, y up) into drawing space.
pub fn board_to_user(pos: (f64, f64), bounds: &Bounds) -> DVec2 {
    let scale = axis_scale(bounds);
    dvec2((pos.0 - 3.5) * scale.x, (3.5 - pos.1) * scale.y)
}

/// Center of `sq` in drawing space.
pub fn square_to_user(sq: Square, view: &BoardView) -> DVec2 {
    board_to_user(sq.oriented(view.orientation), &view.bounds)
}

/// Pixel translate of a square's top-left corner, for ghost pieces.
pub fn translate_px(sq: Square, view: &BoardView) -> DVec2 {
    let (x, y) = sq.oriented(view.orientation);
    dvec2(
        x * view.bounds.width() / 8.0,
        (7.0 - y) * view.bounds.height() / 8.0,
    )
}

/// Approach angle in radians, measured from the destination back toward the
/// origin in board coordinates (y up).
pub fn approach_angle(orig: Square, dest: Square) -> f64 {
    let dx = orig.file() as f64 - dest.file() as f64;
    let dy = orig.rank() as f64 - dest.rank() as f64;
    dy.atan2(dx)
}

/// Discretize an angle into one of 16 buckets.
pub fn angle_to_slot(angle: f64) -> u8 {
    let bucket = (angle * 8.0 / PI).round() as i64;
    bucket.rem_euclid(defaults::SLOTS as i64) as u8
}

pub fn slot_of(orig: Square, dest: Square) -> u8 {
    angle_to_slot(approach_angle(orig, dest))
}

/// Circular distance between two slots
pub fn slot_distance(a: u8, b: u8) -> u8 {
    let d = (a as i16 - b as i16).rem_euclid(defaults::SLOTS as i16) as u8;
    d.min(defaults::SLOTS - d)
}

/// A destination is crowded when two of its recorded slots are within
/// `CROWD_DISTANCE` buckets of each other.
pub fn is_crowded(slots: &[u8]) -> bool {
    slots.iter().enumerate().any(|(i, &a)| {
        slots[i + 1..]
            .iter()
            .any(|&b| slot_distance(a, b) <= defaults::CROWD_DISTANCE)
    })
}

/// Approach slots of every arrow, keyed by destination.
///
/// Rebuilt for each render pass. Every arrow contributes one entry, so two
/// arrows in the same bucket count twice.
#[derive(Debug, Clone, Default)]
pub struct AngleIndex {
    slots: HashMap<Square, Vec<u8>>,
}

impl AngleIndex {
    pub fn build(arrows: impl IntoIterator<Item = (Square, Square)>) -> Self {
        let mut slots: HashMap<Square, Vec<u8>> = HashMap::new();
        for (orig, dest) in arrows {
            if orig != dest {
                slots.entry(dest).or_default().push(slot_of(orig, dest));
            }
        }
        Self { slots }
    }

    pub fn slots(&self, dest: Square) -> &[u8] {
        self.slots.get(&dest).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, dest: Square) -> usize {
        self.slots(dest).len()
    }

    pub fn is_crowded(&self, dest: Square) -> bool {
        is_crowded(self.slots(dest))
    }
}

/// Endpoint pull-back for an arrow.
///
/// Crowding adds its own margin on top of the base one, so an in-progress
/// arrow into a crowded square is pulled back furthest.
pub fn arrow_margin(crowded: bool, current: bool) -> f64 {
    let base = if current {
        defaults::MARGIN_CURRENT
    } else {
        defaults::MARGIN
    };
    if crowded {
        base + crowd_margin(current)
    } else {
        base
    }
}

fn crowd_margin(current: bool) -> f64 {
    if current {
        defaults::CROWD_MARGIN_CURRENT
    } else {
        defaults::CROWD_MARGIN
    }
}

/// Pull `to` back toward `from` by `margin`.
pub fn shorten(from: DVec2, to: DVec2, margin: f64) -> DVec2 {
    let delta = to - from;
    let len = delta.length();
    if len <= margin {
        return from;
    }
    to - delta / len * margin
}

/// Physical arrowhead length for a line of the given drawing-space width
pub fn arrowhead_length(line_width: f64) -> f64 {
    defaults::MARKER_LENGTH * line_width
}

/// Label anchor along an arrow's shaft.
///
/// Corrections apply in order: arrowhead length, then the crowd margin when
/// the destination is crowded, then the odd-slot neighbor shift.
pub fn label_position(
    from: DVec2,
    to: DVec2,
    slot: u8,
    slots: &[u8],
    head_length: f64,
    current: bool,
) -> DVec2 {
    let delta = to - from;
    let len = delta.length();
    if len == 0.0 {
        return from;
    }
    let mut mag = len - head_length;
    if is_crowded(slots) {
        mag -= crowd_margin(current);
        let neighbor_taken = slots.iter().any(|&s| slot_distance(s, slot) == 1);
        if slot % 2 == 1 && neighbor_taken {
            mag -= defaults::LABEL_ODD_SLOT_OFFSET;
        }
    }
    from + delta / len * mag.max(0.0)
}

/// Label font size: shrinks geometrically so longer text still fits the badge.
pub fn label_font_size(text: &str) -> f64 {
    defaults::LABEL_SIZE * label_shrink(text)
}

/// Shrink factor for a label, by length in UTF-16 code units (the same
/// units the label hash runs over).
pub fn label_shrink(text: &str) -> f64 {
    defaults::LABEL_FONT_RATIO.powi(text.encode_utf16().count() as i32)
}

/// Integer-aligned box around a segment. Blur filters ignore zero-extent
/// geometry, so halos are boxed explicitly; each side is at least one unit.
pub fn filter_box(a: DVec2, b: DVec2) -> (DVec2, DVec2) {
    let min = a.min(b).floor();
    let max = a.max(b).ceil().max(min + DVec2::ONE);
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn sq(key: &str) -> Square {
        key.parse().unwrap()
    }

    fn view(w: f64, h: f64, orientation: Color) -> BoardView {
        BoardView::new(Bounds::try_new(w, h, 0.0, 0.0).unwrap(), orientation)
    }

    #[test]
    fn projection_centers_board() {
        let v = view(400.0, 400.0, Color::White);
        assert_eq!(square_to_user(sq("a1"), &v), dvec2(-3.5, 3.5));
        assert_eq!(square_to_user(sq("h8"), &v), dvec2(3.5, -3.5));
        let flipped = view(400.0, 400.0, Color::Black);
        assert_eq!(square_to_user(sq("a1"), &flipped), dvec2(3.5, -3.5));
    }

    #[test]
    fn projection_keeps_aspect() {
        let wide = Bounds::try_new(800.0, 400.0, 0.0, 0.0).unwrap();
        assert_eq!(axis_scale(&wide), dvec2(1.0, 0.5));
        assert_eq!(board_to_user((7.0, 0.0), &wide), dvec2(3.5, 1.75));
    }

    #[test]
    fn slots_wrap_around() {
        assert_eq!(angle_to_slot(0.0), 0);
        assert_eq!(angle_to_slot(PI / 2.0), 4);
        assert_eq!(angle_to_slot(PI), 8);
        assert_eq!(angle_to_slot(-PI / 2.0), 12);
        assert_eq!(angle_to_slot(-0.01), 0);
    }

    #[test]
    fn slot_from_squares() {
        // origin straight above the destination
        assert_eq!(slot_of(sq("e8"), sq("e4")), 4);
        assert_eq!(slot_of(sq("a4"), sq("e4")), 8);
        // knight approach lands in an odd slot
        assert_eq!(slot_of(sq("f6"), sq("e4")) % 2, 1);
    }

    #[test]
    fn circular_distance() {
        assert_eq!(slot_distance(0, 15), 1);
        assert_eq!(slot_distance(2, 14), 4);
        assert_eq!(slot_distance(4, 12), 8);
    }

    #[test]
    fn close_angles_crowd() {
        let a = angle_to_slot(80f64.to_radians());
        let b = angle_to_slot(90f64.to_radians());
        assert!(is_crowded(&[a, b]));
    }

    #[test]
    fn opposite_angles_do_not_crowd() {
        let a = angle_to_slot(5f64.to_radians());
        let b = angle_to_slot(175f64.to_radians());
        assert!(!is_crowded(&[a, b]));
        assert!(!is_crowded(&[a]));
    }

    #[test]
    fn index_counts_every_arrow() {
        let index = AngleIndex::build([(sq("e8"), sq("e4")), (sq("e7"), sq("e4"))]);
        assert_eq!(index.count(sq("e4")), 2);
        assert!(index.is_crowded(sq("e4")));
        assert_eq!(index.count(sq("d4")), 0);
    }

    #[test]
    fn margins_stack() {
        assert_eq!(arrow_margin(false, false), 10.0 / 64.0);
        assert_eq!(arrow_margin(false, true), 20.0 / 64.0);
        assert_eq!(arrow_margin(true, false), 20.0 / 64.0);
        assert_eq!(arrow_margin(true, true), 40.0 / 64.0);
    }

    #[test]
    fn shorten_pulls_back_along_shaft() {
        let end = shorten(dvec2(0.0, 0.0), dvec2(0.0, 4.0), 0.5);
        assert_eq!(end, dvec2(0.0, 3.5));
    }

    #[test]
    fn label_sits_behind_arrowhead() {
        let from = dvec2(0.0, 0.0);
        let to = dvec2(4.0, 0.0);
        let pos = label_position(from, to, 8, &[8], 0.5, false);
        assert_eq!(pos, dvec2(3.5, 0.0));
    }

    #[test]
    fn label_odd_slot_shifts_further() {
        let from = dvec2(0.0, 0.0);
        let to = dvec2(4.0, 0.0);
        let even = label_position(from, to, 2, &[2, 3], 0.5, false);
        let odd = label_position(from, to, 3, &[2, 3], 0.5, false);
        assert!((even.x - (3.5 - 10.0 / 64.0)).abs() < 1e-9);
        assert!((odd.x - (3.5 - 10.0 / 64.0 - 0.4)).abs() < 1e-9);
    }

    #[test]
    fn font_shrinks_with_length() {
        let one = label_font_size("A");
        let three = label_font_size("ABC");
        assert!(one > three);
        assert!((one / three - 0.75f64.powi(-2)).abs() < 1e-12);
    }

    #[test]
    fn font_length_counts_utf16_units() {
        // one astral-plane character is two code units
        assert_eq!(label_shrink("\u{1F451}"), label_shrink("AB"));
        assert_eq!(label_font_size("\u{1F451}"), label_font_size("AB"));
    }

    #[test]
    fn filter_box_has_area_for_vertical_lines() {
        let (min, max) = filter_box(dvec2(0.5, -2.5), dvec2(0.5, 1.5));
        assert_eq!(min, dvec2(0.0, -3.0));
        assert_eq!(max, dvec2(1.0, 2.0));
        let (min, max) = filter_box(dvec2(1.0, 0.0), dvec2(1.0, 2.0));
        assert_eq!(max.x - min.x, 1.0);
    }

    #[test]
    fn ghost_translate_in_pixels() {
        let v = view(800.0, 800.0, Color::White);
        assert_eq!(translate_px(sq("a8"), &v), dvec2(0.0, 0.0));
        assert_eq!(translate_px(sq("h1"), &v), dvec2(700.0, 700.0));
        let flipped = view(800.0, 800.0, Color::Black);
        assert_eq!(translate_px(sq("h1"), &flipped), dvec2(0.0, 0.0));
    }
}
