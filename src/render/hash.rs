//! Content hashes used as reconciliation keys.
//!
//! A hash is a cache key for one render session, not an identity guarantee:
//! the rolling text hash can collide.

use super::svg::fmt_num;
use crate::shape::{BrushModifiers, Shape, ShapePiece};
use crate::types::Bounds;

/// Render-time facts about a shape that change its output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeFlags {
    /// The shape being drawn right now
    pub current: bool,
    /// A persisted shape the current gesture would erase
    pub pending_erase: bool,
    /// Arrow into a crowded destination
    pub shortened: bool,
    /// Arrows recorded at the shape's destination
    pub crowd_count: usize,
}

/// Base-31 rolling hash over UTF-16 code units, wrapping at 32 bits.
pub fn text_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

fn piece_hash(piece: &ShapePiece) -> String {
    let mut parts = vec![piece.color.as_str().to_string(), piece.role.as_str().to_string()];
    if let Some(scale) = piece.scale {
        parts.push(fmt_num(scale));
    }
    parts.join(",")
}

fn modifiers_hash(modifiers: &BrushModifiers) -> String {
    let mut out = String::new();
    if let Some(w) = modifiers.line_width {
        out.push_str(&fmt_num(w));
    }
    if let Some(hilite) = &modifiers.hilite {
        out.push('*');
        out.push_str(hilite);
    }
    out
}

/// Hash of every visually relevant input of a shape.
///
/// Unset optional fields contribute nothing, so they never distinguish two
/// shapes that would render identically.
pub fn content_hash(shape: &Shape, flags: ShapeFlags, bounds: &Bounds) -> String {
    let mut parts: Vec<String> = vec![fmt_num(bounds.width()), fmt_num(bounds.height())];
    if flags.current {
        parts.push("current".into());
    }
    if flags.pending_erase {
        parts.push("pendingErase".into());
    }
    if flags.crowd_count > 0 {
        parts.push(flags.crowd_count.to_string());
    }
    parts.push(shape.orig.to_string());
    if let Some(dest) = shape.dest {
        parts.push(dest.to_string());
    }
    if let Some(brush) = &shape.brush {
        parts.push(brush.clone());
    }
    if flags.shortened {
        parts.push("-".into());
    }
    if let Some(piece) = &shape.piece {
        parts.push(piece_hash(piece));
    }
    if let Some(modifiers) = &shape.modifiers {
        let h = modifiers_hash(modifiers);
        if !h.is_empty() {
            parts.push(h);
        }
    }
    if let Some(custom) = &shape.custom {
        parts.push(format!(
            "custom-{},{}",
            text_hash(&custom.markup),
            custom.anchor.as_str()
        ));
    }
    if let Some(label) = &shape.label {
        let mut part = format!("label-{}", text_hash(&label.text));
        if let Some(fill) = &label.fill {
            part.push('-');
            part.push_str(fill);
        }
        parts.push(part);
    }
    if shape.below {
        parts.push("below".into());
    }
    parts.join(",")
}

/// Bounds-independent key for a ghost piece node; resizing repositions
/// ghosts in place instead of recreating them.
pub fn ghost_hash(shape: &Shape) -> String {
    match &shape.piece {
        Some(piece) => format!("ghost,{},{}", shape.orig, piece_hash(piece)),
        None => format!("ghost,{}", shape.orig),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Label;
    use crate::types::{Color, Role, Square};

    fn sq(key: &str) -> Square {
        key.parse().unwrap()
    }

    fn bounds() -> Bounds {
        Bounds::square(800.0).unwrap()
    }

    #[test]
    fn text_hash_matches_rolling_definition() {
        assert_eq!(text_hash(""), 0);
        assert_eq!(text_hash("A"), 65);
        assert_eq!(text_hash("AB"), 65 * 31 + 66);
        // wraps at 32 bits instead of overflowing
        let long = "a longer label that overflows";
        let expected = long
            .encode_utf16()
            .fold(0u64, |h, c| (h * 31 + c as u64) % (1 << 32));
        assert_eq!(text_hash(long) as u64, expected);
    }

    #[test]
    fn plain_arrow_hash() {
        let shape = Shape::arrow(sq("e2"), sq("e4"), "green");
        insta::assert_snapshot!(content_hash(&shape, ShapeFlags::default(), &bounds()), @"800,800,e2,e4,green");
    }

    #[test]
    fn full_hash_lists_fields_in_order() {
        let shape = Shape::arrow(sq("e2"), sq("e4"), "green")
            .with_label(Label::new("A"))
            .below();
        let flags = ShapeFlags {
            current: true,
            shortened: true,
            crowd_count: 2,
            ..ShapeFlags::default()
        };
        insta::assert_snapshot!(content_hash(&shape, flags, &bounds()), @"800,800,current,2,e2,e4,green,-,label-65,below");
    }

    #[test]
    fn identical_shapes_hash_identically() {
        let a = Shape::arrow(sq("a1"), sq("h8"), "red").with_label(Label::new("1"));
        let b = a.clone();
        assert_eq!(
            content_hash(&a, ShapeFlags::default(), &bounds()),
            content_hash(&b, ShapeFlags::default(), &bounds())
        );
    }

    #[test]
    fn each_visual_field_changes_hash() {
        let base = Shape::arrow(sq("a1"), sq("h8"), "red");
        let flags = ShapeFlags::default();
        let h = content_hash(&base, flags, &bounds());

        let variants = [
            Shape::arrow(sq("a1"), sq("h8"), "blue"),
            base.clone().with_label(Label::new("!")),
            base.clone().with_modifiers(BrushModifiers {
                line_width: Some(4.0),
                hilite: None,
            }),
            base.clone().with_modifiers(BrushModifiers {
                line_width: None,
                hilite: Some("white".into()),
            }),
            base.clone().below(),
        ];
        for variant in &variants {
            assert_ne!(content_hash(variant, flags, &bounds()), h, "{variant:?}");
        }
        let resized = Bounds::square(640.0).unwrap();
        assert_ne!(content_hash(&base, flags, &resized), h);
    }

    #[test]
    fn empty_modifiers_contribute_nothing() {
        let base = Shape::circle(sq("d4"), "green");
        let with_empty = base.clone().with_modifiers(BrushModifiers::default());
        assert_eq!(
            content_hash(&base, ShapeFlags::default(), &bounds()),
            content_hash(&with_empty, ShapeFlags::default(), &bounds())
        );
    }

    #[test]
    fn ghost_hash_ignores_bounds_and_includes_piece() {
        let shape = Shape::ghost(sq("e4"), Role::Knight, Color::White, Some(0.5));
        insta::assert_snapshot!(ghost_hash(&shape), @"ghost,e4,white,knight,0.5");
    }
}
