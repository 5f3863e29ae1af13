//! Overlay primitives
//!
//! Each primitive is its own type that knows how to:
//! - Describe itself as a detached SVG element
//! - Name the arrowhead markers it references
//!
//! `plan_shape` turns one logical shape into the primitives that draw it.

use enum_dispatch::enum_dispatch;
use glam::{DVec2, dvec2};

use super::defaults;
use super::geometry::{
    AngleIndex, arrow_margin, arrowhead_length, axis_scale, filter_box, label_font_size,
    label_position, label_shrink, shorten, slot_of, square_to_user, translate_px,
};
use super::hash::{ShapeFlags, text_hash};
use super::svg::{SvgElement, fmt_num};
use crate::log::warn;
use crate::shape::{Anchor, Brush, BrushPalette, Shape};
use crate::types::{BoardView, Color, Role, Square};

/// Common behavior for all overlay primitives
#[enum_dispatch]
pub trait OverlayPrimitive {
    /// Detached element for this primitive
    fn to_element(&self) -> SvgElement;

    /// Brushes whose arrowhead markers the element references
    fn markers(&self) -> Vec<Brush> {
        Vec::new()
    }
}

/// A rendered overlay primitive
#[enum_dispatch(OverlayPrimitive)]
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    GhostPiece,
    CircleMark,
    ArrowMark,
    LabelBadge,
    CustomGraphic,
}

fn translate(at: DVec2) -> String {
    format!("translate({},{})", fmt_num(at.x), fmt_num(at.y))
}

/// Transform placing a ghost piece; shared with the resize handler.
pub(crate) fn ghost_transform(px: DVec2, scale: f64) -> String {
    format!("{} scale({})", translate(px), fmt_num(scale))
}

fn marker_ref(brush: &Brush) -> String {
    format!("url(#arrowhead-{})", brush.key)
}

/// Arrowhead marker resource for a brush
pub fn marker_element(brush: &Brush) -> SvgElement {
    SvgElement::new("marker")
        .attr("id", format!("arrowhead-{}", brush.key))
        .attr(defaults::BRUSH_ATTR, brush.key.clone())
        .attr("orient", "auto")
        .attr("overflow", "visible")
        .num("markerWidth", defaults::MARKER_SIZE)
        .num("markerHeight", defaults::MARKER_SIZE)
        .num("refX", defaults::MARKER_REF_X)
        .num("refY", defaults::MARKER_REF_Y)
        .child(
            SvgElement::new("path")
                .attr("d", defaults::MARKER_PATH)
                .attr("fill", brush.color.clone()),
        )
}

/// A piece drawn translucently in the auto-piece container
#[derive(Debug, Clone, PartialEq)]
pub struct GhostPiece {
    pub key: Square,
    pub role: Role,
    pub color: Color,
    pub scale: f64,
    /// Pixel offset of the square's top-left corner
    pub px: DVec2,
}

impl OverlayPrimitive for GhostPiece {
    fn to_element(&self) -> SvgElement {
        SvgElement::new("piece")
            .attr("class", format!("ghost {} {}", self.color, self.role))
            .attr(defaults::KEY_ATTR, self.key.to_string())
            .num(defaults::SCALE_ATTR, self.scale)
            .attr("transform", ghost_transform(self.px, self.scale))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleMark {
    pub center: DVec2,
    pub radius: f64,
    pub color: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl OverlayPrimitive for CircleMark {
    fn to_element(&self) -> SvgElement {
        SvgElement::new("circle")
            .attr("stroke", self.color.clone())
            .num("stroke-width", self.stroke_width)
            .attr("fill", "none")
            .num("opacity", self.opacity)
            .num("cx", self.center.x)
            .num("cy", self.center.y)
            .num("r", self.radius)
    }
}

/// Blurred halo drawn beneath an arrow
#[derive(Debug, Clone, PartialEq)]
pub struct Halo {
    pub brush: Brush,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowMark {
    pub from: DVec2,
    /// Already pulled back by the endpoint margin
    pub to: DVec2,
    pub brush: Brush,
    /// Drawing-space stroke width
    pub line_width: f64,
    pub opacity: f64,
    pub halo: Option<Halo>,
}

impl ArrowMark {
    fn line(&self, brush: &Brush, line_width: f64) -> SvgElement {
        SvgElement::new("line")
            .attr("stroke", brush.color.clone())
            .num("stroke-width", line_width)
            .attr("stroke-linecap", "round")
            .attr("marker-end", marker_ref(brush))
            .num("x1", self.from.x)
            .num("y1", self.from.y)
            .num("x2", self.to.x)
            .num("y2", self.to.y)
    }
}

impl OverlayPrimitive for ArrowMark {
    fn to_element(&self) -> SvgElement {
        let crisp = self.line(&self.brush, self.line_width);
        let Some(halo) = &self.halo else {
            return crisp.num("opacity", self.opacity);
        };
        let (min, max) = filter_box(self.from, self.to);
        let bbox = SvgElement::new("rect")
            .num("x", min.x)
            .num("y", min.y)
            .num("width", max.x - min.x)
            .num("height", max.y - min.y)
            .attr("fill", "none")
            .attr("stroke", "none");
        SvgElement::new("g")
            .num("opacity", self.opacity)
            .child(
                SvgElement::new("g")
                    .attr("filter", format!("url(#{})", defaults::BLUR_FILTER_ID))
                    .child(bbox)
                    .child(self.line(&halo.brush, halo.line_width)),
            )
            .child(crisp)
    }

    fn markers(&self) -> Vec<Brush> {
        let mut markers = vec![self.brush.clone()];
        if let Some(halo) = &self.halo {
            markers.push(halo.brush.clone());
        }
        markers
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelBadge {
    pub at: DVec2,
    pub text: String,
    pub fill: String,
}

impl OverlayPrimitive for LabelBadge {
    fn to_element(&self) -> SvgElement {
        SvgElement::new("g")
            .attr("transform", translate(self.at))
            .child(
                SvgElement::new("circle")
                    .num("r", defaults::LABEL_SIZE / 2.0)
                    .attr("fill", self.fill.clone())
                    .attr("stroke", "white")
                    .num("stroke-width", defaults::LABEL_STROKE),
            )
            .child(
                SvgElement::new("text")
                    .num("font-size", label_font_size(&self.text))
                    .attr("text-anchor", "middle")
                    .attr("fill", "white")
                    .num("y", defaults::LABEL_BASELINE * label_shrink(&self.text))
                    .text(self.text.clone()),
            )
    }
}

/// Host markup scaled into a 1×1 cell centered on its anchor
#[derive(Debug, Clone, PartialEq)]
pub struct CustomGraphic {
    pub at: DVec2,
    pub markup: String,
}

impl OverlayPrimitive for CustomGraphic {
    fn to_element(&self) -> SvgElement {
        SvgElement::new("g")
            .attr("transform", translate(self.at - DVec2::splat(0.5)))
            .child(
                SvgElement::new("svg")
                    .num("width", 1.0)
                    .num("height", 1.0)
                    .attr("viewBox", defaults::CUSTOM_VIEW_BOX)
                    .markup(self.markup.clone()),
            )
    }
}

/// Inputs shared by every shape of one render pass
pub struct ShapeRenderContext<'a> {
    pub view: &'a BoardView,
    pub brushes: &'a BrushPalette,
    pub angles: &'a AngleIndex,
}

fn stroke_opacity(brush: &Brush, flags: ShapeFlags) -> f64 {
    let mut opacity = brush.opacity;
    if flags.current {
        opacity *= defaults::CURRENT_OPACITY;
    }
    if flags.pending_erase {
        opacity *= defaults::PENDING_ERASE_OPACITY;
    }
    opacity
}

fn arrow_line_width(brush: &Brush, current: bool) -> f64 {
    let width = brush.line_width / defaults::LINE_WIDTH_UNIT;
    if current {
        width * defaults::CURRENT_LINE_FACTOR
    } else {
        width
    }
}

fn halo_for(brush: &Brush, color: &str, line_width: f64) -> Halo {
    Halo {
        brush: Brush::new(
            format!("hilite{}", text_hash(color)),
            color,
            1.0,
            brush.line_width,
        ),
        line_width: line_width + defaults::HILITE_EXTRA_WIDTH,
    }
}

/// The primitives drawing `shape`, in stacking order.
///
/// A ghost piece excludes every other primitive. An unknown brush id draws
/// no stroke, but labels and embedded content still render.
pub fn plan_shape(shape: &Shape, flags: ShapeFlags, ctx: &ShapeRenderContext<'_>) -> Vec<Overlay> {
    if let Some(piece) = shape.piece {
        return vec![Overlay::from(GhostPiece {
            key: shape.orig,
            role: piece.role,
            color: piece.color,
            scale: piece.scale.unwrap_or(1.0),
            px: translate_px(shape.orig, ctx.view),
        })];
    }

    let from = square_to_user(shape.orig, ctx.view);
    let to = square_to_user(shape.dest_or_orig(), ctx.view);

    let brush = shape.brush.as_deref().and_then(|id| {
        let found = ctx.brushes.get(id);
        if found.is_none() {
            warn!(brush = id, origin = %shape.orig, "unknown brush, stroke skipped");
        }
        found
    });
    let brush = brush.map(|b| match &shape.modifiers {
        Some(modifiers) => b.derive(modifiers),
        None => b.clone(),
    });

    let mut out = Vec::new();
    let mut label_at = None;

    if let Some(brush) = &brush {
        if shape.is_arrow() {
            let dest = shape.dest_or_orig();
            let line_width = arrow_line_width(brush, flags.current);
            let end = shorten(from, to, arrow_margin(flags.shortened, flags.current));
            let halo = shape
                .modifiers
                .as_ref()
                .and_then(|m| m.hilite.as_deref())
                .map(|color| halo_for(brush, color, line_width));
            out.push(Overlay::from(ArrowMark {
                from,
                to: end,
                brush: brush.clone(),
                line_width,
                opacity: stroke_opacity(brush, flags),
                halo,
            }));
            label_at = Some(label_position(
                from,
                to,
                slot_of(shape.orig, dest),
                ctx.angles.slots(dest),
                arrowhead_length(line_width),
                flags.current,
            ));
        } else {
            let scale = axis_scale(&ctx.view.bounds);
            let stroke_width = if flags.current {
                defaults::CIRCLE_STROKE_CURRENT
            } else {
                defaults::CIRCLE_STROKE
            };
            out.push(Overlay::from(CircleMark {
                center: from,
                radius: defaults::CIRCLE_RADIUS * scale.x.min(scale.y) - stroke_width / 2.0,
                color: brush.color.clone(),
                stroke_width,
                opacity: stroke_opacity(brush, flags),
            }));
            label_at = Some(from);
        }
    }

    let label_at = label_at.unwrap_or_else(|| {
        if shape.brush.is_none() {
            from + dvec2(defaults::LABEL_CORNER_OFFSET, -defaults::LABEL_CORNER_OFFSET)
        } else {
            from
        }
    });

    if let Some(label) = &shape.label {
        let fill = label
            .fill
            .clone()
            .or_else(|| brush.as_ref().map(|b| b.color.clone()))
            .unwrap_or_else(|| defaults::LABEL_DEFAULT_FILL.to_string());
        out.push(Overlay::from(LabelBadge {
            at: label_at,
            text: label.text.clone(),
            fill,
        }));
    }

    if let Some(custom) = &shape.custom {
        let at = match custom.anchor {
            Anchor::Origin => from,
            Anchor::Destination => to,
            Anchor::Label => label_at,
        };
        out.push(Overlay::from(CustomGraphic {
            at,
            markup: custom.markup.clone(),
        }));
    }

    out
}
