//! Logical annotation model: shapes, brushes and the host-owned drawing state
//!
//! Nothing here knows about the visual tree. A render pass reads a `DrawState`
//! and reconciles the scene against it.

use std::collections::BTreeMap;

use crate::types::{Color, Role, Square};

/// A named stroke style
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    /// Identity used for marker resources; derived brushes extend the base key
    pub key: String,
    pub color: String,
    pub opacity: f64,
    /// Line width in 1/64ths of a square
    pub line_width: f64,
}

impl Brush {
    pub fn new(key: impl Into<String>, color: impl Into<String>, opacity: f64, line_width: f64) -> Self {
        Self {
            key: key.into(),
            color: color.into(),
            opacity,
            line_width,
        }
    }

    /// Apply per-shape overrides, producing a brush with its own identity.
    ///
    /// The key is the base key followed by the line-width override so that
    /// each distinct (brush, override) pair gets its own arrowhead marker.
    pub fn derive(&self, modifiers: &BrushModifiers) -> Brush {
        let key = match modifiers.line_width {
            Some(w) => format!("{}{}", self.key, w),
            None => self.key.clone(),
        };
        Brush {
            key,
            color: self.color.clone(),
            opacity: (self.opacity * 10.0).round() / 10.0,
            line_width: modifiers.line_width.unwrap_or(self.line_width).round(),
        }
    }
}

/// Per-shape brush refinements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrushModifiers {
    pub line_width: Option<f64>,
    /// Halo color drawn blurred beneath the arrow
    pub hilite: Option<String>,
}

/// Ghost piece drawn instead of a mark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePiece {
    pub role: Role,
    pub color: Color,
    pub scale: Option<f64>,
}

/// Where embedded content is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Origin,
    Destination,
    Label,
}

impl Anchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Origin => "orig",
            Anchor::Destination => "dest",
            Anchor::Label => "label",
        }
    }
}

/// Host-supplied SVG markup, injected verbatim (callers sanitize upstream)
#[derive(Debug, Clone, PartialEq)]
pub struct CustomContent {
    pub markup: String,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub fill: Option<String>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fill: None,
        }
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }
}

/// A logical annotation addressed by board squares
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub orig: Square,
    pub dest: Option<Square>,
    pub brush: Option<String>,
    pub modifiers: Option<BrushModifiers>,
    pub piece: Option<ShapePiece>,
    pub custom: Option<CustomContent>,
    pub label: Option<Label>,
    pub below: bool,
}

impl Shape {
    fn bare(orig: Square) -> Self {
        Self {
            orig,
            dest: None,
            brush: None,
            modifiers: None,
            piece: None,
            custom: None,
            label: None,
            below: false,
        }
    }

    pub fn arrow(orig: Square, dest: Square, brush: impl Into<String>) -> Self {
        Self {
            dest: Some(dest),
            brush: Some(brush.into()),
            ..Self::bare(orig)
        }
    }

    pub fn circle(at: Square, brush: impl Into<String>) -> Self {
        Self {
            brush: Some(brush.into()),
            ..Self::bare(at)
        }
    }

    /// A ghost piece; carries no brush or label.
    pub fn ghost(at: Square, role: Role, color: Color, scale: Option<f64>) -> Self {
        Self {
            piece: Some(ShapePiece { role, color, scale }),
            ..Self::bare(at)
        }
    }

    /// A label badge in the corner of a square, without any stroke.
    pub fn label_only(at: Square, label: Label) -> Self {
        Self {
            label: Some(label),
            ..Self::bare(at)
        }
    }

    /// Embedded content without any stroke.
    pub fn custom_only(at: Square, markup: impl Into<String>, anchor: Anchor) -> Self {
        Self::bare(at).with_custom(markup, anchor)
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_modifiers(mut self, modifiers: BrushModifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    pub fn with_custom(mut self, markup: impl Into<String>, anchor: Anchor) -> Self {
        self.custom = Some(CustomContent {
            markup: markup.into(),
            anchor,
        });
        self
    }

    pub fn below(mut self) -> Self {
        self.below = true;
        self
    }

    /// An arrow has a destination distinct from its origin.
    pub fn is_arrow(&self) -> bool {
        self.dest.is_some_and(|d| d != self.orig)
    }

    /// Destination used for drawing: the origin when the shape is a circle.
    pub fn dest_or_orig(&self) -> Square {
        self.dest.unwrap_or(self.orig)
    }

    /// Same endpoints, circles compared by origin only.
    pub fn same_endpoints(&self, other: &Shape) -> bool {
        self.orig == other.orig && self.dest_or_orig() == other.dest_or_orig()
    }
}

/// Brush id → brush
#[derive(Debug, Clone, PartialEq)]
pub struct BrushPalette {
    brushes: BTreeMap<String, Brush>,
}

impl BrushPalette {
    pub fn empty() -> Self {
        Self {
            brushes: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, brush: Brush) {
        self.brushes.insert(brush.key.clone(), brush);
    }

    pub fn get(&self, id: &str) -> Option<&Brush> {
        self.brushes.get(id)
    }

    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }
}

impl Default for BrushPalette {
    fn default() -> Self {
        let mut palette = Self::empty();
        for (key, color, opacity, line_width) in [
            ("green", "#15781B", 1.0, 10.0),
            ("red", "#882020", 1.0, 10.0),
            ("blue", "#003088", 1.0, 10.0),
            ("yellow", "#e68f00", 1.0, 10.0),
            ("paleBlue", "#003088", 0.4, 15.0),
            ("paleGreen", "#15781B", 0.4, 15.0),
            ("paleRed", "#882020", 0.4, 15.0),
            ("paleGrey", "#4a4a4a", 0.35, 15.0),
            ("purple", "#68217a", 0.65, 10.0),
            ("pink", "#ee2080", 0.5, 10.0),
            ("white", "white", 1.0, 10.0),
        ] {
            palette.insert(Brush::new(key, color, opacity, line_width));
        }
        palette
    }
}

/// Brushes selected by modifier keys while drawing: none, primary, secondary, both.
const GESTURE_BRUSHES: [&str; 4] = ["green", "red", "blue", "yellow"];

/// Host-owned drawing state
#[derive(Debug, Clone)]
pub struct DrawState {
    /// Gestures are ignored when false
    pub enabled: bool,
    /// A render pass treats the shape list as empty when false
    pub visible: bool,
    /// User-drawn shapes
    pub shapes: Vec<Shape>,
    /// Host-generated shapes (engine arrows, ghost pieces, ...)
    pub auto_shapes: Vec<Shape>,
    /// The shape currently being drawn
    pub current: Option<Shape>,
    pub brushes: BrushPalette,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
            shapes: Vec::new(),
            auto_shapes: Vec::new(),
            current: None,
            brushes: BrushPalette::default(),
        }
    }
}

impl DrawState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes(mut self, shapes: Vec<Shape>) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn with_auto_shapes(mut self, shapes: Vec<Shape>) -> Self {
        self.auto_shapes = shapes;
        self
    }

    /// Brush id for the modifier keys held when a gesture starts.
    pub fn brush_for_modifiers(primary: bool, secondary: bool) -> &'static str {
        GESTURE_BRUSHES[usize::from(primary) + 2 * usize::from(secondary)]
    }

    /// Begin drawing at `orig`. The shape starts as a circle.
    pub fn start(&mut self, orig: Square, brush: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.current = Some(Shape::circle(orig, brush));
    }

    /// Move the in-progress shape's destination. `None` means the pointer left
    /// the board and keeps the previous destination.
    pub fn update(&mut self, dest: Option<Square>) {
        let (Some(cur), Some(dest)) = (self.current.as_mut(), dest) else {
            return;
        };
        cur.dest = (dest != cur.orig).then_some(dest);
    }

    /// Commit the in-progress shape with toggle semantics.
    ///
    /// Returns true if the persisted shapes changed.
    pub fn end(&mut self) -> bool {
        let Some(cur) = self.current.take() else {
            return false;
        };
        let similar = self.shapes.iter().position(|s| s.same_endpoints(&cur));
        match similar {
            Some(idx) => {
                let removed = self.shapes.remove(idx);
                self.shapes.retain(|s| !s.same_endpoints(&cur));
                if removed.brush != cur.brush {
                    self.shapes.push(cur);
                }
            }
            None => self.shapes.push(cur),
        }
        true
    }

    /// Drop the in-progress shape.
    pub fn cancel(&mut self) {
        self.current = None;
    }

    /// Drop persisted and in-progress shapes. Auto shapes belong to the host.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.current = None;
    }
}
