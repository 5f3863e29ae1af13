//! Hashing reconciler
//!
//! A render pass hashes every shape, compares the hashes with the ones recorded
//! on the nodes already mounted, removes nodes nobody asks for any more and
//! renders only the shapes with no node yet. A pass whose joined hashes equal
//! the previous pass's does nothing at all.

use std::collections::HashSet;

use super::defaults;
use super::geometry::AngleIndex;
use super::hash::{ShapeFlags, content_hash, ghost_hash};
use super::scene::{Layer, Scene};
use super::shapes::{OverlayPrimitive, ShapeRenderContext, marker_element, plan_shape};
use super::svg::NodeId;
use crate::log::debug;
use crate::shape::{BrushPalette, DrawState, Shape};
use crate::types::{BoardView, Color};

/// What one render pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// The session hash was unchanged and nothing was touched
    pub skipped: bool,
    /// Content nodes appended
    pub inserted: usize,
    /// Content nodes removed
    pub removed: usize,
    /// Arrowhead markers appended
    pub markers_added: usize,
}

/// A shape annotated for one pass
#[derive(Debug, Clone)]
pub struct RenderedShape<'a> {
    pub shape: &'a Shape,
    pub flags: ShapeFlags,
    /// Content hash, includes the bounds
    pub hash: String,
    /// Attribute recorded on the shape's nodes
    pub node_key: String,
}

/// Arrows whose brush resolves; only these draw a shaft into their destination.
fn is_stroked_arrow(shape: &Shape, brushes: &BrushPalette) -> bool {
    shape.is_arrow()
        && shape.piece.is_none()
        && shape
            .brush
            .as_deref()
            .is_some_and(|id| brushes.get(id).is_some())
}

/// Everything one pass renders, in drawing order, plus the angle index.
///
/// The in-progress shape is appended unless a persisted shape with the same
/// endpoints and brush exists; that shape is flagged pending erase instead.
pub fn collect_shapes<'a>(
    state: &'a DrawState,
    view: &BoardView,
) -> (Vec<RenderedShape<'a>>, AngleIndex) {
    if !state.visible {
        return (Vec::new(), AngleIndex::default());
    }

    let erases = |s: &Shape| {
        state
            .current
            .as_ref()
            .is_some_and(|cur| cur.same_endpoints(s) && cur.brush == s.brush)
    };

    let mut entries: Vec<(&Shape, ShapeFlags)> = state
        .shapes
        .iter()
        .map(|s| {
            let flags = ShapeFlags {
                pending_erase: erases(s),
                ..ShapeFlags::default()
            };
            (s, flags)
        })
        .collect();
    entries.extend(state.auto_shapes.iter().map(|s| (s, ShapeFlags::default())));

    if let Some(cur) = &state.current {
        let erasing = entries.iter().any(|(_, f)| f.pending_erase);
        if !erasing {
            let flags = ShapeFlags {
                current: true,
                ..ShapeFlags::default()
            };
            entries.push((cur, flags));
        }
    }

    let angles = AngleIndex::build(
        entries
            .iter()
            .filter(|(s, _)| is_stroked_arrow(s, &state.brushes))
            .map(|(s, _)| (s.orig, s.dest_or_orig())),
    );

    let rendered = entries
        .into_iter()
        .map(|(shape, mut flags)| {
            if is_stroked_arrow(shape, &state.brushes) {
                let dest = shape.dest_or_orig();
                flags.crowd_count = angles.count(dest);
                flags.shortened = angles.is_crowded(dest);
            }
            let hash = content_hash(shape, flags, &view.bounds);
            let node_key = if shape.piece.is_some() {
                ghost_hash(shape)
            } else {
                hash.clone()
            };
            RenderedShape {
                shape,
                flags,
                hash,
                node_key,
            }
        })
        .collect();

    (rendered, angles)
}

/// One reconciliation session: the scene plus the short-circuit sentinel.
#[derive(Debug, Clone, Default)]
pub struct OverlaySession {
    scene: Scene,
    prev_hash: Option<String>,
    orientation: Option<Color>,
}

impl OverlaySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Joined hashes of the last applied pass
    pub fn previous_hash(&self) -> Option<&str> {
        self.prev_hash.as_deref()
    }

    /// Bring the scene in line with `state` seen through `view`.
    pub fn render(&mut self, state: &DrawState, view: &BoardView) -> SyncReport {
        let (shapes, angles) = collect_shapes(state, view);
        let session_hash = shapes
            .iter()
            .map(|s| s.hash.as_str())
            .collect::<Vec<_>>()
            .join(";");

        // Content hashes are orientation-blind, so a flip rebuilds both layers.
        let flipped = self.orientation.is_some_and(|o| o != view.orientation);
        if !flipped && self.prev_hash.as_deref() == Some(session_hash.as_str()) {
            debug!("overlay pass skipped");
            return SyncReport {
                skipped: true,
                ..SyncReport::default()
            };
        }

        let ctx = ShapeRenderContext {
            view,
            brushes: &state.brushes,
            angles: &angles,
        };
        let mut report = SyncReport::default();

        for layer in [Layer::Below, Layer::Above] {
            let nodes = self.scene.layer(layer);
            let wanted: Vec<&RenderedShape<'_>> = shapes
                .iter()
                .filter(|s| s.shape.piece.is_none() && s.shape.below == (layer == Layer::Below))
                .collect();
            self.sync(nodes.shapes, Some(nodes.defs), &wanted, &ctx, flipped, &mut report);
        }

        let ghosts: Vec<&RenderedShape<'_>> =
            shapes.iter().filter(|s| s.shape.piece.is_some()).collect();
        let container = self.scene.auto_pieces();
        self.sync(container, None, &ghosts, &ctx, false, &mut report);
        self.scene.resize(view);

        debug!(
            inserted = report.inserted,
            removed = report.removed,
            markers = report.markers_added,
            "overlay pass applied"
        );
        self.prev_hash = Some(session_hash);
        self.orientation = Some(view.orientation);
        report
    }

    /// Reconcile one container. `purge` drops every existing node.
    fn sync(
        &mut self,
        container: NodeId,
        defs: Option<NodeId>,
        wanted: &[&RenderedShape<'_>],
        ctx: &ShapeRenderContext<'_>,
        purge: bool,
        report: &mut SyncReport,
    ) {
        let tree = self.scene.tree_mut();
        let required: HashSet<&str> = wanted.iter().map(|s| s.node_key.as_str()).collect();

        let mut present: HashSet<String> = HashSet::new();
        let mut stale: Vec<NodeId> = Vec::new();
        for &id in tree.children(container) {
            match tree.attr(id, defaults::HASH_ATTR) {
                Some(h) if !purge && required.contains(h) => {
                    present.insert(h.to_string());
                }
                _ => stale.push(id),
            }
        }
        for id in stale {
            if tree.remove(id) {
                report.removed += 1;
            }
        }

        let mut known_markers: HashSet<String> = defs
            .map(|defs| {
                tree.children(defs)
                    .iter()
                    .filter_map(|&id| tree.attr(id, defaults::BRUSH_ATTR))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        for rendered in wanted {
            if !present.insert(rendered.node_key.clone()) {
                continue;
            }
            for overlay in plan_shape(rendered.shape, rendered.flags, ctx) {
                if let Some(defs) = defs {
                    for brush in overlay.markers() {
                        if known_markers.insert(brush.key.clone())
                            && tree.append(defs, marker_element(&brush)).is_some()
                        {
                            report.markers_added += 1;
                        }
                    }
                }
                let element = overlay
                    .to_element()
                    .attr(defaults::HASH_ATTR, rendered.node_key.clone());
                if tree.append(container, element).is_some() {
                    report.inserted += 1;
                }
            }
        }
    }

    /// Re-project ghost pieces after the board was resized.
    pub fn resize(&mut self, view: &BoardView) -> usize {
        self.scene.resize(view)
    }

    /// Forget the previous pass so the next one is never skipped.
    pub fn reset(&mut self) {
        self.prev_hash = None;
    }

    /// Clear the user's shapes and render the result.
    pub fn clear(&mut self, state: &mut DrawState, view: &BoardView) -> SyncReport {
        state.clear();
        self.reset();
        self.render(state, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bounds;

    fn sq(key: &str) -> crate::types::Square {
        key.parse().unwrap()
    }

    fn view() -> BoardView {
        BoardView::new(Bounds::square(800.0).unwrap(), Color::White)
    }

    #[test]
    fn current_shape_is_appended() {
        let mut state = DrawState::new().with_shapes(vec![Shape::circle(sq("a1"), "green")]);
        state.start(sq("e2"), "green");
        state.update(Some(sq("e4")));
        let (shapes, _) = collect_shapes(&state, &view());
        assert_eq!(shapes.len(), 2);
        assert!(shapes[1].flags.current);
    }

    #[test]
    fn redrawing_a_shape_flags_pending_erase() {
        let mut state = DrawState::new().with_shapes(vec![Shape::arrow(sq("e2"), sq("e4"), "green")]);
        state.start(sq("e2"), "green");
        state.update(Some(sq("e4")));
        let (shapes, _) = collect_shapes(&state, &view());
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].flags.pending_erase);
        assert!(shapes[0].hash.contains("pendingErase"));
    }

    #[test]
    fn unknown_brush_arrow_does_not_crowd() {
        let state = DrawState::new().with_shapes(vec![
            Shape::arrow(sq("e8"), sq("e4"), "green"),
            Shape::arrow(sq("d8"), sq("e4"), "nosuch"),
        ]);
        let (shapes, angles) = collect_shapes(&state, &view());
        assert_eq!(angles.count(sq("e4")), 1);
        assert!(!shapes[0].flags.shortened);
        assert_eq!(shapes[0].flags.crowd_count, 1);
    }

    #[test]
    fn other_brush_is_not_pending_erase() {
        let mut state = DrawState::new().with_shapes(vec![Shape::arrow(sq("e2"), sq("e4"), "green")]);
        state.start(sq("e2"), "red");
        state.update(Some(sq("e4")));
        let (shapes, _) = collect_shapes(&state, &view());
        assert_eq!(shapes.len(), 2);
        assert!(!shapes[0].flags.pending_erase);
    }

    #[test]
    fn crowd_count_only_for_arrows() {
        let state = DrawState::new().with_shapes(vec![
            Shape::arrow(sq("e8"), sq("e4"), "green"),
            Shape::arrow(sq("d8"), sq("e4"), "red"),
            Shape::circle(sq("e4"), "blue"),
        ]);
        let (shapes, angles) = collect_shapes(&state, &view());
        assert_eq!(angles.count(sq("e4")), 2);
        assert_eq!(shapes[0].flags.crowd_count, 2);
        assert!(shapes[0].flags.shortened);
        assert_eq!(shapes[2].flags.crowd_count, 0);
    }

    #[test]
    fn hidden_state_renders_nothing() {
        let state = DrawState {
            visible: false,
            ..DrawState::new().with_shapes(vec![Shape::circle(sq("a1"), "green")])
        };
        let (shapes, _) = collect_shapes(&state, &view());
        assert!(shapes.is_empty());
    }

    #[test]
    fn markers_are_shared_and_append_only() {
        let mut session = OverlaySession::new();
        let mut state = DrawState::new().with_shapes(vec![
            Shape::arrow(sq("a1"), sq("a4"), "green"),
            Shape::arrow(sq("h1"), sq("h4"), "green"),
        ]);
        let report = session.render(&state, &view());
        assert_eq!(report.inserted, 2);
        assert_eq!(report.markers_added, 1);

        state.shapes.clear();
        let report = session.render(&state, &view());
        assert_eq!(report.removed, 2);
        let defs = session.scene().layer(Layer::Above).defs;
        assert_eq!(
            session.scene().tree().find_with_attr(defs, defaults::BRUSH_ATTR).len(),
            1
        );
    }

    #[test]
    fn below_shapes_use_below_layer() {
        let mut session = OverlaySession::new();
        let state = DrawState::new().with_shapes(vec![Shape::circle(sq("a1"), "green").below()]);
        session.render(&state, &view());
        let scene = session.scene();
        assert_eq!(scene.tree().children(scene.layer(Layer::Below).shapes).len(), 1);
        assert!(scene.tree().children(scene.layer(Layer::Above).shapes).is_empty());
    }

    #[test]
    fn flipping_rebuilds_layers() {
        let mut session = OverlaySession::new();
        let state = DrawState::new().with_shapes(vec![Shape::circle(sq("a1"), "green")]);
        session.render(&state, &view());
        let flipped = BoardView::new(Bounds::square(800.0).unwrap(), Color::Black);
        let report = session.render(&state, &flipped);
        assert!(!report.skipped);
        assert_eq!((report.inserted, report.removed), (1, 1));
    }

    #[test]
    fn reset_forces_next_pass() {
        let mut session = OverlaySession::new();
        let state = DrawState::new().with_shapes(vec![Shape::circle(sq("a1"), "green")]);
        session.render(&state, &view());
        assert!(session.render(&state, &view()).skipped);
        session.reset();
        let report = session.render(&state, &view());
        assert!(!report.skipped);
        assert_eq!((report.inserted, report.removed), (0, 0));
    }
}
