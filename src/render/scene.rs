//! Container layout the reconciler mutates
//!
//! ```text
//! cg-container
//! ├── svg.cg-shapes.cg-shapes-below   (defs, g)
//! ├── cg-board                        host-owned pieces
//! ├── svg.cg-shapes                   (defs, g)
//! └── cg-auto-pieces                  ghost pieces
//! ```

use super::defaults;
use super::geometry::translate_px;
use super::shapes::ghost_transform;
use super::svg::{NodeId, SvgElement, SvgTree};
use crate::log::debug;
use crate::types::{BoardView, Square};

/// Stacking layer for brush-drawn shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Beneath the board's pieces
    Below,
    Above,
}

/// Nodes of one layer's svg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerNodes {
    pub svg: NodeId,
    /// Arrowhead markers and the blur filter
    pub defs: NodeId,
    /// Shape content
    pub shapes: NodeId,
}

#[derive(Debug, Clone)]
pub struct Scene {
    tree: SvgTree,
    below: LayerNodes,
    board: NodeId,
    above: LayerNodes,
    auto_pieces: NodeId,
}

fn blur_filter() -> SvgElement {
    SvgElement::new("filter")
        .attr("id", defaults::BLUR_FILTER_ID)
        .child(SvgElement::new("feGaussianBlur").num("stdDeviation", defaults::BLUR_STD_DEVIATION))
}

fn mount_layer(tree: &mut SvgTree, parent: NodeId, class: &str) -> LayerNodes {
    let svg = tree.mount_child(
        parent,
        SvgElement::new("svg")
            .attr("class", class)
            .attr("viewBox", defaults::VIEW_BOX)
            .attr("preserveAspectRatio", "xMidYMid slice"),
    );
    let defs = tree.mount_child(svg, SvgElement::new("defs").child(blur_filter()));
    let shapes = tree.mount_child(svg, SvgElement::new("g"));
    LayerNodes { svg, defs, shapes }
}

impl Scene {
    pub fn new() -> Self {
        let mut tree = SvgTree::new(SvgElement::new("cg-container"));
        let root = tree.root();
        let below = mount_layer(&mut tree, root, "cg-shapes cg-shapes-below");
        let board = tree.mount_child(root, SvgElement::new("cg-board"));
        let above = mount_layer(&mut tree, root, "cg-shapes");
        let auto_pieces = tree.mount_child(root, SvgElement::new("cg-auto-pieces"));
        Self {
            tree,
            below,
            board,
            above,
            auto_pieces,
        }
    }

    pub fn tree(&self) -> &SvgTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut SvgTree {
        &mut self.tree
    }

    pub fn layer(&self, layer: Layer) -> LayerNodes {
        match layer {
            Layer::Below => self.below,
            Layer::Above => self.above,
        }
    }

    /// Slot for the host's own piece elements; never touched by reconciliation.
    pub fn board(&self) -> NodeId {
        self.board
    }

    pub fn auto_pieces(&self) -> NodeId {
        self.auto_pieces
    }

    /// Re-project ghost pieces from their `data-key` / `data-scale` pair.
    ///
    /// Returns the number of ghosts repositioned; children missing either
    /// attribute are left alone.
    pub fn resize(&mut self, view: &BoardView) -> usize {
        let ghosts: Vec<(NodeId, Square, f64)> = self
            .tree
            .children(self.auto_pieces)
            .iter()
            .filter_map(|&id| {
                let key = self.tree.attr(id, defaults::KEY_ATTR)?.parse::<Square>().ok()?;
                let scale = self.tree.attr(id, defaults::SCALE_ATTR)?.parse::<f64>().ok()?;
                Some((id, key, scale))
            })
            .collect();
        for &(id, key, scale) in &ghosts {
            self.tree
                .set_attr(id, "transform", ghost_transform(translate_px(key, view), scale));
        }
        debug!(count = ghosts.len(), "ghost pieces re-projected");
        ghosts.len()
    }

    pub fn to_svg(&self) -> String {
        self.tree.to_svg(self.tree.root())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
