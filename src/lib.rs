//! Annotation overlays and premove mobility for 8×8 boards.
//!
//! Two independent pieces live here:
//! - [`render`]: a hashing reconciler that keeps a two-layer SVG scene in step
//!   with a [`shape::DrawState`] (arrows, circles, labels, embedded graphics
//!   and ghost pieces), touching only the nodes whose content changed.
//! - [`premove`]: the squares a piece could be queued to move to before its
//!   side is on move.

pub mod errors;
pub mod fen;
pub mod log;
pub mod premove;
pub mod render;
pub mod shape;
pub mod types;

pub use errors::{FenError, SquareError};
pub use fen::{INITIAL_FEN, read_fen, write_fen};
pub use premove::{PremoveOptions, premove_destinations, premove_destinations_with};
pub use render::{OverlaySession, SyncReport};
pub use shape::{Brush, BrushModifiers, BrushPalette, DrawState, Label, Shape};
pub use types::{BoardView, Bounds, Color, Piece, Pieces, Role, Square};

/// Render a placement's annotations once and return the scene as SVG text.
///
/// Convenience for one-shot output; interactive hosts keep an
/// [`OverlaySession`] alive so later passes only touch what changed.
pub fn render_overlay(state: &DrawState, view: &BoardView) -> String {
    let mut session = OverlaySession::new();
    session.render(state, view);
    session.scene().to_svg()
}
