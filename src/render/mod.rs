//! SVG overlay rendering for board annotations
//!
//! This module is organized into submodules:
//! - `defaults`: Default sizes and settings
//! - `geometry`: Drawing-space projection, approach slots, crowding and label placement
//! - `hash`: Content hashes used as reconciliation keys
//! - `svg`: Detached elements and the mounted visual tree
//! - `shapes`: Overlay primitives and the per-shape renderer
//! - `scene`: Container layout and ghost re-projection
//! - `reconcile`: The hashing reconciler driving a render session

pub mod defaults;
pub mod geometry;
pub mod hash;
pub mod reconcile;
pub mod scene;
pub mod shapes;
pub mod svg;

// Re-export commonly used items
pub use reconcile::{OverlaySession, SyncReport};
pub use scene::{Layer, LayerNodes, Scene};
pub use shapes::{Overlay, OverlayPrimitive};
pub use svg::{NodeId, SvgElement, SvgTree};
