//! Layout engine.
//!
//! Pure computations over the container tree: gap resolution, geometry
//! derivation and proportional sizing. Nothing here talks to the window
//! system; the redraw handler turns computed rectangles into placements.

pub mod gaps;
pub mod geometry;
pub mod sizing;

pub use gaps::Gaps;
pub use geometry::{child_rects, height, rect, width, window_rects, x, y};
pub use sizing::{MIN_SIZE_PERCENTAGE, resize, share_on_attach, share_on_detach};
