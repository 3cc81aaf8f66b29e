//! Drawing-surface boundary.
//!
//! The engine never rasterizes; it issues canvas-style primitives against a
//! host-supplied surface. One surface belongs to exactly one tile, so the
//! handle's lock is uncontended in the single-logical-thread model and
//! only guards against the host reading mid-draw.

use std::sync::{Arc, Mutex};

use crate::geom::{PixelPoint, TilePath};
use crate::layer::style::Style;
use crate::tile::TileId;

/// Shared handle to one tile's drawing surface.
pub type SurfaceHandle = Arc<Mutex<dyn DrawSurface>>;

/// Drawing primitives the host's rasterizer must provide.
///
/// `apply_style` sets the subsequent fill/stroke/line-width state from the
/// style's populated fields; primitives that follow draw with that state.
pub trait DrawSurface: Send {
    /// Apply the populated fields of `style` to the drawing state.
    fn apply_style(&mut self, style: &Style);

    /// Fill a composite path (even-odd rule, subpaths implicitly closed).
    fn fill_path(&mut self, path: &TilePath);

    /// Stroke a composite path; closed paths include the closing segment.
    fn stroke_path(&mut self, path: &TilePath);

    /// Fill a circle.
    fn fill_circle(&mut self, center: PixelPoint, radius: f64);

    /// Stroke a circle outline.
    fn stroke_circle(&mut self, center: PixelPoint, radius: f64);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Stroke an axis-aligned rectangle outline.
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Stroke a line of text with its baseline at `(x, y)`.
    fn stroke_text(&mut self, text: &str, x: f64, y: f64);

    /// Clear the whole surface.
    fn clear(&mut self);
}

/// Creates drawing surfaces on behalf of the host when a tile is first
/// requested.
pub trait SurfaceFactory {
    /// Create the surface for `id`, sized `tile_size` x `tile_size` pixels.
    fn create_surface(&self, id: TileId, tile_size: u32) -> SurfaceHandle;
}
