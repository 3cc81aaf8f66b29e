//! Per-tile rendering context.

use std::fmt;
use std::sync::Arc;

use crate::decode::DecodedTile;
use crate::surface::SurfaceHandle;

use super::TileId;

/// Everything the engine holds for one visible tile.
///
/// Created when the host first requests the tile, before any data exists.
/// The decoded tile is attached exactly once after the first successful
/// fetch+decode; redraws reuse it without refetching. The surface is
/// exclusively owned by this tile.
///
/// Contexts clone cheaply (the surface and decoded tile are shared
/// handles), which is how they move between the visible index, the
/// drawn-tile index and in-flight loads.
#[derive(Clone)]
pub struct TileContext {
    /// Identity of this tile
    pub id: TileId,

    /// Zoom level the tile was requested at (equals `id.zoom`)
    pub zoom: u32,

    /// Pixel size of the (square) drawing surface
    pub tile_size: u32,

    /// Ancestor tile whose data this tile reuses; set iff over-zoomed
    pub parent_id: Option<TileId>,

    /// The tile's drawing surface
    pub surface: SurfaceHandle,

    /// Decoded tile data, set once after the first successful fetch
    pub decoded: Option<Arc<dyn DecodedTile>>,
}

impl TileContext {
    pub(crate) fn new(
        id: TileId,
        parent_id: Option<TileId>,
        tile_size: u32,
        surface: SurfaceHandle,
    ) -> Self {
        Self {
            id,
            zoom: id.zoom,
            tile_size,
            parent_id,
            surface,
            decoded: None,
        }
    }

    /// The tile whose data must be fetched: the over-zoom ancestor when
    /// present, otherwise this tile itself.
    pub fn fetch_id(&self) -> TileId {
        self.parent_id.unwrap_or(self.id)
    }

    /// Attach the decoded tile. Only the first call takes effect; the
    /// decoded data never changes for the lifetime of the context.
    pub fn set_decoded(&mut self, decoded: Arc<dyn DecodedTile>) {
        if self.decoded.is_none() {
            self.decoded = Some(decoded);
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(id: TileId, parent_id: Option<TileId>, tile_size: u32) -> Self {
        use std::sync::Mutex;
        Self::new(
            id,
            parent_id,
            tile_size,
            Arc::new(Mutex::new(tests::NullSurface)),
        )
    }
}

impl fmt::Debug for TileContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileContext")
            .field("id", &self.id)
            .field("zoom", &self.zoom)
            .field("tile_size", &self.tile_size)
            .field("parent_id", &self.parent_id)
            .field("decoded", &self.decoded.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
