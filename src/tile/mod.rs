//! Tile identity, per-tile context and the drawn-tile index.

mod cache;
mod context;
mod id;

pub use cache::{DrawnTileIndex, DEFAULT_DRAWN_TILE_CAPACITY};
pub use context::TileContext;
pub use id::TileId;
