//! # MVT Overlay
//!
//! A vector-tile overlay engine for embedding binary vector map tiles
//! (MVT) in a host map widget.
//!
//! The engine coordinates the full tile lifecycle: synchronous tile
//! mounting, asynchronous fetch and decode, over-zoom geometry rescaling,
//! per-layer feature registries with multi-tile aggregation, selection
//! state, a drawn-tile cache with invalidation, and debounced pointer hit
//! testing. It never rasterizes or talks to a concrete map API itself;
//! the host supplies drawing surfaces and receives canvas-style
//! primitives through the [`surface`] boundary, and tile bytes arrive
//! through the pluggable [`fetch`] and [`decode`] boundaries.
//!
//! ## Architecture
//!
//! - [`source`] - the [`MvtOverlay`] coordinator: tile lifecycle,
//!   invalidation, selection, pointer dispatch
//! - [`tile`] - tile identity, per-tile context, the drawn-tile index
//! - [`layer`] - per-layer feature registries, features, styling
//! - [`geom`] - paths, over-zoom rescaling, web-mercator math
//! - [`fetch`] - URL templates and the async tile fetcher
//! - [`decode`] - the decoder boundary traits
//! - [`surface`] - the host drawing boundary
//! - [`pointer`] - pointer events, options, debouncing
//! - [`config`] - the construction-time option surface
//!
//! ## Example
//!
//! ```rust,no_run
//! use mvt_overlay::{HttpTileFetcher, MvtOverlay, OverlayConfig};
//! # use mvt_overlay::decode::{DecodedTile, TileDecoder};
//! # use mvt_overlay::error::DecodeError;
//! # use std::sync::Arc;
//! # struct MyDecoder;
//! # impl TileDecoder for MyDecoder {
//! #     fn decode(&self, _: &bytes::Bytes) -> Result<Arc<dyn DecodedTile>, DecodeError> {
//! #         unimplemented!()
//! #     }
//! # }
//!
//! # fn main() -> Result<(), mvt_overlay::OverlayError> {
//! let config = OverlayConfig {
//!     source_max_zoom: Some(14),
//!     cache: true,
//!     ..OverlayConfig::with_url("https://tiles.example.com/{z}/{x}/{y}.pbf")
//! };
//! let overlay = MvtOverlay::new(HttpTileFetcher::new(), MyDecoder, config)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod geom;
pub mod layer;
pub mod pointer;
pub mod source;
pub mod surface;
pub mod tile;

// Re-export commonly used types
pub use config::{OverlayConfig, DEFAULT_TILE_SIZE};
pub use error::{DecodeError, FetchError, OverlayError, TileKeyError};
pub use fetch::{HttpTileFetcher, TileEndpoint, TileFetcher};
pub use geom::mercator::LngLat;
pub use geom::{PixelPoint, TilePath, TilePoint};
pub use layer::feature::{DrawStrategy, Feature, FeatureId, FeatureTile};
pub use layer::style::{default_style, Style, StyleResolver};
pub use layer::{default_feature_id, FeatureRegistry};
pub use pointer::{Debouncer, HitFeature, LayerHit, PointerEvent, PointerOptions};
pub use source::selection::{SelectionEntry, SelectionSet};
pub use source::MvtOverlay;
pub use surface::{DrawSurface, SurfaceFactory, SurfaceHandle};
pub use tile::{DrawnTileIndex, TileContext, TileId, DEFAULT_DRAWN_TILE_CAPACITY};
