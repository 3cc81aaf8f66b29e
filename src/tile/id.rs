//! Tile identity and key arithmetic.
//!
//! Tiles are addressed by a `(zoom, x, y)` triple with a canonical string
//! key of the form `"zoom:x:y"`. The key form is what appears in URLs, logs
//! and the drawn-tile index; the struct form is what the engine hashes and
//! compares. Over-zoom resolves a tile to the ancestor that actually holds
//! its data when the display zoom exceeds the source's maximum zoom.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::TileKeyError;

/// Identity of one map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    /// Zoom level
    pub zoom: u32,

    /// Column, 0-indexed from the west
    pub x: u32,

    /// Row, 0-indexed from the north
    pub y: u32,
}

impl TileId {
    /// The zero tile, returned by lossy key parsing on malformed input.
    pub const ZERO: TileId = TileId { zoom: 0, x: 0, y: 0 };

    /// Create a tile id.
    pub fn new(zoom: u32, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Canonical string key, `"zoom:x:y"`.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.zoom, self.x, self.y)
    }

    /// Parse a canonical key.
    pub fn parse(key: &str) -> Result<Self, TileKeyError> {
        let mut parts = key.split(':');
        let (Some(zoom), Some(x), Some(y), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TileKeyError::Malformed(key.to_string()));
        };
        let component = |s: &str| {
            s.parse::<u32>().map_err(|source| TileKeyError::Component {
                key: key.to_string(),
                source,
            })
        };
        Ok(Self {
            zoom: component(zoom)?,
            x: component(x)?,
            y: component(y)?,
        })
    }

    /// Parse a canonical key, degrading to [`TileId::ZERO`] on failure.
    ///
    /// Malformed keys are logged and the draw pass proceeds with the zero
    /// tile rather than failing outright.
    pub fn from_key(key: &str) -> Self {
        match Self::parse(key) {
            Ok(id) => id,
            Err(e) => {
                error!(key, error = %e, "failed to parse tile key");
                Self::ZERO
            }
        }
    }

    /// The ancestor tile holding this tile's data under over-zoom.
    ///
    /// Returns `None` when no source maximum zoom is configured or this
    /// tile is already at or below it. Otherwise the ancestor sits at
    /// `source_max_zoom`, with `x` and `y` right-shifted by the zoom
    /// distance.
    pub fn ancestor(&self, source_max_zoom: Option<u32>) -> Option<TileId> {
        let max = source_max_zoom?;
        if self.zoom <= max {
            return None;
        }
        let distance = self.zoom - max;
        Some(TileId {
            zoom: max,
            x: self.x >> distance,
            y: self.y >> distance,
        })
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.zoom, self.x, self.y)
    }
}

// =============================================================================
// Tests
// =============================================================================
