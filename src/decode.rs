//! Decoder boundary.
//!
//! The wire-format decoder is an external collaborator: it turns a fetched
//! byte buffer into layers of features with lazily loadable geometry. The
//! engine only depends on these traits, so tests (and hosts with their own
//! decoder) plug in without touching the tile pipeline.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::geom::TilePoint;

/// Geometry type of a decoded feature, tagged `1..=3` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    /// Map a wire tag to a geometry kind.
    pub fn from_tag(tag: u8) -> Result<Self, DecodeError> {
        match tag {
            1 => Ok(Self::Point),
            2 => Ok(Self::LineString),
            3 => Ok(Self::Polygon),
            other => Err(DecodeError::UnknownGeometryType(other)),
        }
    }

    /// The wire tag for this kind.
    pub fn tag(self) -> u8 {
        match self {
            Self::Point => 1,
            Self::LineString => 2,
            Self::Polygon => 3,
        }
    }
}

/// A decoded vector tile: named layers of features.
pub trait DecodedTile: Send + Sync {
    /// Layer names in the tile's declared order.
    fn layer_names(&self) -> Vec<String>;

    /// Look up a layer by name.
    fn layer(&self, name: &str) -> Option<&dyn DecodedLayer>;
}

/// One named layer within a decoded tile.
pub trait DecodedLayer: Send + Sync {
    /// Number of features in the layer.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The feature at `index`, if in range.
    fn feature(&self, index: usize) -> Option<Arc<dyn DecodedFeature>>;
}

/// One decoded feature.
pub trait DecodedFeature: Send + Sync {
    /// Geometry type of this feature.
    fn geometry_kind(&self) -> GeometryKind;

    /// Attribute map.
    fn properties(&self) -> &Map<String, Value>;

    /// Coordinate extent of the feature's tile-local integer space.
    fn extent(&self) -> u32;

    /// Load the geometry: a sequence of rings/lines of raw coordinates.
    fn load_geometry(&self) -> Vec<Vec<TilePoint>>;
}

/// Decodes a fetched byte buffer into a tile.
pub trait TileDecoder: Send + Sync {
    fn decode(&self, bytes: &Bytes) -> Result<Arc<dyn DecodedTile>, DecodeError>;
}

// =============================================================================
// Tests
// =============================================================================
