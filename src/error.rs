use thiserror::Error;

/// Errors from parsing a canonical `"zoom:x:y"` tile key.
#[derive(Debug, Clone, Error)]
pub enum TileKeyError {
    /// Key does not have exactly three `:`-separated components
    #[error("malformed tile key {0:?}: expected \"zoom:x:y\"")]
    Malformed(String),

    /// A component is not a non-negative integer
    #[error("invalid component in tile key {key:?}: {source}")]
    Component {
        key: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Errors from the tile decoder boundary.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The byte buffer is not a valid vector tile
    #[error("malformed vector tile: {reason}")]
    Malformed { reason: String },

    /// A feature carries a geometry type tag outside 1..=3
    #[error("unknown geometry type tag: {0}")]
    UnknownGeometryType(u8),
}

/// Errors from fetching a tile over the network.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL template produced an unparseable URL
    #[error("invalid tile url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// No URL template has been configured
    #[error("no tile url template configured")]
    MissingTemplate,

    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("tile request {url} returned status {status}")]
    Status {
        url: String,
        status: http::StatusCode,
    },
}

/// Top-level errors surfaced by the overlay engine.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Tile fetch failed; the tile is left blank, no retry
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Tile bytes could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}
