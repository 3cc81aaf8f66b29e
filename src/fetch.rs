//! Network boundary: URL templates and the tile fetcher.
//!
//! Tiles are addressed by a URL template containing `{z}`, `{x}` and `{y}`
//! placeholders, substituted with the (possibly over-zoom ancestor) tile's
//! coordinates. Static headers ride along on every request. Fetch failures
//! are logged by the coordinator and leave the tile blank; there is no
//! retry policy and no cancellation of in-flight requests — stale results
//! are discarded after the fact.

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use url::Url;

use crate::error::FetchError;
use crate::tile::TileId;

/// Zoom placeholder in a tile URL template.
pub const PLACEHOLDER_ZOOM: &str = "{z}";
/// Column placeholder in a tile URL template.
pub const PLACEHOLDER_X: &str = "{x}";
/// Row placeholder in a tile URL template.
pub const PLACEHOLDER_Y: &str = "{y}";

/// A tile URL template plus the static headers attached to every request.
#[derive(Debug, Clone)]
pub struct TileEndpoint {
    template: String,
    headers: HeaderMap,
}

impl TileEndpoint {
    pub fn new(template: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            template: template.into(),
            headers,
        }
    }

    /// Replace the template, e.g. when the host switches sources.
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Substitute the tile's coordinates into the template and validate
    /// the result.
    pub fn resolve(&self, id: TileId) -> Result<Url, FetchError> {
        if self.template.is_empty() {
            return Err(FetchError::MissingTemplate);
        }
        let raw = self
            .template
            .replace(PLACEHOLDER_ZOOM, &id.zoom.to_string())
            .replace(PLACEHOLDER_X, &id.x.to_string())
            .replace(PLACEHOLDER_Y, &id.y.to_string());
        Url::parse(&raw).map_err(|source| FetchError::InvalidUrl { url: raw, source })
    }
}

/// Fetches one tile's bytes. The only suspension point in the engine.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    /// Fetch the resource at `url` with the given static headers.
    async fn fetch(&self, url: &Url, headers: &HeaderMap) -> Result<Bytes, FetchError>;
}

/// HTTP fetcher backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTileFetcher {
    client: reqwest::Client,
}

impl HttpTileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-configured client (timeouts, proxies, user agent).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TileFetcher for HttpTileFetcher {
    async fn fetch(&self, url: &Url, headers: &HeaderMap) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response.bytes().await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
