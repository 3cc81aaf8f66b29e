//! Test utilities for engine tests.
//!
//! Provides static decoded-tile fixtures, a tracking mock fetcher, a mock
//! decoder and recording drawing surfaces.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use serde_json::{json, Map, Value};
use url::Url;

use mvt_overlay::decode::{
    DecodedFeature, DecodedLayer, DecodedTile, GeometryKind, TileDecoder,
};
use mvt_overlay::error::{DecodeError, FetchError};
use mvt_overlay::fetch::TileFetcher;
use mvt_overlay::{
    DrawSurface, MvtOverlay, OverlayConfig, PixelPoint, Style, SurfaceFactory, SurfaceHandle,
    TileId, TilePath, TilePoint,
};

/// Initialize tracing for tests (call at the start of a test to see logs).
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Static Decoded Fixtures
// =============================================================================

/// A fixed decoded feature.
pub struct StaticFeature {
    pub kind: GeometryKind,
    pub properties: Map<String, Value>,
    pub extent: u32,
    pub rings: Vec<Vec<TilePoint>>,
}

impl StaticFeature {
    /// A square polygon spanning `min..max` in raw coordinates, extent 256
    /// (raw coordinates equal pixels at tile size 256).
    pub fn square(id: Option<&str>, min: i64, max: i64) -> Arc<Self> {
        let mut properties = Map::new();
        if let Some(id) = id {
            properties.insert("id".to_string(), json!(id));
        }
        Arc::new(Self {
            kind: GeometryKind::Polygon,
            properties,
            extent: 256,
            rings: vec![vec![
                TilePoint::new(min, min),
                TilePoint::new(max, min),
                TilePoint::new(max, max),
                TilePoint::new(min, max),
            ]],
        })
    }

    #[allow(dead_code)]
    pub fn point(id: Option<&str>, x: i64, y: i64) -> Arc<Self> {
        let mut properties = Map::new();
        if let Some(id) = id {
            properties.insert("id".to_string(), json!(id));
        }
        Arc::new(Self {
            kind: GeometryKind::Point,
            properties,
            extent: 256,
            rings: vec![vec![TilePoint::new(x, y)]],
        })
    }
}

impl DecodedFeature for StaticFeature {
    fn geometry_kind(&self) -> GeometryKind {
        self.kind
    }
    fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
    fn extent(&self) -> u32 {
        self.extent
    }
    fn load_geometry(&self) -> Vec<Vec<TilePoint>> {
        self.rings.clone()
    }
}

pub struct StaticLayer {
    pub features: Vec<Arc<StaticFeature>>,
}

impl DecodedLayer for StaticLayer {
    fn len(&self) -> usize {
        self.features.len()
    }
    fn feature(&self, index: usize) -> Option<Arc<dyn DecodedFeature>> {
        self.features
            .get(index)
            .map(|f| f.clone() as Arc<dyn DecodedFeature>)
    }
}

/// A fixed decoded tile with named layers in declared order.
pub struct StaticTile {
    pub layers: Vec<(String, StaticLayer)>,
}

impl StaticTile {
    pub fn single_layer(name: &str, features: Vec<Arc<StaticFeature>>) -> Self {
        Self {
            layers: vec![(name.to_string(), StaticLayer { features })],
        }
    }
}

impl DecodedTile for StaticTile {
    fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|(name, _)| name.clone()).collect()
    }
    fn layer(&self, name: &str) -> Option<&dyn DecodedLayer> {
        self.layers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, layer)| layer as &dyn DecodedLayer)
    }
}

// =============================================================================
// Mock Fetcher with Request Tracking
// =============================================================================

/// A mock fetcher that records every requested URL. Clones share the
/// tracking state, so a clone can be handed to the overlay while the
/// original asserts.
#[derive(Clone)]
pub struct MockFetcher {
    payload: Bytes,
    request_count: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            payload: Bytes::from_static(b"tile-bytes"),
            request_count: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TileFetcher for MockFetcher {
    async fn fetch(&self, url: &Url, _headers: &HeaderMap) -> Result<Bytes, FetchError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: http::StatusCode::NOT_FOUND,
            });
        }
        Ok(self.payload.clone())
    }
}

// =============================================================================
// Mock Decoder
// =============================================================================

/// A decoder that always yields the same static tile.
pub struct MockDecoder {
    tile: Arc<StaticTile>,
}

impl MockDecoder {
    pub fn new(tile: StaticTile) -> Self {
        Self {
            tile: Arc::new(tile),
        }
    }
}

impl TileDecoder for MockDecoder {
    fn decode(&self, _bytes: &Bytes) -> Result<Arc<dyn DecodedTile>, DecodeError> {
        Ok(self.tile.clone() as Arc<dyn DecodedTile>)
    }
}

// =============================================================================
// Recording Surfaces
// =============================================================================

/// One drawing primitive as recorded by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Style,
    FillPath,
    StrokePath,
    FillCircle(PixelPoint, f64),
    StrokeCircle(PixelPoint, f64),
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    Text(String),
    Clear,
}

#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
}

impl DrawSurface for RecordingSurface {
    fn apply_style(&mut self, _style: &Style) {
        self.ops.push(Op::Style);
    }
    fn fill_path(&mut self, _path: &TilePath) {
        self.ops.push(Op::FillPath);
    }
    fn stroke_path(&mut self, _path: &TilePath) {
        self.ops.push(Op::StrokePath);
    }
    fn fill_circle(&mut self, center: PixelPoint, radius: f64) {
        self.ops.push(Op::FillCircle(center, radius));
    }
    fn stroke_circle(&mut self, center: PixelPoint, radius: f64) {
        self.ops.push(Op::StrokeCircle(center, radius));
    }
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::FillRect(x, y, width, height));
    }
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::StrokeRect(x, y, width, height));
    }
    fn stroke_text(&mut self, text: &str, _x: f64, _y: f64) {
        self.ops.push(Op::Text(text.to_string()));
    }
    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }
}

/// Creates one [`RecordingSurface`] per tile and keeps a handle for
/// assertions.
#[derive(Default)]
pub struct MockSurfaceFactory {
    surfaces: Mutex<HashMap<TileId, Arc<Mutex<RecordingSurface>>>>,
}

impl MockSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded primitives for a tile, empty when no surface was made.
    pub fn ops(&self, id: TileId) -> Vec<Op> {
        self.surfaces
            .lock()
            .unwrap()
            .get(&id)
            .map(|surface| surface.lock().unwrap().ops.clone())
            .unwrap_or_default()
    }
}

impl SurfaceFactory for MockSurfaceFactory {
    fn create_surface(&self, id: TileId, _tile_size: u32) -> SurfaceHandle {
        let surface = Arc::new(Mutex::new(RecordingSurface::default()));
        self.surfaces.lock().unwrap().insert(id, surface.clone());
        surface
    }
}

// =============================================================================
// Engine Builders
// =============================================================================

pub const TEST_URL: &str = "https://tiles.test/{z}/{x}/{y}.pbf";

/// An overlay over the given static tile, plus the tracking fetcher and
/// surface factory.
pub fn engine(
    tile: StaticTile,
    config: OverlayConfig,
) -> (
    MvtOverlay<MockFetcher, MockDecoder>,
    MockFetcher,
    MockSurfaceFactory,
) {
    let fetcher = MockFetcher::new();
    let overlay = MvtOverlay::new(fetcher.clone(), MockDecoder::new(tile), config)
        .expect("valid test config");
    (overlay, fetcher, MockSurfaceFactory::new())
}

/// A one-layer overlay with default config.
pub fn water_engine(
    features: Vec<Arc<StaticFeature>>,
) -> (
    MvtOverlay<MockFetcher, MockDecoder>,
    MockFetcher,
    MockSurfaceFactory,
) {
    engine(
        StaticTile::single_layer("water", features),
        OverlayConfig::with_url(TEST_URL),
    )
}
