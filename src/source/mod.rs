//! The overlay coordinator.
//!
//! [`MvtOverlay`] is the engine's hub: it owns the tile lifecycle
//! (request, fetch, decode, draw, cache), the per-layer feature
//! registries, the selection set and pointer dispatch. The host map
//! widget drives it through a small surface: `get_tile` / `load_tile` /
//! `release_tile`, a zoom-change notification, and the pointer entry
//! points.
//!
//! All mutable state sits in one [`OverlayState`] behind a `std::sync`
//! mutex. The lock is never held across an `.await`; the tile fetch is
//! the engine's only suspension point, and stale responses are detected
//! after the fact by re-checking the host zoom (never by cancellation).

pub(crate) mod debug;
pub mod selection;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use crate::config::OverlayConfig;
use crate::decode::TileDecoder;
use crate::error::OverlayError;
use crate::fetch::{TileEndpoint, TileFetcher};
use crate::geom::mercator;
use crate::geom::PixelPoint;
use crate::layer::feature::{DrawFn, FeatureId};
use crate::layer::style::StyleResolver;
use crate::layer::{default_feature_id, FeatureIdFn, FeatureRegistry, FilterFn};
use crate::pointer::{Debouncer, HitFeature, LayerHit, PointerEvent, PointerOptions};
use crate::surface::SurfaceFactory;
use crate::tile::{DrawnTileIndex, TileContext, TileId};

use selection::SelectionSet;

// =============================================================================
// Engine State
// =============================================================================

struct OverlayState {
    endpoint: TileEndpoint,

    /// Host zoom as last reported; tile responses for another zoom are
    /// discarded.
    current_zoom: u32,

    tile_size: u32,
    debug: bool,
    cache_enabled: bool,
    source_max_zoom: Option<u32>,

    visible_layers: Option<Vec<String>>,
    clickable_layers: Option<Vec<String>>,

    /// Whether selecting one feature leaves others selected.
    multiple_selection: bool,

    filter: Option<FilterFn>,
    style: StyleResolver,
    id_fn: FeatureIdFn,
    custom_draw: Option<DrawFn>,

    /// One registry per layer name, created lazily on first sighting.
    layers: HashMap<String, FeatureRegistry>,

    /// Layer creation order; the default clickable-layer walk follows it.
    layer_order: Vec<String>,

    /// Tiles currently mounted by the host.
    visible: HashMap<TileId, TileContext>,

    /// Fully drawn tiles, populated only when caching is enabled.
    drawn: DrawnTileIndex,

    selection: SelectionSet,
}

impl OverlayState {
    fn ensure_registry(&mut self, name: &str) {
        if !self.layers.contains_key(name) {
            self.layers.insert(
                name.to_string(),
                FeatureRegistry::new(
                    name.to_string(),
                    self.filter.clone(),
                    self.style.clone(),
                    self.id_fn.clone(),
                    self.custom_draw.clone(),
                ),
            );
            self.layer_order.push(name.to_string());
        }
    }

    /// Ingest and draw every visible layer of the context's decoded tile,
    /// then record the tile as drawn when caching is enabled.
    fn draw_decoded(&mut self, ctx: &TileContext) {
        let Some(decoded) = ctx.decoded.clone() else {
            return;
        };
        let names = match &self.visible_layers {
            Some(list) => list.clone(),
            None => decoded.layer_names(),
        };
        for name in names {
            // A configured layer the tile does not carry is skipped.
            let Some(layer) = decoded.layer(&name) else {
                continue;
            };
            self.ensure_registry(&name);
            let Self {
                layers, selection, ..
            } = self;
            if let Some(registry) = layers.get_mut(&name) {
                registry.ingest(layer, ctx, selection);
                registry.draw(ctx);
            }
        }
        if self.cache_enabled {
            self.drawn.insert(ctx.id, ctx.clone());
        }
    }

    /// Drop the tile from the drawn index and, if it is visible and has
    /// data, clear its surface and draw it again. A redraw, not a refetch.
    fn redraw_tile(&mut self, id: TileId) {
        self.drawn.remove(&id);
        let Some(ctx) = self.visible.get(&id).cloned() else {
            return;
        };
        if ctx.decoded.is_none() {
            return;
        }
        {
            let mut surface = ctx
                .surface
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            surface.clear();
        }
        self.draw_decoded(&ctx);
    }

    fn redraw_all(&mut self) {
        self.drawn.clear();
        let ids: Vec<TileId> = self.visible.keys().copied().collect();
        for id in ids {
            self.redraw_tile(id);
        }
    }

    /// Unselect every live entry, dropping their tiles from the drawn
    /// index and redrawing the ones at the current zoom, then clear the
    /// set, pending markers included.
    fn deselect_all(&mut self) {
        let zoom = self.current_zoom;
        let mut to_redraw: Vec<TileId> = Vec::new();
        for (id, layer) in self.selection.live() {
            let Some(registry) = self.layers.get_mut(&layer) else {
                continue;
            };
            let Some(tiles) = registry.set_selected(&id, false) else {
                continue;
            };
            for tile in tiles {
                self.drawn.remove(&tile);
                if tile.zoom == zoom && !to_redraw.contains(&tile) {
                    to_redraw.push(tile);
                }
            }
        }
        self.selection.clear();
        for tile in to_redraw {
            self.redraw_tile(tile);
        }
    }

    /// Flip one feature's selection state and redraw its current-zoom
    /// tiles. Selecting under single-selection first deselects everything.
    /// An id the layer does not know is a no-op, with no side effects on
    /// the current selection.
    fn set_feature_selected(&mut self, layer: &str, id: &FeatureId, selected: bool) {
        let known = self
            .layers
            .get(layer)
            .is_some_and(|registry| registry.feature(id).is_some());
        if !known {
            return;
        }
        if selected && !self.multiple_selection {
            self.deselect_all();
        }
        let Some(registry) = self.layers.get_mut(layer) else {
            return;
        };
        let Some(tiles) = registry.set_selected(id, selected) else {
            return;
        };
        if selected {
            self.selection.promote(id.clone(), layer);
        } else {
            self.selection.remove(id);
        }
        let zoom = self.current_zoom;
        for tile in tiles {
            if tile.zoom == zoom {
                self.redraw_tile(tile);
            }
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// The vector-tile overlay engine.
///
/// Generic over the network fetcher and the tile decoder so tests can
/// substitute both; production uses
/// [`HttpTileFetcher`](crate::fetch::HttpTileFetcher) and a real MVT
/// decoder.
pub struct MvtOverlay<F: TileFetcher, D: TileDecoder> {
    fetcher: F,
    decoder: D,
    state: Mutex<OverlayState>,
    debounce: Debouncer,
}

impl<F: TileFetcher, D: TileDecoder> MvtOverlay<F, D> {
    /// Build an overlay from a validated configuration.
    pub fn new(fetcher: F, decoder: D, config: OverlayConfig) -> Result<Self, OverlayError> {
        config.validate()?;

        let tile_size = config.tile_size_or_default();
        let multiple_selection = config.selected_features.len() > 1;
        let mut selection = SelectionSet::new();
        for id in &config.selected_features {
            selection.mark_pending(id.clone());
        }
        let id_fn = config
            .get_id_for_feature
            .unwrap_or_else(|| std::sync::Arc::new(default_feature_id));

        let state = OverlayState {
            endpoint: TileEndpoint::new(config.url, config.headers),
            current_zoom: 0,
            tile_size,
            debug: config.debug,
            cache_enabled: config.cache,
            source_max_zoom: config.source_max_zoom,
            visible_layers: config.visible_layers,
            clickable_layers: config.clickable_layers,
            multiple_selection,
            filter: config.filter,
            style: config.style,
            id_fn,
            custom_draw: config.custom_draw,
            layers: HashMap::new(),
            layer_order: Vec::new(),
            visible: HashMap::new(),
            drawn: DrawnTileIndex::new(),
            selection,
        };

        Ok(Self {
            fetcher,
            decoder,
            state: Mutex::new(state),
            debounce: Debouncer::new(),
        })
    }

    fn state(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Host map surface
    // -------------------------------------------------------------------------

    /// Mount the tile at `(x, y, zoom)`.
    ///
    /// Returns synchronously: a cached context when the tile was already
    /// drawn (no refetch), otherwise a fresh context with a surface from
    /// the factory and the over-zoom ancestor resolved. Data arrives
    /// later via [`load_tile`](Self::load_tile).
    pub fn get_tile(
        &self,
        x: u32,
        y: u32,
        zoom: u32,
        factory: &dyn SurfaceFactory,
    ) -> TileContext {
        let mut state = self.state();
        state.current_zoom = zoom;

        let id = TileId::new(zoom, x, y);
        if let Some(cached) = state.drawn.get(&id).cloned() {
            debug!(tile = %id, "serving tile from drawn cache");
            state.visible.insert(id, cached.clone());
            return cached;
        }

        let surface = factory.create_surface(id, state.tile_size);
        let parent_id = id.ancestor(state.source_max_zoom);
        let ctx = TileContext::new(id, parent_id, state.tile_size, surface);
        state.visible.insert(id, ctx.clone());
        ctx
    }

    /// Fetch, decode and draw the tile behind `ctx`.
    ///
    /// Skips drawn-cached tiles. After the fetch the host zoom is
    /// re-checked: a response for another zoom is discarded without
    /// drawing or caching. Failures are logged and leave the tile blank,
    /// no retry.
    pub async fn load_tile(&self, ctx: &TileContext) -> Result<(), OverlayError> {
        let (url, headers) = {
            let state = self.state();
            if state.drawn.contains(&ctx.id) {
                debug!(tile = %ctx.id, "tile already drawn, skipping fetch");
                return Ok(());
            }
            let url = match state.endpoint.resolve(ctx.fetch_id()) {
                Ok(url) => url,
                Err(e) => {
                    error!(tile = %ctx.id, error = %e, "cannot resolve tile url");
                    return Err(OverlayError::Fetch(e));
                }
            };
            (url, state.endpoint.headers().clone())
        };

        let bytes = match self.fetcher.fetch(&url, &headers).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(tile = %ctx.id, url = %url, error = %e, "tile fetch failed");
                if self.state().debug {
                    debug::draw_debug_info(ctx);
                }
                return Err(OverlayError::Fetch(e));
            }
        };

        let mut state = self.state();
        if state.current_zoom != ctx.zoom {
            debug!(
                tile = %ctx.id,
                current_zoom = state.current_zoom,
                "discarding stale tile response"
            );
            return Ok(());
        }

        let decoded = match self.decoder.decode(&bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                error!(tile = %ctx.id, error = %e, "tile decode failed");
                if state.debug {
                    debug::draw_debug_info(ctx);
                }
                return Err(OverlayError::Decode(e));
            }
        };

        let mut ctx = ctx.clone();
        ctx.set_decoded(decoded.clone());
        if let Some(entry) = state.visible.get_mut(&ctx.id) {
            entry.set_decoded(decoded);
        }
        state.draw_decoded(&ctx);
        if state.debug {
            debug::draw_debug_info(&ctx);
        }
        Ok(())
    }

    /// Unmount a tile. Its registry entries and drawn-cache slot survive;
    /// only the visible index forgets it.
    pub fn release_tile(&self, id: TileId) {
        self.state().visible.remove(&id);
    }

    /// The host zoom changed. Visible tiles are invalidated
    /// unconditionally; without caching the feature registries reset too.
    pub fn on_zoom_changed(&self, zoom: u32) {
        let mut state = self.state();
        state.current_zoom = zoom;
        state.visible.clear();
        if !state.cache_enabled {
            state.layers.clear();
            state.layer_order.clear();
        }
    }

    // -------------------------------------------------------------------------
    // Invalidation
    // -------------------------------------------------------------------------

    /// Drop the given tiles from the drawn index and redraw the visible
    /// ones from their decoded data. Idempotent.
    pub fn invalidate(&self, ids: &[TileId]) {
        let mut state = self.state();
        for id in ids {
            state.redraw_tile(*id);
        }
    }

    /// Clear the whole drawn index and redraw every visible tile.
    /// Idempotent.
    pub fn invalidate_all(&self) {
        self.state().redraw_all();
    }

    // -------------------------------------------------------------------------
    // Configuration updates
    // -------------------------------------------------------------------------

    /// Replace the style resolver across every registry; `redraw` (the
    /// usual case) invalidates everything so the new styles show.
    pub fn set_style(&self, style: StyleResolver, redraw: bool) {
        let mut state = self.state();
        state.style = style.clone();
        for registry in state.layers.values_mut() {
            registry.set_style(style.clone());
        }
        if redraw {
            state.redraw_all();
        }
    }

    /// Replace the filter predicate across every registry. With `redraw`
    /// the new filter takes effect immediately via re-ingestion.
    pub fn set_filter(&self, filter: Option<FilterFn>, redraw: bool) {
        let mut state = self.state();
        state.filter = filter.clone();
        for registry in state.layers.values_mut() {
            registry.set_filter(filter.clone());
        }
        if redraw {
            state.redraw_all();
        }
    }

    /// Restrict drawing to the named layers (`None` draws all).
    pub fn set_visible_layers(&self, layers: Option<Vec<String>>, redraw: bool) {
        let mut state = self.state();
        state.visible_layers = layers;
        if redraw {
            state.redraw_all();
        }
    }

    pub fn visible_layers(&self) -> Option<Vec<String>> {
        self.state().visible_layers.clone()
    }

    /// Restrict hit testing to the named layers (`None` walks all known
    /// layers).
    pub fn set_clickable_layers(&self, layers: Option<Vec<String>>) {
        self.state().clickable_layers = layers;
    }

    /// Point the overlay at a different source. Every registry is
    /// dropped; with `redraw`, visible tiles are redrawn from the data
    /// they already hold until the host refetches them.
    pub fn set_url(&self, url: impl Into<String>, redraw: bool) {
        let mut state = self.state();
        state.endpoint.set_template(url);
        state.layers.clear();
        state.layer_order.clear();
        if redraw {
            state.redraw_all();
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Replace the selection wholesale. More than one id enables multiple
    /// selection. Ids without a parsed feature yet become pending markers
    /// and pre-select the feature when a tile first produces it.
    pub fn set_selected_features(&self, ids: Vec<FeatureId>) {
        let mut state = self.state();
        if ids.len() > 1 {
            state.multiple_selection = true;
        }
        state.deselect_all();
        for id in ids {
            state.selection.mark_pending(id.clone());
            for name in state.layer_order.clone() {
                let known = state
                    .layers
                    .get(&name)
                    .is_some_and(|registry| registry.feature(&id).is_some());
                if known {
                    state.set_feature_selected(&name, &id, true);
                }
            }
        }
    }

    /// Select or deselect one feature of one layer.
    pub fn set_feature_selected(&self, layer: &str, id: &FeatureId, selected: bool) {
        self.state().set_feature_selected(layer, id, selected);
    }

    /// Deselect everything, pending markers included.
    pub fn deselect_all_features(&self) {
        self.state().deselect_all();
    }

    /// Whether the id is selected (pending markers count).
    pub fn is_feature_selected(&self, id: &FeatureId) -> bool {
        self.state().selection.contains(id)
    }

    /// Every selected id, pending markers included.
    pub fn selected_features(&self) -> Vec<FeatureId> {
        self.state().selection.ids()
    }

    /// Selected features with a sighting in the given tile.
    pub fn selected_features_in_tile(&self, tile: TileId) -> Vec<FeatureId> {
        let state = self.state();
        state
            .selection
            .live()
            .into_iter()
            .filter(|(id, layer)| {
                state
                    .layers
                    .get(layer)
                    .and_then(|registry| registry.feature(id))
                    .is_some_and(|feature| feature.tiles.contains_key(&tile))
            })
            .map(|(id, _)| id)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Layer names in creation order.
    pub fn layer_names(&self) -> Vec<String> {
        self.state().layer_order.clone()
    }

    /// Number of registered features in a layer, `None` for an unknown
    /// layer.
    pub fn layer_feature_count(&self, layer: &str) -> Option<usize> {
        self.state()
            .layers
            .get(layer)
            .map(FeatureRegistry::feature_count)
    }

    /// The scaled subpaths of one feature within one visible tile.
    pub fn feature_paths(
        &self,
        layer: &str,
        id: &FeatureId,
        tile: TileId,
    ) -> Vec<Vec<PixelPoint>> {
        let state = self.state();
        let Some(ctx) = state.visible.get(&tile) else {
            return Vec::new();
        };
        state
            .layers
            .get(layer)
            .and_then(|registry| registry.feature(id))
            .map(|feature| feature.paths(ctx))
            .unwrap_or_default()
    }

    /// Ids of the tiles currently mounted.
    pub fn visible_tiles(&self) -> Vec<TileId> {
        self.state().visible.keys().copied().collect()
    }

    /// Number of tiles in the drawn index.
    pub fn drawn_tile_count(&self) -> usize {
        self.state().drawn.len()
    }

    // -------------------------------------------------------------------------
    // Pointer dispatch
    // -------------------------------------------------------------------------

    /// Dispatch a click. `options.multiple_selection` becomes the
    /// engine-wide selection mode for subsequent selections.
    pub async fn on_click(&self, event: PointerEvent, options: PointerOptions) -> Vec<LayerHit> {
        self.state().multiple_selection = options.multiple_selection;
        self.dispatch(event, options, false).await
    }

    /// Dispatch a hover. Hovering forces single selection, auto-selects
    /// the feature under the pointer and deselects all when there is none.
    pub async fn on_hover(&self, event: PointerEvent, options: PointerOptions) -> Vec<LayerHit> {
        self.state().multiple_selection = false;
        self.dispatch(event, options, true).await
    }

    async fn dispatch(
        &self,
        event: PointerEvent,
        options: PointerOptions,
        hover: bool,
    ) -> Vec<LayerHit> {
        if !self.debounce.acquire(options.delay).await {
            return Vec::new();
        }

        let mut state = self.state();
        let (tile_id, point) =
            mercator::tile_local_point(event.position, state.current_zoom, state.tile_size);
        let Some(ctx) = state.visible.get(&tile_id).cloned() else {
            return Vec::new();
        };

        let clickable = state
            .clickable_layers
            .clone()
            .unwrap_or_else(|| state.layer_order.clone());

        let mut hits = Vec::new();
        for name in clickable.iter().rev() {
            if !state.layers.contains_key(name) {
                continue;
            }
            let captured = state
                .layers
                .get(name)
                .and_then(|registry| registry.handle_click(&ctx, point))
                .map(|feature| {
                    (
                        feature.id.clone(),
                        feature.kind,
                        feature.properties.clone(),
                        feature.selected,
                    )
                });

            let feature = match captured {
                Some((id, geometry, properties, was_selected)) => {
                    if options.set_selected {
                        if let Some(id) = &id {
                            if hover {
                                if !was_selected {
                                    state.set_feature_selected(name, id, true);
                                }
                            } else if options.toggle_selection {
                                state.set_feature_selected(name, id, !was_selected);
                            } else if !was_selected {
                                state.set_feature_selected(name, id, true);
                            }
                        }
                    }
                    let selected = match &id {
                        Some(id) => state.selection.contains(id),
                        None => was_selected,
                    };
                    Some(HitFeature {
                        id,
                        geometry,
                        properties,
                        selected,
                    })
                }
                None => {
                    if options.set_selected && hover {
                        state.deselect_all();
                    }
                    None
                }
            };

            let stop = options.limit_to_first_visible_layer && feature.is_some();
            hits.push(LayerHit {
                layer: name.clone(),
                feature,
                tile: tile_id,
                tile_point: point,
            });
            if stop {
                break;
            }
        }
        hits
    }
}

// =============================================================================
// Tests
// =============================================================================
