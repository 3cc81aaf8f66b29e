//! Overlay configuration.
//!
//! One [`OverlayConfig`] is handed to the coordinator at construction. It
//! mirrors the option surface a host embeds the overlay with: source URL,
//! over-zoom limit, layer lists, selection seed, styling/filtering hooks
//! and the static request headers.
//!
//! The filter, style-resolver, id and custom-draw hooks are infallible
//! closures; a panic inside one propagates to the caller.

use http::HeaderMap;

use crate::error::OverlayError;
use crate::fetch::{PLACEHOLDER_X, PLACEHOLDER_Y, PLACEHOLDER_ZOOM};
use crate::layer::feature::{DrawFn, FeatureId};
use crate::layer::style::StyleResolver;
use crate::layer::{FeatureIdFn, FilterFn};

// =============================================================================
// Default Values
// =============================================================================

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for one overlay instance.
#[derive(Clone, Default)]
pub struct OverlayConfig {
    /// Tile URL template with `{z}`, `{x}`, `{y}` placeholders. May be
    /// empty at construction and set later via `set_url`.
    pub url: String,

    /// Deepest zoom the source provides; deeper display zooms reuse and
    /// rescale ancestor tiles. `None` disables over-zoom.
    pub source_max_zoom: Option<u32>,

    /// Draw tile borders, corner/center markers and layer counts.
    pub debug: bool,

    /// Persist fully drawn tiles across redraw passes, skipping refetches.
    pub cache: bool,

    /// Tile edge length in pixels; zero is rejected by `validate`.
    pub tile_size: u32,

    /// Layers to draw; `None` draws every layer in the tile.
    pub visible_layers: Option<Vec<String>>,

    /// Layers hit testing walks (in reverse declared order); `None` walks
    /// every known layer.
    pub clickable_layers: Option<Vec<String>>,

    /// Feature ids selected from the start, ahead of any tile arriving.
    pub selected_features: Vec<FeatureId>,

    /// Maps a decoded feature to its id; defaults to the `id`/`Id`/`ID`
    /// property.
    pub get_id_for_feature: Option<FeatureIdFn>,

    /// Style for every feature, fixed or resolved per feature.
    pub style: StyleResolver,

    /// Filter predicate; `false` excludes a feature entirely.
    pub filter: Option<FilterFn>,

    /// Replaces the built-in per-geometry draw routines.
    pub custom_draw: Option<DrawFn>,

    /// Static headers attached to every tile request.
    pub headers: HeaderMap,
}

impl OverlayConfig {
    /// A configuration with defaults and the given URL template.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tile_size: DEFAULT_TILE_SIZE,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), OverlayError> {
        if self.tile_size == 0 {
            return Err(OverlayError::Config(
                "tile_size must be greater than 0".to_string(),
            ));
        }

        if !self.url.is_empty() {
            for placeholder in [PLACEHOLDER_ZOOM, PLACEHOLDER_X, PLACEHOLDER_Y] {
                if !self.url.contains(placeholder) {
                    return Err(OverlayError::Config(format!(
                        "url template is missing the {placeholder} placeholder"
                    )));
                }
            }
        }

        Ok(())
    }

    /// The configured tile size, defaulting when left at zero via
    /// `Default`.
    pub fn tile_size_or_default(&self) -> u32 {
        if self.tile_size == 0 {
            DEFAULT_TILE_SIZE
        } else {
            self.tile_size
        }
    }
}

impl std::fmt::Debug for OverlayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayConfig")
            .field("url", &self.url)
            .field("source_max_zoom", &self.source_max_zoom)
            .field("debug", &self.debug)
            .field("cache", &self.cache)
            .field("tile_size", &self.tile_size)
            .field("visible_layers", &self.visible_layers)
            .field("clickable_layers", &self.clickable_layers)
            .field("selected_features", &self.selected_features)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
