//! Per-layer feature registry.
//!
//! One registry owns every feature of one named layer across all tiles
//! seen so far. It is created lazily on the layer's first sighting and
//! retained across tiles until the coordinator resets it (zoom change with
//! caching disabled, or a URL change). Parsing, filtering, styling,
//! drawing and click resolution for the layer all live here.

pub mod feature;
pub mod style;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::decode::{DecodedFeature, DecodedLayer};
use crate::geom::PixelPoint;
use crate::source::selection::SelectionSet;
use crate::tile::{TileContext, TileId};

use feature::{DrawFn, Feature, FeatureId};
use style::StyleResolver;

/// Filter predicate: `false` excludes the feature entirely (not
/// registered, not drawn, not selectable).
pub type FilterFn = Arc<dyn Fn(&dyn DecodedFeature, &TileContext) -> bool + Send + Sync>;

/// Maps a decoded feature to its layer-unique id; `None` makes the feature
/// anonymous (drawable, never selectable).
pub type FeatureIdFn = Arc<dyn Fn(&dyn DecodedFeature) -> Option<FeatureId> + Send + Sync>;

/// The built-in id function: the `id`, `Id` or `ID` property.
pub fn default_feature_id(feature: &dyn DecodedFeature) -> Option<FeatureId> {
    let properties = feature.properties();
    ["id", "Id", "ID"]
        .iter()
        .find_map(|key| properties.get(*key))
        .and_then(FeatureId::from_value)
}

/// Registry key: the feature id when one resolves, otherwise a synthetic
/// per-sighting key so re-ingesting a tile cannot duplicate anonymous
/// features.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FeatureKey {
    Id(FeatureId),
    Anonymous(TileId, u32),
}

/// All features of one named layer, across all tiles seen so far.
pub struct FeatureRegistry {
    name: String,
    features: HashMap<FeatureKey, Feature>,
    /// Registration order; drives draw order and click resolution.
    order: Vec<FeatureKey>,
    filter: Option<FilterFn>,
    style: StyleResolver,
    id_fn: FeatureIdFn,
    custom_draw: Option<DrawFn>,
}

impl FeatureRegistry {
    pub(crate) fn new(
        name: String,
        filter: Option<FilterFn>,
        style: StyleResolver,
        id_fn: FeatureIdFn,
        custom_draw: Option<DrawFn>,
    ) -> Self {
        Self {
            name,
            features: HashMap::new(),
            order: Vec::new(),
            filter,
            style,
            id_fn,
            custom_draw,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered features.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Look up a feature by id.
    pub fn feature(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.get(&FeatureKey::Id(id.clone()))
    }

    /// Parse one decoded layer's features for one tile.
    ///
    /// New ids construct a [`Feature`], pre-selected when the id already
    /// sits in the selection set (pending markers included); known ids
    /// extend their tile map. Features of this tile that no longer pass
    /// the filter are purged, so a replaced filter takes effect on redraw.
    pub fn ingest(
        &mut self,
        layer: &dyn DecodedLayer,
        ctx: &TileContext,
        selection: &mut SelectionSet,
    ) {
        let mut seen = HashSet::with_capacity(layer.len());

        for index in 0..layer.len() {
            let Some(decoded) = layer.feature(index) else {
                continue;
            };
            if let Some(filter) = &self.filter {
                if !filter(decoded.as_ref(), ctx) {
                    continue;
                }
            }

            let id = (self.id_fn)(decoded.as_ref());
            let key = match &id {
                Some(id) => FeatureKey::Id(id.clone()),
                None => FeatureKey::Anonymous(ctx.id, index as u32),
            };
            seen.insert(key.clone());

            if let Some(existing) = self.features.get_mut(&key) {
                existing.add_tile(decoded, ctx);
                continue;
            }

            let style = self.style.resolve(decoded.as_ref());
            let selected = id.as_ref().is_some_and(|id| selection.contains(id));
            let feature = Feature::new(
                id.clone(),
                decoded,
                ctx,
                style,
                selected,
                self.custom_draw.clone(),
            );
            if selected {
                if let Some(id) = &id {
                    selection.promote(id.clone(), &self.name);
                }
            }
            self.features.insert(key.clone(), feature);
            self.order.push(key);
        }

        self.purge_unseen(ctx.id, &seen, selection);
    }

    /// Remove this tile's sighting from features the latest ingest pass no
    /// longer produced (filtered out, or gone from the data). Features
    /// left with no tiles disappear from the registry and the selection.
    fn purge_unseen(
        &mut self,
        tile_id: TileId,
        seen: &HashSet<FeatureKey>,
        selection: &mut SelectionSet,
    ) {
        let mut emptied = Vec::new();
        for (key, feature) in self.features.iter_mut() {
            if seen.contains(key) || !feature.tiles.contains_key(&tile_id) {
                continue;
            }
            feature.tiles.remove(&tile_id);
            if feature.tiles.is_empty() {
                emptied.push(key.clone());
            }
        }
        for key in emptied {
            if let Some(feature) = self.features.remove(&key) {
                if let Some(id) = &feature.id {
                    selection.remove(id);
                }
            }
            self.order.retain(|k| k != &key);
        }
    }

    /// Draw every feature sighted in this tile, in registration order.
    pub fn draw(&mut self, ctx: &TileContext) {
        for key in &self.order {
            if let Some(feature) = self.features.get_mut(key) {
                if feature.tiles.contains_key(&ctx.id) {
                    feature.draw(ctx);
                }
            }
        }
    }

    /// Replace the filter predicate. Does not redraw; the coordinator
    /// decides when.
    pub fn set_filter(&mut self, filter: Option<FilterFn>) {
        self.filter = filter;
    }

    /// Replace the style resolver and re-resolve every registered
    /// feature's style. Does not redraw.
    pub fn set_style(&mut self, style: StyleResolver) {
        self.style = style;
        for feature in self.features.values_mut() {
            let handle = feature.tiles.values().next().map(|t| t.feature.clone());
            if let Some(decoded) = handle {
                feature.style = self.style.resolve(decoded.as_ref());
            }
        }
    }

    /// Flip a feature's selection flag, returning the tiles it appears in.
    /// `None` when the id is unknown to this layer.
    pub(crate) fn set_selected(&mut self, id: &FeatureId, selected: bool) -> Option<Vec<TileId>> {
        let feature = self.features.get_mut(&FeatureKey::Id(id.clone()))?;
        feature.selected = selected;
        Some(feature.tile_ids())
    }

    /// Find the first feature (registration order) of this tile whose path
    /// contains the point. At most one match per layer.
    pub fn handle_click(&self, ctx: &TileContext, point: PixelPoint) -> Option<&Feature> {
        self.order.iter().find_map(|key| {
            self.features
                .get(key)
                .filter(|feature| feature.hit_test(ctx.id, point))
        })
    }
}

impl fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureRegistry")
            .field("name", &self.name)
            .field("features", &self.features.len())
            .field("filtered", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
