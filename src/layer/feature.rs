//! Features and their per-tile rendering state.
//!
//! A [`Feature`] is the logical entity: one id, one geometry type, one
//! style, one selection flag. The same logical feature commonly appears in
//! several tiles (over-zoomed descendants of one ancestor, or neighbours
//! a geometry spills into); each appearance is a [`FeatureTile`] holding
//! the decoded handle, the coordinate divisor and the cached composite
//! path for that tile.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decode::{DecodedFeature, GeometryKind};
use crate::geom::rescale;
use crate::geom::{PixelPoint, TilePath};
use crate::surface::DrawSurface;
use crate::tile::{TileContext, TileId};

use super::style::Style;

/// A feature's id within its layer: the original data uses both strings
/// and integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(i64),
    Text(String),
}

impl FeatureId {
    /// Extract an id from a property value (string or integer).
    pub fn from_value(value: &Value) -> Option<FeatureId> {
        match value {
            Value::String(s) => Some(FeatureId::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(FeatureId::Number),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{n}"),
            FeatureId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FeatureId {
    fn from(n: i64) -> Self {
        FeatureId::Number(n)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::Text(s.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        FeatureId::Text(s)
    }
}

/// Custom draw routine: surface, tile context, per-tile state, effective
/// style.
pub type DrawFn =
    Arc<dyn Fn(&mut dyn DrawSurface, &TileContext, &FeatureTile, &Style) + Send + Sync>;

/// How a feature draws itself, chosen at construction from the geometry
/// type unless a custom routine is supplied.
#[derive(Clone)]
pub enum DrawStrategy {
    Point,
    Line,
    Polygon,
    Custom(DrawFn),
}

impl DrawStrategy {
    fn for_kind(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Point => Self::Point,
            GeometryKind::LineString => Self::Line,
            GeometryKind::Polygon => Self::Polygon,
        }
    }
}

impl fmt::Debug for DrawStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Point => "Point",
            Self::Line => "Line",
            Self::Polygon => "Polygon",
            Self::Custom(_) => "Custom(..)",
        };
        f.write_str(name)
    }
}

/// One feature's rendering state within one tile.
pub struct FeatureTile {
    /// Decoded feature handle for this tile's data
    pub feature: Arc<dyn DecodedFeature>,

    /// `extent / tile_size`, the raw-to-pixel coordinate divisor
    pub divisor: f64,

    /// Composite path in tile-local pixels, rebuilt on each draw
    pub path: TilePath,
}

impl FeatureTile {
    fn new(feature: Arc<dyn DecodedFeature>, tile_size: u32) -> Self {
        let divisor = f64::from(feature.extent()) / f64::from(tile_size);
        Self {
            feature,
            divisor,
            path: TilePath::new(),
        }
    }
}

impl fmt::Debug for FeatureTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureTile")
            .field("divisor", &self.divisor)
            .field("path_subpaths", &self.path.subpaths().len())
            .finish_non_exhaustive()
    }
}

/// One logical feature of a layer, aggregated across every tile it has
/// been sighted in.
pub struct Feature {
    /// Layer-unique id; `None` for anonymous (unselectable) features
    pub id: Option<FeatureId>,

    /// Geometry type
    pub kind: GeometryKind,

    /// Attribute map from the first sighting
    pub properties: Map<String, Value>,

    /// Resolved style (selection substyle applied at draw time)
    pub style: Style,

    /// Current selection state
    pub selected: bool,

    /// Per-tile rendering state; never empty after construction
    pub tiles: HashMap<TileId, FeatureTile>,

    draw: DrawStrategy,
}

impl Feature {
    pub(crate) fn new(
        id: Option<FeatureId>,
        decoded: Arc<dyn DecodedFeature>,
        ctx: &TileContext,
        style: Style,
        selected: bool,
        custom_draw: Option<DrawFn>,
    ) -> Self {
        let kind = decoded.geometry_kind();
        let draw = match custom_draw {
            Some(f) => DrawStrategy::Custom(f),
            None => DrawStrategy::for_kind(kind),
        };
        let mut feature = Self {
            id,
            kind,
            properties: decoded.properties().clone(),
            style,
            selected,
            tiles: HashMap::new(),
            draw,
        };
        feature.add_tile(decoded, ctx);
        feature
    }

    /// Record a sighting of this feature in another tile (or refresh the
    /// state for a tile already seen).
    pub(crate) fn add_tile(&mut self, decoded: Arc<dyn DecodedFeature>, ctx: &TileContext) {
        self.tiles
            .insert(ctx.id, FeatureTile::new(decoded, ctx.tile_size));
    }

    /// Tiles this feature currently appears in.
    pub fn tile_ids(&self) -> Vec<TileId> {
        self.tiles.keys().copied().collect()
    }

    /// Draw this feature onto the given tile's surface, rebuilding the
    /// cached path, using the effective style for the selection state.
    pub fn draw(&mut self, ctx: &TileContext) {
        let style = self.style.effective(self.selected).clone();
        let kind = self.kind;
        let strategy = self.draw.clone();
        let Some(tile) = self.tiles.get_mut(&ctx.id) else {
            return;
        };

        let mut surface = ctx
            .surface
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match strategy {
            DrawStrategy::Point => draw_point(&mut *surface, ctx, tile, &style),
            DrawStrategy::Line => {
                tile.path = rescale::build_path(ctx, tile.feature.as_ref(), tile.divisor);
                surface.apply_style(&style);
                surface.stroke_path(&tile.path);
            }
            DrawStrategy::Polygon => {
                tile.path = rescale::build_path(ctx, tile.feature.as_ref(), tile.divisor);
                tile.path.close();
                surface.apply_style(&style);
                if style.fill_style.is_some() {
                    surface.fill_path(&tile.path);
                }
                if style.stroke_style.is_some() {
                    surface.stroke_path(&tile.path);
                }
            }
            DrawStrategy::Custom(custom) => {
                // Rebuild the path first so custom-drawn features remain
                // hit-testable.
                tile.path = rescale::build_path(ctx, tile.feature.as_ref(), tile.divisor);
                if kind == GeometryKind::Polygon {
                    tile.path.close();
                }
                custom(&mut *surface, ctx, tile, &style);
            }
        }
    }

    /// Scaled subpaths of this feature in the given tile.
    pub fn paths(&self, ctx: &TileContext) -> Vec<Vec<PixelPoint>> {
        match self.tiles.get(&ctx.id) {
            Some(tile) => rescale::scaled_paths(ctx, tile.feature.as_ref(), tile.divisor),
            None => Vec::new(),
        }
    }

    /// Whether the cached path for `tile_id` contains `point`. Points draw
    /// no containment path and therefore never hit.
    pub fn hit_test(&self, tile_id: TileId, point: PixelPoint) -> bool {
        self.tiles
            .get(&tile_id)
            .is_some_and(|tile| tile.path.contains(point))
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("selected", &self.selected)
            .field("tiles", &self.tiles.len())
            .field("draw", &self.draw)
            .finish_non_exhaustive()
    }
}

/// Point draw: filled and stroked circle at the first vertex.
fn draw_point(surface: &mut dyn DrawSurface, ctx: &TileContext, tile: &FeatureTile, style: &Style) {
    let geometry = tile.feature.load_geometry();
    let Some(raw) = geometry.first().and_then(|ring| ring.first()) else {
        return;
    };
    let center = rescale::scale_point(*raw, ctx, tile.divisor);
    surface.apply_style(style);
    surface.fill_circle(center, style.radius_or_default());
    surface.stroke_circle(center, style.radius_or_default());
}

// =============================================================================
// Tests
// =============================================================================
