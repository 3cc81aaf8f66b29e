//! Rescaling raw tile geometry into drawing-surface pixels.
//!
//! Every decoded coordinate is first divided by the feature's divisor
//! (`extent / tile_size`). When the tile is over-zoomed the geometry
//! actually belongs to an ancestor tile: the point is scaled up by
//! `2^(zoom distance)` and translated so that only this descendant's
//! quadrant of the ancestor lands in local pixel space.

use crate::decode::DecodedFeature;
use crate::tile::TileContext;

use super::{PixelPoint, TilePath, TilePoint};

/// Scale one raw coordinate into the tile's local pixel space.
pub fn scale_point(raw: TilePoint, ctx: &TileContext, divisor: f64) -> PixelPoint {
    let point = PixelPoint::new(raw.x as f64 / divisor, raw.y as f64 / divisor);
    match ctx.parent_id {
        Some(parent) => over_zoomed_point(point, ctx, parent.zoom),
        None => point,
    }
}

/// Translate an ancestor-space point into this descendant tile's space.
fn over_zoomed_point(point: PixelPoint, ctx: &TileContext, parent_zoom: u32) -> PixelPoint {
    let distance = ctx.id.zoom - parent_zoom;
    let scale = (1u64 << distance) as f64;
    let tile_size = f64::from(ctx.tile_size);

    let x_offset = f64::from(ctx.id.x % (1 << distance));
    let y_offset = f64::from(ctx.id.y % (1 << distance));

    PixelPoint::new(
        point.x * scale - x_offset * tile_size,
        point.y * scale - y_offset * tile_size,
    )
}

/// Build the composite path for one feature's geometry in one tile.
///
/// Each ring/line becomes one subpath: move to the first scaled point,
/// line to each subsequent point, no implicit closing.
pub fn build_path(ctx: &TileContext, feature: &dyn DecodedFeature, divisor: f64) -> TilePath {
    let mut path = TilePath::new();
    for ring in feature.load_geometry() {
        let subpath = ring
            .into_iter()
            .map(|raw| scale_point(raw, ctx, divisor))
            .collect();
        path.push_subpath(subpath);
    }
    path
}

/// Scaled subpaths without the composite-path wrapper, for callers that
/// want the raw point lists.
pub fn scaled_paths(
    ctx: &TileContext,
    feature: &dyn DecodedFeature,
    divisor: f64,
) -> Vec<Vec<PixelPoint>> {
    feature
        .load_geometry()
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|raw| scale_point(raw, ctx, divisor))
                .collect::<Vec<_>>()
        })
        .filter(|ring: &Vec<PixelPoint>| !ring.is_empty())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
