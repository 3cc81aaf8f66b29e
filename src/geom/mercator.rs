//! Web-mercator projection helpers for pointer dispatch.
//!
//! Pointer events carry geographic positions; hit testing needs the owning
//! tile at the current zoom plus the tile-local pixel point. Latitudes are
//! clamped just short of the poles, where the projection diverges.

use crate::tile::TileId;

use super::PixelPoint;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

// Keeps the mercator y finite near the poles.
const MAX_SIN_LAT: f64 = 0.9999;

/// Project to world pixel coordinates at the given zoom.
///
/// The world is `tile_size * 2^zoom` pixels on each side; (0, 0) is the
/// north-west corner.
pub fn world_point(position: LngLat, zoom: u32, tile_size: u32) -> PixelPoint {
    let world_size = f64::from(tile_size) * f64::from(1u32 << zoom.min(31));

    let x = (position.lng + 180.0) / 360.0;

    let sin_lat = position
        .lat
        .to_radians()
        .sin()
        .clamp(-MAX_SIN_LAT, MAX_SIN_LAT);
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI);

    PixelPoint::new(x * world_size, y * world_size)
}

/// The tile containing a geographic position at the given zoom, together
/// with the position's pixel point local to that tile.
pub fn tile_local_point(position: LngLat, zoom: u32, tile_size: u32) -> (TileId, PixelPoint) {
    let world = world_point(position, zoom, tile_size);
    let size = f64::from(tile_size);
    let max_index = (1u64 << zoom.min(31)) - 1;

    let tile_x = ((world.x / size).floor() as i64).clamp(0, max_index as i64) as u32;
    let tile_y = ((world.y / size).floor() as i64).clamp(0, max_index as i64) as u32;

    let local = PixelPoint::new(
        world.x - f64::from(tile_x) * size,
        world.y - f64::from(tile_y) * size,
    );
    (TileId::new(zoom, tile_x, tile_y), local)
}

// =============================================================================
// Tests
// =============================================================================
