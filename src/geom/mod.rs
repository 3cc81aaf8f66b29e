//! Geometry primitives shared by drawing and hit testing.
//!
//! Raw tile geometry arrives as integer coordinates in the tile's own
//! extent; rescaling (see [`rescale`]) turns those into pixel coordinates
//! on a drawing surface. [`TilePath`] is the composite path one feature
//! occupies in one tile: a list of subpaths, each built with an initial
//! move-to and subsequent line-tos, never implicitly closed while drawing.

pub mod mercator;
pub mod rescale;

/// A raw integer coordinate in tile-extent space, as produced by the
/// decoder. Values can fall outside `0..extent` for geometry that spills
/// over the tile buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePoint {
    pub x: i64,
    pub y: i64,
}

impl TilePoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A pixel coordinate on a tile's drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// Composite Path
// =============================================================================

/// The composite path of one feature within one tile.
///
/// Subpaths map 1:1 to the rings/lines of the decoded geometry. The
/// `closed` flag records whether the polygon draw routine closed the path;
/// containment queries always treat subpaths as closed, matching canvas
/// `isPointInPath` semantics on open paths.
#[derive(Debug, Clone, Default)]
pub struct TilePath {
    subpaths: Vec<Vec<PixelPoint>>,
    closed: bool,
}

impl TilePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one subpath. Empty subpaths are dropped.
    pub fn push_subpath(&mut self, points: Vec<PixelPoint>) {
        if !points.is_empty() {
            self.subpaths.push(points);
        }
    }

    /// Mark the path closed; the stroke of each subpath then includes the
    /// segment back to its first point.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn subpaths(&self) -> &[Vec<PixelPoint>] {
        &self.subpaths
    }

    /// Even-odd point containment over all subpaths.
    ///
    /// Each subpath is implicitly closed for the test. Crossings are
    /// accumulated across subpaths, so polygon holes behave as holes.
    pub fn contains(&self, point: PixelPoint) -> bool {
        let mut inside = false;
        for subpath in &self.subpaths {
            if subpath.len() < 3 {
                continue;
            }
            let mut j = subpath.len() - 1;
            for i in 0..subpath.len() {
                let (a, b) = (subpath[i], subpath[j]);
                if (a.y > point.y) != (b.y > point.y) {
                    let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                    if point.x < x_cross {
                        inside = !inside;
                    }
                }
                j = i;
            }
        }
        inside
    }
}

// =============================================================================
// Tests
// =============================================================================
