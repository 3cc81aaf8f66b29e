//! Pointer events, dispatch options and debouncing.
//!
//! The original event coalescing relied on a timer plus an identity
//! comparison against the last captured event. [`Debouncer`] makes that
//! explicit: every delayed dispatch takes a monotonically increasing
//! ticket, sleeps out the configured delay, and proceeds only if no newer
//! ticket was issued meanwhile. Last delayed event wins; a superseded
//! dispatch is inert. Zero-delay dispatches bypass the gate entirely and
//! leave pending delayed dispatches untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::decode::GeometryKind;
use crate::geom::mercator::LngLat;
use crate::geom::PixelPoint;
use crate::layer::feature::FeatureId;
use crate::tile::TileId;

/// A pointer event as delivered by the host: a geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: LngLat,
}

impl PointerEvent {
    pub fn new(position: LngLat) -> Self {
        Self { position }
    }
}

/// Options controlling one pointer dispatch.
#[derive(Debug, Clone)]
pub struct PointerOptions {
    /// Apply selection changes to hit features
    pub set_selected: bool,

    /// Clicking a selected feature deselects it (ignored for hover)
    pub toggle_selection: bool,

    /// Stop at the first clickable layer that produced a feature
    pub limit_to_first_visible_layer: bool,

    /// Allow more than one selected feature at a time (clicks only)
    pub multiple_selection: bool,

    /// Debounce delay; zero dispatches immediately
    pub delay: Duration,
}

impl Default for PointerOptions {
    fn default() -> Self {
        Self {
            set_selected: false,
            toggle_selection: true,
            limit_to_first_visible_layer: false,
            multiple_selection: false,
            delay: Duration::ZERO,
        }
    }
}

/// Feature details captured at hit time.
#[derive(Debug, Clone)]
pub struct HitFeature {
    /// Feature id; `None` for anonymous features (not selectable)
    pub id: Option<FeatureId>,

    pub geometry: GeometryKind,

    pub properties: Map<String, Value>,

    /// Selection state after this dispatch's changes were applied
    pub selected: bool,
}

/// Outcome of walking one clickable layer: one record per layer visited,
/// whether or not a feature was under the pointer.
#[derive(Debug, Clone)]
pub struct LayerHit {
    /// Layer the record belongs to
    pub layer: String,

    /// The topmost feature hit in this layer, if any
    pub feature: Option<HitFeature>,

    /// Tile the pointer fell in
    pub tile: TileId,

    /// Pointer position local to that tile's surface
    pub tile_point: PixelPoint,
}

// =============================================================================
// Debouncer
// =============================================================================

/// Last-writer-wins dispatch gate.
#[derive(Debug, Default)]
pub struct Debouncer {
    seq: AtomicU64,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait out `delay` and report whether this dispatch is still the
    /// most recent delayed one. A zero delay passes immediately without
    /// taking a ticket, so it never supersedes a dispatch that is
    /// currently waiting.
    pub async fn acquire(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return true;
        }
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(delay).await;
        self.seq.load(Ordering::SeqCst) == ticket
    }
}

// =============================================================================
// Tests
// =============================================================================
