//! Drawn-tile index.
//!
//! When the cache option is enabled, tiles that completed a full
//! fetch/decode/draw pass are recorded here and later host requests for
//! the same tile reuse the stored context without refetching.
//! Invalidation removes entries to force a redraw; the decoded data
//! survives on the still-referenced context, so no network traffic
//! results. The index is bounded: eviction of a live tile merely costs a
//! redraw on its next request.

use std::num::NonZeroUsize;

use lru::LruCache;

use super::{TileContext, TileId};

/// Default maximum number of drawn tiles retained.
pub const DEFAULT_DRAWN_TILE_CAPACITY: usize = 1024;

/// Bounded index of fully drawn tile contexts.
pub struct DrawnTileIndex {
    entries: LruCache<TileId, TileContext>,
}

impl DrawnTileIndex {
    /// Create an index with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_DRAWN_TILE_CAPACITY)
    }

    /// Create an index bounded to `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Look up a drawn tile, marking it recently used.
    pub fn get(&mut self, id: &TileId) -> Option<&TileContext> {
        self.entries.get(id)
    }

    /// Whether `id` is recorded as drawn, without touching LRU order.
    pub fn contains(&self, id: &TileId) -> bool {
        self.entries.contains(id)
    }

    /// Record a tile as drawn.
    pub fn insert(&mut self, id: TileId, ctx: TileContext) {
        self.entries.put(id, ctx);
    }

    /// Drop one tile from the index. Idempotent.
    pub fn remove(&mut self, id: &TileId) -> Option<TileContext> {
        self.entries.pop(id)
    }

    /// Drop every entry. Idempotent.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DrawnTileIndex {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
