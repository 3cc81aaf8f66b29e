//! Selection bookkeeping.
//!
//! The selection set maps feature ids to either a live entry (the feature
//! exists in some layer's registry) or a pending marker (the id was
//! selected before any tile produced the feature; ingest promotes it).
//! In single-selection mode the coordinator keeps at most one live entry
//! by deselecting everything before selecting anew.

use std::collections::HashMap;

use crate::layer::feature::FeatureId;

/// State of one selected id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEntry {
    /// Selected by id before the feature was parsed from any tile.
    Pending,

    /// The feature exists; `layer` names the registry that owns it.
    Live { layer: String },
}

/// The set of selected feature ids.
#[derive(Debug, Default)]
pub struct SelectionSet {
    entries: HashMap<FeatureId, SelectionEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the id is selected, pending markers included.
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.entries.contains_key(id)
    }

    /// The owning layer of a live entry, `None` for pending or absent.
    pub fn layer_of(&self, id: &FeatureId) -> Option<&str> {
        match self.entries.get(id) {
            Some(SelectionEntry::Live { layer }) => Some(layer),
            _ => None,
        }
    }

    /// Record an id as selected ahead of its feature existing.
    pub fn mark_pending(&mut self, id: FeatureId) {
        self.entries.entry(id).or_insert(SelectionEntry::Pending);
    }

    /// Record an id as selected and owned by `layer`, replacing a pending
    /// marker if present.
    pub fn promote(&mut self, id: FeatureId, layer: &str) {
        self.entries.insert(
            id,
            SelectionEntry::Live {
                layer: layer.to_string(),
            },
        );
    }

    /// Remove one id. Idempotent.
    pub fn remove(&mut self, id: &FeatureId) {
        self.entries.remove(id);
    }

    /// Drop every entry, pending markers included.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Every selected id, pending markers included.
    pub fn ids(&self) -> Vec<FeatureId> {
        self.entries.keys().cloned().collect()
    }

    /// Live `(id, layer)` pairs, in no particular order.
    pub fn live(&self) -> Vec<(FeatureId, String)> {
        self.entries
            .iter()
            .filter_map(|(id, entry)| match entry {
                SelectionEntry::Live { layer } => Some((id.clone(), layer.clone())),
                SelectionEntry::Pending => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
