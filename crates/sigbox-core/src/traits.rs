//! Trait interfaces for the Sigbox core.
//!
//! - [`BoxSource`]: read-only lookup of unspent boxes by id. The builder
//!   resolves input values and spending conditions through it; callers back
//!   it with an explorer snapshot, a node, or the in-memory [`UtxoSet`].

use std::collections::HashMap;

use crate::error::CoreError;
use crate::types::{BoxId, LedgerBox, Proposition};

/// Read-only view of unspent boxes.
pub trait BoxSource: Send + Sync {
    /// Look up a box by id. Returns `None` if spent or unknown.
    fn get_box(&self, id: &BoxId) -> Result<Option<LedgerBox>, CoreError>;

    /// Check whether a box exists and is unspent.
    ///
    /// Default implementation delegates to [`get_box`](Self::get_box).
    fn contains_box(&self, id: &BoxId) -> Result<bool, CoreError> {
        Ok(self.get_box(id)?.is_some())
    }
}

/// In-memory unspent box set keyed by box id.
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    boxes: HashMap<BoxId, LedgerBox>,
}

impl UtxoSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box, returning its id. Re-inserting the same box is a no-op.
    pub fn insert(&mut self, ledger_box: LedgerBox) -> BoxId {
        let id = ledger_box.box_id();
        self.boxes.insert(id, ledger_box);
        id
    }

    /// Remove a spent box.
    pub fn remove(&mut self, id: &BoxId) -> Option<LedgerBox> {
        self.boxes.remove(id)
    }

    /// Number of boxes held.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// All boxes guarded by `proposition`, ordered by id for stable output.
    pub fn boxes_for(&self, proposition: &Proposition) -> Vec<LedgerBox> {
        let mut found: Vec<(BoxId, LedgerBox)> = self
            .boxes
            .iter()
            .filter(|(_, b)| b.proposition() == proposition)
            .map(|(id, b)| (*id, b.clone()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found.into_iter().map(|(_, b)| b).collect()
    }
}

impl FromIterator<LedgerBox> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = LedgerBox>>(iter: I) -> Self {
        let mut set = Self::new();
        for b in iter {
            set.insert(b);
        }
        set
    }
}

impl BoxSource for UtxoSet {
    fn get_box(&self, id: &BoxId) -> Result<Option<LedgerBox>, CoreError> {
        Ok(self.boxes.get(id).cloned())
    }
}
