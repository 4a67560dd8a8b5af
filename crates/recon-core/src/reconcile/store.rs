//! Persistence collaborator contract.
//!
//! The engine consumes this trait; transactional guarantees around the
//! upsert belong to the implementor, not the core.

use std::collections::{BTreeMap, HashMap};

use crate::error::StoreError;
use crate::models::item::LineItem;
use crate::models::run::ReconciliationRun;

/// Result of an upsert keyed by `product_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Store of persisted line items and run verdicts.
pub trait ItemStore {
    /// Insert or update one line item, `product_id` being the natural key
    /// within a batch.
    fn upsert_line_item(
        &mut self,
        batch_key: &str,
        item: &LineItem,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Load the persisted line items for a batch, for recomputation.
    fn find_line_items_for_batch(&self, batch_key: &str) -> Result<Vec<LineItem>, StoreError>;

    /// Persist the run verdict.
    fn save_run(&mut self, run: &ReconciliationRun) -> Result<(), StoreError>;
}

/// In-memory store, sufficient for tests and single-shot callers.
///
/// Items are kept ordered by `product_id` so recomputation sees a
/// deterministic snapshot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, BTreeMap<String, LineItem>>,
    runs: HashMap<String, ReconciliationRun>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self, batch_key: &str) -> Option<&ReconciliationRun> {
        self.runs.get(batch_key)
    }
}

impl ItemStore for MemoryStore {
    fn upsert_line_item(
        &mut self,
        batch_key: &str,
        item: &LineItem,
    ) -> Result<UpsertOutcome, StoreError> {
        let batch = self.items.entry(batch_key.to_string()).or_default();
        match batch.insert(item.product_id.clone(), item.clone()) {
            None => Ok(UpsertOutcome::Created),
            Some(_) => Ok(UpsertOutcome::Updated),
        }
    }

    fn find_line_items_for_batch(&self, batch_key: &str) -> Result<Vec<LineItem>, StoreError> {
        Ok(self
            .items
            .get(batch_key)
            .map(|batch| batch.values().cloned().collect())
            .unwrap_or_default())
    }

    fn save_run(&mut self, run: &ReconciliationRun) -> Result<(), StoreError> {
        self.runs.insert(run.batch_key.clone(), run.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_upsert_outcomes() {
        let mut store = MemoryStore::new();
        let item = LineItem::new("12-3", "テスト", Decimal::from(1000));

        assert_eq!(
            store.upsert_line_item("b1", &item).unwrap(),
            UpsertOutcome::Created
        );
        assert_eq!(
            store.upsert_line_item("b1", &item).unwrap(),
            UpsertOutcome::Updated
        );
        // Same product id in a different batch is a fresh row.
        assert_eq!(
            store.upsert_line_item("b2", &item).unwrap(),
            UpsertOutcome::Created
        );

        assert_eq!(store.find_line_items_for_batch("b1").unwrap().len(), 1);
        assert!(store.find_line_items_for_batch("none").unwrap().is_empty());
    }
}
