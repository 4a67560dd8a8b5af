//! File-backed store: one JSON document holding line items and run
//! verdicts, written through on every mutation.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use recon_core::{ItemStore, LineItem, ReconciliationRun, StoreError, UpsertOutcome};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    /// batch_key -> product_id -> item, ordered for stable output.
    items: HashMap<String, BTreeMap<String, LineItem>>,
    runs: HashMap<String, ReconciliationRun>,
}

/// Store persisted as a single JSON file next to the user's data.
pub struct JsonStore {
    path: PathBuf,
    data: StoreFile,
}

impl JsonStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let data = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            StoreFile::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn run(&self, batch_key: &str) -> Option<&ReconciliationRun> {
        self.data.runs.get(batch_key)
    }

    pub fn items(&self, batch_key: &str) -> Vec<&LineItem> {
        self.data
            .items
            .get(batch_key)
            .map(|batch| batch.values().collect())
            .unwrap_or_default()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| StoreError::SaveRun(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| StoreError::SaveRun(e.to_string()))
    }
}

impl ItemStore for JsonStore {
    fn upsert_line_item(
        &mut self,
        batch_key: &str,
        item: &LineItem,
    ) -> Result<UpsertOutcome, StoreError> {
        let batch = self.data.items.entry(batch_key.to_string()).or_default();
        let outcome = match batch.insert(item.product_id.clone(), item.clone()) {
            None => UpsertOutcome::Created,
            Some(_) => UpsertOutcome::Updated,
        };
        self.persist().map_err(|e| StoreError::Upsert {
            product_id: item.product_id.clone(),
            reason: e.to_string(),
        })?;
        Ok(outcome)
    }

    fn find_line_items_for_batch(&self, batch_key: &str) -> Result<Vec<LineItem>, StoreError> {
        Ok(self
            .data
            .items
            .get(batch_key)
            .map(|batch| batch.values().cloned().collect())
            .unwrap_or_default())
    }

    fn save_run(&mut self, run: &ReconciliationRun) -> Result<(), StoreError> {
        self.data.runs.insert(run.batch_key.clone(), run.clone());
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = JsonStore::open(&path).unwrap();
        let item = LineItem::new("A-1", "指輪", Decimal::from(42_000));
        store.upsert_line_item("b1", &item).unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        let items = reopened.find_line_items_for_batch("b1").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "A-1");
        assert_eq!(items[0].purchase_price, Decimal::from(42_000));
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(&dir.path().join("none.json")).unwrap();
        assert!(store.find_line_items_for_batch("b1").unwrap().is_empty());
        assert!(store.run("b1").is_none());
    }
}
