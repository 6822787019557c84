use crate::catalog::{CatalogStore, MergeRows};
use crate::error::IngestError;
use crate::model::{CandidateRecord, StoredFoodRecord};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// In-memory catalog with the same `(is_global, barcode)` uniqueness
/// semantics as the relational store. Backs the CLI and tests; the write
/// lock held across the whole merge unit stands in for the transaction.
#[derive(Default)]
pub struct MemoryCatalogStore {
    records: RwLock<Vec<StoredFoodRecord>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, in insertion order
    pub async fn all_records(&self) -> Vec<StoredFoodRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn merge_globals(
        &self,
        with_barcode: &[CandidateRecord],
        without_barcode: &[CandidateRecord],
    ) -> Result<MergeRows, IngestError> {
        let mut records = self.records.write().await;
        let mut rows = MergeRows::default();

        for candidate in with_barcode {
            let conflict = records
                .iter()
                .any(|r| r.is_global && r.barcode == candidate.barcode);
            if conflict {
                continue;
            }
            let record = StoredFoodRecord::new_global(candidate.clone());
            records.push(record.clone());
            rows.inserted_with_barcode.push(record);
        }

        let barcodes: HashSet<&str> = with_barcode
            .iter()
            .filter_map(|c| c.barcode.as_deref())
            .collect();
        rows.existing = records
            .iter()
            .filter(|r| {
                r.is_global
                    && r.barcode
                        .as_deref()
                        .is_some_and(|code| barcodes.contains(code))
            })
            .cloned()
            .collect();

        for candidate in without_barcode {
            let record = StoredFoodRecord::new_global(candidate.clone());
            records.push(record.clone());
            rows.inserted_without_barcode.push(record);
        }

        Ok(rows)
    }

    async fn find_global_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<StoredFoodRecord>, IngestError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.is_global && r.barcode.as_deref() == Some(barcode))
            .cloned())
    }
}
