mod memory;
mod merge;
mod postgres;

pub use memory::MemoryCatalogStore;
pub use merge::merge_candidates;
pub use postgres::PgCatalogStore;

use crate::error::IngestError;
use crate::model::{CandidateRecord, StoredFoodRecord};
use async_trait::async_trait;

/// Row sets produced by one merge write unit. `existing` may overlap with
/// `inserted_with_barcode` when the fetch runs inside the same transaction;
/// the merger deduplicates by persisted id.
#[derive(Debug, Default)]
pub struct MergeRows {
    pub existing: Vec<StoredFoodRecord>,
    pub inserted_with_barcode: Vec<StoredFoodRecord>,
    pub inserted_without_barcode: Vec<StoredFoodRecord>,
}

/// Seam to the global food store: a relational table with a uniqueness
/// constraint on `(is_global, barcode)` and none on name/brand.
///
/// Correctness under concurrent identical searches relies on the store's
/// constraint enforcement, not on an application-level lock: two racers
/// inserting the same barcode get exactly one winner, and the loser
/// recovers the winning row through the existing-rows fetch.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Execute one atomic merge write unit:
    /// 1. insert `with_barcode` candidates as global rows, skipping (not
    ///    erroring on) barcode uniqueness conflicts;
    /// 2. fetch all existing global rows matching any candidate barcode,
    ///    regardless of what step 1 inserted;
    /// 3. insert `without_barcode` candidates unconditionally.
    /// Any failure must leave no partial catalog mutation behind.
    async fn merge_globals(
        &self,
        with_barcode: &[CandidateRecord],
        without_barcode: &[CandidateRecord],
    ) -> Result<MergeRows, IngestError>;

    /// Catalog-local barcode lookup, consulted before any external call
    async fn find_global_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<StoredFoodRecord>, IngestError>;
}
