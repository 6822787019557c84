use crate::catalog::CatalogStore;
use crate::error::IngestError;
use crate::model::{CandidateRecord, StoredFoodRecord};
use std::collections::HashSet;

/// Reconcile deduplicated candidates against the persistent global catalog.
///
/// Barcode candidates are insert-if-absent; existing rows for their
/// barcodes are always fetched so callers receive records inserted by
/// prior searches. Non-barcode candidates are inserted unconditionally —
/// two searches producing the same unidentified food create two distinct
/// records, which is accepted behavior here.
///
/// Returned order: existing-by-barcode rows, newly-inserted-with-barcode
/// rows, newly-inserted-without-barcode rows, deduplicated by persisted id.
pub async fn merge_candidates(
    store: &dyn CatalogStore,
    candidates: Vec<CandidateRecord>,
) -> Result<Vec<StoredFoodRecord>, IngestError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let (with_barcode, without_barcode): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.barcode.as_deref().is_some_and(|code| !code.is_empty()));

    let rows = store.merge_globals(&with_barcode, &without_barcode).await?;

    let mut seen = HashSet::new();
    let combined = rows
        .existing
        .into_iter()
        .chain(rows.inserted_with_barcode)
        .chain(rows.inserted_without_barcode)
        .filter(|record| seen.insert(record.id))
        .collect();

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalogStore;
    use crate::model::Source;
    use std::collections::HashMap;

    fn candidate(name: &str, barcode: Option<&str>) -> CandidateRecord {
        CandidateRecord {
            name: name.to_string(),
            brand: None,
            barcode: barcode.map(str::to_string),
            source: Source::OpenFoodFacts,
            portion_label: "1 bar (40 g)".to_string(),
            portion_grams: Some(40.0),
            kcal: 180,
            carbs_g: 20.0,
            protein_g: 4.0,
            fat_g: 9.0,
            micronutrients: HashMap::new(),
            serving_provided: true,
        }
    }

    #[tokio::test]
    async fn test_merge_is_idempotent_under_barcode_race() {
        let store = MemoryCatalogStore::new();

        // Two "concurrent" searches insert the same barcode-bearing food
        let first = merge_candidates(&store, vec![candidate("Choc Bar", Some("555"))])
            .await
            .unwrap();
        let second = merge_candidates(&store, vec![candidate("Choc Bar", Some("555"))])
            .await
            .unwrap();

        // Exactly one row exists, and both callers received it
        assert_eq!(store.all_records().await.len(), 1);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].barcode.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn test_unbarcoded_items_get_no_identity_check() {
        let store = MemoryCatalogStore::new();

        let first = merge_candidates(&store, vec![candidate("Mystery Bar", None)])
            .await
            .unwrap();
        let second = merge_candidates(&store, vec![candidate("Mystery Bar", None)])
            .await
            .unwrap();

        assert_eq!(store.all_records().await.len(), 2);
        assert_ne!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_combined_output_has_no_id_duplicates() {
        let store = MemoryCatalogStore::new();
        let merged = merge_candidates(
            &store,
            vec![
                candidate("Choc Bar", Some("555")),
                candidate("Mystery Bar", None),
            ],
        )
        .await
        .unwrap();

        // The freshly inserted barcode row also appears in the existing
        // fetch; it must come back once
        assert_eq!(merged.len(), 2);
        let ids: HashSet<_> = merged.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_existing_rows_come_first() {
        let store = MemoryCatalogStore::new();
        merge_candidates(&store, vec![candidate("Old Bar", Some("555"))])
            .await
            .unwrap();

        let merged = merge_candidates(
            &store,
            vec![
                candidate("Mystery Bar", None),
                candidate("New Bar", Some("555")),
            ],
        )
        .await
        .unwrap();

        assert_eq!(merged.len(), 2);
        // The pre-existing barcode row wins the slot; its original name is kept
        assert_eq!(merged[0].name, "Old Bar");
        assert_eq!(merged[1].name, "Mystery Bar");
    }

    #[tokio::test]
    async fn test_empty_input_skips_the_store() {
        let store = MemoryCatalogStore::new();
        let merged = merge_candidates(&store, Vec::new()).await.unwrap();
        assert!(merged.is_empty());
        assert!(store.all_records().await.is_empty());
    }
}
