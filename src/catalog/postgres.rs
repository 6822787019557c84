use crate::catalog::{CatalogStore, MergeRows};
use crate::error::IngestError;
use crate::model::{CandidateRecord, Source, StoredFoodRecord};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

/// Postgres-backed global catalog.
///
/// Expects a `foods` table owned by the wider application (schema and
/// migrations are managed there), with a unique index on
/// `(is_global, barcode)` and columns matching `FoodRow`. NULL barcodes
/// never conflict, which is exactly the unconditional-insert behavior the
/// non-barcode path wants.
pub struct PgCatalogStore {
    pool: PgPool,
}

const COLUMNS: &str = "id, name, brand, barcode, source, portion_label, portion_grams, \
     kcal, carbs_g, protein_g, fat_g, micronutrients, serving_provided, \
     is_global, created_by_user_id, created_at";

const INSERT_SKIP_SQL: &str = "\
    INSERT INTO foods (id, name, brand, barcode, source, portion_label, portion_grams, \
        kcal, carbs_g, protein_g, fat_g, micronutrients, serving_provided, \
        is_global, created_by_user_id, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
    ON CONFLICT (is_global, barcode) DO NOTHING \
    RETURNING id, name, brand, barcode, source, portion_label, portion_grams, \
        kcal, carbs_g, protein_g, fat_g, micronutrients, serving_provided, \
        is_global, created_by_user_id, created_at";

const INSERT_SQL: &str = "\
    INSERT INTO foods (id, name, brand, barcode, source, portion_label, portion_grams, \
        kcal, carbs_g, protein_g, fat_g, micronutrients, serving_provided, \
        is_global, created_by_user_id, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
    RETURNING id, name, brand, barcode, source, portion_label, portion_grams, \
        kcal, carbs_g, protein_g, fat_g, micronutrients, serving_provided, \
        is_global, created_by_user_id, created_at";

#[derive(Debug, FromRow)]
struct FoodRow {
    id: Uuid,
    name: String,
    brand: Option<String>,
    barcode: Option<String>,
    source: String,
    portion_label: String,
    portion_grams: Option<f64>,
    kcal: i32,
    carbs_g: f64,
    protein_g: f64,
    fat_g: f64,
    micronutrients: Json<HashMap<String, f64>>,
    serving_provided: bool,
    is_global: bool,
    created_by_user_id: Option<Uuid>,
    created_at: OffsetDateTime,
}

impl From<FoodRow> for StoredFoodRecord {
    fn from(row: FoodRow) -> Self {
        StoredFoodRecord {
            id: row.id,
            name: row.name,
            brand: row.brand,
            barcode: row.barcode,
            source: Source::from_str_or_user(&row.source),
            portion_label: row.portion_label,
            portion_grams: row.portion_grams,
            kcal: row.kcal,
            carbs_g: row.carbs_g,
            protein_g: row.protein_g,
            fat_g: row.fat_g,
            micronutrients: row.micronutrients.0,
            serving_provided: row.serving_provided,
            is_global: row.is_global,
            created_by_user_id: row.created_by_user_id,
            created_at: row.created_at,
        }
    }
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        PgCatalogStore { pool }
    }

    async fn insert_one(
        tx: &mut Transaction<'_, Postgres>,
        sql: &str,
        candidate: &CandidateRecord,
    ) -> Result<Option<StoredFoodRecord>, IngestError> {
        let record = StoredFoodRecord::new_global(candidate.clone());
        let row: Option<FoodRow> = sqlx::query_as::<_, FoodRow>(sql)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.brand)
            .bind(&record.barcode)
            .bind(record.source.as_str())
            .bind(&record.portion_label)
            .bind(record.portion_grams)
            .bind(record.kcal)
            .bind(record.carbs_g)
            .bind(record.protein_g)
            .bind(record.fat_g)
            .bind(Json(&record.micronutrients))
            .bind(record.serving_provided)
            .bind(record.is_global)
            .bind(record.created_by_user_id)
            .bind(record.created_at)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(StoredFoodRecord::from))
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn merge_globals(
        &self,
        with_barcode: &[CandidateRecord],
        without_barcode: &[CandidateRecord],
    ) -> Result<MergeRows, IngestError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = MergeRows::default();

        for candidate in with_barcode {
            if let Some(record) = Self::insert_one(&mut tx, INSERT_SKIP_SQL, candidate).await? {
                rows.inserted_with_barcode.push(record);
            }
        }

        let barcodes: Vec<String> = with_barcode
            .iter()
            .filter_map(|c| c.barcode.clone())
            .collect();
        if !barcodes.is_empty() {
            let existing: Vec<FoodRow> = sqlx::query_as::<_, FoodRow>(&format!(
                "SELECT {COLUMNS} FROM foods WHERE is_global AND barcode = ANY($1)"
            ))
            .bind(&barcodes)
            .fetch_all(&mut *tx)
            .await?;
            rows.existing = existing.into_iter().map(StoredFoodRecord::from).collect();
        }

        for candidate in without_barcode {
            if let Some(record) = Self::insert_one(&mut tx, INSERT_SQL, candidate).await? {
                rows.inserted_without_barcode.push(record);
            }
        }

        tx.commit().await?;
        Ok(rows)
    }

    async fn find_global_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<StoredFoodRecord>, IngestError> {
        let row: Option<FoodRow> = sqlx::query_as::<_, FoodRow>(&format!(
            "SELECT {COLUMNS} FROM foods WHERE is_global AND barcode = $1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredFoodRecord::from))
    }
}
