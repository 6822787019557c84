use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

/// Provenance of a food record. Curated sources (USDA) and user-entered
/// foods bypass the quality filter; community-maintained sources do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Usda,
    OpenFoodFacts,
    User,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Usda => "usda",
            Source::OpenFoodFacts => "openfoodfacts",
            Source::User => "user",
        }
    }

    pub fn from_str_or_user(s: &str) -> Self {
        match s {
            "usda" => Source::Usda,
            "openfoodfacts" => Source::OpenFoodFacts,
            _ => Source::User,
        }
    }

    /// Community-maintained sources are low-trust and subject to the
    /// quality filter.
    pub fn is_high_trust(&self) -> bool {
        !matches!(self, Source::OpenFoodFacts)
    }

    /// Relative ordering used when assembling the candidate list for
    /// deduplication: lower rank goes first and wins key collisions.
    pub fn trust_rank(&self) -> u8 {
        match self {
            Source::Usda => 0,
            Source::User => 1,
            Source::OpenFoodFacts => 2,
        }
    }
}

/// An in-memory, not-yet-persisted normalized food item produced by a
/// provider adapter. Macro fields are always finite and non-negative;
/// absent inputs resolve to 0 during nutrient resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub brand: Option<String>,
    /// Primary identity key when present
    pub barcode: Option<String>,
    pub source: Source,
    pub portion_label: String,
    /// Positive when set
    pub portion_grams: Option<f64>,
    pub kcal: i32,
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    /// Open-ended nutrient map, opaque to the merge/write layers
    #[serde(default)]
    pub micronutrients: HashMap<String, f64>,
    /// True if the source explicitly stated a serving size, false when the
    /// 100 g default was substituted
    pub serving_provided: bool,
}

/// A candidate plus persistence identity. Global records are shared
/// read-only reference data; the catalog only grows, this pipeline never
/// deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFoodRecord {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub source: Source,
    pub portion_label: String,
    pub portion_grams: Option<f64>,
    pub kcal: i32,
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub micronutrients: HashMap<String, f64>,
    pub serving_provided: bool,
    pub is_global: bool,
    pub created_by_user_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

impl StoredFoodRecord {
    /// Mint a new global record from a search candidate.
    pub fn new_global(candidate: CandidateRecord) -> Self {
        StoredFoodRecord {
            id: Uuid::new_v4(),
            name: candidate.name,
            brand: candidate.brand,
            barcode: candidate.barcode,
            source: candidate.source,
            portion_label: candidate.portion_label,
            portion_grams: candidate.portion_grams,
            kcal: candidate.kcal,
            carbs_g: candidate.carbs_g,
            protein_g: candidate.protein_g,
            fat_g: candidate.fat_g,
            micronutrients: candidate.micronutrients,
            serving_provided: candidate.serving_provided,
            is_global: true,
            created_by_user_id: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
