use crate::error::IngestError;
use crate::model::{CandidateRecord, Source};
use crate::nutrients::{lookup_keyed, resolve_keyed_map};
use crate::providers::NutritionProvider;
use crate::serving::parse_serving;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

const PROVIDER: &str = "openfoodfacts";

/// Micronutrient keys worth carrying over from the nutriments map
const MICRO_KEYS: [&str; 4] = ["fiber", "sugars", "sodium", "salt"];

/// Open Food Facts adapter: community-maintained database, free-text
/// search plus barcode lookup, no credential required.
pub struct OpenFoodFactsProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<Product>,
}

#[derive(Debug, Deserialize, Default)]
struct Product {
    product_name: Option<String>,
    /// Comma-separated list; the first entry is the primary brand
    brands: Option<String>,
    code: Option<String>,
    serving_size: Option<String>,
    #[serde(default)]
    nutriments: Map<String, Value>,
}

impl OpenFoodFactsProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("foodlog-ingest/0.1")
            .build()
            .expect("Failed to create HTTP client");

        OpenFoodFactsProvider {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn candidate_from_product(&self, product: Product) -> Option<CandidateRecord> {
        // A record with no usable name is dropped rather than emitted empty
        let name = product.product_name?.trim().to_string();
        if name.is_empty() {
            return None;
        }

        let brand = product
            .brands
            .as_deref()
            .and_then(|brands| brands.split(',').next())
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        let barcode = product
            .code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());

        let serving = parse_serving(product.serving_size.as_deref());
        let macros = resolve_keyed_map(&product.nutriments);

        let mut micronutrients = HashMap::new();
        for key in MICRO_KEYS {
            if let Some(value) = lookup_keyed(&product.nutriments, key) {
                micronutrients.insert(key.to_string(), value);
            }
        }

        Some(CandidateRecord {
            name,
            brand,
            barcode,
            source: Source::OpenFoodFacts,
            portion_label: serving.label,
            portion_grams: Some(serving.grams),
            kcal: macros.kcal,
            carbs_g: macros.carbs_g,
            protein_g: macros.protein_g,
            fat_g: macros.fat_g,
            micronutrients,
            serving_provided: serving.provided,
        })
    }
}

#[async_trait]
impl NutritionProvider for OpenFoodFactsProvider {
    fn source(&self) -> Source {
        Source::OpenFoodFacts
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<CandidateRecord>, IngestError> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| IngestError::provider_unavailable(PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            return Err(IngestError::provider_unavailable(
                PROVIDER,
                format!("HTTP {}", response.status()),
            ));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| IngestError::malformed_payload(PROVIDER, e.to_string()))?;

        let candidates: Vec<CandidateRecord> = payload
            .products
            .into_iter()
            .filter_map(|product| self.candidate_from_product(product))
            .take(limit as usize)
            .collect();

        debug!("openfoodfacts search '{query}' produced {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn lookup_barcode(&self, code: &str) -> Result<Option<CandidateRecord>, IngestError> {
        let url = format!("{}/api/v0/product/{code}.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::provider_unavailable(PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            return Err(IngestError::provider_unavailable(
                PROVIDER,
                format!("HTTP {}", response.status()),
            ));
        }

        let payload: ProductResponse = response
            .json()
            .await
            .map_err(|e| IngestError::malformed_payload(PROVIDER, e.to_string()))?;

        // status 1 means found; anything else is a clean miss
        if payload.status != 1 {
            return Ok(None);
        }

        let candidate = payload
            .product
            .and_then(|product| self.candidate_from_product(product))
            .map(|mut candidate| {
                // The queried code is authoritative when the payload omits it
                if candidate.barcode.is_none() {
                    candidate.barcode = Some(code.to_string());
                }
                candidate
            });

        Ok(candidate)
    }
}
