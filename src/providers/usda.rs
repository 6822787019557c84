use crate::error::IngestError;
use crate::model::{CandidateRecord, Source};
use crate::nutrients::resolve_named_list;
use crate::providers::NutritionProvider;
use crate::serving::parse_serving;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const PROVIDER: &str = "usda";

/// Nutrient name fragments already captured as macros
const MACRO_FRAGMENTS: [&str; 4] = ["energy", "protein", "carbohydrate", "fat"];

/// USDA FoodData Central adapter: curated database, free-text search only,
/// gated behind an API key. Without a key the adapter is a no-op rather
/// than a failure, since the feature is optional.
pub struct UsdaProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<Food>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Food {
    description: Option<String>,
    brand_owner: Option<String>,
    gtin_upc: Option<String>,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FoodNutrient {
    nutrient_name: Option<String>,
    value: Option<f64>,
}

impl UsdaProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("foodlog-ingest/0.1")
            .build()
            .expect("Failed to create HTTP client");

        UsdaProvider {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    fn candidate_from_food(food: Food) -> Option<CandidateRecord> {
        let name = food.description?.trim().to_string();
        if name.is_empty() {
            return None;
        }

        let brand = food
            .brand_owner
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        let barcode = food
            .gtin_upc
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());

        // USDA serving is numeric + unit; synthesize the free-text form the
        // shared parser expects
        let serving_text = food.serving_size.map(|size| {
            let unit = normalize_unit(food.serving_size_unit.as_deref().unwrap_or("g"));
            format!("{size} {unit}")
        });
        let serving = parse_serving(serving_text.as_deref());

        let named: Vec<(&str, f64)> = food
            .food_nutrients
            .iter()
            .filter_map(|n| Some((n.nutrient_name.as_deref()?, n.value?)))
            .collect();
        let macros = resolve_named_list(&named);

        let mut micronutrients = HashMap::new();
        for (nutrient_name, value) in &named {
            let lowered = nutrient_name.to_lowercase();
            if !MACRO_FRAGMENTS.iter().any(|f| lowered.contains(f)) {
                micronutrients.entry(lowered).or_insert(*value);
            }
        }

        Some(CandidateRecord {
            name,
            brand,
            barcode,
            source: Source::Usda,
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

fn normalize_unit(unit: &str) -> &str {
    match unit.to_uppercase().as_str() {
        "G" | "GRM" => "g",
        "ML" | "MLT" => "ml",
        _ => "g",
    }
}

#[async_trait]
impl NutritionProvider for UsdaProvider {
    fn source(&self) -> Source {
        Source::Usda
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<CandidateRecord>, IngestError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("usda search skipped: no API key configured");
            return Ok(Vec::new());
        };

        let url = format!("{}/foods/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", &limit.to_string()),
                ("api_key", api_key),
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
            .foods
            .into_iter()
            .filter_map(Self::candidate_from_food)
            .take(limit as usize)
            .collect();

        debug!("usda search '{query}' produced {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider(base_url: &str, api_key: Option<&str>) -> UsdaProvider {
        UsdaProvider::new(base_url, api_key.map(str::to_string), Duration::from_secs(5))
    }

    #[test]
    fn test_enabled_only_with_api_key() {
        assert!(provider("http://unused.invalid", Some("k")).is_enabled());
        assert!(!provider("http://unused.invalid", None).is_enabled());
        // A blank key is filtered at construction
        assert!(!provider("http://unused.invalid", Some("")).is_enabled());
    }

    #[tokio::test]
    async fn test_search_without_api_key_returns_empty() {
        let result = provider("http://unused.invalid", None)
            .search("apple", 5)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_search_maps_foods_to_candidates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/foods/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "chicken breast".into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "foods": [
                        {
                            "description": "Chicken, breast, meat only, cooked, roasted",
                            "brandOwner": "Tyson",
                            "gtinUpc": "023700031402",
                            "servingSize": 112.0,
                            "servingSizeUnit": "GRM",
                            "foodNutrients": [
                                { "nutrientName": "Energy", "value": 165.0 },
                                { "nutrientName": "Protein", "value": 31.02 },
                                { "nutrientName": "Carbohydrate, by difference", "value": 0.0 },
                                { "nutrientName": "Total lipid (fat)", "value": 3.57 },
                                { "nutrientName": "Sodium, Na", "value": 74.0 }
                            ]
                        },
                        { "description": "   " }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let result = provider(&server.url(), Some("test-key"))
            .search("chicken breast", 10)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        let candidate = &result[0];
        assert_eq!(candidate.source, Source::Usda);
        assert_eq!(candidate.brand.as_deref(), Some("Tyson"));
        assert_eq!(candidate.barcode.as_deref(), Some("023700031402"));
        assert_eq!(candidate.kcal, 165);
        assert_eq!(candidate.protein_g, 31.0);
        assert_eq!(candidate.fat_g, 3.6);
        assert_eq!(candidate.portion_grams, Some(112.0));
        assert!(candidate.serving_provided);
        assert_eq!(candidate.micronutrients.get("sodium, na"), Some(&74.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_http_error_is_provider_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/foods/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let result = provider(&server.url(), Some("test-key"))
            .search("apple", 5)
            .await;
        assert!(matches!(
            result,
            Err(IngestError::ProviderUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_serving_defaults_to_100g() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/foods/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{ "foods": [ { "description": "Apples, raw, with skin",
                    "foodNutrients": [ { "nutrientName": "Energy", "value": 52.0 },
                                       { "nutrientName": "Carbohydrate, by difference", "value": 13.81 } ] } ] }"#,
            )
            .create_async()
            .await;

        let result = provider(&server.url(), Some("test-key"))
            .search("apple", 5)
            .await
            .unwrap();

        assert_eq!(result[0].portion_label, "100 g");
        assert_eq!(result[0].portion_grams, Some(100.0));
        assert!(!result[0].serving_provided);
    }
}
