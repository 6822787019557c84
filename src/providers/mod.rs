mod open_food_facts;
mod usda;

pub use open_food_facts::OpenFoodFactsProvider;
pub use usda::UsdaProvider;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::model::{CandidateRecord, Source};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Unified trait for all external nutrition data providers.
///
/// Adapters own their provider-specific parsing and emit the canonical
/// candidate shape: nutrients resolved to the four macros, serving text
/// reduced to a label and gram weight, unnamed raw results dropped.
/// An empty result list means "no matches", never "the call failed" —
/// failures surface as errors.
#[async_trait]
pub trait NutritionProvider: Send + Sync {
    /// Provenance identifier stamped on every emitted candidate
    fn source(&self) -> Source;

    /// Whether the adapter is usable as configured. Disabled providers are
    /// never consulted, so they count neither as successes nor as failures.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Free-text search against the provider's database
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<CandidateRecord>, IngestError>;

    /// Barcode lookup, for providers that support it
    async fn lookup_barcode(&self, _code: &str) -> Result<Option<CandidateRecord>, IngestError> {
        Ok(None)
    }
}

/// Build the standard provider set from configuration, ordered high-trust
/// first so downstream deduplication resolves collisions in favor of
/// curated data.
pub fn default_providers(config: &IngestConfig) -> Vec<Arc<dyn NutritionProvider>> {
    let timeout = Duration::from_secs(config.provider_timeout_secs);
    vec![
        Arc::new(UsdaProvider::new(
            &config.usda.base_url,
            config.usda.api_key.clone(),
            timeout,
        )),
        Arc::new(OpenFoodFactsProvider::new(
            &config.open_food_facts.base_url,
            timeout,
        )),
    ]
}
