use crate::catalog::{merge_candidates, CatalogStore};
use crate::config::IngestConfig;
use crate::dedupe::dedupe;
use crate::error::IngestError;
use crate::model::{CandidateRecord, StoredFoodRecord};
use crate::providers::{default_providers, NutritionProvider};
use crate::quality::is_low_quality;
use futures_util::future::join_all;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// The food-search pipeline: on a local-catalog miss the caller invokes
/// `search_food`, which fans out to every configured provider, normalizes
/// and filters the results, deduplicates across sources and merges the
/// survivors into the global catalog.
pub struct FoodSearchPipeline {
    providers: Vec<Arc<dyn NutritionProvider>>,
    store: Arc<dyn CatalogStore>,
    provider_timeout: Duration,
}

impl FoodSearchPipeline {
    pub fn new(
        providers: Vec<Arc<dyn NutritionProvider>>,
        store: Arc<dyn CatalogStore>,
        provider_timeout: Duration,
    ) -> Self {
        FoodSearchPipeline {
            providers,
            store,
            provider_timeout,
        }
    }

    pub fn from_config(config: &IngestConfig, store: Arc<dyn CatalogStore>) -> Self {
        FoodSearchPipeline::new(
            default_providers(config),
            store,
            Duration::from_secs(config.provider_timeout_secs),
        )
    }

    /// Search all providers for `query` and return the merged catalog
    /// records.
    ///
    /// Provider calls run concurrently, each bounded by the configured
    /// timeout so one slow source cannot stall the rest. A failing provider
    /// contributes nothing; its failure is logged, not propagated. Only
    /// when every consulted provider fails does the caller see a single
    /// aggregate error; providers disabled by configuration are not
    /// consulted and count toward neither side. Candidate ordering for
    /// deduplication follows source trust rank, never call completion time.
    pub async fn search_food(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<StoredFoodRecord>, IngestError> {
        let mut ordered = self.enabled_providers();
        ordered.sort_by_key(|provider| provider.source().trust_rank());

        let outcomes = join_all(
            ordered
                .iter()
                .map(|provider| self.search_one(provider.as_ref(), query, limit)),
        )
        .await;

        let mut candidates: Vec<CandidateRecord> = Vec::new();
        let mut failures: Vec<String> = Vec::new();
        for (provider, outcome) in ordered.iter().zip(outcomes) {
            match outcome {
                Ok(batch) => {
                    debug!(
                        "{} returned {} candidates for '{query}'",
                        provider.source().as_str(),
                        batch.len()
                    );
                    candidates.extend(batch);
                }
                Err(e) => {
                    warn!("{} search failed: {e}", provider.source().as_str());
                    failures.push(format!("{}: {e}", provider.source().as_str()));
                }
            }
        }

        if !failures.is_empty() && failures.len() == ordered.len() {
            return Err(IngestError::provider_unavailable(
                "all",
                failures.join("; "),
            ));
        }

        let before = candidates.len();
        candidates.retain(|c| c.source.is_high_trust() || !is_low_quality(c));
        if candidates.len() < before {
            debug!(
                "quality filter dropped {} low-trust candidates",
                before - candidates.len()
            );
        }

        merge_candidates(self.store.as_ref(), dedupe(candidates)).await
    }

    /// Resolve one barcode, consulting the catalog before any external
    /// source. A fresh external hit is persisted through the merger so the
    /// next lookup is catalog-local. Provider failures fall through to the
    /// next source under the same policy as `search_food`: an error
    /// surfaces only when every consulted provider failed.
    pub async fn lookup_barcode(
        &self,
        code: &str,
    ) -> Result<Option<StoredFoodRecord>, IngestError> {
        if let Some(existing) = self.store.find_global_by_barcode(code).await? {
            debug!("barcode {code} resolved from catalog");
            return Ok(Some(existing));
        }

        let consulted = self.enabled_providers();
        let mut failures: Vec<String> = Vec::new();
        for provider in &consulted {
            let outcome =
                match tokio::time::timeout(self.provider_timeout, provider.lookup_barcode(code))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(IngestError::provider_unavailable(
                        provider.source().as_str(),
                        format!("timed out after {:?}", self.provider_timeout),
                    )),
                };

            match outcome {
                Ok(Some(candidate)) => {
                    let merged = merge_candidates(self.store.as_ref(), vec![candidate]).await?;
                    return Ok(merged.into_iter().next());
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("{} barcode lookup failed: {e}", provider.source().as_str());
                    failures.push(format!("{}: {e}", provider.source().as_str()));
                }
            }
        }

        if !failures.is_empty() && failures.len() == consulted.len() {
            return Err(IngestError::provider_unavailable(
                "all",
                failures.join("; "),
            ));
        }

        Ok(None)
    }

    fn enabled_providers(&self) -> Vec<&Arc<dyn NutritionProvider>> {
        self.providers
            .iter()
            .filter(|provider| {
                let enabled = provider.is_enabled();
                if !enabled {
                    debug!("{} skipped: not configured", provider.source().as_str());
                }
                enabled
            })
            .collect()
    }

    async fn search_one(
        &self,
        provider: &dyn NutritionProvider,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateRecord>, IngestError> {
        match tokio::time::timeout(self.provider_timeout, provider.search(query, limit)).await {
            Ok(result) => result,
            Err(_) => Err(IngestError::provider_unavailable(
                provider.source().as_str(),
                format!("timed out after {:?}", self.provider_timeout),
            )),
        }
    }
}
