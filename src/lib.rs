//! Food data ingestion and normalization pipeline.
//!
//! When a food search misses the local catalog, this crate queries multiple
//! third-party nutrition databases concurrently, reconciles their
//! incompatible schemas into one canonical candidate shape, filters
//! low-confidence records from community-maintained sources, deduplicates
//! across sources and merges the survivors into the shared global catalog.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use foodlog_ingest::{FoodSearchPipeline, IngestConfig, MemoryCatalogStore};
//!
//! # async fn example() -> Result<(), foodlog_ingest::IngestError> {
//! let config = IngestConfig::load()?;
//! let store = Arc::new(MemoryCatalogStore::new());
//! let pipeline = FoodSearchPipeline::from_config(&config, store);
//!
//! let records = pipeline.search_food("chicken breast", 10).await?;
//! let by_barcode = pipeline.lookup_barcode("3017620422003").await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod model;
pub mod nutrients;
pub mod pipeline;
pub mod providers;
pub mod quality;
pub mod serving;

pub use catalog::{CatalogStore, MemoryCatalogStore, MergeRows, PgCatalogStore};
pub use config::IngestConfig;
pub use error::IngestError;
pub use model::{CandidateRecord, Source, StoredFoodRecord};
pub use pipeline::FoodSearchPipeline;
pub use providers::{NutritionProvider, OpenFoodFactsProvider, UsdaProvider};
