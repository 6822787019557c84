use foodlog_ingest::{FoodSearchPipeline, IngestConfig, MemoryCatalogStore};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let query = args
        .get(1)
        .ok_or("Please provide a search query as an argument")?;
    let limit: u32 = match args.get(2) {
        Some(raw) => raw.parse()?,
        None => 10,
    };

    let config = IngestConfig::load()?;
    let store = Arc::new(MemoryCatalogStore::new());
    let pipeline = FoodSearchPipeline::from_config(&config, store);

    let records = pipeline.search_food(query, limit).await?;
    if records.is_empty() {
        println!("No matches for '{query}'");
        return Ok(());
    }

    for record in records {
        println!(
            "{} [{}] {} kcal, {}C/{}P/{}F per {} (barcode: {})",
            record.name,
            record.source.as_str(),
            record.kcal,
            record.carbs_g,
            record.protein_g,
            record.fat_g,
            record.portion_label,
            record.barcode.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
