use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;

use gpumarket_backend::entities::{gpu_models, providers};
use gpumarket_backend::handlers::{prices, scrape, trends};
use gpumarket_backend::scrapers::ScraperConfig;
use gpumarket_backend::services::catalog::CatalogCache;
use gpumarket_backend::services::scrape_status::ScrapeStatusRegistry;
use gpumarket_backend::AppState;

/// App state over an injected connection, usually a MockDatabase.
pub fn test_state(db: DatabaseConnection) -> AppState {
    test_state_with_config(db, ScraperConfig::default())
}

#[allow(dead_code)]
pub fn test_state_with_config(db: DatabaseConnection, scraper_config: ScraperConfig) -> AppState {
    AppState {
        db,
        catalog: CatalogCache::new(),
        scraper_config,
        scrape_status: ScrapeStatusRegistry::new(),
    }
}

/// The same routes main wires up, minus the liveness root.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/scrape", get(scrape::trigger_scrape))
        .route("/scrape/status", get(scrape::scrape_status))
        .route("/gpus", get(prices::list_gpus))
        .route("/current-prices", get(prices::current_prices))
        .route("/gpu-trends", get(trends::gpu_trends))
        .route("/gpu-trends/smoothed", get(trends::gpu_trends_smoothed))
        .with_state(state)
}

/// Rows matching the seed migration's providers.
#[allow(dead_code)]
pub fn seed_providers() -> Vec<providers::Model> {
    [
        (1, "aws", "Amazon Web Services"),
        (2, "coreweave", "CoreWeave"),
        (3, "lambda", "Lambda Labs"),
        (4, "vast", "Vast.ai"),
    ]
    .into_iter()
    .map(|(id, slug, name)| providers::Model {
        id,
        slug: slug.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// A cut of the seeded GPU catalog, enough for every adapter fixture.
#[allow(dead_code)]
pub fn seed_gpus() -> Vec<gpu_models::Model> {
    [
        (1, "h100-sxm", "NVIDIA H100 SXM", 80),
        (2, "a100-sxm", "NVIDIA A100 SXM 80GB", 80),
        (3, "l4", "NVIDIA L4", 24),
        (4, "a10", "NVIDIA A10", 24),
        (5, "v100", "NVIDIA Tesla V100", 16),
    ]
    .into_iter()
    .map(|(id, slug, name, vram_gb)| gpu_models::Model {
        id,
        slug: slug.to_string(),
        name: name.to_string(),
        vram_gb,
    })
    .collect()
}
