// src/lib.rs

use scrapers::ScraperConfig;
use sea_orm::DatabaseConnection;
use services::{catalog::CatalogCache, scrape_status::ScrapeStatusRegistry};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub catalog: CatalogCache,
    pub scraper_config: ScraperConfig,
    pub scrape_status: ScrapeStatusRegistry,
}

pub mod entities {
    pub mod prelude;
    pub mod gpu_models;
    pub mod prices;
    pub mod providers;
}

pub mod services {
    pub mod catalog;
    pub mod moving_average;
    pub mod price_repository;
    pub mod scrape_runner;
    pub mod scrape_status;
    pub mod trend_aggregator;
}

pub mod models;
pub mod handlers;
pub mod jobs;
pub mod scrapers;
