use axum::{routing::get, Router};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gpumarket_backend::handlers::{prices, scrape, trends};
use gpumarket_backend::jobs::price_scrape::start_price_scrape_job;
use gpumarket_backend::scrapers::ScraperConfig;
use gpumarket_backend::services::catalog::CatalogCache;
use gpumarket_backend::services::scrape_status::ScrapeStatusRegistry;
use gpumarket_backend::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gpumarket_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let state = AppState {
        db,
        catalog: CatalogCache::new(),
        scraper_config: ScraperConfig::from_env(),
        scrape_status: ScrapeStatusRegistry::new(),
    };

    // Kick off the scheduled scrape loop
    start_price_scrape_job(state.clone()).await;

    // Build router
    let app = Router::new()
        .route("/", get(health))
        .route("/scrape", get(scrape::trigger_scrape))
        .route("/scrape/status", get(scrape::scrape_status))
        .route("/gpus", get(prices::list_gpus))
        .route("/current-prices", get(prices::current_prices))
        .route("/gpu-trends", get(trends::gpu_trends))
        .route("/gpu-trends/smoothed", get(trends::gpu_trends_smoothed))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

async fn health() -> &'static str {
    "GPU price aggregator is running"
}
