//! Scrape trigger and status handlers
//!
//! GET /scrape runs one provider's pipeline synchronously and returns
//! the run summary. GET /scrape/status reports the latest completed
//! run per provider.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use crate::models::scrape::{ScrapeQuery, ScrapeStatusResponse, ScrapeSummary};
use crate::models::ErrorResponse;
use crate::services::scrape_runner::{self, ScrapeError};
use crate::AppState;

/// GET /scrape
///
/// Scrapes one provider and persists the normalized prices. With
/// `dryRun=true` the incoming batch is diffed against stored prices
/// and nothing is written.
///
/// # Query Parameters
/// - `provider`: provider slug (required): aws, coreweave, lambda, vast
/// - `dryRun`: "true" or "1" to preview instead of persisting
///
/// # Response
/// - 200: Run summary; upstream fetch failures are reported in its
///   `errors` list rather than as an HTTP error
/// - 400: Missing or unknown provider
/// - 500: Reference catalog or storage unavailable
pub async fn trigger_scrape(
    State(state): State<AppState>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<ScrapeSummary>, (StatusCode, Json<ErrorResponse>)> {
    let Some(provider) = query.provider.as_deref() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid provider")),
        ));
    };
    let dry_run = query.dry_run_enabled();

    let summary = scrape_runner::run_scrape(
        &state.db,
        &state.catalog,
        &state.scraper_config,
        provider,
        dry_run,
    )
    .await
    .map_err(|e| match e {
        ScrapeError::InvalidProvider(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid provider")),
        ),
        ScrapeError::Internal(msg) => {
            error!(error = %msg, "Scrape run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Scrape failed")),
            )
        }
    })?;

    // Dry runs never enter the status registry; only real runs move the
    // per-provider "last scraped" marker
    if !summary.dry_run {
        state.scrape_status.record(summary.clone());
    }

    Ok(Json(summary))
}

/// GET /scrape/status
///
/// Latest completed run per provider, keyed by provider slug. Providers
/// never scraped since startup are absent.
pub async fn scrape_status(State(state): State<AppState>) -> Json<ScrapeStatusResponse> {
    Json(ScrapeStatusResponse {
        providers: state.scrape_status.snapshot(),
    })
}
