//! GPU catalog and current price handlers
//!
//! GET /gpus lists the canonical GPU models and GET /current-prices
//! returns each provider's latest stored rate for one model.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tracing::{error, info};

use crate::models::gpu::{CurrentPriceDto, CurrentPricesResponse, GpuDto, GpusResponse};
use crate::models::ErrorResponse;
use crate::services::price_repository;
use crate::AppState;

/// Query parameters for the current price lookup
#[derive(Debug, Deserialize)]
pub struct CurrentPricesQuery {
    /// Numeric GPU model id
    #[serde(rename = "gpuId")]
    pub gpu_id: Option<String>,
}

impl CurrentPricesQuery {
    fn parsed_gpu_id(&self) -> Option<i32> {
        self.gpu_id.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// GET /gpus
///
/// The canonical GPU model catalog, ordered by id.
pub async fn list_gpus(
    State(state): State<AppState>,
) -> Result<Json<GpusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let catalog = state.catalog.get(&state.db).await.map_err(|e| {
        error!(error = %e, "Database error loading GPU catalog");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Database error: {}", e))),
        )
    })?;

    let gpus = catalog.gpus.iter().map(GpuDto::from).collect();

    Ok(Json(GpusResponse { gpus }))
}

/// GET /current-prices
///
/// Latest stored rate per provider for one GPU model. An id the catalog
/// does not know yields an empty list, not an error.
///
/// # Query Parameters
/// - `gpuId`: numeric GPU model id (required)
pub async fn current_prices(
    State(state): State<AppState>,
    Query(query): Query<CurrentPricesQuery>,
) -> Result<Json<CurrentPricesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(gpu_model_id) = query.parsed_gpu_id() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing or invalid gpuId")),
        ));
    };

    let catalog = state.catalog.get(&state.db).await.map_err(|e| {
        error!(error = %e, "Database error loading reference catalog");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Database error: {}", e))),
        )
    })?;

    let rows = price_repository::current_prices_for_gpu(&state.db, gpu_model_id)
        .await
        .map_err(|e| {
            error!(error = %e, gpu_model_id, "Database error fetching current prices");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Database error: {}", e))),
            )
        })?;

    info!(gpu_model_id, rows = rows.len(), "Current price query completed");

    let data = rows
        .iter()
        .map(|row| CurrentPriceDto {
            provider: catalog
                .provider_by_id(row.provider_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("provider-{}", row.provider_id)),
            gpu_model: catalog
                .gpu_by_id(row.gpu_model_id)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| format!("gpu-{}", row.gpu_model_id)),
            price_per_hour: row.price_per_hour.to_f64().unwrap_or(0.0),
            source_url: row.source_url.clone(),
            updated_at: row.created_at,
        })
        .collect();

    Ok(Json(CurrentPricesResponse { data }))
}
