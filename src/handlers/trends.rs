//! GPU price trend handlers
//!
//! GET /gpu-trends returns the daily cross-provider average price for
//! one GPU model; GET /gpu-trends/smoothed runs the same series through
//! a trailing moving average.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::prelude::ToPrimitive;
use tracing::{error, info};

use crate::models::trends::{
    MovingAveragePointDto, SmoothedTrendQuery, SmoothedTrendsResponse, TrendPointDto, TrendQuery,
    TrendsResponse,
};
use crate::models::ErrorResponse;
use crate::services::moving_average::{self, DEFAULT_SMOOTHING_WINDOW};
use crate::services::trend_aggregator;
use crate::AppState;

/// GET /gpu-trends
///
/// # Query Parameters
/// - `gpuId`: numeric GPU model id (required)
/// - `days`: trailing window in days (default: 30)
///
/// # Response
/// - 200: Daily averages, oldest first; empty data for an unknown id
/// - 400: Missing or non-numeric gpuId
/// - 500: Database error
pub async fn gpu_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(gpu_model_id) = query.parsed_gpu_id() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing or invalid gpuId")),
        ));
    };

    let points = trend_aggregator::daily_trend(&state.db, gpu_model_id, query.parsed_days())
        .await
        .map_err(|e| {
            error!(error = %e, gpu_model_id, "Database error computing trend");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Database error: {}", e))),
            )
        })?;

    info!(gpu_model_id, points = points.len(), "Trend query completed");

    let data = points
        .iter()
        .map(|p| TrendPointDto {
            day: p.day,
            avg_price_per_hour: p.avg_price_per_hour.to_f64().unwrap_or(0.0),
            provider_count: p.provider_count,
        })
        .collect();

    Ok(Json(TrendsResponse { data }))
}

/// GET /gpu-trends/smoothed
///
/// Same series as /gpu-trends with a trailing moving average applied.
/// The window shrinks at the start of the range, so early points
/// average over fewer days.
///
/// # Query Parameters
/// - `gpuId`: numeric GPU model id (required)
/// - `days`: trailing window in days (default: 30)
/// - `window`: moving average width in days (default: 7)
pub async fn gpu_trends_smoothed(
    State(state): State<AppState>,
    Query(query): Query<SmoothedTrendQuery>,
) -> Result<Json<SmoothedTrendsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(gpu_model_id) = query.parsed_gpu_id() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing or invalid gpuId")),
        ));
    };
    let window = query.parsed_window().unwrap_or(DEFAULT_SMOOTHING_WINDOW);

    let points = trend_aggregator::daily_trend(&state.db, gpu_model_id, query.parsed_days())
        .await
        .map_err(|e| {
            error!(error = %e, gpu_model_id, "Database error computing smoothed trend");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Database error: {}", e))),
            )
        })?;

    let smoothed = moving_average::compute_moving_average(&points, window);

    info!(
        gpu_model_id,
        window,
        points = smoothed.len(),
        "Smoothed trend query completed"
    );

    let data = smoothed
        .iter()
        .map(|p| MovingAveragePointDto {
            day: p.day,
            moving_average: p.moving_average.to_f64().unwrap_or(0.0),
            provider_count: p.provider_count,
        })
        .collect();

    Ok(Json(SmoothedTrendsResponse {
        window: window.max(1),
        data,
    }))
}
