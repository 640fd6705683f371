mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;

use gpumarket_backend::entities::prices;

use crate::common::{build_router, test_state};

fn reading(id: i64, provider_id: i32, timestamp: &str, price: Decimal) -> prices::Model {
    prices::Model {
        id,
        provider_id,
        gpu_model_id: 1,
        price_per_hour: price,
        source_url: None,
        created_at: timestamp.parse().unwrap(),
    }
}

#[tokio::test]
async fn test_gpu_trends_requires_gpu_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_router(test_state(db));

    for uri in ["/gpu-trends", "/gpu-trends?gpuId=h100"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Missing or invalid gpuId");
    }
}

#[tokio::test]
async fn test_gpu_trends_averages_across_providers() {
    // three providers reported on the same day
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            reading(1, 1, "2026-08-20T06:00:00", dec!(1.00)),
            reading(2, 2, "2026-08-20T07:30:00", dec!(2.00)),
            reading(3, 3, "2026-08-20T09:00:00", dec!(3.00)),
        ]])
        .into_connection();
    let app = build_router(test_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpu-trends?gpuId=1&days=30")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["day"], "2026-08-20");
    assert_eq!(data[0]["avgPricePerHour"], 2.0);
    assert_eq!(data[0]["providerCount"], 3);
}

#[tokio::test]
async fn test_gpu_trends_tolerates_unparseable_days() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![reading(1, 1, "2026-08-20T06:00:00", dec!(0.75))]])
        .into_connection();
    let app = build_router(test_state(db));

    // garbage "days" falls back to the default window instead of failing
    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpu-trends?gpuId=1&days=banana")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_gpu_trends_unknown_gpu_yields_empty_data() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<prices::Model>::new()])
        .into_connection();
    let app = build_router(test_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpu-trends?gpuId=9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_smoothed_trend_applies_trailing_window() {
    // one provider, four consecutive days: 1, 3, 5, 7
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            reading(1, 1, "2026-08-17T08:00:00", dec!(1.00)),
            reading(2, 1, "2026-08-18T08:00:00", dec!(3.00)),
            reading(3, 1, "2026-08-19T08:00:00", dec!(5.00)),
            reading(4, 1, "2026-08-20T08:00:00", dec!(7.00)),
        ]])
        .into_connection();
    let app = build_router(test_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpu-trends/smoothed?gpuId=1&days=10&window=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["window"], 2);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 4);

    // first point averages only itself, the rest average two days
    let averages: Vec<f64> = data
        .iter()
        .map(|p| p["movingAverage"].as_f64().unwrap())
        .collect();
    assert_eq!(averages, vec![1.0, 2.0, 4.0, 6.0]);
    assert_eq!(data[3]["day"], "2026-08-20");
    assert_eq!(data[3]["providerCount"], 1);
}

#[tokio::test]
async fn test_smoothed_trend_defaults_window_to_seven() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<prices::Model>::new()])
        .into_connection();
    let app = build_router(test_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gpu-trends/smoothed?gpuId=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["window"], 7);
    assert_eq!(json["data"], serde_json::json!([]));
}
