//! Trend endpoint request/response models
//!
//! Models for GET /gpu-trends and GET /gpu-trends/smoothed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query parameters for the daily trend endpoint. Numeric fields arrive
/// as strings so malformed values can degrade to defaults instead of a
/// framework-level rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendQuery {
    #[serde(rename = "gpuId")]
    pub gpu_id: Option<String>,
    pub days: Option<String>,
}

impl TrendQuery {
    pub fn parsed_gpu_id(&self) -> Option<i32> {
        self.gpu_id.as_deref().and_then(|v| v.trim().parse().ok())
    }

    /// None for absent or non-numeric input; range coercion happens in
    /// the aggregator.
    pub fn parsed_days(&self) -> Option<i64> {
        self.days.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// Query parameters for the smoothed trend endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmoothedTrendQuery {
    #[serde(rename = "gpuId")]
    pub gpu_id: Option<String>,
    pub days: Option<String>,
    pub window: Option<String>,
}

impl SmoothedTrendQuery {
    pub fn parsed_gpu_id(&self) -> Option<i32> {
        self.gpu_id.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn parsed_days(&self) -> Option<i64> {
        self.days.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn parsed_window(&self) -> Option<usize> {
        self.window.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPointDto {
    /// UTC day in YYYY-MM-DD form
    pub day: NaiveDate,
    pub avg_price_per_hour: f64,
    pub provider_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsResponse {
    pub data: Vec<TrendPointDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingAveragePointDto {
    pub day: NaiveDate,
    pub moving_average: f64,
    pub provider_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedTrendsResponse {
    pub window: usize,
    pub data: Vec<MovingAveragePointDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing_tolerates_garbage() {
        let query = TrendQuery {
            gpu_id: Some("12".to_string()),
            days: Some("abc".to_string()),
        };
        assert_eq!(query.parsed_gpu_id(), Some(12));
        assert_eq!(query.parsed_days(), None);

        let query = TrendQuery {
            gpu_id: Some("not-a-number".to_string()),
            days: Some(" 14 ".to_string()),
        };
        assert_eq!(query.parsed_gpu_id(), None);
        assert_eq!(query.parsed_days(), Some(14));

        assert_eq!(TrendQuery::default().parsed_gpu_id(), None);
    }

    #[test]
    fn test_trend_point_serializes_camel_case() {
        let dto = TrendPointDto {
            day: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            avg_price_per_hour: 2.49,
            provider_count: 3,
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["day"], "2026-08-20");
        assert_eq!(json["avgPricePerHour"], 2.49);
        assert_eq!(json["providerCount"], 3);
    }

    #[test]
    fn test_smoothed_point_serializes_camel_case() {
        let dto = MovingAveragePointDto {
            day: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            moving_average: 2.5133,
            provider_count: 2,
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["movingAverage"], 2.5133);
        assert_eq!(json["providerCount"], 2);
    }
}
