//! Daily price trend aggregation.
//!
//! Collapses the raw reading history for one GPU into one point per UTC
//! day: the mean over each provider's last reading that day. Days with
//! no readings at all simply don't appear; no values are fabricated.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr};

use crate::entities::prices;
use crate::services::price_repository;

pub const DEFAULT_TREND_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub day: NaiveDate,
    /// Mean over provider-latest readings for the day
    pub avg_price_per_hour: Decimal,
    pub provider_count: usize,
}

/// Zero, negative or absent day counts fall back to the default window.
pub fn effective_days(days: Option<i64>) -> i64 {
    match days {
        Some(d) if d > 0 => d,
        _ => DEFAULT_TREND_DAYS,
    }
}

pub async fn daily_trend(
    db: &DatabaseConnection,
    gpu_model_id: i32,
    days: Option<i64>,
) -> Result<Vec<TrendPoint>, DbErr> {
    let days = effective_days(days);
    let today = chrono::Utc::now().date_naive();
    let from_day = today - chrono::Duration::days(days);

    let rows = price_repository::history_for_gpu(db, gpu_model_id, from_day, today).await?;
    Ok(bucket_daily(&rows))
}

/// Pure aggregation over rows ordered oldest first. Later readings from
/// the same provider on the same day replace earlier ones, so only each
/// provider's closing price enters the mean.
pub fn bucket_daily(rows: &[prices::Model]) -> Vec<TrendPoint> {
    let mut days: BTreeMap<NaiveDate, HashMap<i32, Decimal>> = BTreeMap::new();

    for row in rows {
        days.entry(row.created_at.date())
            .or_default()
            .insert(row.provider_id, row.price_per_hour);
    }

    days.into_iter()
        .map(|(day, by_provider)| {
            let provider_count = by_provider.len();
            let sum: Decimal = by_provider.values().copied().sum();
            TrendPoint {
                day,
                avg_price_per_hour: sum / Decimal::from(provider_count as u64),
                provider_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    fn at(day: &str, time: &str) -> NaiveDateTime {
        format!("{day}T{time}").parse().unwrap()
    }

    fn row(id: i64, provider_id: i32, price: Decimal, ts: NaiveDateTime) -> prices::Model {
        prices::Model {
            id,
            provider_id,
            gpu_model_id: 10,
            price_per_hour: price,
            source_url: None,
            created_at: ts,
        }
    }

    #[test]
    fn test_mean_over_three_providers() {
        let rows = vec![
            row(1, 1, dec!(1.0), at("2026-08-20", "09:00:00")),
            row(2, 2, dec!(2.0), at("2026-08-20", "10:00:00")),
            row(3, 3, dec!(3.0), at("2026-08-20", "11:00:00")),
        ];

        let points = bucket_daily(&rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].avg_price_per_hour, dec!(2.0));
        assert_eq!(points[0].provider_count, 3);
    }

    #[test]
    fn test_last_reading_per_provider_wins_within_a_day() {
        let rows = vec![
            row(1, 1, dec!(4.00), at("2026-08-20", "08:00:00")),
            row(2, 1, dec!(3.50), at("2026-08-20", "18:00:00")),
        ];

        let points = bucket_daily(&rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].avg_price_per_hour, dec!(3.50));
        assert_eq!(points[0].provider_count, 1);
    }

    #[test]
    fn test_days_without_readings_are_omitted() {
        let rows = vec![
            row(1, 1, dec!(1.0), at("2026-08-18", "12:00:00")),
            // nothing on the 19th
            row(2, 1, dec!(1.2), at("2026-08-20", "12:00:00")),
        ];

        let points = bucket_daily(&rows);
        let days: Vec<String> = points.iter().map(|p| p.day.to_string()).collect();
        assert_eq!(days, vec!["2026-08-18", "2026-08-20"]);
    }

    #[test]
    fn test_points_ordered_oldest_first() {
        let rows = vec![
            row(1, 1, dec!(1.0), at("2026-08-20", "12:00:00")),
            row(2, 1, dec!(0.9), at("2026-08-21", "12:00:00")),
            row(3, 1, dec!(0.8), at("2026-08-22", "12:00:00")),
        ];

        let points = bucket_daily(&rows);
        assert!(points.windows(2).all(|w| w[0].day < w[1].day));
    }

    #[test]
    fn test_empty_history() {
        assert!(bucket_daily(&[]).is_empty());
    }

    #[test]
    fn test_effective_days_coercion() {
        assert_eq!(effective_days(Some(84)), 84);
        assert_eq!(effective_days(Some(0)), DEFAULT_TREND_DAYS);
        assert_eq!(effective_days(Some(-5)), DEFAULT_TREND_DAYS);
        assert_eq!(effective_days(None), DEFAULT_TREND_DAYS);
    }
}
