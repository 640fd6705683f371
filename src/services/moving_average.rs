//! Trailing moving average over daily trend points.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::services::trend_aggregator::TrendPoint;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct MovingAveragePoint {
    pub day: NaiveDate,
    /// Mean of the day's average and up to window-1 preceding ones,
    /// rounded to 4 decimal places
    pub moving_average: Decimal,
    /// Passed through from the underlying day, not smoothed
    pub provider_count: usize,
}

/// Smooth a daily trend with a trailing window. The window only looks
/// backwards and shrinks at the start of the series, so the output has
/// exactly one point per input point. A window below 1 is treated as 1.
pub fn compute_moving_average(points: &[TrendPoint], window_size: usize) -> Vec<MovingAveragePoint> {
    let window = window_size.max(1);

    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let start = (index + 1).saturating_sub(window);
            let slice = &points[start..=index];
            let sum: Decimal = slice.iter().map(|p| p.avg_price_per_hour).sum();
            let mean = sum / Decimal::from(slice.len() as u64);

            MovingAveragePoint {
                day: point.day,
                moving_average: mean
                    .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
                provider_count: point.provider_count,
            }
        })
        .collect()
}
