//! Service rating aggregate

use serde::Serialize;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Mean and count of a service's approved review ratings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Rounded to two decimals; 0 when there are no reviews
    pub average_rating: f64,
    pub total_reviews: i64,
}

impl RatingSummary {
    /// From the sum and count of approved ratings
    pub fn from_totals(sum: i64, count: i64) -> Self {
        if count <= 0 {
            return Self::default();
        }
        Self {
            average_rating: round2(sum as f64 / count as f64),
            total_reviews: count,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
