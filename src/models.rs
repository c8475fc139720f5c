use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// One aggregate row per (city, calendar date) from the review store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDailySummary {
    pub review_date: NaiveDate,
    pub location_city: String,
    pub n_reviews: i64,
    pub avg_del_score: Option<f64>,
    pub avg_food_score: Option<f64>,
}

/// Half-open window baked into the aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: NaiveDate,
    pub end_exclusive: NaiveDate,
}

/// Inclusive range chosen by the caller. An inverted range contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryPoint {
    pub review_date: NaiveDate,
    pub location_city: String,
    pub avg_del_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedViews {
    pub filtered: Vec<ReviewDailySummary>,
    pub reviews_per_city: BTreeMap<String, f64>,
    pub delivery_series: Vec<DeliveryPoint>,
}
