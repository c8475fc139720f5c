use std::collections::BTreeMap;

use crate::config::DashboardSettings;
use crate::db::ReviewStore;
use crate::error::DashboardError;
use crate::models::{DateRange, DeliveryPoint, DerivedViews, ReviewDailySummary};

pub struct Pipeline<S> {
    store: S,
    settings: DashboardSettings,
}

impl<S: ReviewStore> Pipeline<S> {
    pub fn new(store: S, settings: DashboardSettings) -> Self {
        Pipeline { store, settings }
    }

    pub async fn fetch_daily_summaries(&self) -> Result<Vec<ReviewDailySummary>, DashboardError> {
        self.store.fetch_daily_summaries(&self.settings).await
    }

    /// Fetches the full window and derives both views for `range`.
    pub async fn run(&self, range: DateRange) -> Result<DerivedViews, DashboardError> {
        let summaries = self.fetch_daily_summaries().await?;
        Ok(derive_views(&summaries, range))
    }
}

pub fn filter_by_range(
    summaries: &[ReviewDailySummary],
    range: DateRange,
) -> Vec<ReviewDailySummary> {
    summaries
        .iter()
        .filter(|row| range.contains(row.review_date))
        .cloned()
        .collect()
}

/// Mean of the daily review counts per city over the rows present.
/// Cities without rows are absent from the result.
pub fn average_reviews_per_city(filtered: &[ReviewDailySummary]) -> BTreeMap<String, f64> {
    mean_by_city(filtered.iter().map(|row| (&row.location_city, Some(row.n_reviews as f64))))
}

/// Mean of the defined daily food scores per city.
pub fn average_food_score_per_city(filtered: &[ReviewDailySummary]) -> BTreeMap<String, f64> {
    mean_by_city(filtered.iter().map(|row| (&row.location_city, row.avg_food_score)))
}

pub fn delivery_score_series(filtered: &[ReviewDailySummary]) -> Vec<DeliveryPoint> {
    filtered
        .iter()
        .map(|row| DeliveryPoint {
            review_date: row.review_date,
            location_city: row.location_city.clone(),
            avg_del_score: row.avg_del_score,
        })
        .collect()
}

pub fn derive_views(summaries: &[ReviewDailySummary], range: DateRange) -> DerivedViews {
    let filtered = filter_by_range(summaries, range);
    tracing::debug!(
        start = %range.start,
        end = %range.end,
        kept = filtered.len(),
        total = summaries.len(),
        "filtered summaries"
    );
    let reviews_per_city = average_reviews_per_city(&filtered);
    let delivery_series = delivery_score_series(&filtered);

    DerivedViews {
        filtered,
        reviews_per_city,
        delivery_series,
    }
}

fn mean_by_city<'a, I>(values: I) -> BTreeMap<String, f64>
where
    I: Iterator<Item = (&'a String, Option<f64>)>,
{
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for (city, value) in values {
        let Some(value) = value else {
            continue;
        };
        let entry = totals.entry(city.clone()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(city, (sum, count))| (city, sum / count as f64))
        .collect()
}
