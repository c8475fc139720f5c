use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::config::{DashboardSettings, DbConfig};
use crate::error::DashboardError;
use crate::models::ReviewDailySummary;

/// Source of daily review aggregates.
#[allow(async_fn_in_trait)]
pub trait ReviewStore {
    async fn fetch_daily_summaries(
        &self,
        settings: &DashboardSettings,
    ) -> Result<Vec<ReviewDailySummary>, DashboardError>;
}

pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub async fn connect(config: &DbConfig) -> Result<Self, DashboardError> {
        tracing::info!(url = %config.redacted_url(), "connecting to review store");
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(config.connect_options())
            .await
            .map_err(DashboardError::Connectivity)?;
        Ok(PgReviewStore { pool })
    }
}

const DAILY_SUMMARY_SQL: &str = r#"
    SELECT
        DATE(revs.datetime) AS review_date,
        rests.location_city,
        COUNT(*) AS n_reviews,
        AVG(revs.rating_delivery)::double precision AS avg_del_score,
        AVG(revs.rating_food)::double precision AS avg_food_score
    FROM reviews revs
    LEFT JOIN restaurants rests
        ON revs.restaurant_id = rests.restaurant_id
    WHERE revs.datetime >= $1
      AND revs.datetime < $2
      AND rests.location_city = ANY($3)
    GROUP BY DATE(revs.datetime), rests.location_city
"#;

impl ReviewStore for PgReviewStore {
    async fn fetch_daily_summaries(
        &self,
        settings: &DashboardSettings,
    ) -> Result<Vec<ReviewDailySummary>, DashboardError> {
        let rows = sqlx::query(DAILY_SUMMARY_SQL)
            .bind(settings.window.start)
            .bind(settings.window.end_exclusive)
            .bind(&settings.cities)
            .fetch_all(&self.pool)
            .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            summaries.push(ReviewDailySummary {
                review_date: row.try_get("review_date")?,
                location_city: row.try_get("location_city")?,
                n_reviews: row.try_get("n_reviews")?,
                avg_del_score: row.try_get("avg_del_score")?,
                avg_food_score: row.try_get("avg_food_score")?,
            });
        }

        tracing::info!(rows = summaries.len(), "fetched daily summaries");
        Ok(summaries)
    }
}
