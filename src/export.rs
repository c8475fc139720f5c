use std::io::Write;

use crate::error::DashboardError;
use crate::models::ReviewDailySummary;

const HEADER: [&str; 5] = [
    "review_date",
    "location_city",
    "n_reviews",
    "avg_del_score",
    "avg_food_score",
];

/// Writes summary rows as CSV. Undefined averages become empty fields.
/// The header is written even when there are no rows.
pub fn write_csv<W: Write>(
    writer: W,
    rows: &[ReviewDailySummary],
) -> Result<usize, DashboardError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(rows.len())
}
