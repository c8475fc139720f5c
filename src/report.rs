use std::collections::BTreeMap;
use std::fmt::Write;

use crate::models::{DateRange, DeliveryPoint, DerivedViews};
use crate::pipeline;

pub fn build_report(range: DateRange, views: &DerivedViews) -> String {
    let food_scores = pipeline::average_food_score_per_city(&views.filtered);

    let mut output = String::new();

    let _ = writeln!(output, "# Restaurant Review Dashboard");
    let _ = writeln!(
        output,
        "Reviews from {} through {} ({} city-days)",
        range.start,
        range.end,
        views.filtered.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Average Reviews per Day");

    if views.reviews_per_city.is_empty() {
        let _ = writeln!(output, "No reviews recorded for this range.");
    } else {
        let _ = writeln!(output, "| City | Reviews / day | Avg food score |");
        let _ = writeln!(output, "|---|---|---|");
        for (city, avg_reviews) in views.reviews_per_city.iter() {
            let food = food_scores
                .get(city)
                .map(|score| format!("{score:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(output, "| {} | {:.2} | {} |", city, avg_reviews, food);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Delivery Rating over Time");

    let by_city = series_by_city(&views.delivery_series);
    if by_city.is_empty() {
        let _ = writeln!(output, "No delivery ratings recorded for this range.");
    } else {
        for (city, points) in by_city {
            let _ = writeln!(output);
            let _ = writeln!(output, "### {city}");
            for point in points {
                match point.avg_del_score {
                    Some(score) => {
                        let _ = writeln!(output, "- {}: {:.2}", point.review_date, score);
                    }
                    None => {
                        let _ = writeln!(output, "- {}: no rating", point.review_date);
                    }
                }
            }
        }
    }

    output
}

fn series_by_city(series: &[DeliveryPoint]) -> BTreeMap<&str, Vec<&DeliveryPoint>> {
    let mut map: BTreeMap<&str, Vec<&DeliveryPoint>> = BTreeMap::new();
    for point in series {
        map.entry(point.location_city.as_str()).or_default().push(point);
    }
    for points in map.values_mut() {
        points.sort_by_key(|point| point.review_date);
    }
    map
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::ReviewDailySummary;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, d).unwrap()
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange {
            start: date(start),
            end: date(end),
        }
    }

    fn rows() -> Vec<ReviewDailySummary> {
        vec![
            ReviewDailySummary {
                review_date: date(2),
                location_city: "Amsterdam".to_string(),
                n_reviews: 20,
                avg_del_score: Some(3.5),
                avg_food_score: Some(4.0),
            },
            ReviewDailySummary {
                review_date: date(1),
                location_city: "Amsterdam".to_string(),
                n_reviews: 10,
                avg_del_score: Some(4.5),
                avg_food_score: Some(4.0),
            },
            ReviewDailySummary {
                review_date: date(1),
                location_city: "Groningen".to_string(),
                n_reviews: 2,
                avg_del_score: None,
                avg_food_score: None,
            },
        ]
    }

    #[test]
    fn report_lists_averages_and_series() {
        let views = pipeline::derive_views(&rows(), range(1, 2));
        let report = build_report(range(1, 2), &views);

        assert!(report.contains("Reviews from 2022-01-01 through 2022-01-02 (3 city-days)"));
        assert!(report.contains("| Amsterdam | 15.00 | 4.00 |"));
        assert!(report.contains("| Groningen | 2.00 | n/a |"));
        assert!(report.contains("- 2022-01-01: no rating"));

        let first = report.find("- 2022-01-01: 4.50").unwrap();
        let second = report.find("- 2022-01-02: 3.50").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_range_reports_no_data() {
        let views = pipeline::derive_views(&rows(), range(2, 1));
        let report = build_report(range(2, 1), &views);

        assert!(report.contains("No reviews recorded for this range."));
        assert!(report.contains("No delivery ratings recorded for this range."));
    }
}
