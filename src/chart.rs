use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;

use crate::error::DashboardError;
use crate::models::DeliveryPoint;

const CHART_SIZE: (u32, u32) = (900, 500);

/// Bar chart with one bar per city, height = mean daily review count.
pub fn reviews_per_city_svg(averages: &BTreeMap<String, f64>) -> Result<String, DashboardError> {
    let cities: Vec<&String> = averages.keys().collect();
    let values: Vec<f64> = averages.values().copied().collect();
    let y_max = values.iter().copied().fold(0.0_f64, f64::max).max(1.0) * 1.1;
    let slots = cities.len().max(1);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(DashboardError::render)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Average number of reviews per city per day", ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0..slots).into_segmented(), 0f64..y_max)
            .map_err(DashboardError::render)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("No. of reviews / Day")
            .x_desc("")
            .x_label_formatter(&|segment| match segment {
                SegmentValue::CenterOf(index) => cities
                    .get(*index)
                    .map(|city| city.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(DashboardError::render)?;

        chart
            .draw_series(values.iter().enumerate().map(|(index, value)| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(index), 0.0),
                        (SegmentValue::Exact(index + 1), *value),
                    ],
                    BLUE.mix(0.7).filled(),
                );
                bar.set_margin(0, 0, 20, 20);
                bar
            }))
            .map_err(DashboardError::render)?;

        root.present().map_err(DashboardError::render)?;
    }

    Ok(svg)
}

/// One line per city of average delivery score over time. Days without a
/// defined score are left out of the line. Each day is also marked with a dot.
pub fn delivery_scores_svg(series: &[DeliveryPoint]) -> Result<String, DashboardError> {
    let lines = lines_by_city(series);

    let days: Vec<i32> = lines
        .values()
        .flat_map(|points| points.iter().map(|(day, _)| *day))
        .collect();
    let x_start = days.iter().copied().min().unwrap_or(0);
    let x_end = days.iter().copied().max().unwrap_or(0).max(x_start + 1);

    let scores: Vec<f64> = lines
        .values()
        .flat_map(|points| points.iter().map(|(_, score)| *score))
        .collect();
    let y_start = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let y_end = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (y_start, y_end) = if scores.is_empty() {
        (0.0, 1.0)
    } else {
        ((y_start - 0.25).max(0.0), y_end + 0.25)
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(DashboardError::render)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Average delivery rating per day", ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_start..x_end, y_start..y_end)
            .map_err(DashboardError::render)?;

        chart
            .configure_mesh()
            .x_desc("review_date")
            .y_desc("avg_del_score")
            .x_labels(8)
            .x_label_formatter(&|day| {
                NaiveDate::from_num_days_from_ce_opt(*day)
                    .map(|date| date.to_string())
                    .unwrap_or_default()
            })
            .draw()
            .map_err(DashboardError::render)?;

        for (index, (city, points)) in lines.iter().enumerate() {
            let color = Palette99::pick(index).to_rgba();
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(DashboardError::render)?
                .label(*city)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            // markers keep single-day cities visible
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|point| Circle::new(*point, 3, color.filled())),
                )
                .map_err(DashboardError::render)?;
        }

        if !lines.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperRight)
                .draw()
                .map_err(DashboardError::render)?;
        }

        root.present().map_err(DashboardError::render)?;
    }

    Ok(svg)
}

/// Groups defined scores by city as (day number, score), ordered by date.
fn lines_by_city(series: &[DeliveryPoint]) -> BTreeMap<&str, Vec<(i32, f64)>> {
    let mut lines: BTreeMap<&str, Vec<(i32, f64)>> = BTreeMap::new();
    for point in series {
        if let Some(score) = point.avg_del_score {
            lines
                .entry(point.location_city.as_str())
                .or_default()
                .push((point.review_date.num_days_from_ce(), score));
        }
    }
    for points in lines.values_mut() {
        points.sort_by_key(|(day, _)| *day);
    }
    lines
}
