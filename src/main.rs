use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod chart;
mod config;
mod db;
mod error;
mod export;
mod models;
mod pipeline;
mod report;

use config::{DashboardSettings, DbConfig};
use db::PgReviewStore;
use models::{DateRange, DerivedViews};
use pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "review-dashboard")]
#[command(about = "Daily restaurant review dashboard per city", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the reviews-per-city bar chart and delivery rating line chart as SVG
    Render {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,
    },
    /// Print average reviews per day for each city
    Summary {
        #[command(flatten)]
        range: RangeArgs,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the filtered daily summaries as CSV
    Export {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value = "daily_summaries.csv")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_picker_date, default_value = "2022-01-01")]
    start: NaiveDate,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_picker_date, default_value = "2023-01-31")]
    end: NaiveDate,
}

impl RangeArgs {
    fn to_range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }
}

fn parse_picker_date(value: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))?;
    let bounds = DashboardSettings::standard()
        .map_err(|err| err.to_string())?
        .picker_bounds;
    if !bounds.contains(date) {
        return Err(format!(
            "date must lie between {} and {}",
            bounds.start, bounds.end
        ));
    }
    Ok(date)
}

fn summary_json(views: &DerivedViews) -> serde_json::Value {
    serde_json::json!({
        "reviews_per_city": views.reviews_per_city,
        "delivery_series": views.delivery_series,
    })
}

fn write_output(path: &Path, contents: String) -> anyhow::Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "file written");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_config = DbConfig::from_env().context("review store configuration is incomplete")?;
    let settings = DashboardSettings::standard()?;

    let store = PgReviewStore::connect(&db_config)
        .await
        .context("failed to connect to Postgres")?;
    let pipeline = Pipeline::new(store, settings);

    match cli.command {
        Commands::Render { range, out_dir } => {
            let views = pipeline.run(range.to_range()).await?;
            let bar = chart::reviews_per_city_svg(&views.reviews_per_city)?;
            let line = chart::delivery_scores_svg(&views.delivery_series)?;

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            let bar_path = out_dir.join("reviews_per_city.svg");
            let line_path = out_dir.join("delivery_scores.svg");
            write_output(&bar_path, bar)?;
            write_output(&line_path, line)?;
            println!(
                "Charts written to {} and {}.",
                bar_path.display(),
                line_path.display()
            );
        }
        Commands::Summary { range, json } => {
            let views = pipeline.run(range.to_range()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary_json(&views))?);
                return Ok(());
            }

            if views.reviews_per_city.is_empty() {
                println!("No reviews found for this range.");
                return Ok(());
            }

            println!("Average reviews per day ({} to {}):", range.start, range.end);
            for (city, avg) in views.reviews_per_city.iter() {
                let points = views
                    .delivery_series
                    .iter()
                    .filter(|point| &point.location_city == city)
                    .count();
                println!("- {city}: {avg:.2} across {points} days");
            }
        }
        Commands::Report { range, out } => {
            let views = pipeline.run(range.to_range()).await?;
            let report = report::build_report(range.to_range(), &views);
            write_output(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { range, out } => {
            let views = pipeline.run(range.to_range()).await?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let written = export::write_csv(file, &views.filtered)?;
            tracing::info!(path = %out.display(), rows = written, "export written");
            println!("Exported {written} rows to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_accepts_dates_inside_bounds() {
        assert_eq!(
            parse_picker_date("2022-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert!(parse_picker_date("2023-01-31").is_ok());
    }

    #[test]
    fn picker_rejects_dates_outside_bounds() {
        assert!(parse_picker_date("2021-12-31").is_err());
        assert!(parse_picker_date("2023-02-01").is_err());
        assert!(parse_picker_date("31-01-2023").is_err());
    }

    #[test]
    fn inverted_range_is_accepted_by_the_parser() {
        let cli = Cli::try_parse_from([
            "review-dashboard",
            "summary",
            "--start",
            "2022-06-01",
            "--end",
            "2022-01-01",
        ])
        .unwrap();

        match cli.command {
            Commands::Summary { range, json } => {
                assert!(!json);
                assert!(range.start > range.end);
            }
            _ => panic!("expected summary command"),
        }
    }

    #[test]
    fn write_failures_name_the_target_file() {
        let target = std::env::temp_dir()
            .join("review-dashboard-missing-dir")
            .join("report.md");
        let err = write_output(&target, "# report".to_string()).unwrap_err();

        assert!(err.to_string().starts_with("failed to write"));
        assert!(err.to_string().contains("report.md"));
    }

    #[test]
    fn writes_output_file() {
        let target = std::env::temp_dir().join(format!(
            "review-dashboard-{}-report.md",
            std::process::id()
        ));
        write_output(&target, "# report".to_string()).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# report");
        std::fs::remove_file(&target).unwrap();
    }

    #[test]
    fn json_summary_carries_both_views() {
        let day = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let rows = vec![models::ReviewDailySummary {
            review_date: day,
            location_city: "Amsterdam".to_string(),
            n_reviews: 10,
            avg_del_score: None,
            avg_food_score: Some(4.0),
        }];
        let views = pipeline::derive_views(&rows, DateRange { start: day, end: day });

        let value = summary_json(&views);
        assert_eq!(value["reviews_per_city"]["Amsterdam"], 10.0);
        assert_eq!(value["delivery_series"][0]["review_date"], "2022-01-01");
        assert_eq!(value["delivery_series"][0]["location_city"], "Amsterdam");
        assert!(value["delivery_series"][0]["avg_del_score"].is_null());
    }
}
