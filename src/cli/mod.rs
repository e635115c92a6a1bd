//! Command-line parsing for the sales dashboard.
//!
//! Argument parsing stays here; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DataSource, FilterSet};
use crate::report::{DEFAULT_RECENT_N, DEFAULT_TOP_N};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales dashboard: summaries, breakdowns and linear forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the dashboard for a (filtered) view. This is the default.
    Summary(SummaryArgs),
    /// List the values available to each filter.
    Options(OptionsArgs),
    /// Project profit and revenue at the end of a year.
    Forecast(ForecastArgs),
    /// Monthly profit/revenue for a year, observed or projected.
    Trend(TrendArgs),
    /// Write a synthetic sales dataset.
    Sample(SampleArgs),
}

/// Where the dataset is read from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Sales CSV file.
    #[arg(long, env = "SALES_CSV", default_value = "ventas.csv")]
    pub file: PathBuf,

    /// Fetch the CSV from a URL instead of a file.
    #[arg(long, env = "SALES_URL")]
    pub url: Option<String>,

    /// Field delimiter (single ASCII character, or "tab").
    #[arg(long, env = "SALES_DELIMITER", default_value = ";", value_parser = parse_delimiter)]
    pub delimiter: u8,
}

impl SourceArgs {
    pub fn data_source(&self) -> DataSource {
        match self.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => DataSource::Url(url.to_string()),
            None => DataSource::Path(self.file.clone()),
        }
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// Category substring (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    pub year: Option<i32>,

    /// Month number, 1-12.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Payment method (exact match).
    #[arg(long)]
    pub payment: Option<String>,
}

impl FilterArgs {
    pub fn filter_set(&self) -> FilterSet {
        FilterSet {
            category: self.category.clone(),
            year: self.year,
            month: self.month,
            payment_method: self.payment.clone(),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Number of best-selling products to list.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Number of most recent sales to list.
    #[arg(long, default_value_t = DEFAULT_RECENT_N)]
    pub recent: usize,

    /// Render ASCII charts.
    #[arg(long)]
    pub plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Export aggregates and charts to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Export the filtered rows to CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Target year; the projection is evaluated at its December 31.
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    pub year: i32,

    /// Forecast one category (exact name, case-insensitive). Default: all.
    #[arg(long)]
    pub category: Option<String>,

    /// Export the forecast to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TrendArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    pub year: i32,

    /// Category substring (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,

    /// Render an ASCII line chart.
    #[arg(long)]
    pub plot: bool,

    #[arg(long, default_value_t = 60)]
    pub width: usize,

    #[arg(long, default_value_t = 15)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 500)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long = "start-year", default_value_t = 2023)]
    pub start_year: i32,

    /// Number of years covered.
    #[arg(long, default_value_t = 2)]
    pub years: u32,
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    if raw.eq_ignore_ascii_case("tab") || raw == "\\t" {
        return Ok(b'\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(format!("delimiter must be a single ASCII character, got '{raw}'")),
    }
}
