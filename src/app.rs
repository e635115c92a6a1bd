//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - loads the dataset into a session
//! - runs the report/forecast pipeline
//! - prints text and plots, and writes optional exports

use clap::Parser;

use crate::cli::{Command, ForecastArgs, OptionsArgs, SampleArgs, SummaryArgs, TrendArgs};
use crate::data::{SampleConfig, generate_records};
use crate::domain::ReportConfig;
use crate::error::AppError;
use crate::filter::FilterOptions;
use crate::io::export::{write_json, write_records_csv};
use crate::io::ingest::{DEFAULT_DELIMITER, IngestOptions};
use crate::plot::{render_bar_chart, render_line_chart};
use crate::report::{self, ChartSeries};

pub mod pipeline;
pub mod session;

pub use session::Session;

const LINE_CHART_HEIGHT: usize = 12;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` must be loaded before clap reads `env = ...` defaults.
    dotenvy::dotenv().ok();
    crate::logging::init_tracing();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Options(args) => handle_options(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Trend(args) => handle_trend(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args);
    let mut session = Session::open(
        config.source.clone(),
        IngestOptions {
            delimiter: config.delimiter,
        },
    )?;
    session.set_filters(config.filters.clone());

    let snapshot = session.snapshot();
    let out = pipeline::run_report(&snapshot, session.filters(), config.top_n, config.recent_n);

    println!(
        "{}",
        report::format_header(&config.source.to_string(), &out.filters, out.total_rows, out.view_rows)
    );
    println!("{}", report::format_dashboard(&out.aggregates));

    if config.plot {
        let charts = &out.charts;
        let breakdown_title = charts
            .breakdown
            .series
            .first()
            .map(|s| s.name.as_str())
            .unwrap_or("Breakdown");
        println!("{}", render_bar_chart(breakdown_title, &charts.breakdown, config.plot_width));
        println!("{}", render_bar_chart("Top products (quantity)", &charts.top_products, config.plot_width));
        println!(
            "{}",
            render_line_chart("Monthly revenue", &charts.monthly_revenue, config.plot_width, LINE_CHART_HEIGHT)
        );
        println!(
            "{}",
            render_line_chart(
                "Revenue by payment method",
                &charts.payment_by_month,
                config.plot_width,
                LINE_CHART_HEIGHT
            )
        );
    }

    if let Some(path) = &config.export_json {
        write_json(path, &out)?;
    }
    if let Some(path) = &config.export_csv {
        write_records_csv(path, &out.view, DEFAULT_DELIMITER)?;
    }

    Ok(())
}

fn handle_options(args: OptionsArgs) -> Result<(), AppError> {
    let session = Session::open(
        args.source.data_source(),
        IngestOptions {
            delimiter: args.source.delimiter,
        },
    )?;
    let options = FilterOptions::from_records(session.records());
    println!("{}", report::format_options(&options));
    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let session = Session::open(
        args.source.data_source(),
        IngestOptions {
            delimiter: args.source.delimiter,
        },
    )?;

    let forecast = pipeline::run_forecast(session.records(), args.year, args.category.as_deref());
    if forecast.categories.is_empty() {
        return Err(AppError::InsufficientData(
            "no categorized sales to forecast".to_string(),
        ));
    }

    println!("{}", report::format_forecast(&forecast));

    if let Some(path) = &args.export_json {
        write_json(path, &forecast)?;
    }
    Ok(())
}

fn handle_trend(args: TrendArgs) -> Result<(), AppError> {
    let session = Session::open(
        args.source.data_source(),
        IngestOptions {
            delimiter: args.source.delimiter,
        },
    )?;

    let trend = pipeline::run_trend(session.records(), args.year, args.category.as_deref()).ok_or_else(|| {
        AppError::InsufficientData(format!(
            "no sales in {} and fewer than two months of history to project from",
            args.year
        ))
    })?;

    println!("{}", report::format_trend(&trend));
    if args.plot {
        let chart = ChartSeries::trend(&trend);
        println!(
            "{}",
            render_line_chart(&format!("Trend {}", trend.year), &chart, args.width, args.height)
        );
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        rows: args.rows,
        seed: args.seed,
        start_year: args.start_year,
        years: args.years,
    };
    let records = generate_records(&config)?;
    write_records_csv(&args.out, &records, DEFAULT_DELIMITER)?;
    println!("Wrote {} sample rows to {}", records.len(), args.out.display());
    Ok(())
}

pub fn report_config_from_args(args: &SummaryArgs) -> ReportConfig {
    ReportConfig {
        source: args.source.data_source(),
        delimiter: args.source.delimiter,
        filters: args.filters.filter_set(),
        top_n: args.top,
        recent_n: args.recent,
        plot: args.plot,
        plot_width: args.width,
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
    }
}

/// Rewrite argv so `sales` defaults to `sales summary`.
///
/// Rules:
/// - `sales`                        -> `sales summary`
/// - `sales --year 2024 ...`        -> `sales summary --year 2024 ...`
/// - `sales --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("summary".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "options" | "forecast" | "trend" | "sample");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "summary".to_string());
        return argv;
    }

    argv
}
