//! Shared report pipeline used by every subcommand.
//!
//! filter -> aggregate -> chart adaptation, run against one snapshot.

use serde::Serialize;

use crate::domain::{CategoryScope, FilterSet, SalesRecord};
use crate::filter::{self, FilterOptions};
use crate::forecast::{self, ForecastReport, TrendSeries};
use crate::report::{Aggregates, DashboardCharts, aggregate};

/// All computed outputs for one filtered view.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub filters: FilterSet,
    pub total_rows: usize,
    pub view_rows: usize,
    pub aggregates: Aggregates,
    pub charts: DashboardCharts,
    pub options: FilterOptions,
    #[serde(skip)]
    pub view: Vec<SalesRecord>,
}

pub fn run_report(records: &[SalesRecord], filters: &FilterSet, top_n: usize, recent_n: usize) -> ReportOutput {
    let view = filter::apply(records, filters);
    let aggregates = aggregate(&view, filters, top_n, recent_n);
    let charts = DashboardCharts::from_aggregates(&aggregates);

    tracing::debug!(
        filters = %filters,
        total = records.len(),
        view = view.len(),
        "report computed"
    );

    ReportOutput {
        filters: filters.clone(),
        total_rows: records.len(),
        view_rows: view.len(),
        aggregates,
        charts,
        options: FilterOptions::from_records(records),
        view,
    }
}

/// Forecast over the full snapshot; `category` narrows the scope.
pub fn run_forecast(records: &[SalesRecord], target_year: i32, category: Option<&str>) -> ForecastReport {
    forecast::project(records, target_year, &CategoryScope::from_option(category))
}

pub fn run_trend(records: &[SalesRecord], year: i32, category: Option<&str>) -> Option<TrendSeries> {
    forecast::monthly_trend(records, year, category)
}
