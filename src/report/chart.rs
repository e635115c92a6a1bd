//! Chart-ready series for a presentation layer.
//!
//! A chart is a shared label axis plus one or more named value series of the
//! same length. No colors, no number formatting.

use serde::Serialize;

use crate::domain::MONTH_LABELS;
use crate::forecast::TrendSeries;
use crate::report::{Aggregates, BreakdownKey, GroupTotal, PaymentMonthly};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.iter().all(|s| s.values.is_empty())
    }

    /// Single series keyed by group.
    pub fn from_groups(name: &str, groups: &[GroupTotal]) -> Self {
        Self {
            labels: groups.iter().map(|g| g.key.clone()).collect(),
            series: vec![NamedSeries {
                name: name.to_string(),
                values: groups.iter().map(|g| g.value).collect(),
            }],
        }
    }

    /// Single series over the twelve calendar months.
    pub fn monthly(name: &str, values: &[f64; 12]) -> Self {
        Self {
            labels: month_labels(),
            series: vec![NamedSeries {
                name: name.to_string(),
                values: values.to_vec(),
            }],
        }
    }

    /// One series per payment method over the twelve calendar months.
    pub fn payment_by_month(rows: &[PaymentMonthly]) -> Self {
        Self {
            labels: month_labels(),
            series: rows
                .iter()
                .map(|row| NamedSeries {
                    name: row.payment_method.clone(),
                    values: row.months.to_vec(),
                })
                .collect(),
        }
    }

    /// Profit and revenue series for a yearly trend.
    pub fn trend(trend: &TrendSeries) -> Self {
        Self {
            labels: month_labels(),
            series: vec![
                NamedSeries {
                    name: "profit".to_string(),
                    values: trend.profit.to_vec(),
                },
                NamedSeries {
                    name: "total".to_string(),
                    values: trend.total.to_vec(),
                },
            ],
        }
    }
}

fn month_labels() -> Vec<String> {
    MONTH_LABELS.iter().map(|m| m.to_string()).collect()
}

/// The four dashboard charts for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub breakdown: ChartSeries,
    pub payment_by_month: ChartSeries,
    pub monthly_revenue: ChartSeries,
    pub top_products: ChartSeries,
}

impl DashboardCharts {
    pub fn from_aggregates(aggregates: &Aggregates) -> Self {
        let breakdown_name = match aggregates.breakdown.key {
            BreakdownKey::Category => "revenue by category",
            BreakdownKey::Product => "revenue by product",
        };
        Self {
            breakdown: ChartSeries::from_groups(breakdown_name, &aggregates.breakdown.groups),
            payment_by_month: ChartSeries::payment_by_month(&aggregates.payment_by_month),
            monthly_revenue: ChartSeries::monthly("monthly revenue", &aggregates.monthly_revenue),
            top_products: ChartSeries::from_groups("quantity sold", &aggregates.top_products),
        }
    }
}
