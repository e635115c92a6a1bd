//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the filter, aggregation and forecast stages
//! - exported to JSON/CSV
//! - handed to a presentation layer without further conversion

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Payment method assigned to rows whose `Pago` column is missing or blank.
pub const DEFAULT_PAYMENT_METHOD: &str = "Other";

/// Short month labels, index 0 = January.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One parsed row of the sales dataset.
///
/// Amount fields are always numeric: missing or non-numeric input coerces to `0`
/// (see `io::ingest` for the full set of defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// 1-based line in the source file (header is line 1).
    pub line: usize,
    pub product: String,
    pub category: String,
    /// `None` when the `Fecha` cell was missing or not a valid `DD/MM/YYYY` date.
    pub date: Option<NaiveDate>,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    /// Revenue for the row.
    pub total: f64,
    pub cost: f64,
    pub payment_method: String,
}

impl SalesRecord {
    pub fn profit(&self) -> f64 {
        self.total - self.cost
    }

    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }

    /// The record's date floored to the first day of its month.
    pub fn month_start(&self) -> Option<NaiveDate> {
        self.date.and_then(|d| d.with_day(1))
    }
}

/// Active view filter. Every field is optional; `None` (or a blank string)
/// means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Case-insensitive substring matched against `category`.
    pub category: Option<String>,
    pub year: Option<i32>,
    /// Calendar month, 1-12.
    pub month: Option<u32>,
    /// Exact, case-sensitive match against `payment_method`.
    pub payment_method: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    /// The category term, if a non-blank one is set.
    pub fn category_term(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    /// The payment method term, if a non-blank one is set.
    pub fn payment_term(&self) -> Option<&str> {
        non_blank(self.payment_method.as_deref())
    }

    pub fn has_date_constraint(&self) -> bool {
        self.year.is_some() || self.month.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.category_term().is_none() && !self.has_date_constraint() && self.payment_term().is_none()
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut parts = Vec::new();
        if let Some(c) = self.category_term() {
            parts.push(format!("category~{c}"));
        }
        if let Some(y) = self.year {
            parts.push(format!("year={y}"));
        }
        if let Some(m) = self.month {
            parts.push(format!("month={m:02}"));
        }
        if let Some(p) = self.payment_term() {
            parts.push(format!("payment={p}"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Aggregated profit/revenue for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub profit_sum: f64,
    pub total_sum: f64,
}

impl MonthlyBucket {
    pub fn month_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Ordinary-least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionModel {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// A forecast at a target date. `None` means "not computable", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub profit: Option<f64>,
    pub total: Option<f64>,
    pub margin_pct: Option<f64>,
    pub increment_pct: Option<f64>,
}

impl Projection {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.profit.is_some() && self.total.is_some()
    }
}

/// Which categories a forecast covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryScope {
    All,
    Category(String),
}

impl CategoryScope {
    /// `None`/blank maps to `All`.
    pub fn from_option(category: Option<&str>) -> Self {
        match non_blank(category) {
            Some(c) => CategoryScope::Category(c.trim().to_string()),
            None => CategoryScope::All,
        }
    }
}

/// Where raw sales text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => write!(f, "{u}"),
        }
    }
}

/// A full `sales summary` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub source: DataSource,
    pub delimiter: u8,
    pub filters: FilterSet,
    pub top_n: usize,
    pub recent_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}
