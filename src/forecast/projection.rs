//! Per-category linear projections of monthly profit and revenue.
//!
//! Steps for one category:
//! 1. bucket dated records by `(year, month)`
//! 2. fit one OLS line to `(month_start, profit_sum)` and one to `(month_start, total_sum)`
//! 3. evaluate both at December 31 of the target year, clamping negatives to 0
//! 4. derive margin and the change against the latest observed month
//!
//! Anything that cannot be computed is `None`. A projected `0.0` is a real value.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CategoryScope, MonthlyBucket, Projection, RegressionModel, SalesRecord};
use crate::math::fit_line;

/// Projection for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProjection {
    pub category: String,
    /// Number of observed months the fit used.
    pub months_observed: usize,
    pub projection: Projection,
}

/// Output of `project`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub target_year: i32,
    pub scope: CategoryScope,
    /// For `All`, the sum of the per-category projections.
    pub total: Projection,
    pub categories: Vec<CategoryProjection>,
    /// Categories without enough history to fit a line.
    pub skipped: Vec<String>,
}

/// Fitted lines for the profit and revenue series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesModels {
    pub profit: Option<RegressionModel>,
    pub total: Option<RegressionModel>,
}

/// Project profit/revenue for `target_year`.
///
/// `All` runs an independent fit per category (first-seen order) and sums the
/// available projections; it does not fit one combined line.
pub fn project(records: &[SalesRecord], target_year: i32, scope: &CategoryScope) -> ForecastReport {
    let names: Vec<String> = match scope {
        CategoryScope::Category(name) => vec![name.clone()],
        CategoryScope::All => distinct_categories(records),
    };

    let mut categories = Vec::with_capacity(names.len());
    let mut skipped = Vec::new();

    for name in names {
        let subset: Vec<SalesRecord> = records
            .iter()
            .filter(|r| same_category(&r.category, &name))
            .cloned()
            .collect();
        let buckets = monthly_buckets(&subset);
        let projection = project_buckets(&buckets, target_year);
        if !projection.is_available() {
            tracing::debug!(category = %name, months = buckets.len(), "not enough history to project");
            skipped.push(name.clone());
        }
        categories.push(CategoryProjection {
            category: name,
            months_observed: buckets.len(),
            projection,
        });
    }

    let total = match scope {
        CategoryScope::Category(_) => categories
            .first()
            .map(|c| c.projection)
            .unwrap_or_else(Projection::unavailable),
        CategoryScope::All => {
            let categorized: Vec<SalesRecord> = records
                .iter()
                .filter(|r| !r.category.is_empty())
                .cloned()
                .collect();
            sum_projections(&categories, monthly_buckets(&categorized).last())
        }
    };

    tracing::debug!(
        target_year,
        categories = categories.len(),
        skipped = skipped.len(),
        "forecast complete"
    );

    ForecastReport {
        target_year,
        scope: scope.clone(),
        total,
        categories,
        skipped,
    }
}

/// Project a single bucket series.
pub fn project_buckets(buckets: &[MonthlyBucket], target_year: i32) -> Projection {
    let Some(target_x) = NaiveDate::from_ymd_opt(target_year, 12, 31).map(date_millis) else {
        return Projection::unavailable();
    };

    let models = fit_buckets(buckets);
    let profit = models.profit.map(|m| m.predict(target_x).max(0.0));
    let total = models.total.map(|m| m.predict(target_x).max(0.0));

    Projection {
        profit,
        total,
        margin_pct: margin(profit, total),
        increment_pct: increment(profit, buckets.last()),
    }
}

/// Fit the profit and revenue lines for a bucket series.
pub fn fit_buckets(buckets: &[MonthlyBucket]) -> SeriesModels {
    let (profit, total) = bucket_series(buckets);
    SeriesModels {
        profit: fit_line(&profit),
        total: fit_line(&total),
    }
}

/// `(month_start_millis, profit_sum)` and `(month_start_millis, total_sum)`, ascending.
pub fn bucket_series(buckets: &[MonthlyBucket]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let mut profit = Vec::with_capacity(buckets.len());
    let mut total = Vec::with_capacity(buckets.len());
    for b in buckets {
        let Some(start) = b.month_start() else { continue };
        let x = date_millis(start);
        profit.push((x, b.profit_sum));
        total.push((x, b.total_sum));
    }
    (profit, total)
}

/// Group dated records by calendar month, ascending.
pub fn monthly_buckets(records: &[SalesRecord]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for r in records {
        let (Some(year), Some(month)) = (r.year(), r.month()) else { continue };
        let entry = months.entry((year, month)).or_insert((0.0, 0.0));
        entry.0 += r.profit();
        entry.1 += r.total;
    }
    months
        .into_iter()
        .map(|((year, month), (profit_sum, total_sum))| MonthlyBucket {
            year,
            month,
            profit_sum,
            total_sum,
        })
        .collect()
}

/// Midnight UTC of `date` as epoch milliseconds.
pub fn date_millis(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
        .unwrap_or(f64::NAN)
}

fn margin(profit: Option<f64>, total: Option<f64>) -> Option<f64> {
    match (profit, total) {
        (Some(p), Some(t)) if t > 0.0 => Some(p / t * 100.0),
        _ => None,
    }
}

fn increment(profit: Option<f64>, latest: Option<&MonthlyBucket>) -> Option<f64> {
    let profit = profit?;
    let last = latest?.profit_sum;
    if last > 0.0 {
        Some((profit - last) / last * 100.0)
    } else {
        None
    }
}

fn sum_projections(categories: &[CategoryProjection], latest: Option<&MonthlyBucket>) -> Projection {
    let available: Vec<&Projection> = categories
        .iter()
        .map(|c| &c.projection)
        .filter(|p| p.is_available())
        .collect();
    if available.is_empty() {
        return Projection::unavailable();
    }

    let profit: f64 = available.iter().filter_map(|p| p.profit).sum();
    let total: f64 = available.iter().filter_map(|p| p.total).sum();

    Projection {
        profit: Some(profit),
        total: Some(total),
        margin_pct: margin(Some(profit), Some(total)),
        increment_pct: increment(Some(profit), latest),
    }
}

fn distinct_categories(records: &[SalesRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for r in records {
        if !r.category.is_empty() && !out.iter().any(|c| same_category(c, &r.category)) {
            out.push(r.category.clone());
        }
    }
    out
}

fn same_category(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(category: &str, ymd: (i32, u32, u32), total: f64, cost: f64) -> SalesRecord {
        SalesRecord {
            line: 0,
            product: "P".to_string(),
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2),
            quantity: 1.0,
            unit_price: None,
            total,
            cost,
            payment_method: "Other".to_string(),
        }
    }

    #[test]
    fn buckets_floor_to_month_and_sort() {
        let records = vec![
            rec("A", (2024, 2, 20), 200.0, 50.0),
            rec("A", (2024, 1, 1), 100.0, 40.0),
            rec("A", (2024, 1, 31), 10.0, 0.0),
        ];
        let buckets = monthly_buckets(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!((buckets[0].year, buckets[0].month), (2024, 1));
        assert_eq!(buckets[0].profit_sum, 70.0);
        assert_eq!(buckets[0].total_sum, 110.0);
        assert_eq!(buckets[1].profit_sum, 150.0);
    }

    #[test]
    fn single_category_two_months_projects_upward() {
        let records = vec![
            rec("A", (2024, 1, 1), 100.0, 40.0),
            rec("A", (2024, 2, 1), 200.0, 50.0),
        ];
        let report = project(&records, 2024, &CategoryScope::Category("A".into()));
        let p = report.total;
        let profit = p.profit.unwrap();
        assert!(profit > 150.0);
        let total = p.total.unwrap();
        assert!(total > 200.0);
        assert!(p.margin_pct.unwrap() > 0.0);
        // Increment is measured against February's 150.
        let inc = p.increment_pct.unwrap();
        assert!((inc - (profit - 150.0) / 150.0 * 100.0).abs() < 1e-9);

        let models = fit_buckets(&monthly_buckets(&records));
        assert!(models.profit.unwrap().slope > 0.0);
    }

    #[test]
    fn declining_series_clamps_to_zero() {
        let records = vec![
            rec("A", (2024, 1, 1), 500.0, 0.0),
            rec("A", (2024, 2, 1), 100.0, 0.0),
        ];
        let p = project(&records, 2030, &CategoryScope::Category("A".into())).total;
        assert_eq!(p.profit, Some(0.0));
        assert_eq!(p.total, Some(0.0));
        assert_eq!(p.margin_pct, None);
        assert_eq!(p.increment_pct, Some(-100.0));
    }

    #[test]
    fn one_month_is_unavailable_not_zero() {
        let records = vec![rec("A", (2024, 1, 1), 100.0, 40.0), rec("A", (2024, 1, 9), 5.0, 1.0)];
        let report = project(&records, 2025, &CategoryScope::Category("a".into()));
        assert_eq!(report.total, Projection::unavailable());
        assert_eq!(report.skipped, vec!["a".to_string()]);
        assert_eq!(report.categories[0].months_observed, 1);
    }

    #[test]
    fn all_sums_independent_category_projections() {
        let records = vec![
            rec("A", (2024, 1, 1), 100.0, 40.0),
            rec("B", (2024, 1, 1), 50.0, 10.0),
            rec("A", (2024, 2, 1), 200.0, 50.0),
            rec("B", (2024, 3, 1), 80.0, 20.0),
            rec("C", (2024, 3, 1), 999.0, 0.0),
        ];
        let report = project(&records, 2025, &CategoryScope::All);
        let names: Vec<&str> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(report.skipped, vec!["C".to_string()]);

        let a = report.categories[0].projection;
        let b = report.categories[1].projection;
        let sum = a.profit.unwrap() + b.profit.unwrap();
        assert!((report.total.profit.unwrap() - sum).abs() < 1e-6);
        let sum_total = a.total.unwrap() + b.total.unwrap();
        assert!((report.total.total.unwrap() - sum_total).abs() < 1e-6);
    }

    #[test]
    fn increment_unavailable_when_last_month_not_profitable() {
        let records = vec![
            rec("A", (2024, 1, 1), 100.0, 0.0),
            rec("A", (2024, 2, 1), 100.0, 100.0),
        ];
        let p = project(&records, 2024, &CategoryScope::Category("A".into())).total;
        assert!(p.profit.is_some());
        assert_eq!(p.increment_pct, None);
    }

    #[test]
    fn empty_input_all_scope_is_unavailable() {
        let report = project(&[], 2025, &CategoryScope::All);
        assert!(report.categories.is_empty());
        assert_eq!(report.total, Projection::unavailable());
    }
}
