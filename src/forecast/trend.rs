//! Twelve-month profit/revenue trend for one year.
//!
//! When the year has observed sales the monthly sums are returned as-is.
//! Otherwise a single line is fitted across all categories and evaluated at
//! each month start, plus a small sine wave sized from historical volatility.
//! The wave is presentational only; it keeps a projected year from drawing as
//! a perfectly straight line.

use std::f64::consts::PI;

use chrono::NaiveDate;
use serde::Serialize;

use super::projection::{date_millis, fit_buckets, monthly_buckets};
use crate::domain::{FilterSet, MonthlyBucket, RegressionModel, SalesRecord};
use crate::filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSource {
    Observed,
    Projected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub year: i32,
    pub source: TrendSource,
    /// Index 0 = January.
    pub profit: [f64; 12],
    pub total: [f64; 12],
}

/// Build the trend for `year`, optionally narrowed by a category substring.
///
/// Returns `None` when the year has no data and the history is too short to
/// fit a line.
pub fn monthly_trend(records: &[SalesRecord], year: i32, category: Option<&str>) -> Option<TrendSeries> {
    let scoped = match category.filter(|c| !c.trim().is_empty()) {
        Some(term) => filter::apply(records, &FilterSet::new().with_category(term)),
        None => records.to_vec(),
    };
    let buckets = monthly_buckets(&scoped);

    if buckets.iter().any(|b| b.year == year) {
        return Some(observed(&buckets, year));
    }

    let models = fit_buckets(&buckets);
    let (Some(profit_model), Some(total_model)) = (models.profit, models.total) else {
        tracing::debug!(year, months = buckets.len(), "trend unavailable");
        return None;
    };

    let profit_amp = 0.5 * mean_abs_change(buckets.iter().map(|b| b.profit_sum));
    let total_amp = 0.5 * mean_abs_change(buckets.iter().map(|b| b.total_sum));

    Some(TrendSeries {
        year,
        source: TrendSource::Projected,
        profit: projected(&profit_model, year, profit_amp)?,
        total: projected(&total_model, year, total_amp)?,
    })
}

fn observed(buckets: &[MonthlyBucket], year: i32) -> TrendSeries {
    let mut profit = [0.0; 12];
    let mut total = [0.0; 12];
    for b in buckets.iter().filter(|b| b.year == year) {
        let idx = (b.month - 1) as usize;
        profit[idx] = b.profit_sum;
        total[idx] = b.total_sum;
    }
    TrendSeries {
        year,
        source: TrendSource::Observed,
        profit,
        total,
    }
}

fn projected(model: &RegressionModel, year: i32, amplitude: f64) -> Option<[f64; 12]> {
    let mut out = [0.0; 12];
    for (idx, slot) in out.iter_mut().enumerate() {
        let start = NaiveDate::from_ymd_opt(year, idx as u32 + 1, 1)?;
        let base = model.predict(date_millis(start));
        let wiggle = amplitude * (idx as f64 * PI / 6.0).sin();
        *slot = (base + wiggle).max(0.0);
    }
    Some(out)
}

/// Mean absolute difference between consecutive values; 0 for fewer than two.
fn mean_abs_change(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.len() < 2 {
        return 0.0;
    }
    let sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    sum / (values.len() - 1) as f64
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
    fn observed_year_returns_monthly_sums() {
        let records = vec![
            rec("Bebidas", (2024, 1, 3), 100.0, 40.0),
            rec("Snacks", (2024, 1, 9), 10.0, 5.0),
            rec("Bebidas", (2024, 3, 1), 50.0, 20.0),
            rec("Bebidas", (2023, 3, 1), 999.0, 0.0),
        ];
        let t = monthly_trend(&records, 2024, None).unwrap();
        assert_eq!(t.source, TrendSource::Observed);
        assert_eq!(t.total[0], 110.0);
        assert_eq!(t.profit[0], 65.0);
        assert_eq!(t.total[1], 0.0);
        assert_eq!(t.total[2], 50.0);

        let t = monthly_trend(&records, 2024, Some("snack")).unwrap();
        assert_eq!(t.total[0], 10.0);
        assert_eq!(t.total[2], 0.0);
    }

    #[test]
    fn future_year_is_projected_and_non_negative() {
        let records = vec![
            rec("A", (2024, 1, 1), 100.0, 40.0),
            rec("A", (2024, 2, 1), 300.0, 60.0),
            rec("A", (2024, 3, 1), 200.0, 20.0),
        ];
        let t = monthly_trend(&records, 2026, None).unwrap();
        assert_eq!(t.source, TrendSource::Projected);
        assert!(t.profit.iter().chain(t.total.iter()).all(|v| *v >= 0.0));
        // January has a zero phase, so it sits exactly on the fitted line.
        let line = fit_buckets(&monthly_buckets(&records)).total.unwrap();
        let jan = date_millis(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!((t.total[0] - line.predict(jan).max(0.0)).abs() < 1e-6);

        // April: sin(3 * pi / 6) = 1, so the full amplitude is added.
        // Totals 100 -> 300 -> 200 change by 200 and 100, mean 150, amplitude 75.
        let apr = date_millis(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        let expected = (line.predict(apr) + 75.0).max(0.0);
        assert!((t.total[3] - expected).abs() < 1e-6);

        // July: sin(pi) = 0, back on the line.
        let jul = date_millis(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        assert!((t.total[6] - line.predict(jul).max(0.0)).abs() < 1e-6);
    }

    #[test]
    fn declining_projection_clamps_at_zero() {
        let records = vec![
            rec("A", (2024, 1, 1), 500.0, 0.0),
            rec("A", (2024, 2, 1), 100.0, 0.0),
        ];
        let t = monthly_trend(&records, 2030, None).unwrap();
        assert!(t.profit.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn short_history_has_no_trend() {
        let records = vec![rec("A", (2024, 1, 1), 500.0, 0.0)];
        assert!(monthly_trend(&records, 2025, None).is_none());
        assert!(monthly_trend(&[], 2025, None).is_none());
    }

    #[test]
    fn mean_abs_change_of_series() {
        assert_eq!(mean_abs_change([1.0, 4.0, 2.0].into_iter()), 2.5);
        assert_eq!(mean_abs_change([7.0].into_iter()), 0.0);
    }
}
