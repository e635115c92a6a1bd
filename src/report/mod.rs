//! Aggregation: scalar statistics and grouped series over a filtered view.
//!
//! Every function here is pure. Grouped outputs keep the order in which keys
//! were first seen in the input, so repeated calls on the same input produce
//! the same sequence.
//!
//! Rows with an empty grouping key (no category, no product) are left out of
//! that grouping but still count toward the scalar totals. Date-bucketed series
//! only consider rows with a parsed date.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{FilterSet, SalesRecord};

pub mod chart;
pub mod format;

pub use chart::*;
pub use format::*;

/// Default length of the top-products list.
pub const DEFAULT_TOP_N: usize = 5;
/// Default length of the most-recent-sales list.
pub const DEFAULT_RECENT_N: usize = 5;

/// Headline numbers for a filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of rows (receipts) in the view.
    pub count: usize,
    pub total_quantity: f64,
    pub total_revenue: f64,
    pub net_profit: f64,
    /// `net_profit / total_revenue * 100`, or `0` when there is no revenue.
    pub margin: f64,
}

/// One group of a keyed sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

/// One group of a keyed count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

/// What the revenue breakdown is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownKey {
    Category,
    Product,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub key: BreakdownKey,
    pub groups: Vec<GroupTotal>,
}

/// Revenue per calendar month (index 0 = January) for one payment method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMonthly {
    pub payment_method: String,
    pub months: [f64; 12],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub total: f64,
}

/// Everything a dashboard view needs for one filtered dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub summary: SummaryStats,
    pub count_by_category: Vec<GroupCount>,
    pub revenue_by_category: Vec<GroupTotal>,
    pub breakdown: Breakdown,
    pub payment_by_month: Vec<PaymentMonthly>,
    pub monthly_revenue: [f64; 12],
    pub revenue_by_year: Vec<YearTotal>,
    pub top_products: Vec<GroupTotal>,
    pub recent: Vec<SalesRecord>,
}

/// Compute every aggregate for an already-filtered collection.
///
/// `filters` is only consulted to pick the breakdown grouping key.
pub fn aggregate(records: &[SalesRecord], filters: &FilterSet, top_n: usize, recent_n: usize) -> Aggregates {
    Aggregates {
        summary: summarize(records),
        count_by_category: count_by_category(records),
        revenue_by_category: revenue_by_category(records),
        breakdown: breakdown(records, filters),
        payment_by_month: revenue_by_payment_method_by_month(records),
        monthly_revenue: monthly_revenue(records),
        revenue_by_year: revenue_by_year(records),
        top_products: top_products_by_quantity(records, top_n),
        recent: most_recent(records, recent_n),
    }
}

pub fn summarize(records: &[SalesRecord]) -> SummaryStats {
    let mut stats = SummaryStats {
        count: records.len(),
        ..SummaryStats::default()
    };
    for r in records {
        stats.total_quantity += r.quantity;
        stats.total_revenue += r.total;
        stats.net_profit += r.profit();
    }
    stats.margin = margin_pct(stats.net_profit, stats.total_revenue);
    stats
}

fn margin_pct(profit: f64, revenue: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }
    let m = profit / revenue * 100.0;
    if m.is_finite() { m } else { 0.0 }
}

pub fn count_by_category(records: &[SalesRecord]) -> Vec<GroupCount> {
    group_sum(records, |r| non_empty(&r.category), |_| 1.0)
        .into_iter()
        .map(|g| GroupCount {
            key: g.key,
            count: g.value as usize,
        })
        .collect()
}

pub fn revenue_by_category(records: &[SalesRecord]) -> Vec<GroupTotal> {
    group_sum(records, |r| non_empty(&r.category), |r| r.total)
}

pub fn revenue_by_product(records: &[SalesRecord]) -> Vec<GroupTotal> {
    group_sum(records, |r| non_empty(&r.product), |r| r.total)
}

/// Revenue breakdown for the "share" chart.
///
/// With an active category filter the view is already narrowed to matching
/// categories, so the breakdown switches to products within them.
pub fn breakdown(records: &[SalesRecord], filters: &FilterSet) -> Breakdown {
    if filters.category_term().is_some() {
        Breakdown {
            key: BreakdownKey::Product,
            groups: revenue_by_product(records),
        }
    } else {
        Breakdown {
            key: BreakdownKey::Category,
            groups: revenue_by_category(records),
        }
    }
}

pub fn revenue_by_payment_method_by_month(records: &[SalesRecord]) -> Vec<PaymentMonthly> {
    let mut out: Vec<PaymentMonthly> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for r in records {
        let Some(month) = r.month() else { continue };
        let slot = *index.entry(r.payment_method.as_str()).or_insert_with(|| {
            out.push(PaymentMonthly {
                payment_method: r.payment_method.clone(),
                months: [0.0; 12],
            });
            out.len() - 1
        });
        out[slot].months[month as usize - 1] += r.total;
    }

    out
}

/// Revenue per calendar month, summed across years.
pub fn monthly_revenue(records: &[SalesRecord]) -> [f64; 12] {
    let mut months = [0.0; 12];
    for r in records {
        if let Some(m) = r.month() {
            months[m as usize - 1] += r.total;
        }
    }
    months
}

/// Revenue per year, ascending.
pub fn revenue_by_year(records: &[SalesRecord]) -> Vec<YearTotal> {
    let mut years: BTreeMap<i32, f64> = BTreeMap::new();
    for r in records {
        if let Some(y) = r.year() {
            *years.entry(y).or_insert(0.0) += r.total;
        }
    }
    years
        .into_iter()
        .map(|(year, total)| YearTotal { year, total })
        .collect()
}

/// Best-selling products by summed quantity, at most `n`.
///
/// Ties keep first-seen order.
pub fn top_products_by_quantity(records: &[SalesRecord], n: usize) -> Vec<GroupTotal> {
    let mut groups = group_sum(records, |r| non_empty(&r.product), |r| r.quantity);
    // Stable sort: equal quantities stay in first-seen order.
    groups.sort_by(|a, b| b.value.total_cmp(&a.value));
    groups.truncate(n);
    groups
}

/// The `n` latest sales with a product and a date, newest first.
///
/// Rows sharing a date keep their input order.
pub fn most_recent(records: &[SalesRecord], n: usize) -> Vec<SalesRecord> {
    let mut dated: Vec<(usize, &SalesRecord)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.product.is_empty() && r.date.is_some())
        .collect();
    dated.sort_by(|(ia, a), (ib, b)| b.date.cmp(&a.date).then(ia.cmp(ib)));
    dated.into_iter().take(n).map(|(_, r)| r.clone()).collect()
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

fn group_sum<'a>(
    records: &'a [SalesRecord],
    key: impl Fn(&'a SalesRecord) -> Option<&'a str>,
    value: impl Fn(&SalesRecord) -> f64,
) -> Vec<GroupTotal> {
    let mut out: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for r in records {
        let Some(k) = key(r) else { continue };
        let slot = *index.entry(k).or_insert_with(|| {
            out.push(GroupTotal {
                key: k.to_string(),
                value: 0.0,
            });
            out.len() - 1
        });
        out[slot].value += value(r);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[allow(clippy::too_many_arguments)]
    fn rec(
        line: usize,
        product: &str,
        category: &str,
        date: Option<(i32, u32, u32)>,
        qty: f64,
        total: f64,
        cost: f64,
        pay: &str,
    ) -> SalesRecord {
        SalesRecord {
            line,
            product: product.to_string(),
            category: category.to_string(),
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            quantity: qty,
            unit_price: None,
            total,
            cost,
            payment_method: pay.to_string(),
        }
    }

    fn dataset() -> Vec<SalesRecord> {
        vec![
            rec(2, "Cafe", "Bebidas", Some((2024, 1, 5)), 3.0, 30.0, 12.0, "Efectivo"),
            rec(3, "Galleta", "Snacks", Some((2024, 1, 5)), 5.0, 10.0, 4.0, "Tarjeta"),
            rec(4, "Te", "Bebidas", Some((2024, 3, 2)), 5.0, 20.0, 5.0, "Efectivo"),
            rec(5, "Cafe", "Bebidas", None, 2.0, 20.0, 8.0, "Other"),
            rec(6, "Chifles", "Snacks", Some((2023, 12, 30)), 1.0, 0.0, 0.0, "Tarjeta"),
            rec(7, "", "", Some((2024, 3, 9)), 4.0, 5.0, 1.0, "Efectivo"),
        ]
    }

    #[test]
    fn summary_totals() {
        let s = summarize(&dataset());
        assert_eq!(s.count, 6);
        assert_eq!(s.total_quantity, 20.0);
        assert_eq!(s.total_revenue, 85.0);
        assert_eq!(s.net_profit, 55.0);
        assert!((s.margin - 55.0 / 85.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn empty_dataset_is_all_zero() {
        let a = aggregate(&[], &FilterSet::new(), DEFAULT_TOP_N, DEFAULT_RECENT_N);
        assert_eq!(a.summary, SummaryStats::default());
        assert_eq!(a.summary.margin, 0.0);
        assert!(a.count_by_category.is_empty());
        assert!(a.revenue_by_category.is_empty());
        assert!(a.breakdown.groups.is_empty());
        assert!(a.payment_by_month.is_empty());
        assert_eq!(a.monthly_revenue, [0.0; 12]);
        assert!(a.revenue_by_year.is_empty());
        assert!(a.top_products.is_empty());
        assert!(a.recent.is_empty());
    }

    #[test]
    fn zero_revenue_margin_is_zero_not_nan() {
        let rows = vec![rec(2, "A", "X", None, 1.0, 0.0, 10.0, "Other")];
        let s = summarize(&rows);
        assert_eq!(s.net_profit, -10.0);
        assert_eq!(s.margin, 0.0);
    }

    #[test]
    fn category_groups_keep_first_seen_order() {
        let data = dataset();
        let revenue = revenue_by_category(&data);
        assert_eq!(
            revenue,
            vec![
                GroupTotal { key: "Bebidas".into(), value: 70.0 },
                GroupTotal { key: "Snacks".into(), value: 10.0 },
            ]
        );
        let counts = count_by_category(&data);
        assert_eq!(counts[0], GroupCount { key: "Bebidas".into(), count: 3 });
        assert_eq!(counts[1], GroupCount { key: "Snacks".into(), count: 2 });
    }

    #[test]
    fn breakdown_switches_to_products_under_category_filter() {
        let data = dataset();
        let b = breakdown(&data, &FilterSet::new());
        assert_eq!(b.key, BreakdownKey::Category);

        let filters = FilterSet::new().with_category("beb");
        let narrowed = crate::filter::apply(&data, &filters);
        let b = breakdown(&narrowed, &filters);
        assert_eq!(b.key, BreakdownKey::Product);
        assert_eq!(
            b.groups,
            vec![
                GroupTotal { key: "Cafe".into(), value: 50.0 },
                GroupTotal { key: "Te".into(), value: 20.0 },
            ]
        );
    }

    #[test]
    fn payment_months_only_use_dated_rows() {
        let p = revenue_by_payment_method_by_month(&dataset());
        let names: Vec<&str> = p.iter().map(|x| x.payment_method.as_str()).collect();
        assert_eq!(names, vec!["Efectivo", "Tarjeta"]);
        assert_eq!(p[0].months[0], 30.0);
        assert_eq!(p[0].months[2], 25.0);
        assert_eq!(p[1].months[0], 10.0);
        assert_eq!(p[1].months[11], 0.0);
    }

    #[test]
    fn monthly_and_yearly_revenue() {
        let data = dataset();
        let m = monthly_revenue(&data);
        assert_eq!(m[0], 40.0);
        assert_eq!(m[2], 25.0);
        assert_eq!(m[11], 0.0);
        assert_eq!(
            revenue_by_year(&data),
            vec![YearTotal { year: 2023, total: 0.0 }, YearTotal { year: 2024, total: 65.0 }]
        );
    }

    #[test]
    fn top_products_sorted_with_stable_ties() {
        let data = dataset();
        let top = top_products_by_quantity(&data, DEFAULT_TOP_N);
        let keys: Vec<&str> = top.iter().map(|g| g.key.as_str()).collect();
        // Cafe=5 (first seen), Galleta=5, Te=5, Chifles=1
        assert_eq!(keys, vec!["Cafe", "Galleta", "Te", "Chifles"]);
        assert_eq!(top_products_by_quantity(&data, 2).len(), 2);
        assert_eq!(top, top_products_by_quantity(&data, DEFAULT_TOP_N));
    }

    #[test]
    fn most_recent_orders_by_date_then_input() {
        let recent = most_recent(&dataset(), 3);
        let lines: Vec<usize> = recent.iter().map(|r| r.line).collect();
        // Line 7 has no product; lines 2 and 3 share a date.
        assert_eq!(lines, vec![4, 2, 3]);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let data = dataset();
        let f = FilterSet::new().with_year(2024);
        let view = crate::filter::apply(&data, &f);
        let a = aggregate(&view, &f, 5, 5);
        let b = aggregate(&crate::filter::apply(&data, &f), &f, 5, 5);
        assert_eq!(a, b);
    }
}
