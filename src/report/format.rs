//! Formatted terminal output.
//!
//! All text rendering lives here so aggregation and forecasting stay free of
//! presentation concerns.

use crate::domain::{FilterSet, MONTH_LABELS, Projection, SalesRecord};
use crate::filter::FilterOptions;
use crate::forecast::{ForecastReport, TrendSeries, TrendSource};
use crate::report::{Aggregates, BreakdownKey, GroupTotal, PaymentMonthly, SummaryStats};

/// Header block: source, filters and row counts.
pub fn format_header(source: &str, filters: &FilterSet, total_rows: usize, view_rows: usize) -> String {
    let mut out = String::new();
    out.push_str("=== sales - Sales Dashboard ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!("Filters: {filters}\n"));
    out.push_str(&format!("Rows: {view_rows} of {total_rows}\n"));
    out.push('\n');
    out
}

pub fn format_summary(stats: &SummaryStats) -> String {
    let mut out = String::new();
    out.push_str("Summary:\n");
    out.push_str(&format!("- sales     : {}\n", stats.count));
    out.push_str(&format!("- quantity  : {}\n", fmt_qty(stats.total_quantity)));
    out.push_str(&format!("- revenue   : {}\n", fmt_money(stats.total_revenue)));
    out.push_str(&format!("- net profit: {}\n", fmt_money(stats.net_profit)));
    out.push_str(&format!("- margin    : {:.2}%\n", stats.margin));
    out
}

/// Full dashboard text for one view.
pub fn format_dashboard(aggregates: &Aggregates) -> String {
    let mut out = format_summary(&aggregates.summary);
    out.push('\n');

    let title = match aggregates.breakdown.key {
        BreakdownKey::Category => "Revenue by category:",
        BreakdownKey::Product => "Revenue by product:",
    };
    out.push_str(title);
    out.push('\n');
    out.push_str(&format_groups(&aggregates.breakdown.groups, "revenue", fmt_money));
    out.push('\n');

    out.push_str("Sales by category:\n");
    let counts: Vec<GroupTotal> = aggregates
        .count_by_category
        .iter()
        .map(|c| GroupTotal {
            key: c.key.clone(),
            value: c.count as f64,
        })
        .collect();
    out.push_str(&format_groups(&counts, "sales", |v| format!("{v:.0}")));
    out.push('\n');

    out.push_str("Revenue by payment method and month:\n");
    out.push_str(&format_payment_table(&aggregates.payment_by_month));
    out.push('\n');

    out.push_str("Revenue by year:\n");
    let years: Vec<GroupTotal> = aggregates
        .revenue_by_year
        .iter()
        .map(|y| GroupTotal {
            key: y.year.to_string(),
            value: y.total,
        })
        .collect();
    out.push_str(&format_groups(&years, "revenue", fmt_money));
    out.push('\n');

    out.push_str("Top products (quantity):\n");
    out.push_str(&format_groups(&aggregates.top_products, "quantity", fmt_qty));
    out.push('\n');

    out.push_str("Most recent sales:\n");
    out.push_str(&format_recent(&aggregates.recent));

    out
}

/// Two-column key/value table.
pub fn format_groups(groups: &[GroupTotal], value_label: &str, fmt_value: impl Fn(f64) -> String) -> String {
    if groups.is_empty() {
        return "  (no data)\n".to_string();
    }
    let mut out = String::new();
    push_line(&mut out, format!("{:<28} {:>14}", "name", value_label));
    push_line(&mut out, format!("{:-<28} {:-<14}", "", ""));
    for g in groups {
        push_line(&mut out, format!("{:<28} {:>14}", truncate(&g.key, 28), fmt_value(g.value)));
    }
    out
}

/// Payment methods as rows, months as columns.
pub fn format_payment_table(rows: &[PaymentMonthly]) -> String {
    if rows.is_empty() {
        return "  (no data)\n".to_string();
    }
    let mut out = String::new();

    let mut header = format!("{:<12}", "method");
    let mut rule = format!("{:-<12}", "");
    for m in MONTH_LABELS {
        header.push_str(&format!(" {m:>9}"));
        rule.push_str(&format!(" {:-<9}", ""));
    }
    push_line(&mut out, header);
    push_line(&mut out, rule);

    for row in rows {
        let mut line = format!("{:<12}", truncate(&row.payment_method, 12));
        for v in row.months {
            line.push_str(&format!(" {v:>9.2}"));
        }
        push_line(&mut out, line);
    }
    out
}

pub fn format_recent(records: &[SalesRecord]) -> String {
    if records.is_empty() {
        return "  (no data)\n".to_string();
    }
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<10} {:<24} {:<16} {:>8} {:>12}", "date", "product", "category", "qty", "total"),
    );
    push_line(&mut out, format!("{:-<10} {:-<24} {:-<16} {:-<8} {:-<12}", "", "", "", "", ""));
    for r in records {
        let date = r.date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default();
        push_line(
            &mut out,
            format!(
                "{:<10} {:<24} {:<16} {:>8} {:>12}",
                date,
                truncate(&r.product, 24),
                truncate(&r.category, 16),
                fmt_qty(r.quantity),
                fmt_money(r.total),
            ),
        );
    }
    out
}

pub fn format_forecast(report: &ForecastReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Forecast for {} (as of Dec 31) ===\n", report.target_year));

    push_line(
        &mut out,
        format!(
            "{:<20} {:>7} {:>14} {:>14} {:>9} {:>10}",
            "category", "months", "profit", "revenue", "margin", "vs last"
        ),
    );
    push_line(&mut out, format!("{:-<20} {:-<7} {:-<14} {:-<14} {:-<9} {:-<10}", "", "", "", "", "", ""));
    for c in &report.categories {
        push_line(&mut out, projection_row(&c.category, Some(c.months_observed), &c.projection));
    }
    if report.categories.len() != 1 {
        push_line(&mut out, projection_row("ALL", None, &report.total));
    }

    if !report.skipped.is_empty() {
        out.push_str(&format!(
            "\n(skipped, fewer than two months of history) {}\n",
            report.skipped.join(", ")
        ));
    }
    out
}

fn projection_row(name: &str, months: Option<usize>, p: &Projection) -> String {
    format!(
        "{:<20} {:>7} {:>14} {:>14} {:>9} {:>10}",
        truncate(name, 20),
        months.map(|m| m.to_string()).unwrap_or_default(),
        fmt_opt(p.profit, fmt_money),
        fmt_opt(p.total, fmt_money),
        fmt_opt(p.margin_pct, fmt_pct),
        fmt_opt(p.increment_pct, fmt_signed_pct),
    )
}

pub fn format_trend(trend: &TrendSeries) -> String {
    let mut out = String::new();
    let source = match trend.source {
        TrendSource::Observed => "observed",
        TrendSource::Projected => "projected",
    };
    out.push_str(&format!("=== Monthly trend {} ({source}) ===\n", trend.year));
    push_line(&mut out, format!("{:<6} {:>14} {:>14}", "month", "profit", "revenue"));
    push_line(&mut out, format!("{:-<6} {:-<14} {:-<14}", "", "", ""));
    for (i, label) in MONTH_LABELS.iter().enumerate() {
        push_line(
            &mut out,
            format!(
                "{:<6} {:>14} {:>14}",
                label,
                fmt_money(trend.profit[i]),
                fmt_money(trend.total[i])
            ),
        );
    }
    out
}

/// Distinct values available to each filter control.
pub fn format_options(options: &FilterOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("Categories: {}\n", join_or_none(&options.categories)));
    let years: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
    out.push_str(&format!("Years: {}\n", join_or_none(&years)));
    let months: Vec<String> = options
        .months
        .iter()
        .map(|m| format!("{:02} ({})", m, MONTH_LABELS[(*m as usize).saturating_sub(1) % 12]))
        .collect();
    out.push_str(&format!("Months: {}\n", join_or_none(&months)));
    out.push_str(&format!("Payment methods: {}\n", join_or_none(&options.payment_methods)));
    out
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() { "(none)".to_string() } else { items.join(", ") }
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_money(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_qty(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v:.2}") }
}

fn fmt_pct(v: f64) -> String {
    format!("{v:.2}%")
}

fn fmt_signed_pct(v: f64) -> String {
    format!("{v:+.2}%")
}

fn fmt_opt(v: Option<f64>, f: impl Fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| "n/a".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
