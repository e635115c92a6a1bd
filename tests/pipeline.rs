use std::io::Write;

use sales_report::app::Session;
use sales_report::app::pipeline::{run_forecast, run_report, run_trend};
use sales_report::data::{SampleConfig, generate_records};
use sales_report::domain::{DataSource, FilterSet};
use sales_report::forecast::TrendSource;
use sales_report::io::export::write_records_csv;
use sales_report::io::ingest::IngestOptions;

const LEDGER: &str = "\u{feff}Producto;Categoría;Fecha;Cantidad;PrecioUnitario;Total;Costo;Pago
Cafe;Bebidas;05/01/2024;3;10;30;12;Efectivo
Galleta;Snacks;05/01/2024;5;2;10;4;Tarjeta
Te;Bebidas;02/03/2024;5;4;20;5;Efectivo
Cafe;Bebidas;;2;10;20;8;
Chifles;Snacks;30/12/2023;1;;0;0;Tarjeta
Agua;Bebidas;15/02/2024;4;2,50;10,00;4,00;Yape
";

fn write_ledger(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn open(path: &std::path::Path) -> Session {
    Session::open(DataSource::Path(path.to_path_buf()), IngestOptions::default()).unwrap()
}

#[test]
fn load_filter_and_aggregate_a_ledger() {
    let file = write_ledger(LEDGER);
    let session = open(file.path());
    assert_eq!(session.records().len(), 6);
    assert_eq!(session.records()[3].payment_method, "Other");
    assert_eq!(session.records()[5].total, 10.0);

    let all = run_report(session.records(), &FilterSet::new(), 5, 5);
    assert_eq!(all.aggregates.summary.count, 6);
    assert_eq!(all.aggregates.summary.total_revenue, 90.0);
    assert_eq!(all.aggregates.summary.net_profit, 57.0);

    let filters = FilterSet::new().with_category("BEB").with_year(2024);
    let view = run_report(session.records(), &filters, 5, 5);
    // The undated Cafe row drops out under a year filter.
    assert_eq!(view.view_rows, 3);
    assert_eq!(view.aggregates.summary.total_revenue, 60.0);
    let products: Vec<&str> = view
        .aggregates
        .breakdown
        .groups
        .iter()
        .map(|g| g.key.as_str())
        .collect();
    assert_eq!(products, vec!["Cafe", "Te", "Agua"]);
}

#[test]
fn filter_conjunction_is_intersection() {
    let records = generate_records(&SampleConfig {
        rows: 300,
        ..SampleConfig::default()
    })
    .unwrap();
    let a = FilterSet::new().with_category("snack");
    let b = FilterSet::new().with_month(6);
    let both = FilterSet::new().with_category("snack").with_month(6);

    let view_a = run_report(&records, &a, 5, 5).view;
    let view_b = run_report(&records, &b, 5, 5).view;
    let view_both = run_report(&records, &both, 5, 5).view;

    let expected: Vec<_> = view_a.iter().filter(|r| view_b.contains(r)).cloned().collect();
    assert_eq!(view_both, expected);
}

#[test]
fn failed_reload_keeps_previous_snapshot() {
    let file = write_ledger(LEDGER);
    let mut session = open(file.path());
    session.set_filters(FilterSet::new().with_payment_method("Efectivo"));
    let held = session.snapshot();

    std::fs::write(file.path(), "x|y|z\n1|2|3\n").unwrap();
    assert!(session.reload().is_err());
    assert_eq!(session.records().len(), 6);
    assert_eq!(session.view().len(), 2);

    std::fs::write(file.path(), LEDGER.lines().take(3).collect::<Vec<_>>().join("\n")).unwrap();
    assert_eq!(session.reload().unwrap(), 2);
    assert!(session.filters().is_empty());
    assert_eq!(held.len(), 6);
}

#[test]
fn forecast_and_trend_over_a_generated_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ventas.csv");
    let records = generate_records(&SampleConfig::default()).unwrap();
    write_records_csv(&path, &records, b';').unwrap();

    let session = open(&path);
    assert_eq!(session.records().len(), records.len());

    let forecast = run_forecast(session.records(), 2025, None);
    assert!(forecast.skipped.is_empty());
    let sum: f64 = forecast
        .categories
        .iter()
        .filter_map(|c| c.projection.profit)
        .sum();
    assert!((forecast.total.profit.unwrap() - sum).abs() < 1e-6);
    assert!(forecast.total.profit.unwrap() >= 0.0);

    let single = run_forecast(session.records(), 2025, Some("bebidas"));
    assert_eq!(single.categories.len(), 1);
    assert!(single.total.is_available());

    let observed = run_trend(session.records(), 2024, None).unwrap();
    assert_eq!(observed.source, TrendSource::Observed);
    let projected = run_trend(session.records(), 2026, Some("Snacks")).unwrap();
    assert_eq!(projected.source, TrendSource::Projected);
    assert!(projected.total.iter().all(|v| *v >= 0.0));
}

#[test]
fn two_month_single_category_projection_rises() {
    let text = "Producto;Categoria;Fecha;Cantidad;Total;Costo;Pago
A;Solo;10/01/2024;1;100;40;Yape
A;Solo;10/02/2024;1;200;50;Yape
";
    let file = write_ledger(text);
    let session = open(file.path());
    let forecast = run_forecast(session.records(), 2024, Some("Solo"));
    let profit = forecast.total.profit.unwrap();
    assert!(profit > 150.0);

    let declining = "Producto;Categoria;Fecha;Cantidad;Total;Costo;Pago
A;Solo;10/01/2024;1;500;0;Yape
A;Solo;10/02/2024;1;100;0;Yape
";
    let file = write_ledger(declining);
    let session = open(file.path());
    let forecast = run_forecast(session.records(), 2030, None);
    assert_eq!(forecast.total.profit, Some(0.0));
}

#[test]
fn empty_dataset_yields_zeroes() {
    let file = write_ledger("Producto;Categoria;Fecha;Cantidad;Total;Costo;Pago\n");
    let session = open(file.path());
    let out = run_report(session.records(), &FilterSet::new(), 5, 5);
    assert_eq!(out.aggregates.summary.count, 0);
    assert_eq!(out.aggregates.summary.margin, 0.0);
    assert!(out.charts.breakdown.is_empty());
    assert!(run_forecast(session.records(), 2025, None).categories.is_empty());
    assert!(run_trend(session.records(), 2025, None).is_none());
}
