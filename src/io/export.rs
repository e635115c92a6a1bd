//! Exports of a filtered view.
//!
//! - CSV: the filtered records, in the same `;`-delimited layout the parser reads
//! - JSON: any serializable report (aggregates, charts, forecasts)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::SalesRecord;
use crate::error::AppError;

/// Column headers written by `write_records_csv`.
pub const CSV_HEADERS: [&str; 8] = [
    "Producto",
    "Categoria",
    "Fecha",
    "Cantidad",
    "PrecioUnitario",
    "Total",
    "Costo",
    "Pago",
];

/// Write records as delimited text with a header row.
pub fn write_records_csv(path: &Path, records: &[SalesRecord], delimiter: u8) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::export(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| AppError::export(path, e))?;

    for r in records {
        let date = r.date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default();
        let unit_price = r.unit_price.map(fmt_amount).unwrap_or_default();
        writer
            .write_record([
                r.product.as_str(),
                r.category.as_str(),
                date.as_str(),
                fmt_amount(r.quantity).as_str(),
                unit_price.as_str(),
                fmt_amount(r.total).as_str(),
                fmt_amount(r.cost).as_str(),
                r.payment_method.as_str(),
            ])
            .map_err(|e| AppError::export(path, e))?;
    }

    writer.flush().map_err(|e| AppError::export(path, e))?;
    tracing::info!(path = %path.display(), rows = records.len(), "wrote CSV export");
    Ok(())
}

/// Write `value` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::export(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| AppError::export(path, e))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| AppError::export(path, e))?;
    tracing::info!(path = %path.display(), "wrote JSON export");
    Ok(())
}

fn fmt_amount(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v:.2}") }
}
