//! CSV ingest and normalization.
//!
//! This module is responsible for turning a delimited sales export into a clean
//! set of `SalesRecord`s that the filter/aggregate/forecast stages can consume.
//!
//! Parsing is *total* at the row level. Each field has an explicit default:
//!
//! | column            | missing / invalid value      |
//! |-------------------|------------------------------|
//! | `Producto`        | empty string                 |
//! | `Categoría`       | empty string                 |
//! | `Fecha`           | `None` (no date)             |
//! | `Cantidad`        | `0`                          |
//! | `PrecioUnitario`  | `None`                       |
//! | `Total`           | `0`                          |
//! | `Costo`           | `0`                          |
//! | `Pago`            | `"Other"`                    |
//!
//! Only problems with the file as a whole (no header, unreadable CSV, a header
//! with none of the expected columns) are errors, and they abort the load.

use std::collections::HashMap;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DEFAULT_PAYMENT_METHOD, DataSource, SalesRecord};
use crate::error::AppError;
use crate::io::source::read_text;

/// Delimiter used by the canonical sales export.
pub const DEFAULT_DELIMITER: u8 = b';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Ingest output: parsed records + bookkeeping for diagnostics.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<SalesRecord>,
    pub rows_read: usize,
    pub rows_without_date: usize,
    /// Recognized columns absent from the header (their fields take defaults).
    pub missing_columns: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Product,
    Category,
    Date,
    Quantity,
    UnitPrice,
    Total,
    Cost,
    Payment,
}

impl Column {
    const ALL: [Column; 8] = [
        Column::Product,
        Column::Category,
        Column::Date,
        Column::Quantity,
        Column::UnitPrice,
        Column::Total,
        Column::Cost,
        Column::Payment,
    ];

    fn label(self) -> &'static str {
        match self {
            Column::Product => "Producto",
            Column::Category => "Categoría",
            Column::Date => "Fecha",
            Column::Quantity => "Cantidad",
            Column::UnitPrice => "PrecioUnitario",
            Column::Total => "Total",
            Column::Cost => "Costo",
            Column::Payment => "Pago",
        }
    }

    /// Normalized header spellings, most specific first.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Product => &["producto"],
            Column::Category => &["categoria"],
            Column::Date => &["fecha"],
            Column::Quantity => &["cantidad"],
            Column::UnitPrice => &["preciounitario", "precio"],
            Column::Total => &["total"],
            Column::Cost => &["costo"],
            Column::Payment => &["pago"],
        }
    }

    fn optional(self) -> bool {
        matches!(self, Column::UnitPrice)
    }
}

type ColumnMap = HashMap<Column, usize>;

/// Read a dataset from `source` and parse it.
pub fn load_records(source: &DataSource, options: &IngestOptions) -> Result<IngestedData, AppError> {
    let text = read_text(source)?;
    let data = parse_records(&text, options)?;
    tracing::info!(
        source = %source,
        rows = data.rows_read,
        undated = data.rows_without_date,
        "loaded sales dataset"
    );
    Ok(data)
}

/// Parse delimited sales text (header row required).
pub fn parse_records(text: &str, options: &IngestOptions) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::parse(format!("failed to read header row: {e}")))?
        .clone();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::parse("missing header row"));
    }

    let columns = resolve_columns(&headers);
    if columns.is_empty() {
        let expected: Vec<&str> = Column::ALL.iter().map(|c| c.label()).collect();
        return Err(AppError::parse(format!(
            "none of the expected columns ({}) were found in the header; check the delimiter ('{}')",
            expected.join(", "),
            options.delimiter as char
        )));
    }

    let missing_columns: Vec<&'static str> = Column::ALL
        .iter()
        .filter(|c| !c.optional() && !columns.contains_key(*c))
        .map(|c| c.label())
        .collect();
    if !missing_columns.is_empty() {
        tracing::warn!(missing = ?missing_columns, "sales header is missing columns; defaults apply");
    }

    let mut records = Vec::new();
    let mut rows_without_date = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::parse(format!("CSV read error: {e}")))?;
        // Header is line 1, so the first data row is line 2 unless blank lines intervene.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let row = parse_row(&record, &columns, line);
        if row.date.is_none() {
            rows_without_date += 1;
        }
        records.push(row);
    }

    tracing::debug!(rows = records.len(), undated = rows_without_date, "parsed sales rows");

    Ok(IngestedData {
        rows_read: records.len(),
        records,
        rows_without_date,
        missing_columns,
    })
}

fn resolve_columns(headers: &StringRecord) -> ColumnMap {
    let mut header_map: HashMap<String, usize> = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins when a label is repeated.
        header_map.entry(normalize_header_name(name)).or_insert(idx);
    }

    Column::ALL
        .iter()
        .filter_map(|&col| {
            col.aliases()
                .iter()
                .find_map(|alias| header_map.get(*alias))
                .map(|&idx| (col, idx))
        })
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .map(fold_accent)
        .flat_map(char::to_lowercase)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'Á' | 'À' | 'Ä' => 'a',
        'é' | 'è' | 'ë' | 'É' | 'È' | 'Ë' => 'e',
        'í' | 'ì' | 'ï' | 'Í' | 'Ì' | 'Ï' => 'i',
        'ó' | 'ò' | 'ö' | 'Ó' | 'Ò' | 'Ö' => 'o',
        'ú' | 'ù' | 'ü' | 'Ú' | 'Ù' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}

fn parse_row(record: &StringRecord, columns: &ColumnMap, line: usize) -> SalesRecord {
    let text = |col| get_optional(record, columns, col).unwrap_or_default().to_string();
    let amount = |col| get_optional(record, columns, col).and_then(parse_amount);

    SalesRecord {
        line,
        product: text(Column::Product),
        category: text(Column::Category),
        date: get_optional(record, columns, Column::Date).and_then(parse_date),
        quantity: amount(Column::Quantity).unwrap_or(0.0),
        unit_price: amount(Column::UnitPrice),
        total: amount(Column::Total).unwrap_or(0.0),
        cost: amount(Column::Cost).unwrap_or(0.0),
        payment_method: get_optional(record, columns, Column::Payment)
            .unwrap_or(DEFAULT_PAYMENT_METHOD)
            .to_string(),
    }
}

fn get_optional<'a>(record: &'a StringRecord, columns: &ColumnMap, col: Column) -> Option<&'a str> {
    let idx = columns.get(&col)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a `DD/MM/YYYY` date. Returns `None` instead of failing.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.trim().split('/');
    let (dd, mm, yyyy) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if !(all_digits(dd) && all_digits(mm) && all_digits(yyyy)) {
        return None;
    }
    NaiveDate::from_ymd_opt(yyyy.parse().ok()?, mm.parse().ok()?, dd.parse().ok()?)
}

/// Locale-tolerant number parsing.
///
/// Accepts a leading sign, a `S/` or `$` currency prefix, and either `.` or `,`
/// as decimal mark. When both marks appear, the last one is the decimal mark
/// and the other is a thousands separator. A lone `,` is a decimal comma.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let (negative, unsigned) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.as_str()),
    };
    let digits = unsigned
        .strip_prefix("S/")
        .or_else(|| unsigned.strip_prefix('$'))
        .unwrap_or(unsigned);
    if negative && digits.starts_with(['-', '+']) {
        return None;
    }

    let commas = digits.matches(',').count();
    let dots = digits.matches('.').count();
    let normalized = match (digits.rfind(','), digits.rfind('.')) {
        (Some(c), Some(d)) if c > d => digits.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => digits.replace(',', ""),
        (Some(_), None) if commas == 1 => digits.replace(',', "."),
        (Some(_), None) => digits.replace(',', ""),
        (None, Some(_)) if dots > 1 => digits.replace('.', ""),
        _ => digits.to_string(),
    };

    let v = normalized.parse::<f64>().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if negative { -v } else { v })
}
