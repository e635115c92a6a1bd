//! Synthetic sales dataset generation.
//!
//! Produces a deterministic (seeded) shop ledger with a mild upward trend and
//! yearly seasonality, so forecasts and trends have something to fit.

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SalesRecord;
use crate::error::AppError;

/// Product catalog: name, category, list price, cost as a share of revenue.
const CATALOG: &[(&str, &str, f64, f64)] = &[
    ("Inca Kola 500ml", "Bebidas", 3.50, 0.62),
    ("Agua San Luis 625ml", "Bebidas", 2.00, 0.55),
    ("Cafe Altomayo", "Bebidas", 12.90, 0.58),
    ("Papas Lays", "Snacks", 2.50, 0.60),
    ("Galleta Soda Field", "Snacks", 1.20, 0.65),
    ("Chifles", "Snacks", 3.00, 0.50),
    ("Arroz Costeno 1kg", "Abarrotes", 4.80, 0.78),
    ("Aceite Primor 1L", "Abarrotes", 10.50, 0.80),
    ("Azucar Rubia 1kg", "Abarrotes", 4.20, 0.82),
    ("Detergente Bolivar", "Limpieza", 9.90, 0.70),
    ("Lejia Clorox", "Limpieza", 4.50, 0.68),
];

const PAYMENT_METHODS: [&str; 4] = ["Efectivo", "Yape", "Tarjeta", "Plin"];

/// Revenue growth across the whole sampled period.
const TREND_GROWTH: f64 = 0.30;
/// Peak-to-mean seasonal swing.
const SEASONAL_SWING: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    pub start_year: i32,
    pub years: u32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 500,
            seed: 42,
            start_year: 2023,
            years: 2,
        }
    }
}

/// Generate `config.rows` records, sorted by date.
pub fn generate_records(config: &SampleConfig) -> Result<Vec<SalesRecord>, AppError> {
    if config.rows == 0 {
        return Err(AppError::invalid("Sample row count must be > 0."));
    }
    if config.years == 0 {
        return Err(AppError::invalid("Sample must span at least one year."));
    }
    let start = NaiveDate::from_ymd_opt(config.start_year, 1, 1)
        .ok_or_else(|| AppError::invalid(format!("Invalid start year {}.", config.start_year)))?;
    let end = i32::try_from(config.years)
        .ok()
        .and_then(|years| config.start_year.checked_add(years))
        .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .ok_or_else(|| AppError::invalid("Sample period is out of range."))?;
    let span_days = (end - start).num_days();
    if span_days <= 0 {
        return Err(AppError::invalid("Sample period is out of range."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let price_noise = Normal::new(1.0_f64, 0.05)
        .map_err(|e| AppError::invalid(format!("Noise distribution error: {e}")))?;
    let cost_noise = Normal::new(1.0_f64, 0.03)
        .map_err(|e| AppError::invalid(format!("Noise distribution error: {e}")))?;

    let mut dated: Vec<(NaiveDate, SalesRecord)> = Vec::with_capacity(config.rows);
    for _ in 0..config.rows {
        let offset = rng.gen_range(0..span_days);
        let date = start + Duration::days(offset);
        let &(product, category, list_price, cost_share) = CATALOG
            .choose(&mut rng)
            .ok_or_else(|| AppError::invalid("Empty sample catalog."))?;

        let progress = offset as f64 / span_days as f64;
        let season = (date.month0() as f64 * std::f64::consts::PI / 6.0).sin();
        let demand = (1.0 + TREND_GROWTH * progress) * (1.0 + SEASONAL_SWING * season);
        let quantity = (rng.gen_range(1.0..6.0) * demand).round().max(1.0);

        let unit_price = round2(list_price * price_noise.sample(&mut rng).clamp(0.8, 1.2));
        let total = round2(quantity * unit_price);
        let cost = round2(total * cost_share * cost_noise.sample(&mut rng).clamp(0.9, 1.1));
        let payment = PAYMENT_METHODS[rng.gen_range(0..PAYMENT_METHODS.len())];

        dated.push((
            date,
            SalesRecord {
                line: 0,
                product: product.to_string(),
                category: category.to_string(),
                date: Some(date),
                quantity,
                unit_price: Some(unit_price),
                total,
                cost,
                payment_method: payment.to_string(),
            },
        ));
    }

    dated.sort_by_key(|(d, _)| *d);
    Ok(dated
        .into_iter()
        .enumerate()
        .map(|(i, (_, mut r))| {
            r.line = i + 2;
            r
        })
        .collect())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
