//! Filter engine.
//!
//! `apply` narrows a record collection to the rows matching a `FilterSet`.
//! Active constraints combine with AND:
//!
//! - category: case-insensitive substring
//! - year / month: exact match on the parsed date (undated rows never match)
//! - payment method: exact, case-sensitive
//!
//! Category matching is loose while payment matching is strict.

use std::collections::{BTreeSet, HashSet};

use chrono::Datelike;
use serde::Serialize;

use crate::domain::{FilterSet, SalesRecord};

/// Return the records matching `filters`, in input order.
pub fn apply(records: &[SalesRecord], filters: &FilterSet) -> Vec<SalesRecord> {
    if filters.is_empty() {
        return records.to_vec();
    }

    let category = filters.category_term().map(str::to_lowercase);
    records
        .iter()
        .filter(|r| matches(r, filters, category.as_deref()))
        .cloned()
        .collect()
}

/// Whether one record passes `filters`.
pub fn matches_filters(record: &SalesRecord, filters: &FilterSet) -> bool {
    let category = filters.category_term().map(str::to_lowercase);
    matches(record, filters, category.as_deref())
}

fn matches(record: &SalesRecord, filters: &FilterSet, category_lower: Option<&str>) -> bool {
    if let Some(term) = category_lower {
        if !record.category.to_lowercase().contains(term) {
            return false;
        }
    }

    if filters.has_date_constraint() {
        let Some(date) = record.date else { return false };
        if filters.year.is_some_and(|y| y != date.year()) {
            return false;
        }
        if filters.month.is_some_and(|m| m != date.month()) {
            return false;
        }
    }

    if let Some(method) = filters.payment_term() {
        if record.payment_method != method {
            return false;
        }
    }

    true
}

/// Distinct values a user can pick from for each filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// First-seen order.
    pub categories: Vec<String>,
    /// Most recent first.
    pub years: Vec<i32>,
    /// Ascending, 1-12.
    pub months: Vec<u32>,
    /// First-seen order.
    pub payment_methods: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        let mut categories = Vec::new();
        let mut seen_categories = HashSet::new();
        let mut payment_methods = Vec::new();
        let mut seen_payments = HashSet::new();
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();

        for r in records {
            if !r.category.is_empty() && seen_categories.insert(r.category.as_str()) {
                categories.push(r.category.clone());
            }
            if seen_payments.insert(r.payment_method.as_str()) {
                payment_methods.push(r.payment_method.clone());
            }
            if let (Some(y), Some(m)) = (r.year(), r.month()) {
                years.insert(y);
                months.insert(m);
            }
        }

        Self {
            categories,
            years: years.into_iter().rev().collect(),
            months: months.into_iter().collect(),
            payment_methods,
        }
    }
}
