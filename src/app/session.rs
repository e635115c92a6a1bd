//! In-memory dataset owner.
//!
//! A `Session` holds the current record snapshot and the active filters. The
//! snapshot is an `Arc<[SalesRecord]>`: readers clone the `Arc` and keep a
//! consistent view while a reload builds the next one. A reload only swaps the
//! snapshot after the new dataset parsed completely.

use std::sync::Arc;

use crate::domain::{DataSource, FilterSet, SalesRecord};
use crate::error::AppError;
use crate::filter;
use crate::io::ingest::{IngestOptions, IngestedData, load_records, parse_records};

#[derive(Debug, Clone)]
pub struct Session {
    source: DataSource,
    options: IngestOptions,
    snapshot: Arc<[SalesRecord]>,
    filters: FilterSet,
}

impl Session {
    /// Load `source` and start a session over it.
    pub fn open(source: DataSource, options: IngestOptions) -> Result<Self, AppError> {
        let data = load_records(&source, &options)?;
        Ok(Self {
            source,
            options,
            snapshot: data.records.into(),
            filters: FilterSet::default(),
        })
    }

    /// A session over records that are already in memory.
    pub fn from_records(source: DataSource, records: Vec<SalesRecord>) -> Self {
        Self {
            source,
            options: IngestOptions::default(),
            snapshot: records.into(),
            filters: FilterSet::default(),
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// The current snapshot. Later reloads do not affect the returned handle.
    pub fn snapshot(&self) -> Arc<[SalesRecord]> {
        Arc::clone(&self.snapshot)
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.snapshot
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterSet) {
        tracing::debug!(filters = %filters, "filters updated");
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterSet::default();
    }

    /// The snapshot narrowed by the active filters.
    pub fn view(&self) -> Vec<SalesRecord> {
        filter::apply(&self.snapshot, &self.filters)
    }

    /// Re-read the current source. Returns the new row count.
    pub fn reload(&mut self) -> Result<usize, AppError> {
        let data = load_records(&self.source, &self.options)?;
        Ok(self.install(data))
    }

    /// Switch to a different source. On failure the session is unchanged.
    pub fn load_from(&mut self, source: DataSource) -> Result<usize, AppError> {
        let data = load_records(&source, &self.options)?;
        self.source = source;
        Ok(self.install(data))
    }

    /// Replace the dataset with already-fetched text (e.g. an upload).
    pub fn replace_with_text(&mut self, text: &str) -> Result<usize, AppError> {
        let data = parse_records(text, &self.options)?;
        Ok(self.install(data))
    }

    fn install(&mut self, data: IngestedData) -> usize {
        let rows = data.records.len();
        self.snapshot = data.records.into();
        self.clear_filters();
        tracing::info!(source = %self.source, rows, "dataset replaced; filters reset");
        rows
    }
}
