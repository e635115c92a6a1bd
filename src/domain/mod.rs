//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - parsed dataset rows (`SalesRecord`)
//! - the active view filter (`FilterSet`)
//! - forecast building blocks (`MonthlyBucket`, `RegressionModel`, `Projection`)
//! - run configuration (`ReportConfig`, `DataSource`)

pub mod types;

pub use types::*;
