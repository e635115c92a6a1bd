//! Linear forecasting over monthly aggregates.

pub mod projection;
pub mod trend;

pub use projection::*;
pub use trend::*;
