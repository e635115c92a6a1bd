//! Input/output helpers.
//!
//! - raw dataset access, file or URL (`source`)
//! - CSV parsing into records (`ingest`)
//! - CSV/JSON exports (`export`)

pub mod export;
pub mod ingest;
pub mod source;

pub use export::*;
pub use ingest::*;
pub use source::*;
