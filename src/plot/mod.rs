pub mod ascii;

pub use ascii::*;
