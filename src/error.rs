//! Crate-wide error type.
//!
//! Every fallible operation returns `AppError`. The binary maps each variant to
//! a process exit code:
//!
//! - `2`: bad input (unreadable file, unusable CSV, invalid arguments)
//! - `3`: not enough data to produce the requested output
//! - `4`: runtime failures (network, writing exports)

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse sales data: {0}")]
    Parse(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Failed to write '{}': {message}", path.display())]
    Export { path: PathBuf, message: String },
}

impl AppError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn export(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Export {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Io { .. } | AppError::Parse(_) | AppError::InvalidInput(_) => 2,
            AppError::InsufficientData(_) => 3,
            AppError::Fetch { .. } | AppError::Export { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(AppError::parse("bad header").exit_code(), 2);
        assert_eq!(AppError::invalid("month must be 1-12").exit_code(), 2);
        assert_eq!(AppError::InsufficientData("empty".into()).exit_code(), 3);
        assert_eq!(AppError::export("out.json", "disk full").exit_code(), 4);
    }

    #[test]
    fn display_includes_path() {
        let err = AppError::Io {
            path: PathBuf::from("ventas.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("ventas.csv"));
    }
}
