//! Raw dataset access: local files and remote URLs.
//!
//! Both paths return the full text or an error; nothing is parsed here.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::DataSource;
use crate::error::AppError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Read the whole dataset text from `source`.
pub fn read_text(source: &DataSource) -> Result<String, AppError> {
    match source {
        DataSource::Path(path) => {
            tracing::debug!(path = %path.display(), "reading sales file");
            std::fs::read_to_string(path).map_err(|source| AppError::Io {
                path: path.clone(),
                source,
            })
        }
        DataSource::Url(url) => fetch_text(url),
    }
}

fn fetch_text(url: &str) -> Result<String, AppError> {
    tracing::debug!(%url, "fetching sales file");
    let fetch_err = |message: String| AppError::Fetch {
        url: url.to_string(),
        message,
    };

    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| fetch_err(format!("failed to build HTTP client: {e}")))?;

    let resp = client
        .get(url)
        .send()
        .map_err(|e| fetch_err(format!("request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(fetch_err(format!("request failed with status {}", resp.status())));
    }

    resp.text()
        .map_err(|e| fetch_err(format!("failed to read response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Producto;Total\nCafe;3\n").unwrap();
        let text = read_text(&DataSource::Path(file.path().to_path_buf())).unwrap();
        assert!(text.starts_with("Producto"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_text(&DataSource::Path("/nonexistent/ventas.csv".into())).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
