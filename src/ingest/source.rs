//! Data acquisition: fetch the NDJSON blob over HTTP or read it from disk.
//! One blocking attempt; any failure is fatal to the run.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::{AnalyzerError, AnalyzerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http {
        url: String,
        timeout: Duration,
        connect_timeout: Duration,
    },
    File(PathBuf),
}

impl DataSource {
    /// Human-readable location for logs and error messages.
    pub fn location(&self) -> String {
        match self {
            DataSource::Http { url, .. } => url.clone(),
            DataSource::File(path) => path.display().to_string(),
        }
    }

    fn unavailable(&self, reason: impl ToString) -> AnalyzerError {
        AnalyzerError::SourceUnavailable {
            location: self.location(),
            reason: reason.to_string(),
        }
    }

    /// Fetch the whole blob. No retry.
    pub fn fetch(&self) -> AnalyzerResult<String> {
        info!(location = %self.location(), "loading event data");
        let body = match self {
            DataSource::Http {
                url,
                timeout,
                connect_timeout,
            } => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(*timeout)
                    .connect_timeout(*connect_timeout)
                    .build()
                    .map_err(|e| self.unavailable(e))?;
                let res = client.get(url).send().map_err(|e| self.unavailable(e))?;
                if !res.status().is_success() {
                    return Err(self.unavailable(format!("HTTP {}", res.status())));
                }
                res.text().map_err(|e| self.unavailable(e))?
            }
            DataSource::File(path) => std::fs::read_to_string(path).map_err(|e| self.unavailable(e))?,
        };
        info!(bytes = body.len(), "event data loaded");
        Ok(body)
    }
}

/// Hex SHA-256 of the raw input, stamped into the report.
pub fn source_digest(text: &str) -> String {
    let mut h = Sha256::new();
    h.update(text.as_bytes());
    format!("{:x}", h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_source_reads_contents() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"user_id":"u"}}"#).unwrap();
        let src = DataSource::File(f.path().to_path_buf());
        assert!(src.fetch().unwrap().contains("user_id"));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let src = DataSource::File(dir.path().join("absent.ndjson"));
        match src.fetch() {
            Err(AnalyzerError::SourceUnavailable { location, .. }) => {
                assert!(location.ends_with("absent.ndjson"))
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn digest_is_stable_sha256() {
        assert_eq!(
            source_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(source_digest("abc"), source_digest("abc"));
        assert_ne!(source_digest("abc"), source_digest("abd"));
    }
}
