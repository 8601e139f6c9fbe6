//! Error types: fatal run errors and per-record rejection reasons.

use thiserror::Error;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The data source could not be fetched or read.
    #[error("source unavailable ({location}): {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// Writing the rendered report failed.
    #[error("report write failed: {0}")]
    Report(#[from] std::io::Error),

    /// JSON export of the report failed.
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Why a raw input line did not become an [`Event`](crate::ingest::Event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RejectReason {
    #[error("line is not valid JSON")]
    MalformedJson,
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("required field `{0}` is missing or null")]
    MissingField(&'static str),
    #[error("field `{0}` has an unsupported type")]
    InvalidField(&'static str),
    #[error("event_time is not an ISO-8601 instant")]
    InvalidTimestamp,
}
