//! Event ingestion: NDJSON lines → validated, typed events.
//! Validation is the only place optional fields are defaulted.

mod source;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::RejectReason;

pub use source::{source_digest, DataSource};

/// One observed user interaction. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub user_id: String,
    /// Only unique within `user_id`
    pub session_id: String,
    pub event_time: DateTime<Utc>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Event {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        event_time: DateTime<Utc>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            event_time,
            path: path.into(),
            css: None,
            text: None,
        }
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Lower-cased css, empty when absent.
    pub fn css_folded(&self) -> String {
        self.css.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Lower-cased text, empty when absent.
    pub fn text_folded(&self) -> String {
        self.text.as_deref().unwrap_or_default().to_lowercase()
    }
}

/// Accept a timestamp the way the event log writes them: ISO-8601 with an
/// optional trailing `Z` or numeric offset. Offset-less values are UTC.
pub fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };
    let s = normalized.as_str();

    const WITH_OFFSET: [&str; 8] = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M%:z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%d %H:%M%z",
    ];
    for fmt in WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    const NAIVE: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

fn required<'a>(obj: &'a serde_json::Map<String, Value>, field: &'static str) -> Result<&'a Value, RejectReason> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(RejectReason::MissingField(field)),
        Some(v) => Ok(v),
    }
}

/// Any non-null value identifies a user or session. Strings are taken as-is,
/// everything else by its JSON text.
fn identifier(obj: &serde_json::Map<String, Value>, field: &'static str) -> Result<String, RejectReason> {
    match required(obj, field)? {
        Value::String(s) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}

fn optional_string(obj: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Validate a loosely-typed record into an [`Event`].
pub fn validate(raw: &Value) -> Result<Event, RejectReason> {
    let obj = raw.as_object().ok_or(RejectReason::NotAnObject)?;

    // Presence of all required fields is checked before any type checks.
    for field in ["user_id", "session_id", "event_time", "path"] {
        required(obj, field)?;
    }

    let user_id = identifier(obj, "user_id")?;
    let session_id = identifier(obj, "session_id")?;
    let path = required(obj, "path")?
        .as_str()
        .ok_or(RejectReason::InvalidField("path"))?
        .to_string();
    let event_time = required(obj, "event_time")?
        .as_str()
        .and_then(parse_event_time)
        .ok_or(RejectReason::InvalidTimestamp)?;

    Ok(Event {
        user_id,
        session_id,
        event_time,
        path,
        css: optional_string(obj, "css"),
        text: optional_string(obj, "text"),
    })
}

/// Parse and validate one NDJSON line.
pub fn parse_line(line: &str) -> Result<Event, RejectReason> {
    let raw: Value = serde_json::from_str(line).map_err(|_| RejectReason::MalformedJson)?;
    validate(&raw)
}

/// Outcome counts of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub valid: usize,
    pub rejected: usize,
    pub by_reason: HashMap<RejectReason, usize>,
}

impl LoadStats {
    fn reject(&mut self, reason: RejectReason) {
        self.rejected += 1;
        *self.by_reason.entry(reason).or_insert(0) += 1;
    }
}

/// Validate every non-blank line of an NDJSON blob. Rejections are counted, never fatal.
pub fn load_events(text: &str) -> (Vec<Event>, LoadStats) {
    let mut events = Vec::new();
    let mut stats = LoadStats::default();

    for (lineno, line) in text.trim().split('\n').enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(event) => {
                events.push(event);
                stats.valid += 1;
            }
            Err(reason) => {
                debug!(line = lineno + 1, %reason, "rejected record");
                stats.reject(reason);
            }
        }
    }

    info!(valid = stats.valid, rejected = stats.rejected, "loaded events");
    if stats.valid == 0 {
        warn!("no valid events to process");
    }
    (events, stats)
}

/// Stable sort by instant; equal timestamps keep input order.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by_key(|e| e.event_time);
}
