//! Log setup plus one-JSON-object-per-line finding records for downstream ingestion.

use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::findings::AnomalyFinding;

#[derive(Serialize)]
pub struct FindingLine<'a> {
    pub ts: String,
    pub kind: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<&'a str>,
}

impl<'a> FindingLine<'a> {
    pub fn anomaly(finding: &'a AnomalyFinding, ts: String, run_id: Option<&'a str>) -> Self {
        Self {
            ts,
            kind: "anomaly",
            title: &finding.title,
            description: &finding.description,
            severity: Some(finding.severity.as_str()),
            run_id,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber on stderr, level from RUST_LOG or `default_level`.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    /// Emit a single structured line without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(w, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::Severity;
    use crate::findings::{AnomalyDetail, ErrorDetail};

    #[test]
    fn emits_one_json_object_per_line() {
        let finding = AnomalyFinding {
            title: "Technical Errors".into(),
            description: "Found 2 events with error-related keywords".into(),
            severity: Severity::High,
            detail: AnomalyDetail::TechnicalErrors(ErrorDetail {
                total_errors: 2,
                page_breakdown: Vec::new(),
            }),
        };
        let mut buf = Vec::new();
        StructuredLogger::emit_json(&FindingLine::anomaly(&finding, "t0".into(), None), &mut buf);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        let v: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(v["severity"], "High");
        assert_eq!(v["kind"], "anomaly");
        assert!(v.get("run_id").is_none());
    }
}
