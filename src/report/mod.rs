//! Report assembly and output. Renderers only present findings; they never
//! compute anything the analyzers did not.

mod html;

pub use html::HtmlReporter;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::error::AnalyzerResult;
use crate::findings::{AnomalyFinding, FlowFinding};
use crate::pipeline::AnalysisRun;

/// Headline counts shown above the findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_events: usize,
    pub total_users: usize,
    pub total_sessions: usize,
    pub avg_sessions_per_user: f64,
    pub rejected_records: usize,
    pub anomalies_detected: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    /// SHA-256 of the raw input
    pub source_digest: String,
    pub summary: RunSummary,
    pub flows: Vec<FlowFinding>,
    pub anomalies: Vec<AnomalyFinding>,
}

impl Report {
    pub fn new(run: &AnalysisRun, source: impl Into<String>, source_digest: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source: source.into(),
            source_digest: source_digest.into(),
            summary: run.summary(),
            flows: run.flows.clone(),
            anomalies: run.anomalies.clone(),
        }
    }
}

pub trait ReportRenderer {
    fn render(&self, report: &Report) -> AnalyzerResult<String>;
}

/// Pretty-printed JSON copy of the whole report.
pub struct JsonReporter;

impl ReportRenderer for JsonReporter {
    fn render(&self, report: &Report) -> AnalyzerResult<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// Write rendered output, creating parent directories as needed.
pub fn write_report(path: &Path, contents: &str) -> AnalyzerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    info!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}
