//! Analyzer configuration. Every section has defaults matching the built-in heuristics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ingest::DataSource;

pub const DEFAULT_SOURCE_URL: &str =
    "https://s3.eu-central-1.amazonaws.com/public.prod.usetandem.ai/sessions.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Where the NDJSON event log comes from
    pub source: SourceConfig,
    /// Funnel / flow statistics parameters
    pub flows: FlowsConfig,
    /// Anomaly heuristics
    pub anomalies: AnomalyConfig,
    /// Report output
    pub report: ReportConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Remote NDJSON location
    pub url: String,
    /// Local NDJSON file; takes precedence over `url` when set
    pub path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowsConfig {
    pub checkout_path: String,
    /// Case-folded phrase a checkout event's text must contain to count as an order
    pub success_phrase: String,
    /// Case-folded markers in css or text that disqualify a checkout event
    pub failure_markers: Vec<String>,
    pub product_prefix: String,
    /// Adjacent-event deltas at or above this are not counted as dwell time
    pub max_dwell_secs: f64,
    pub sequence_separator: String,
    pub top_patterns: usize,
    pub top_exit_points: usize,
    pub top_entry_points: usize,
    pub top_products: usize,
    pub top_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Gaps strictly longer than this are idle gaps
    pub idle_gap_secs: f64,
    /// More idle gaps than this escalates severity to High
    pub high_gap_count: usize,
    pub gap_examples: usize,
    pub error_keywords: Vec<String>,
    pub error_texts_per_page: usize,
    /// Standard deviations above the mean session length before a session is flagged
    pub length_sigma: f64,
    pub unusual_session_examples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub html_path: PathBuf,
    /// Optional machine-readable copy of the report
    pub json_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            path: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            checkout_path: "/checkout".to_string(),
            success_phrase: "place order".to_string(),
            failure_markers: vec!["error".to_string(), "cancel".to_string()],
            product_prefix: "/products/".to_string(),
            max_dwell_secs: 1800.0,
            sequence_separator: " → ".to_string(),
            top_patterns: 3,
            top_exit_points: 5,
            top_entry_points: 5,
            top_products: 10,
            top_pages: 10,
        }
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            idle_gap_secs: 300.0,
            high_gap_count: 10,
            gap_examples: 3,
            error_keywords: ["error", "404", "timeout", "failed", "invalid", "missing"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            error_texts_per_page: 3,
            length_sigma: 2.0,
            unusual_session_examples: 5,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            html_path: PathBuf::from("user_flow_report.html"),
            json_path: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SourceConfig {
    /// Resolve to a concrete data source; a local path wins over the URL.
    pub fn data_source(&self) -> DataSource {
        match &self.path {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Http {
                url: self.url.clone(),
                timeout: Duration::from_secs(self.timeout_secs),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            },
        }
    }
}

impl AnalyzerConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<AnalyzerConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Apply `FLOWSCOPE_*` environment overrides on top of the loaded file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("FLOWSCOPE_SOURCE_URL") {
            self.source.url = url;
            self.source.path = None;
        }
        if let Ok(path) = std::env::var("FLOWSCOPE_SOURCE_PATH") {
            self.source.path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("FLOWSCOPE_REPORT_PATH") {
            self.report.html_path = PathBuf::from(path);
        }
        self
    }
}
