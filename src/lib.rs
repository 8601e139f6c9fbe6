//! flowscope: session reconstruction and flow / anomaly analysis over user interaction logs.
//!
//! Modular structure:
//! - [`ingest`]: NDJSON loading, event validation, data source
//! - [`sessions`]: Per-user, per-session grouping
//! - [`flows`]: Funnel, exit/entry, product and dwell-time statistics
//! - [`anomaly`]: Idle gap, error keyword and session length signals
//! - [`pipeline`]: End-to-end analysis run
//! - [`report`]: HTML and JSON report rendering
//! - [`logging`]: Structured logging

pub mod config;
pub mod error;
pub mod ingest;
pub mod sessions;
pub mod stats;
pub mod findings;
pub mod flows;
pub mod anomaly;
pub mod pipeline;
pub mod report;
pub mod logging;

pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, RejectReason};
pub use ingest::{DataSource, Event};
pub use sessions::{Session, SessionIndex};
pub use flows::FlowAnalyzer;
pub use anomaly::{AnomalyDetector, Severity};
pub use findings::{AnomalyFinding, FlowFinding};
pub use pipeline::{AnalysisRun, FlowPipeline};
pub use report::{HtmlReporter, Report, ReportRenderer};
pub use logging::StructuredLogger;
