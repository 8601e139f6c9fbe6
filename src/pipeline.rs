//! Analysis pipeline: NDJSON → validated events → sorted → sessions → flows + anomalies.

use tracing::info;

use crate::anomaly::AnomalyDetector;
use crate::config::AnalyzerConfig;
use crate::findings::{AnomalyFinding, FlowFinding};
use crate::flows::FlowAnalyzer;
use crate::ingest::{load_events, Event, LoadStats};
use crate::report::RunSummary;
use crate::sessions::SessionIndex;

/// Everything one run produced. Owned by the caller; nothing is shared.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub load: LoadStats,
    pub index: SessionIndex,
    pub flows: Vec<FlowFinding>,
    pub anomalies: Vec<AnomalyFinding>,
}

impl AnalysisRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_events: self.index.event_count(),
            total_users: self.index.user_count(),
            total_sessions: self.index.session_count(),
            avg_sessions_per_user: self.index.avg_sessions_per_user(),
            rejected_records: self.load.rejected,
            anomalies_detected: self.anomalies.len(),
        }
    }
}

pub struct FlowPipeline {
    flows: FlowAnalyzer,
    anomalies: AnomalyDetector,
}

impl FlowPipeline {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            flows: FlowAnalyzer::new(config.flows.clone()),
            anomalies: AnomalyDetector::new(config.anomalies.clone()),
        }
    }

    /// Run over a raw NDJSON blob.
    pub fn run(&self, text: &str) -> AnalysisRun {
        let (events, load) = load_events(text);
        self.run_events(events, load)
    }

    /// Run over already-validated events in any order.
    pub fn run_events(&self, events: Vec<Event>, load: LoadStats) -> AnalysisRun {
        let index = SessionIndex::from_unsorted(events);
        let flows = self.flows.analyze(&index);
        let anomalies = self.anomalies.detect(&index);
        info!(
            events = index.event_count(),
            flows = flows.len(),
            anomalies = anomalies.len(),
            "analysis complete"
        );
        AnalysisRun {
            load,
            index,
            flows,
            anomalies,
        }
    }
}
