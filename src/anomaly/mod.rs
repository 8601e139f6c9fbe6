//! Heuristic anomaly signals: idle gaps, error keywords, outlying session length.
//! Thresholds are fixed heuristics from [`AnomalyConfig`], not learned.

mod errors;
mod idle;
mod length;
mod severity;

pub use errors::mentions_error;
pub use idle::collect_gaps;
pub use length::length_threshold;
pub use severity::Severity;

use tracing::info;

use crate::config::AnomalyConfig;
use crate::findings::AnomalyFinding;
use crate::sessions::SessionIndex;

pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Run the three detectors in report order; each yields at most one finding.
    pub fn detect(&self, index: &SessionIndex) -> Vec<AnomalyFinding> {
        let anomalies: Vec<AnomalyFinding> = [
            idle::detect(index, &self.config),
            errors::detect(index.events(), &self.config),
            length::detect(index, &self.config),
        ]
        .into_iter()
        .flatten()
        .collect();

        info!(
            findings = anomalies.len(),
            high = anomalies.iter().filter(|a| a.severity == Severity::High).count(),
            "anomaly detection complete"
        );
        anomalies
    }
}
