//! Sessions with an outlying number of events.

use crate::config::AnomalyConfig;
use crate::findings::{AnomalyDetail, AnomalyFinding, UnusualSession, UnusualSessionDetail};
use crate::sessions::SessionIndex;
use crate::stats::{mean, sample_stdev};

use super::Severity;

/// Mean session length and the flagging threshold. Below two sessions there
/// is no deviation to speak of and the threshold falls back to twice the mean.
pub fn length_threshold(lengths: &[f64], sigma: f64) -> Option<(f64, f64)> {
    let avg = mean(lengths)?;
    let threshold = match sample_stdev(lengths) {
        Some(sd) => avg + sigma * sd,
        None => avg * 2.0,
    };
    Some((avg, threshold))
}

pub fn detect(index: &SessionIndex, config: &AnomalyConfig) -> Option<AnomalyFinding> {
    let lengths: Vec<f64> = index.sessions().map(|s| s.len() as f64).collect();
    let (avg, threshold) = length_threshold(&lengths, config.length_sigma)?;

    let flagged: Vec<UnusualSession> = index
        .sessions()
        .filter(|s| s.len() as f64 > threshold)
        .map(|s| UnusualSession {
            user_id: s.user_id.to_string(),
            session_id: s.session_id.to_string(),
            event_count: s.len(),
            duration_minutes: s.duration_minutes(),
        })
        .collect();
    if flagged.is_empty() {
        return None;
    }

    let count = flagged.len();
    let examples = flagged.into_iter().take(config.unusual_session_examples).collect();
    Some(AnomalyFinding {
        title: "Unusual Session Activity".to_string(),
        description: format!("Found {} sessions with unusually high activity", count),
        severity: Severity::Medium,
        detail: AnomalyDetail::UnusualSessions(UnusualSessionDetail {
            flagged: count,
            average_session_length: avg,
            threshold,
            examples,
        }),
    })
}
