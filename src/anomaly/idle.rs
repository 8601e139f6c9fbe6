//! Long idle gaps between consecutive events of a session.

use std::collections::HashMap;

use crate::config::AnomalyConfig;
use crate::findings::{AnomalyDetail, AnomalyFinding, IdleGap, IdleGapDetail, PageGaps};
use crate::sessions::SessionIndex;
use crate::stats::{mean, Minutes};

use super::Severity;

/// Every gap longer than the idle threshold, in session order.
pub fn collect_gaps(index: &SessionIndex, config: &AnomalyConfig) -> Vec<IdleGap> {
    let threshold = config.idle_gap_secs;
    index
        .sessions()
        .filter(|s| s.len() >= 2)
        .flat_map(move |s| {
            s.steps().filter(move |step| step.secs > threshold).map(move |step| IdleGap {
                user_id: s.user_id.to_string(),
                session_id: s.session_id.to_string(),
                gap_minutes: step.secs / 60.0,
                stuck_on_page: step.from.path.clone(),
                next_page: step.to.path.clone(),
            })
        })
        .collect()
}

/// Per stuck-on page: instance count and longest gap, first-seen page order.
fn page_breakdown(gaps: &[IdleGap]) -> Vec<PageGaps> {
    let mut pages: Vec<(&str, usize, f64)> = Vec::new();
    let mut by_page: HashMap<&str, usize> = HashMap::new();
    for g in gaps {
        match by_page.get(g.stuck_on_page.as_str()) {
            Some(&i) => {
                let entry = &mut pages[i];
                entry.1 += 1;
                entry.2 = entry.2.max(g.gap_minutes);
            }
            None => {
                by_page.insert(g.stuck_on_page.as_str(), pages.len());
                pages.push((g.stuck_on_page.as_str(), 1, g.gap_minutes));
            }
        }
    }
    pages
        .into_iter()
        .map(|(page, instances, longest)| PageGaps {
            page: page.to_string(),
            instances,
            longest: Minutes(longest),
        })
        .collect()
}

pub fn detect(index: &SessionIndex, config: &AnomalyConfig) -> Option<AnomalyFinding> {
    let mut gaps = collect_gaps(index, config);
    if gaps.is_empty() {
        return None;
    }

    let page_breakdown = page_breakdown(&gaps);
    let minutes: Vec<f64> = gaps.iter().map(|g| g.gap_minutes).collect();
    let average = mean(&minutes).unwrap_or(0.0);

    gaps.sort_by(|a, b| b.gap_minutes.partial_cmp(&a.gap_minutes).unwrap_or(std::cmp::Ordering::Equal));
    let longest = gaps[0].gap_minutes;
    let total = gaps.len();
    gaps.truncate(config.gap_examples);

    Some(AnomalyFinding {
        title: "User Confusion / Long Delays".to_string(),
        description: format!(
            "Found {} instances of users spending >{} minutes on a page",
            total,
            config.idle_gap_secs / 60.0
        ),
        severity: Severity::from_count(total, config.high_gap_count),
        detail: AnomalyDetail::IdleGaps(IdleGapDetail {
            total_instances: total,
            average_gap: Minutes(average),
            longest_gap: Minutes(longest),
            page_breakdown,
            examples: gaps,
        }),
    })
}
