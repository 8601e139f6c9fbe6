//! Flow analyzer: funnel outcome, exit and entry points, product popularity
//! and page dwell time, folded from per-session summaries.

mod checkout;
mod summary;

pub use checkout::{is_order_placement, is_successful_checkout};
pub use summary::SessionSummary;

use std::collections::HashMap;
use tracing::info;

use crate::config::FlowsConfig;
use crate::findings::{
    AbandonmentDetail, DwellTimeDetail, EntryPointDetail, FlowDetail, FlowFinding, FlowPattern, PageCount,
    PageDwell, ProductDetail, SuccessfulFlowsDetail,
};
use crate::sessions::SessionIndex;
use crate::stats::{mean, FrequencyCounter, Percent, Seconds};

pub struct FlowAnalyzer {
    config: FlowsConfig,
}

/// Running totals across sessions.
#[derive(Default)]
struct FlowTotals {
    sessions: usize,
    successful: usize,
    abandoned: usize,
    patterns: FrequencyCounter,
    pattern_steps: HashMap<String, Vec<String>>,
    exits: FrequencyCounter,
    entries: FrequencyCounter,
    products: FrequencyCounter,
    product_sessions: usize,
    dwell_order: Vec<String>,
    dwell: HashMap<String, Vec<f64>>,
}

impl FlowTotals {
    fn absorb(&mut self, s: SessionSummary<'_>, separator: &str) {
        self.sessions += 1;
        if s.successful {
            self.successful += 1;
            let joined = s.paths.join(separator);
            self.patterns.add(&joined);
            self.pattern_steps
                .entry(joined)
                .or_insert_with(|| s.paths.iter().map(|p| p.to_string()).collect());
        } else {
            self.abandoned += 1;
            if let Some(exit) = s.exit() {
                self.exits.add(exit);
            }
        }
        if let Some(entry) = s.entry() {
            self.entries.add(entry);
        }
        if !s.products.is_empty() {
            self.product_sessions += 1;
        }
        for product in &s.products {
            self.products.add(product);
        }
        for (page, secs) in s.dwell {
            match self.dwell.get_mut(page) {
                Some(v) => v.push(secs),
                None => {
                    self.dwell_order.push(page.to_string());
                    self.dwell.insert(page.to_string(), vec![secs]);
                }
            }
        }
    }
}

fn page_counts(counter: &FrequencyCounter, n: usize) -> Vec<PageCount> {
    counter.most_common(n).into_iter().map(PageCount::from).collect()
}

impl FlowAnalyzer {
    pub fn new(config: FlowsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlowsConfig {
        &self.config
    }

    /// Produce flow findings in report order. Categories with no data are omitted.
    pub fn analyze(&self, index: &SessionIndex) -> Vec<FlowFinding> {
        let mut totals = FlowTotals::default();
        for session in index.sessions() {
            totals.absorb(SessionSummary::of(&session, &self.config), &self.config.sequence_separator);
        }

        let mut flows = Vec::new();
        flows.extend(self.successful_flows(&totals));
        flows.extend(self.abandonment(&totals));
        flows.extend(self.entry_points(&totals));
        flows.extend(self.products(&totals));
        flows.extend(self.dwell_time(&totals));

        info!(
            sessions = totals.sessions,
            successful = totals.successful,
            abandoned = totals.abandoned,
            findings = flows.len(),
            "flow analysis complete"
        );
        flows
    }

    fn successful_flows(&self, t: &FlowTotals) -> Option<FlowFinding> {
        if t.successful == 0 {
            return None;
        }
        let most_common_patterns = t
            .patterns
            .most_common(self.config.top_patterns)
            .into_iter()
            .map(|(joined, count)| FlowPattern {
                steps: t.pattern_steps.get(&joined).cloned().unwrap_or_default(),
                count,
            })
            .collect();
        Some(FlowFinding {
            title: "Successful Purchase Flows".to_string(),
            description: format!("Found {} successful checkout sessions", t.successful),
            detail: FlowDetail::SuccessfulFlows(SuccessfulFlowsDetail {
                total_successful: t.successful,
                most_common_patterns,
                conversion_rate: Percent::of(t.successful, t.sessions),
            }),
        })
    }

    fn abandonment(&self, t: &FlowTotals) -> Option<FlowFinding> {
        if t.abandoned == 0 {
            return None;
        }
        Some(FlowFinding {
            title: "Flow Abandonment Patterns".to_string(),
            description: format!("Analyzed {} abandoned sessions", t.abandoned),
            detail: FlowDetail::Abandonment(AbandonmentDetail {
                total_abandoned: t.abandoned,
                common_exit_points: page_counts(&t.exits, self.config.top_exit_points),
                abandonment_rate: Percent::of(t.abandoned, t.sessions),
            }),
        })
    }

    fn entry_points(&self, t: &FlowTotals) -> Option<FlowFinding> {
        if t.entries.is_empty() {
            return None;
        }
        Some(FlowFinding {
            title: "User Entry Points".to_string(),
            description: "Most common starting pages for user sessions".to_string(),
            detail: FlowDetail::EntryPoints(EntryPointDetail {
                top_entry_points: page_counts(&t.entries, self.config.top_entry_points),
            }),
        })
    }

    fn products(&self, t: &FlowTotals) -> Option<FlowFinding> {
        if t.products.is_empty() {
            return None;
        }
        Some(FlowFinding {
            title: "Most Consulted Products".to_string(),
            description: format!("Analysis of products viewed across {} user sessions", t.product_sessions),
            detail: FlowDetail::Products(ProductDetail {
                product_sessions: t.product_sessions,
                total_product_views: t.products.total(),
                unique_products: t.products.len(),
                top_products: page_counts(&t.products, self.config.top_products),
            }),
        })
    }

    fn dwell_time(&self, t: &FlowTotals) -> Option<FlowFinding> {
        let mut averages: Vec<(&str, f64)> = t
            .dwell_order
            .iter()
            .filter_map(|page| mean(t.dwell.get(page)?).map(|avg| (page.as_str(), avg)))
            .collect();
        if averages.is_empty() {
            return None;
        }
        let values: Vec<f64> = averages.iter().map(|(_, avg)| *avg).collect();
        let overall = mean(&values).unwrap_or(0.0);

        averages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let longest_activity_pages = averages
            .iter()
            .take(self.config.top_pages)
            .map(|(page, avg)| PageDwell {
                page: page.to_string(),
                average: Seconds(*avg),
            })
            .collect();

        Some(FlowFinding {
            title: "Pages with Longest Activity".to_string(),
            description: format!("Analysis of user time spent on {} different pages", averages.len()),
            detail: FlowDetail::DwellTime(DwellTimeDetail {
                total_pages_analyzed: averages.len(),
                longest_activity_pages,
                average_page_time: Seconds(overall),
            }),
        })
    }
}
