//! Per-session facts the flow statistics are folded from.

use crate::config::FlowsConfig;
use crate::sessions::Session;

use super::checkout::is_successful_checkout;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary<'a> {
    pub successful: bool,
    pub paths: Vec<&'a str>,
    /// Distinct product paths, first-seen order
    pub products: Vec<&'a str>,
    /// (earlier page, seconds until next event) for representative deltas only
    pub dwell: Vec<(&'a str, f64)>,
}

impl<'a> SessionSummary<'a> {
    pub fn of(session: &Session<'a>, config: &FlowsConfig) -> Self {
        let paths = session.path_sequence();

        let mut products: Vec<&'a str> = Vec::new();
        for &p in &paths {
            if p.starts_with(config.product_prefix.as_str()) && !products.contains(&p) {
                products.push(p);
            }
        }

        let dwell = session
            .steps()
            .filter(|s| s.secs > 0.0 && s.secs < config.max_dwell_secs)
            .map(|s| (s.from.path.as_str(), s.secs))
            .collect();

        Self {
            successful: is_successful_checkout(session, config),
            paths,
            products,
            dwell,
        }
    }

    pub fn entry(&self) -> Option<&'a str> {
        self.paths.first().copied()
    }

    pub fn exit(&self) -> Option<&'a str> {
        self.paths.last().copied()
    }
}
