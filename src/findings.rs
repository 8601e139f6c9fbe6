//! Findings handed to the reporter. Each analysis category has its own
//! detail variant so renderers dispatch on type rather than key names.

use serde::Serialize;

use crate::anomaly::Severity;
use crate::stats::{Minutes, Percent, Seconds};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowFinding {
    pub title: String,
    pub description: String,
    pub detail: FlowDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyFinding {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub detail: AnomalyDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowDetail {
    SuccessfulFlows(SuccessfulFlowsDetail),
    Abandonment(AbandonmentDetail),
    EntryPoints(EntryPointDetail),
    Products(ProductDetail),
    DwellTime(DwellTimeDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyDetail {
    IdleGaps(IdleGapDetail),
    TechnicalErrors(ErrorDetail),
    UnusualSessions(UnusualSessionDetail),
}

/// A page (or product path) and how many times it was counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCount {
    pub page: String,
    pub count: usize,
}

impl From<(String, usize)> for PageCount {
    fn from((page, count): (String, usize)) -> Self {
        Self { page, count }
    }
}

/// A full session path sequence and how many successful sessions followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowPattern {
    pub steps: Vec<String>,
    pub count: usize,
}

impl FlowPattern {
    pub fn joined(&self, separator: &str) -> String {
        self.steps.join(separator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessfulFlowsDetail {
    pub total_successful: usize,
    pub most_common_patterns: Vec<FlowPattern>,
    pub conversion_rate: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbandonmentDetail {
    pub total_abandoned: usize,
    pub common_exit_points: Vec<PageCount>,
    pub abandonment_rate: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryPointDetail {
    pub top_entry_points: Vec<PageCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    /// Sessions that viewed at least one product
    pub product_sessions: usize,
    /// Distinct (session, product) pairs
    pub total_product_views: usize,
    pub unique_products: usize,
    pub top_products: Vec<PageCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDwell {
    pub page: String,
    pub average: Seconds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DwellTimeDetail {
    pub total_pages_analyzed: usize,
    pub longest_activity_pages: Vec<PageDwell>,
    pub average_page_time: Seconds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdleGap {
    pub user_id: String,
    pub session_id: String,
    pub gap_minutes: f64,
    pub stuck_on_page: String,
    pub next_page: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageGaps {
    pub page: String,
    pub instances: usize,
    pub longest: Minutes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdleGapDetail {
    pub total_instances: usize,
    pub average_gap: Minutes,
    pub longest_gap: Minutes,
    pub page_breakdown: Vec<PageGaps>,
    pub examples: Vec<IdleGap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextCount {
    pub text: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSamples {
    /// Most frequent error texts on the page
    Texts(Vec<TextCount>),
    /// No event on the page carried text; count of css-only matches
    CssOnly(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageErrors {
    pub page: String,
    pub errors: usize,
    pub samples: ErrorSamples,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub total_errors: usize,
    pub page_breakdown: Vec<PageErrors>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusualSession {
    pub user_id: String,
    pub session_id: String,
    pub event_count: usize,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusualSessionDetail {
    pub flagged: usize,
    pub average_session_length: f64,
    pub threshold: f64,
    pub examples: Vec<UnusualSession>,
}
