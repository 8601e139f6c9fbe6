//! Static HTML rendering of a [`Report`].

use std::fmt::Write as _;

use super::{Report, ReportRenderer};
use crate::error::AnalyzerResult;
use crate::findings::{AnomalyDetail, AnomalyFinding, ErrorSamples, FlowDetail, FlowFinding, PageCount};

const STYLE: &str = r#"
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f5f5; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 10px; margin-bottom: 30px; }
.header h1 { margin: 0; font-size: 2.5em; }
.section { background: white; margin: 20px 0; padding: 25px; border-radius: 10px; }
.section h2 { color: #667eea; border-bottom: 2px solid #667eea; padding-bottom: 10px; margin-top: 0; }
.flow-item, .anomaly-item { background: #f8f9fa; border-left: 4px solid #667eea; padding: 15px; margin: 15px 0; border-radius: 5px; }
.anomaly-item.high { border-left-color: #c0392b; background: #fdf2f2; }
.anomaly-item.medium { border-left-color: #f39c12; background: #fef9e7; }
.title { font-size: 1.3em; font-weight: bold; color: #2c3e50; margin-bottom: 8px; }
.description { color: #7f8c8d; margin-bottom: 15px; }
.details { background: white; padding: 15px; border-radius: 5px; margin-top: 10px; }
.metric { display: inline-block; background: #667eea; color: white; padding: 8px 15px; border-radius: 20px; margin: 5px; font-weight: bold; }
.metric.success { background: #27ae60; }
.metric.warning { background: #f39c12; }
.metric.danger { background: #e74c3c; }
.chip { background: #667eea; color: white; padding: 4px 12px; border-radius: 20px; font-size: 0.85em; }
.arrow { color: #7f8c8d; font-weight: bold; margin: 0 4px; }
.pattern { margin: 10px 0; padding: 12px; background: #f8f9fa; border-radius: 8px; border-left: 4px solid #27ae60; }
.summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; margin-bottom: 30px; }
.summary-card { background: white; padding: 20px; border-radius: 10px; text-align: center; }
.summary-number { font-size: 2.5em; font-weight: bold; color: #667eea; }
.summary-label { color: #7f8c8d; font-size: 1.1em; }
.page-section { margin: 15px 0; padding: 15px; background: #f8f9fa; border-radius: 5px; border-left: 3px solid #667eea; }
.page-title { font-weight: bold; color: #2c3e50; margin-bottom: 10px; }
.footer { color: #95a5a6; font-size: 0.9em; }
"#;

/// Escape text for HTML element and attribute content.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct HtmlReporter {
    /// Separator drawn between the steps of a flow pattern
    pub arrow: String,
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self {
            arrow: "→".to_string(),
        }
    }
}

fn metric(out: &mut String, class: &str, label: &str, value: impl std::fmt::Display) {
    let _ = write!(
        out,
        "<span class='metric {}'>{}: {}</span>",
        class,
        escape(label),
        escape(&value.to_string())
    );
}

fn count_list(out: &mut String, heading: &str, items: &[PageCount], class: &str, unit: &str) {
    let _ = write!(out, "<strong>{}:</strong><ul>", heading);
    for item in items {
        let _ = write!(
            out,
            "<li>{} <span class='metric {}'>{} {}</span></li>",
            escape(&item.page),
            class,
            item.count,
            unit
        );
    }
    out.push_str("</ul>");
}

impl HtmlReporter {
    fn flow_details(&self, out: &mut String, detail: &FlowDetail) {
        match detail {
            FlowDetail::SuccessfulFlows(d) => {
                metric(out, "", "Total Successful", d.total_successful);
                out.push_str("<strong>Most Common Patterns:</strong><div>");
                for pattern in &d.most_common_patterns {
                    out.push_str("<div class='pattern'><div>");
                    let chips: Vec<String> = pattern
                        .steps
                        .iter()
                        .map(|s| format!("<span class='chip'>{}</span>", escape(s)))
                        .collect();
                    let arrow = format!("<span class='arrow'>{}</span>", escape(&self.arrow));
                    out.push_str(&chips.join(arrow.as_str()));
                    let _ = write!(
                        out,
                        "</div><div style='text-align: right;'><span class='metric success'>{} completions</span></div></div>",
                        pattern.count
                    );
                }
                out.push_str("</div>");
                metric(out, "success", "Conversion Rate", d.conversion_rate);
            }
            FlowDetail::Abandonment(d) => {
                metric(out, "", "Total Abandoned", d.total_abandoned);
                count_list(out, "Common Exit Points", &d.common_exit_points, "warning", "exits");
                metric(out, "warning", "Abandonment Rate", d.abandonment_rate);
            }
            FlowDetail::EntryPoints(d) => {
                count_list(out, "Top Entry Points", &d.top_entry_points, "success", "entries");
            }
            FlowDetail::Products(d) => {
                metric(out, "", "Product Sessions", d.product_sessions);
                metric(out, "", "Total Product Views", d.total_product_views);
                metric(out, "", "Unique Products", d.unique_products);
                count_list(out, "Top Products", &d.top_products, "success", "views");
            }
            FlowDetail::DwellTime(d) => {
                metric(out, "", "Total Pages Analyzed", d.total_pages_analyzed);
                out.push_str("<strong>Longest Activity Pages:</strong><ul>");
                for page in &d.longest_activity_pages {
                    let _ = write!(
                        out,
                        "<li>{} <span class='metric warning'>{}</span></li>",
                        escape(&page.page),
                        page.average
                    );
                }
                out.push_str("</ul>");
                metric(out, "", "Average Page Time", d.average_page_time);
            }
        }
    }

    fn anomaly_details(&self, out: &mut String, detail: &AnomalyDetail) {
        match detail {
            AnomalyDetail::IdleGaps(d) => {
                metric(out, "", "Total Instances", d.total_instances);
                metric(out, "", "Average Gap", d.average_gap);
                metric(out, "", "Longest Gap", d.longest_gap);
                out.push_str("<strong>Issues by Page:</strong>");
                for page in &d.page_breakdown {
                    let _ = write!(
                        out,
                        "<div class='page-section'><div class='page-title'>{} ({} issues)</div><ul><li>Longest delay: {}</li></ul></div>",
                        escape(&page.page),
                        page.instances,
                        page.longest
                    );
                }
                out.push_str("<strong>Examples:</strong><ul>");
                for gap in &d.examples {
                    let _ = write!(
                        out,
                        "<li>User {} stuck on {} for {:.1} minutes before {}</li>",
                        escape(&gap.user_id),
                        escape(&gap.stuck_on_page),
                        gap.gap_minutes,
                        escape(&gap.next_page)
                    );
                }
                out.push_str("</ul>");
            }
            AnomalyDetail::TechnicalErrors(d) => {
                metric(out, "", "Total Errors", d.total_errors);
                out.push_str("<strong>Errors by Page:</strong>");
                for page in &d.page_breakdown {
                    let _ = write!(
                        out,
                        "<div class='page-section'><div class='page-title'>{} ({} errors)</div><ul>",
                        escape(&page.page),
                        page.errors
                    );
                    match &page.samples {
                        ErrorSamples::Texts(texts) => {
                            for t in texts {
                                let _ = write!(out, "<li>'{}': {} occurrences</li>", escape(&t.text), t.count);
                            }
                        }
                        ErrorSamples::CssOnly(n) => {
                            let _ = write!(out, "<li>CSS-only errors: {} occurrences</li>", n);
                        }
                    }
                    out.push_str("</ul></div>");
                }
            }
            AnomalyDetail::UnusualSessions(d) => {
                metric(out, "", "Flagged Sessions", d.flagged);
                metric(out, "", "Average Session Length", format!("{:.1} events", d.average_session_length));
                metric(out, "", "Threshold", format!("{:.1} events", d.threshold));
                out.push_str("<strong>Unusual Sessions:</strong><ul>");
                for s in &d.examples {
                    let _ = write!(
                        out,
                        "<li>User {} session {} with {} events ({:.1} minutes)</li>",
                        escape(&s.user_id),
                        escape(&s.session_id),
                        s.event_count,
                        s.duration_minutes
                    );
                }
                out.push_str("</ul>");
            }
        }
    }

    fn flow_item(&self, out: &mut String, flow: &FlowFinding) {
        let _ = write!(
            out,
            "<div class='flow-item'><div class='title'>{}</div><div class='description'>{}</div><div class='details'>",
            escape(&flow.title),
            escape(&flow.description)
        );
        self.flow_details(out, &flow.detail);
        out.push_str("</div></div>\n");
    }

    fn anomaly_item(&self, out: &mut String, anomaly: &AnomalyFinding) {
        let _ = write!(
            out,
            "<div class='anomaly-item {}'><div class='title'>{} <span class='metric danger'>{}</span></div><div class='description'>{}</div><div class='details'>",
            anomaly.severity.as_str().to_lowercase(),
            escape(&anomaly.title),
            anomaly.severity,
            escape(&anomaly.description)
        );
        self.anomaly_details(out, &anomaly.detail);
        out.push_str("</div></div>\n");
    }
}

impl ReportRenderer for HtmlReporter {
    fn render(&self, report: &Report) -> AnalyzerResult<String> {
        let s = &report.summary;
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>User Flow Analysis Report</title>\n<style>{}</style>\n</head>\n<body>\n\
             <div class='header'><h1>User Flow Analysis Report</h1><p>Generated on {}</p></div>\n",
            STYLE,
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        );

        out.push_str("<div class='summary'>");
        let cards: [(String, &str); 6] = [
            (s.total_users.to_string(), "Unique Users"),
            (s.total_sessions.to_string(), "Total Sessions"),
            (format!("{:.1}", s.avg_sessions_per_user), "Avg Sessions/User"),
            (s.total_events.to_string(), "Total Events"),
            (s.rejected_records.to_string(), "Rejected Records"),
            (s.anomalies_detected.to_string(), "Anomalies Detected"),
        ];
        for (value, label) in cards {
            let _ = write!(
                out,
                "<div class='summary-card'><div class='summary-number'>{}</div><div class='summary-label'>{}</div></div>",
                value, label
            );
        }
        out.push_str("</div>\n");

        out.push_str("<div class='section'><h2>Meaningful User Flows</h2>\n");
        if report.flows.is_empty() {
            out.push_str("<p>No significant flows detected.</p>");
        }
        for flow in &report.flows {
            self.flow_item(&mut out, flow);
        }
        out.push_str("</div>\n");

        out.push_str("<div class='section'><h2>Detected Anomalies</h2>\n");
        if report.anomalies.is_empty() {
            out.push_str("<p>No anomalies detected.</p>");
        }
        for anomaly in &report.anomalies {
            self.anomaly_item(&mut out, anomaly);
        }
        out.push_str("</div>\n");

        let _ = write!(
            out,
            "<p class='footer'>Run {} · source {} · sha256 {}</p>\n</body>\n</html>\n",
            report.run_id,
            escape(&report.source),
            report.source_digest
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::pipeline::FlowPipeline;

    fn render(ndjson: &str) -> String {
        let run = FlowPipeline::new(&AnalyzerConfig::default()).run(ndjson);
        let report = Report::new(&run, "test", "digest");
        HtmlReporter::default().render(&report).unwrap()
    }

    #[test]
    fn empty_report_says_nothing_found() {
        let html = render("");
        assert!(html.contains("No significant flows detected."));
        assert!(html.contains("No anomalies detected."));
    }

    #[test]
    fn renders_every_category_and_escapes_text() {
        let lines = [
            r#"{"user_id":"u1","session_id":"s1","event_time":"2024-01-01T00:00:00Z","path":"/products/<1>"}"#,
            r#"{"user_id":"u1","session_id":"s1","event_time":"2024-01-01T00:10:00Z","path":"/checkout","text":"Place order"}"#,
            r#"{"user_id":"u2","session_id":"s1","event_time":"2024-01-01T00:00:00Z","path":"/cart","css":"btn","text":"Payment failed"}"#,
        ];
        let html = render(&lines.join("\n"));
        for title in [
            "Successful Purchase Flows",
            "Flow Abandonment Patterns",
            "User Entry Points",
            "Most Consulted Products",
            "User Confusion / Long Delays",
            "Technical Errors",
        ] {
            assert!(html.contains(title), "missing {}", title);
        }
        assert!(html.contains("/products/&lt;1&gt;"));
        assert!(!html.contains("/products/<1>"));
        assert!(html.contains("'Payment failed': 1 occurrences"));
        assert!(html.contains("anomaly-item high"));
    }

    #[test]
    fn escape_covers_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
