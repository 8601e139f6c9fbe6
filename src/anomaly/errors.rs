//! Error keywords in the css or text of any event.

use std::collections::HashMap;

use crate::config::AnomalyConfig;
use crate::findings::{AnomalyDetail, AnomalyFinding, ErrorDetail, ErrorSamples, PageErrors, TextCount};
use crate::ingest::Event;
use crate::stats::FrequencyCounter;

use super::Severity;

/// Placeholder the event log uses for "no visible text".
const NO_TEXT: &str = "N/A";

pub fn mentions_error(event: &Event, keywords: &[String]) -> bool {
    let css = event.css_folded();
    let text = event.text_folded();
    keywords
        .iter()
        .any(|k| css.contains(k.as_str()) || text.contains(k.as_str()))
}

/// Scans the flat, chronologically ordered event list; sessions are irrelevant here.
pub fn detect(events: &[Event], config: &AnomalyConfig) -> Option<AnomalyFinding> {
    let mut pages: Vec<(&str, Vec<&Event>)> = Vec::new();
    let mut by_page: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;

    for e in events.iter().filter(|e| mentions_error(e, &config.error_keywords)) {
        total += 1;
        match by_page.get(e.path.as_str()) {
            Some(&i) => pages[i].1.push(e),
            None => {
                by_page.insert(e.path.as_str(), pages.len());
                pages.push((e.path.as_str(), vec![e]));
            }
        }
    }
    if total == 0 {
        return None;
    }

    let page_breakdown = pages
        .into_iter()
        .map(|(page, errors)| {
            let texts: FrequencyCounter = errors
                .iter()
                .filter_map(|e| e.text.as_deref())
                .filter(|t| *t != NO_TEXT)
                .collect();
            let samples = if texts.is_empty() {
                ErrorSamples::CssOnly(errors.len())
            } else {
                ErrorSamples::Texts(
                    texts
                        .most_common(config.error_texts_per_page)
                        .into_iter()
                        .map(|(text, count)| TextCount { text, count })
                        .collect(),
                )
            };
            PageErrors {
                page: page.to_string(),
                errors: errors.len(),
                samples,
            }
        })
        .collect();

    Some(AnomalyFinding {
        title: "Technical Errors".to_string(),
        description: format!("Found {} events with error-related keywords", total),
        severity: Severity::High,
        detail: AnomalyDetail::TechnicalErrors(ErrorDetail {
            total_errors: total,
            page_breakdown,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ev(path: &str) -> Event {
        Event::new("u", "s", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), path)
    }

    #[test]
    fn keyword_in_text_is_attributed_to_page() {
        let events = vec![ev("/missing-page").with_text("Error 404: page not found"), ev("/home")];
        let finding = detect(&events, &AnomalyConfig::default()).unwrap();
        assert_eq!(finding.severity, Severity::High);
        match finding.detail {
            AnomalyDetail::TechnicalErrors(d) => {
                assert_eq!(d.total_errors, 1);
                assert_eq!(d.page_breakdown.len(), 1);
                assert_eq!(d.page_breakdown[0].page, "/missing-page");
                assert_eq!(
                    d.page_breakdown[0].samples,
                    ErrorSamples::Texts(vec![TextCount {
                        text: "Error 404: page not found".into(),
                        count: 1
                    }])
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn css_only_matches_fall_back_to_count() {
        let events = vec![
            ev("/pay").with_css("alert.TIMEOUT"),
            ev("/pay").with_css("form .invalid"),
            ev("/pay").with_css("x").with_text(NO_TEXT),
        ];
        let finding = detect(&events, &AnomalyConfig::default());
        match finding.map(|f| f.detail) {
            Some(AnomalyDetail::TechnicalErrors(d)) => {
                assert_eq!(d.total_errors, 2);
                assert_eq!(d.page_breakdown[0].samples, ErrorSamples::CssOnly(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn top_three_texts_per_page() {
        let events = vec![
            ev("/a").with_text("failed A"),
            ev("/a").with_text("failed B"),
            ev("/a").with_text("failed B"),
            ev("/a").with_text("failed C"),
            ev("/a").with_text("failed D"),
            ev("/a").with_css("error"),
        ];
        let finding = detect(&events, &AnomalyConfig::default()).unwrap();
        match finding.detail {
            AnomalyDetail::TechnicalErrors(d) => {
                assert_eq!(d.page_breakdown[0].errors, 6);
                match &d.page_breakdown[0].samples {
                    ErrorSamples::Texts(t) => {
                        let got: Vec<_> = t.iter().map(|t| (t.text.as_str(), t.count)).collect();
                        assert_eq!(got, [("failed B", 2), ("failed A", 1), ("failed C", 1)]);
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn interleaved_pages_keep_first_seen_order() {
        let events = vec![
            ev("/b").with_text("failed"),
            ev("/a").with_text("invalid"),
            ev("/b").with_css("error"),
            ev("/c").with_text("missing"),
            ev("/a").with_text("invalid"),
            ev("/b").with_text("failed"),
        ];
        let finding = detect(&events, &AnomalyConfig::default()).unwrap();
        match finding.detail {
            AnomalyDetail::TechnicalErrors(d) => {
                let pages: Vec<_> = d.page_breakdown.iter().map(|p| (p.page.as_str(), p.errors)).collect();
                assert_eq!(pages, [("/b", 3), ("/a", 2), ("/c", 1)]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn clean_events_produce_nothing() {
        assert!(detect(&[ev("/home").with_text("Welcome")], &AnomalyConfig::default()).is_none());
    }
}
