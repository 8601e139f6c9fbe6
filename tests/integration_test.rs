//! Integration test: config load, NDJSON → findings, report rendering.

use flowscope::{
    config::AnalyzerConfig,
    findings::{AnomalyDetail, ErrorSamples, FlowDetail, PageCount},
    flows::is_successful_checkout,
    ingest::{load_events, DataSource},
    pipeline::FlowPipeline,
    report::{HtmlReporter, Report, ReportRenderer},
    sessions::SessionIndex,
    AnalysisRun, Severity,
};
use serde_json::json;
use std::io::Write;
use std::path::Path;

fn line(user: &str, session: &str, secs: i64, path: &str, text: Option<&str>) -> String {
    let t = chrono::DateTime::from_timestamp(1_704_067_200 + secs, 0)
        .unwrap()
        .to_rfc3339()
        .replace("+00:00", "Z");
    let mut v = json!({"user_id": user, "session_id": session, "event_time": t, "path": path});
    if let Some(text) = text {
        v["text"] = json!(text);
    }
    v.to_string()
}

fn run(lines: &[String]) -> AnalysisRun {
    FlowPipeline::new(&AnalyzerConfig::default()).run(&lines.join("\n"))
}

fn flow<'a>(run: &'a AnalysisRun, title: &str) -> &'a FlowDetail {
    &run.flows.iter().find(|f| f.title == title).expect(title).detail
}

#[test]
fn config_load_default() {
    let c = AnalyzerConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.flows.checkout_path, "/checkout");
    assert_eq!(c.anomalies.idle_gap_secs, 300.0);
    assert_eq!(c.flows.max_dwell_secs, 1800.0);
    assert!(c.source.path.is_none());
}

#[test]
fn successful_checkout_converts() {
    let r = run(&[
        line("u", "s", 0, "/home", None),
        line("u", "s", 100, "/checkout", Some("place order")),
    ]);
    match flow(&r, "Successful Purchase Flows") {
        FlowDetail::SuccessfulFlows(d) => {
            assert_eq!(d.total_successful, 1);
            assert_eq!(d.conversion_rate.to_string(), "100.0%");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(r.flows.iter().all(|f| f.title != "Flow Abandonment Patterns"));
}

#[test]
fn cancelled_checkout_is_abandoned_at_checkout() {
    let r = run(&[
        line("u", "s", 0, "/home", None),
        line("u", "s", 100, "/checkout", Some("cancel order")),
    ]);
    match flow(&r, "Flow Abandonment Patterns") {
        FlowDetail::Abandonment(d) => {
            assert_eq!(d.total_abandoned, 1);
            assert_eq!(d.common_exit_points, vec![PageCount { page: "/checkout".into(), count: 1 }]);
            assert_eq!(d.abandonment_rate.to_string(), "100.0%");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn long_gap_is_reported() {
    let r = run(&[line("u", "s", 0, "/home", None), line("u", "s", 400, "/cart", None)]);
    let gap = r
        .anomalies
        .iter()
        .find(|a| a.title == "User Confusion / Long Delays")
        .expect("gap finding");
    assert_eq!(gap.severity, Severity::Medium);
    match &gap.detail {
        AnomalyDetail::IdleGaps(d) => {
            assert_eq!(d.examples.len(), 1);
            assert_eq!(d.examples[0].stuck_on_page, "/home");
            assert_eq!(d.examples[0].next_page, "/cart");
            assert_eq!(format!("{:.1}", d.examples[0].gap_minutes), "6.7");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn error_text_is_attributed_to_its_page() {
    let r = run(&[line("u", "s", 0, "/broken", Some("Error 404: page not found"))]);
    let err = r.anomalies.iter().find(|a| a.title == "Technical Errors").expect("errors");
    assert_eq!(err.severity, Severity::High);
    match &err.detail {
        AnomalyDetail::TechnicalErrors(d) => {
            assert_eq!(d.total_errors, 1);
            assert_eq!(d.page_breakdown[0].page, "/broken");
            assert!(matches!(&d.page_breakdown[0].samples, ErrorSamples::Texts(t) if t[0].count == 1));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn repeated_product_views_count_once_per_session() {
    let r = run(&[
        line("u", "s", 0, "/products/1", None),
        line("u", "s", 10, "/products/1", None),
        line("u", "s", 20, "/products/2", None),
    ]);
    match flow(&r, "Most Consulted Products") {
        FlowDetail::Products(d) => {
            assert_eq!(
                d.top_products,
                vec![
                    PageCount { page: "/products/1".into(), count: 1 },
                    PageCount { page: "/products/2".into(), count: 1 }
                ]
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn grouping_conserves_events_and_orders_paths() {
    let lines: Vec<String> = (0..40)
        .map(|i| {
            let user = format!("u{}", i % 4);
            let session = format!("s{}", i % 3);
            line(&user, &session, 1000 - i * 7, &format!("/p{}", i), None)
        })
        .collect();
    let (events, stats) = load_events(&lines.join("\n"));
    assert_eq!(stats.valid, 40);
    let index = SessionIndex::from_unsorted(events);
    let total: usize = index.sessions().map(|s| s.len()).sum();
    assert_eq!(total, 40);
    for s in index.sessions() {
        assert_eq!(s.path_sequence().len(), s.len());
        let times: Vec<_> = s.events().map(|e| e.event_time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn checkout_success_is_monotonic() {
    let cfg = AnalyzerConfig::default().flows;
    let successful = vec![
        line("u", "s", 0, "/checkout", Some("Place order")),
        line("u", "s", 5, "/checkout", Some("place order now")),
    ];
    let index = SessionIndex::from_unsorted(load_events(&successful.join("\n")).0);
    assert!(is_successful_checkout(&index.sessions().next().unwrap(), &cfg));

    let failing = vec![
        line("u", "s", 0, "/home", None),
        line("u", "s", 5, "/checkout", Some("cancel")),
        line("u", "s", 9, "/checkout", Some("error placing order")),
    ];
    let index = SessionIndex::from_unsorted(load_events(&failing.join("\n")).0);
    assert!(!is_successful_checkout(&index.sessions().next().unwrap(), &cfg));
}

#[test]
fn entry_and_exit_points_cover_every_session() {
    let r = run(&[
        line("a", "1", 0, "/home", None),
        line("a", "1", 5, "/checkout", Some("place order")),
        line("b", "1", 0, "/search", None),
        line("c", "1", 0, "/home", None),
        line("c", "1", 5, "/cart", None),
    ]);
    let entries: usize = match flow(&r, "User Entry Points") {
        FlowDetail::EntryPoints(d) => d.top_entry_points.iter().map(|p| p.count).sum(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(entries, 3);
    let exits: usize = match flow(&r, "Flow Abandonment Patterns") {
        FlowDetail::Abandonment(d) => d.common_exit_points.iter().map(|p| p.count).sum(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(exits, 2);
}

#[test]
fn identical_input_gives_identical_findings() {
    let lines = vec![
        line("u", "s", 0, "/home", None),
        line("u", "s", 400, "/products/9", None),
        line("u", "s", 450, "/checkout", Some("Timeout while paying")),
        line("v", "t", 0, "/home", None),
        line("v", "t", 30, "/checkout", Some("place order")),
    ];
    let a = run(&lines);
    let b = run(&lines);
    assert_eq!(a.flows, b.flows);
    assert_eq!(a.anomalies, b.anomalies);
}

#[test]
fn file_source_to_html_report() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "{}", line("u", "s", 0, "/home", None)).unwrap();
    writeln!(f, "not json").unwrap();
    writeln!(f, "{}", line("u", "s", 100, "/checkout", Some("place order"))).unwrap();

    let text = DataSource::File(f.path().to_path_buf()).fetch().unwrap();
    let r = FlowPipeline::new(&AnalyzerConfig::default()).run(&text);
    assert_eq!(r.load.rejected, 1);
    let summary = r.summary();
    assert_eq!(summary.total_events, 2);
    assert_eq!(summary.total_users, 1);

    let report = Report::new(&r, "file", "digest");
    let html = HtmlReporter::default().render(&report).unwrap();
    assert!(html.contains("Successful Purchase Flows"));
    assert!(html.contains("100.0%"));
}
