//! flowscope entrypoint: fetch the event log once, analyze it, write the report.
//! A source failure aborts the run; bad records are only counted.

use flowscope::{
    config::AnalyzerConfig,
    ingest::source_digest,
    logging::{FindingLine, StructuredLogger},
    pipeline::FlowPipeline,
    report::{write_report, HtmlReporter, JsonReporter, Report, ReportRenderer},
};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("FLOWSCOPE_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("flowscope.json"));
    let config = AnalyzerConfig::load(&config_path).with_env_overrides();

    StructuredLogger::init(config.log.json, &config.log.level);

    let source = config.source.data_source();
    info!(source = %source.location(), "flowscope starting");

    let text = match source.fetch() {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "cannot load event data");
            return Err(e.into());
        }
    };

    let run = FlowPipeline::new(&config).run(&text);
    let report = Report::new(&run, source.location(), source_digest(&text));

    let html = HtmlReporter::default().render(&report)?;
    write_report(&config.report.html_path, &html)?;
    if let Some(json_path) = &config.report.json_path {
        write_report(json_path, &JsonReporter.render(&report)?)?;
    }

    let run_id = report.run_id.to_string();
    let ts = report.generated_at.to_rfc3339();
    let mut stdout = std::io::stdout().lock();
    for anomaly in &report.anomalies {
        StructuredLogger::emit_json(&FindingLine::anomaly(anomaly, ts.clone(), Some(run_id.as_str())), &mut stdout);
    }

    info!(
        flows = report.flows.len(),
        anomalies = report.anomalies.len(),
        report = %config.report.html_path.display(),
        "analysis complete"
    );
    Ok(())
}
