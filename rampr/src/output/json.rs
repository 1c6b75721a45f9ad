use serde::Serialize;
use std::io::Write as _;

use rampr_core::runner::{Lifecycle, RunSummary, ScenarioConfig, Verdict};

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl Lifecycle for JsonOutput {
    // stdout is reserved for the summary object; the header and
    // completion lines are human-output concerns.
    fn on_start(&self, _config: &ScenarioConfig) {}
    fn on_end(&self) {}
}

impl OutputFormatter for JsonOutput {
    fn print_summary(&self, summary: &RunSummary, verdict: &Verdict) -> anyhow::Result<()> {
        let line = build_summary_line(summary, verdict);
        let json = serde_json::to_string(&line)?;

        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        writeln!(lock, "{json}")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonSummaryLine {
    kind: &'static str,
    requests_total: u64,
    failed_requests_total: u64,
    error_rate: Option<f64>,
    run_duration_ms: u64,
    rps: f64,
    latency: Option<JsonLatencySummary>,
    checks: Vec<JsonCheckSummary>,
    thresholds: Vec<JsonThresholdResult>,
    pass: bool,
}

#[derive(Debug, Serialize)]
struct JsonLatencySummary {
    p50: Option<f64>,
    p90: Option<f64>,
    p95: Option<f64>,
    p99: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    mean: Option<f64>,
    count: u64,
}

#[derive(Debug, Serialize)]
struct JsonCheckSummary {
    name: &'static str,
    total: u64,
    failed: u64,
}

#[derive(Debug, Serialize)]
struct JsonThresholdResult {
    metric: String,
    expression: String,
    observed: Option<f64>,
    passed: bool,
}

fn build_summary_line(summary: &RunSummary, verdict: &Verdict) -> JsonSummaryLine {
    let latency = (summary.latency.count > 0).then(|| JsonLatencySummary {
        p50: summary.latency.p50,
        p90: summary.latency.p90,
        p95: summary.latency.p95,
        p99: summary.latency.p99,
        min: summary.latency.min,
        max: summary.latency.max,
        mean: summary.latency.mean,
        count: summary.latency.count,
    });

    JsonSummaryLine {
        kind: "summary",
        requests_total: summary.requests_total,
        failed_requests_total: summary.failed_requests_total,
        error_rate: summary.error_rate,
        run_duration_ms: summary.run_duration.as_millis().min(u64::MAX as u128) as u64,
        rps: summary.rps,
        latency,
        checks: summary
            .checks
            .iter()
            .map(|c| JsonCheckSummary {
                name: c.name,
                total: c.total,
                failed: c.failed,
            })
            .collect(),
        thresholds: verdict
            .thresholds
            .iter()
            .map(|t| JsonThresholdResult {
                metric: t.metric.clone(),
                expression: t.expression.clone(),
                observed: t.observed,
                passed: t.passed,
            })
            .collect(),
        pass: verdict.pass,
    }
}
