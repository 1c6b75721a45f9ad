use std::fmt::Write as _;

use rampr_core::runner::{Lifecycle, RunSummary, ScenarioConfig, Verdict};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput;

impl Lifecycle for HumanReadableOutput {
    fn on_start(&self, config: &ScenarioConfig) {
        println!("starting load test");
        println!("target: {}", config.target_url);
        println!(
            "vus: {} (30s ramp-up, {} sustain, 30s ramp-down; total {})",
            config.vus,
            humantime::format_duration(config.sustain),
            humantime::format_duration(config.total_duration()),
        );
        println!(
            "request timeout: {}",
            humantime::format_duration(config.request_timeout)
        );
        println!();
    }

    fn on_end(&self) {
        println!("load test completed");
        println!();
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn print_summary(&self, summary: &RunSummary, verdict: &Verdict) -> anyhow::Result<()> {
        print!("{}", render(summary, verdict));
        Ok(())
    }
}

fn render(summary: &RunSummary, verdict: &Verdict) -> String {
    let mut out = String::new();

    out.push_str("summary\n");
    writeln!(
        &mut out,
        "  requests: {} (failed {})",
        summary.requests_total, summary.failed_requests_total
    )
    .ok();
    writeln!(&mut out, "  error_rate: {}", format_rate(summary.error_rate)).ok();
    writeln!(&mut out, "  rps: {:.1}", summary.rps).ok();

    let lat = &summary.latency;
    if lat.count > 0 {
        writeln!(
            &mut out,
            "  latency: p50={} p90={} p95={} p99={} mean={} max={} (n={})",
            format_ms(lat.p50),
            format_ms(lat.p90),
            format_ms(lat.p95),
            format_ms(lat.p99),
            format_ms(lat.mean),
            format_ms(lat.max),
            lat.count
        )
        .ok();
    } else {
        out.push_str("  latency: n/a\n");
    }

    out.push_str("\nchecks\n");
    for check in &summary.checks {
        let passed = check.total.saturating_sub(check.failed);
        let mark = if check.failed == 0 { "ok  " } else { "FAIL" };
        writeln!(
            &mut out,
            "  {mark} {}: {passed}/{} passed",
            check.name, check.total
        )
        .ok();
    }

    out.push_str("\nthresholds\n");
    for t in &verdict.thresholds {
        let mark = if t.passed { "ok  " } else { "FAIL" };
        let observed = match t.observed {
            Some(v) => format!("{v:.2}"),
            None => "-".to_string(),
        };
        writeln!(
            &mut out,
            "  {mark} {}: {} (observed {observed})",
            t.metric, t.expression
        )
        .ok();
    }

    writeln!(
        &mut out,
        "\nverdict: {}",
        if verdict.pass { "pass" } else { "FAIL" }
    )
    .ok();

    out
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.2}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

fn format_ms(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{ms:.1}ms"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampr_core::runner::{LatencySummary, ThresholdResult};
    use std::time::Duration;

    #[test]
    fn render_includes_verdict_and_thresholds() {
        let summary = RunSummary {
            requests_total: 100,
            failed_requests_total: 10,
            error_rate: Some(0.1),
            run_duration: Duration::from_secs(10),
            rps: 10.0,
            latency: LatencySummary {
                p50: Some(50.0),
                p90: Some(90.0),
                p95: Some(95.0),
                p99: Some(99.0),
                min: Some(1.0),
                max: Some(120.0),
                mean: Some(55.0),
                count: 100,
            },
            checks: Vec::new(),
            metrics: Vec::new(),
        };
        let verdict = Verdict {
            thresholds: vec![ThresholdResult {
                metric: "http_req_failed".to_string(),
                expression: "rate<0.05".to_string(),
                observed: Some(0.1),
                passed: false,
            }],
            pass: false,
        };

        let text = render(&summary, &verdict);
        assert!(text.contains("requests: 100 (failed 10)"));
        assert!(text.contains("error_rate: 10.00%"));
        assert!(text.contains("FAIL http_req_failed: rate<0.05 (observed 0.10)"));
        assert!(text.contains("verdict: FAIL"));
    }

    #[test]
    fn render_handles_empty_runs() {
        let summary = RunSummary {
            requests_total: 0,
            failed_requests_total: 0,
            error_rate: None,
            run_duration: Duration::ZERO,
            rps: 0.0,
            latency: LatencySummary::default(),
            checks: Vec::new(),
            metrics: Vec::new(),
        };
        let verdict = Verdict {
            thresholds: Vec::new(),
            pass: true,
        };

        let text = render(&summary, &verdict);
        assert!(text.contains("error_rate: n/a"));
        assert!(text.contains("latency: n/a"));
    }
}
