use super::stats::{MetricSummary, MetricValues};

/// Threshold assertions over one named metric series, e.g.
/// `http_req_duration: ["p(95)<500"]`.
#[derive(Debug, Clone)]
pub struct ThresholdSet {
    pub metric: String,
    pub expressions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
}

#[derive(Debug, Clone)]
pub enum ThresholdAgg {
    Avg,
    Min,
    Max,
    Count,
    Rate,
    P(u32),
}

#[derive(Debug, Clone)]
pub struct ThresholdExpr {
    pub agg: ThresholdAgg,
    pub op: ThresholdOp,
    pub value: f64,
}

/// Outcome of one threshold expression. `observed == None` means the
/// metric had nothing to aggregate (missing series, empty trend, rate
/// over zero samples) — that counts as failed, never as a pass.
#[derive(Debug, Clone)]
pub struct ThresholdResult {
    pub metric: String,
    pub expression: String,
    pub observed: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone)]
pub struct Verdict {
    pub thresholds: Vec<ThresholdResult>,
    pub pass: bool,
}

pub fn parse_threshold_expr(raw: &str) -> Result<ThresholdExpr, String> {
    let s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return Err("empty threshold".to_string());
    }

    let ops = [
        ("<=", ThresholdOp::Lte),
        (">=", ThresholdOp::Gte),
        ("==", ThresholdOp::Eq),
        ("<", ThresholdOp::Lt),
        (">", ThresholdOp::Gt),
    ];
    let (op_pos, op_len, op) = ops
        .iter()
        .find_map(|(tok, op)| s.find(tok).map(|pos| (pos, tok.len(), *op)))
        .ok_or_else(|| format!("invalid threshold (missing operator): {raw}"))?;

    let (left, right_with_op) = s.split_at(op_pos);
    let right = &right_with_op[op_len..];
    if left.is_empty() || right.is_empty() {
        return Err(format!("invalid threshold: {raw}"));
    }

    let agg = if left.eq_ignore_ascii_case("avg") {
        ThresholdAgg::Avg
    } else if left.eq_ignore_ascii_case("min") {
        ThresholdAgg::Min
    } else if left.eq_ignore_ascii_case("max") {
        ThresholdAgg::Max
    } else if left.eq_ignore_ascii_case("count") {
        ThresholdAgg::Count
    } else if left.eq_ignore_ascii_case("rate") {
        ThresholdAgg::Rate
    } else if let Some(inner) = left.strip_prefix("p(").and_then(|v| v.strip_suffix(')')) {
        let p: u32 = inner
            .parse()
            .map_err(|_| format!("invalid percentile in threshold: {raw}"))?;
        if !(1..=100).contains(&p) {
            return Err(format!("percentile out of range in threshold: {raw}"));
        }
        ThresholdAgg::P(p)
    } else {
        return Err(format!("unknown aggregation `{left}` in threshold: {raw}"));
    };

    let value: f64 = right
        .parse()
        .map_err(|_| format!("invalid numeric value in threshold: {raw}"))?;

    Ok(ThresholdExpr { agg, op, value })
}

/// Evaluate every configured threshold against the final metric
/// summaries. Pure: the same inputs always produce the same verdict.
pub fn evaluate_thresholds(
    thresholds: &[ThresholdSet],
    metrics: &[MetricSummary],
) -> Result<Verdict, String> {
    let mut results = Vec::new();

    for set in thresholds {
        let series = metrics.iter().find(|m| m.name == set.metric);

        for expr_raw in &set.expressions {
            let expr = parse_threshold_expr(expr_raw)?;
            let observed = series.and_then(|s| observed_value(&s.values, &expr.agg));
            let passed = observed
                .map(|v| compare(v, expr.op, expr.value))
                .unwrap_or(false);

            results.push(ThresholdResult {
                metric: set.metric.clone(),
                expression: expr_raw.clone(),
                observed,
                passed,
            });
        }
    }

    let pass = results.iter().all(|r| r.passed);
    Ok(Verdict {
        thresholds: results,
        pass,
    })
}

fn compare(left: f64, op: ThresholdOp, right: f64) -> bool {
    match op {
        ThresholdOp::Lt => left < right,
        ThresholdOp::Lte => left <= right,
        ThresholdOp::Gt => left > right,
        ThresholdOp::Gte => left >= right,
        ThresholdOp::Eq => left == right,
    }
}

fn observed_value(values: &MetricValues, agg: &ThresholdAgg) -> Option<f64> {
    match (values, agg) {
        (MetricValues::Trend { avg, .. }, ThresholdAgg::Avg) => *avg,
        (MetricValues::Trend { min, .. }, ThresholdAgg::Min) => *min,
        (MetricValues::Trend { max, .. }, ThresholdAgg::Max) => *max,
        (MetricValues::Trend { count, .. }, ThresholdAgg::Count) => Some(*count as f64),
        (
            MetricValues::Trend {
                p50, p90, p95, p99, ..
            },
            ThresholdAgg::P(p),
        ) => match *p {
            50 => *p50,
            90 => *p90,
            95 => *p95,
            99 => *p99,
            // Only the precomputed percentiles are supported.
            _ => None,
        },

        (MetricValues::Counter { value }, ThresholdAgg::Count) => Some(*value as f64),
        (MetricValues::Counter { value }, ThresholdAgg::Avg) => Some(*value as f64),

        (MetricValues::Rate { rate, .. }, ThresholdAgg::Rate) => *rate,
        (MetricValues::Rate { total, .. }, ThresholdAgg::Count) => Some(*total as f64),

        // Non-sensical combinations.
        (_, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(p95: f64, count: u64) -> MetricValues {
        MetricValues::Trend {
            avg: Some(p95 / 2.0),
            min: Some(1.0),
            max: Some(p95 * 2.0),
            p50: Some(p95 / 2.0),
            p90: Some(p95 * 0.9),
            p95: Some(p95),
            p99: Some(p95 * 1.1),
            count,
        }
    }

    fn summaries(p95: f64, error_rate: f64) -> Vec<MetricSummary> {
        vec![
            MetricSummary {
                name: "http_req_duration".to_string(),
                values: trend(p95, 100),
            },
            MetricSummary {
                name: "http_req_failed".to_string(),
                values: MetricValues::Rate {
                    rate: Some(error_rate),
                    hits: (error_rate * 100.0) as u64,
                    total: 100,
                },
            },
        ]
    }

    fn default_sets() -> Vec<ThresholdSet> {
        vec![
            ThresholdSet {
                metric: "http_req_duration".to_string(),
                expressions: vec!["p(95)<500".to_string()],
            },
            ThresholdSet {
                metric: "http_req_failed".to_string(),
                expressions: vec!["rate<0.05".to_string()],
            },
        ]
    }

    #[test]
    fn parse_threshold_expr_trims_whitespace() {
        let expr = parse_threshold_expr("  p(95)  <  500  ").unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(expr.agg, ThresholdAgg::P(95)));
        assert!(matches!(expr.op, ThresholdOp::Lt));
        assert_eq!(expr.value, 500.0);
    }

    #[test]
    fn parse_threshold_expr_rejects_out_of_range_percentiles() {
        let err = match parse_threshold_expr("p(101)<1") {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(err.contains("out of range"));
    }

    #[test]
    fn parse_threshold_expr_rejects_missing_operator() {
        assert!(parse_threshold_expr("rate0.05").is_err());
        assert!(parse_threshold_expr("nope<1").is_err());
    }

    #[test]
    fn healthy_run_passes_both_default_thresholds() {
        let verdict = evaluate_thresholds(&default_sets(), &summaries(120.0, 0.0))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(verdict.pass);
        assert_eq!(verdict.thresholds.len(), 2);
        assert!(verdict.thresholds.iter().all(|r| r.passed));
    }

    #[test]
    fn ten_percent_errors_fail_the_rate_threshold() {
        let verdict = evaluate_thresholds(&default_sets(), &summaries(120.0, 0.10))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(!verdict.pass);

        let rate = verdict
            .thresholds
            .iter()
            .find(|r| r.metric == "http_req_failed")
            .unwrap_or_else(|| panic!("missing rate result"));
        assert!(!rate.passed);
        assert_eq!(rate.observed, Some(0.10));

        let duration = verdict
            .thresholds
            .iter()
            .find(|r| r.metric == "http_req_duration")
            .unwrap_or_else(|| panic!("missing duration result"));
        assert!(duration.passed);
    }

    #[test]
    fn missing_series_fails_instead_of_passing_vacuously() {
        let verdict = evaluate_thresholds(&default_sets(), &[]).unwrap_or_else(|e| panic!("{e}"));
        assert!(!verdict.pass);
        assert!(verdict.thresholds.iter().all(|r| r.observed.is_none()));
        assert!(verdict.thresholds.iter().all(|r| !r.passed));
    }

    #[test]
    fn indeterminate_rate_fails() {
        let metrics = vec![MetricSummary {
            name: "http_req_failed".to_string(),
            values: MetricValues::Rate {
                rate: None,
                hits: 0,
                total: 0,
            },
        }];
        let sets = vec![ThresholdSet {
            metric: "http_req_failed".to_string(),
            expressions: vec!["rate<0.05".to_string()],
        }];

        let verdict = evaluate_thresholds(&sets, &metrics).unwrap_or_else(|e| panic!("{e}"));
        assert!(!verdict.pass);
        assert_eq!(verdict.thresholds[0].observed, None);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let metrics = summaries(300.0, 0.02);
        let sets = default_sets();

        let a = evaluate_thresholds(&sets, &metrics).unwrap_or_else(|e| panic!("{e}"));
        let b = evaluate_thresholds(&sets, &metrics).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(a.pass, b.pass);
        for (ra, rb) in a.thresholds.iter().zip(b.thresholds.iter()) {
            assert_eq!(ra.passed, rb.passed);
            assert_eq!(ra.observed, rb.observed);
        }
    }
}
