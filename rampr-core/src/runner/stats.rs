use hdrhistogram::Histogram;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::check::{Check, RequestOutcome};

/// Latency percentiles in milliseconds. Empty runs carry no values.
#[derive(Debug, Clone, Default)]
pub struct LatencySummary {
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct CheckSummary {
    pub name: &'static str,
    pub total: u64,
    pub failed: u64,
}

/// Aggregated values of one named metric series, the shape the
/// threshold evaluator consumes.
#[derive(Debug, Clone)]
pub enum MetricValues {
    Counter {
        value: u64,
    },
    Trend {
        avg: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
        p50: Option<f64>,
        p90: Option<f64>,
        p95: Option<f64>,
        p99: Option<f64>,
        count: u64,
    },
    Rate {
        /// `None` when nothing was recorded; a rate over zero samples
        /// is indeterminate, not zero.
        rate: Option<f64>,
        hits: u64,
        total: u64,
    },
}

#[derive(Debug, Clone)]
pub struct MetricSummary {
    pub name: String,
    pub values: MetricValues,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub requests_total: u64,
    pub failed_requests_total: u64,
    /// `None` when no request completed (indeterminate, not 0).
    pub error_rate: Option<f64>,
    pub run_duration: Duration,
    pub rps: f64,
    pub latency: LatencySummary,
    pub checks: Vec<CheckSummary>,
    pub metrics: Vec<MetricSummary>,
}

#[derive(Debug, Default)]
struct CheckCounters {
    total: AtomicU64,
    failed: AtomicU64,
}

/// Shared outcome accumulator. The only mutable state shared across
/// VUs: atomic counters plus a mutex-guarded latency histogram, so
/// concurrent `record` calls never lose updates.
#[derive(Debug)]
pub struct RunStats {
    requests_total: AtomicU64,
    failed_requests_total: AtomicU64,
    status_2xx: AtomicU64,
    status_4xx: AtomicU64,
    status_5xx: AtomicU64,
    transport_errors: AtomicU64,
    check_counters: [CheckCounters; Check::ALL.len()],
    latency_us: Mutex<Histogram<u64>>,
}

impl Default for RunStats {
    fn default() -> Self {
        // Track up to 60s in microseconds (with 3 sigfigs).
        let hist = Histogram::<u64>::new_with_bounds(1, 60_000_000, 3)
            .unwrap_or_else(|err| panic!("failed to init histogram: {err}"));

        Self {
            requests_total: AtomicU64::new(0),
            failed_requests_total: AtomicU64::new(0),
            status_2xx: AtomicU64::new(0),
            status_4xx: AtomicU64::new(0),
            status_5xx: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            check_counters: [CheckCounters::default(), CheckCounters::default()],
            latency_us: Mutex::new(hist),
        }
    }
}

impl RunStats {
    pub fn record(&self, outcome: &RequestOutcome) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if outcome.failed() {
            self.failed_requests_total.fetch_add(1, Ordering::Relaxed);
        }

        match outcome.status {
            Some(200..=299) => {
                self.status_2xx.fetch_add(1, Ordering::Relaxed);
            }
            Some(400..=499) => {
                self.status_4xx.fetch_add(1, Ordering::Relaxed);
            }
            Some(500..=599) => {
                self.status_5xx.fetch_add(1, Ordering::Relaxed);
            }
            Some(_) => {}
            None => {
                self.transport_errors.fetch_add(1, Ordering::Relaxed);
            }
        }

        for result in &outcome.checks {
            let idx = Check::ALL
                .iter()
                .position(|c| *c == result.check)
                .unwrap_or(0);
            let counters = &self.check_counters[idx];
            counters.total.fetch_add(1, Ordering::Relaxed);
            if !result.passed {
                counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        let micros = outcome.elapsed.as_micros().min(u64::MAX as u128) as u64;
        let mut hist = self
            .latency_us
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = hist.record(micros.max(1));
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn failed_requests_total(&self) -> u64 {
        self.failed_requests_total.load(Ordering::Relaxed)
    }

    pub fn summarize(&self, run_duration: Duration) -> RunSummary {
        let requests_total = self.requests_total();
        let failed_requests_total = self.failed_requests_total();

        let error_rate = if requests_total == 0 {
            None
        } else {
            Some(failed_requests_total as f64 / requests_total as f64)
        };

        let rps = requests_total as f64 / run_duration.as_secs_f64().max(1e-9);

        let latency = self.latency_summary_ms();

        let checks: Vec<CheckSummary> = Check::ALL
            .iter()
            .zip(self.check_counters.iter())
            .map(|(check, counters)| CheckSummary {
                name: check.name(),
                total: counters.total.load(Ordering::Relaxed),
                failed: counters.failed.load(Ordering::Relaxed),
            })
            .collect();

        let checks_total: u64 = checks.iter().map(|c| c.total).sum();
        let checks_passed: u64 = checks.iter().map(|c| c.total - c.failed).sum();

        let metrics = vec![
            MetricSummary {
                name: "http_reqs".to_string(),
                values: MetricValues::Counter {
                    value: requests_total,
                },
            },
            MetricSummary {
                name: "http_req_duration".to_string(),
                values: MetricValues::Trend {
                    avg: latency.mean,
                    min: latency.min,
                    max: latency.max,
                    p50: latency.p50,
                    p90: latency.p90,
                    p95: latency.p95,
                    p99: latency.p99,
                    count: latency.count,
                },
            },
            MetricSummary {
                name: "http_req_failed".to_string(),
                values: MetricValues::Rate {
                    rate: error_rate,
                    hits: failed_requests_total,
                    total: requests_total,
                },
            },
            MetricSummary {
                name: "checks".to_string(),
                values: MetricValues::Rate {
                    rate: (checks_total > 0).then(|| checks_passed as f64 / checks_total as f64),
                    hits: checks_passed,
                    total: checks_total,
                },
            },
        ];

        RunSummary {
            requests_total,
            failed_requests_total,
            error_rate,
            run_duration,
            rps,
            latency,
            checks,
            metrics,
        }
    }

    fn latency_summary_ms(&self) -> LatencySummary {
        let hist = self
            .latency_us
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let count = hist.len();
        if count == 0 {
            return LatencySummary::default();
        }

        let ms = |us: u64| us as f64 / 1000.0;

        LatencySummary {
            p50: Some(ms(hist.value_at_quantile(0.50))),
            p90: Some(ms(hist.value_at_quantile(0.90))),
            p95: Some(ms(hist.value_at_quantile(0.95))),
            p99: Some(ms(hist.value_at_quantile(0.99))),
            min: Some(ms(hist.min())),
            max: Some(ms(hist.max())),
            mean: Some(hist.mean() / 1000.0),
            count,
        }
    }
}
