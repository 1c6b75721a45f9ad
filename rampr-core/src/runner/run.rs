use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

use tokio::sync::Barrier;

use crate::HttpClient;

use super::config::ScenarioConfig;
use super::error::Result;
use super::executor::RequestExecutor;
use super::schedule::RampSchedule;
use super::stats::{RunStats, RunSummary};
use super::vu::{StartSignal, VuContext, run_vu};

/// Harness-invoked lifecycle hooks. `on_start` runs exactly once before
/// any VU is spawned; `on_end` runs exactly once after every VU has
/// drained, before the summary is surfaced.
pub trait Lifecycle: Send + Sync {
    fn on_start(&self, _config: &ScenarioConfig) {}
    fn on_end(&self) {}
}

pub struct NoopLifecycle;

impl Lifecycle for NoopLifecycle {}

/// Run the configured ramp profile to completion and return the final
/// aggregated summary. Threshold evaluation is a separate step so the
/// caller decides how to surface the verdict.
pub async fn run_scenario(
    config: &ScenarioConfig,
    lifecycle: &(impl Lifecycle + ?Sized),
) -> Result<RunSummary> {
    lifecycle.on_start(config);

    let client = Arc::new(HttpClient::default());
    let stats = Arc::new(RunStats::default());
    let schedule = Arc::new(RampSchedule::new(0, config.stages.clone()));
    let target_url: Arc<str> = Arc::from(config.target_url.as_str());

    let max_vus = schedule.max_target().min(usize::MAX as u64) as usize;
    let ready_barrier: Arc<Barrier> = Arc::new(Barrier::new(max_vus.saturating_add(1)));
    let start_signal: Arc<StartSignal> = Arc::new(StartSignal::new());
    let run_started: Arc<OnceLock<Instant>> = Arc::new(OnceLock::new());

    let mut handles = Vec::with_capacity(max_vus);
    for vu_index in 1..=max_vus as u64 {
        let ctx = VuContext {
            vu_index,
            executor: RequestExecutor::new(
                client.clone(),
                target_url.clone(),
                config.request_timeout,
                stats.clone(),
            ),
            schedule: schedule.clone(),
            run_started: run_started.clone(),
            ready_barrier: ready_barrier.clone(),
            start_signal: start_signal.clone(),
        };

        handles.push(tokio::spawn(run_vu(ctx)));
    }

    // Block until every VU task is parked at the barrier, then start
    // the clock. This keeps spawn skew out of the measured run time.
    ready_barrier.wait().await;

    let started = Instant::now();
    let _ = run_started.set(started);
    start_signal.start();

    for h in handles {
        h.await?;
    }

    lifecycle.on_end();

    Ok(stats.summarize(started.elapsed()))
}
