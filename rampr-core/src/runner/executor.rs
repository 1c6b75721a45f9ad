use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::HttpClient;

use super::check::RequestOutcome;
use super::stats::RunStats;

/// Fixed pause between a VU's iterations, modeling user pacing.
pub const THINK_TIME: Duration = Duration::from_secs(1);

/// Issues one GET per iteration and feeds the outcome into the shared
/// stats. Transport failures become failed outcomes, never errors: a VU
/// must survive a refused connection or a timeout and keep iterating.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Arc<HttpClient>,
    target_url: Arc<str>,
    timeout: Duration,
    stats: Arc<RunStats>,
}

impl RequestExecutor {
    pub fn new(
        client: Arc<HttpClient>,
        target_url: Arc<str>,
        timeout: Duration,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            client,
            target_url,
            timeout,
            stats,
        }
    }

    /// One request: send, time, check, record.
    pub async fn run_iteration(&self) -> RequestOutcome {
        let started = Instant::now();
        let result = self.client.get(&self.target_url, Some(self.timeout)).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(status) => RequestOutcome::new(Some(status), None, elapsed),
            Err(err) => RequestOutcome::new(None, Some(err.transport_error_kind()), elapsed),
        };

        self.stats.record(&outcome);
        outcome
    }
}
