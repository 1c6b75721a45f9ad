use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Barrier;
use tokio::sync::Notify;

use super::executor::{RequestExecutor, THINK_TIME};
use super::schedule::RampSchedule;

#[derive(Debug)]
pub struct StartSignal {
    started: AtomicBool,
    notify: Notify,
}

impl StartSignal {
    pub fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    pub fn start(&self) {
        self.started.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);

        // Register before the final flag check so a `start` racing with
        // this call can never be missed.
        notified.as_mut().enable();
        if self.started.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }
}

impl Default for StartSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct VuContext {
    /// 1-based index; this VU iterates only while `vu_index` is at or
    /// below the interpolated ramp target.
    pub vu_index: u64,
    pub executor: RequestExecutor,
    pub schedule: Arc<RampSchedule>,

    pub run_started: Arc<OnceLock<Instant>>,
    pub ready_barrier: Arc<Barrier>,
    pub start_signal: Arc<StartSignal>,
}

/// The per-VU loop. Blocks on the ready barrier, waits for the shared
/// start instant, then iterates until the schedule is exhausted.
/// Shutdown is cooperative: the schedule is consulted only between
/// iterations, so an in-flight request always completes (or times out)
/// and its outcome is recorded.
pub async fn run_vu(ctx: VuContext) {
    ctx.ready_barrier.wait().await;
    ctx.start_signal.wait().await;

    let started = ctx.run_started.get().copied().unwrap_or_else(Instant::now);

    loop {
        let elapsed = started.elapsed();
        if ctx.schedule.is_done(elapsed) {
            break;
        }

        let target = ctx.schedule.target_at(elapsed);
        if ctx.vu_index > target {
            let wait = ctx.schedule.next_recheck_in(elapsed, ctx.vu_index);
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
            continue;
        }

        ctx.executor.run_iteration().await;
        tokio::time::sleep(THINK_TIME).await;
    }
}
