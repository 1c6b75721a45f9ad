mod check;
mod config;
mod error;
mod executor;
mod run;
mod schedule;
mod stats;
mod thresholds;
mod vu;

pub use check::{Check, CheckResult, RequestOutcome};
pub use config::{ConfigError, ScenarioConfig, ScenarioInput, Stage, parse_duration};
pub use error::{Error, Result};
pub use executor::{RequestExecutor, THINK_TIME};
pub use run::{Lifecycle, NoopLifecycle, run_scenario};
pub use schedule::RampSchedule;
pub use stats::{
    CheckSummary, LatencySummary, MetricSummary, MetricValues, RunStats, RunSummary,
};
pub use thresholds::{
    ThresholdAgg, ThresholdExpr, ThresholdOp, ThresholdResult, ThresholdSet, Verdict,
    evaluate_thresholds, parse_threshold_expr,
};
pub use vu::{StartSignal, VuContext};
