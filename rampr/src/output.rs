use rampr_core::runner::{Lifecycle, RunSummary, Verdict};

use crate::cli::OutputFormat;

mod human;
mod json;

/// Output surface of a run. The formatter doubles as the lifecycle
/// sink: `on_start` announces the resolved configuration, `on_end`
/// fires after the VUs drain, `print_summary` renders the final report.
pub(crate) trait OutputFormatter: Lifecycle {
    fn print_summary(&self, summary: &RunSummary, verdict: &Verdict) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
