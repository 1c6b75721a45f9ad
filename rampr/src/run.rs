use anyhow::Context as _;

use rampr_core::runner::{ScenarioConfig, evaluate_thresholds, run_scenario};

use crate::cli::Cli;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub async fn run(cli: Cli) -> Result<ExitCode, RunError> {
    let out = output::formatter(cli.output);

    let input = cli.scenario_input();
    let config = ScenarioConfig::resolve(&input)
        .map_err(|err| RunError::InvalidInput(anyhow::Error::new(err)))?;

    let summary = run_scenario(&config, out.as_ref())
        .await
        .map_err(|err| RunError::RuntimeError(anyhow::Error::new(err)))?;

    let verdict = evaluate_thresholds(&config.thresholds, &summary.metrics)
        .map_err(|msg| RunError::RuntimeError(anyhow::anyhow!(msg)))?;

    out.print_summary(&summary, &verdict)
        .context("failed to print summary")
        .map_err(RunError::RuntimeError)?;

    for t in &verdict.thresholds {
        if t.passed {
            continue;
        }
        match t.observed {
            Some(o) => eprintln!(
                "threshold_failed: metric={} expr={} observed={o}",
                t.metric, t.expression
            ),
            None => eprintln!(
                "threshold_failed: metric={} expr={} observed=-",
                t.metric, t.expression
            ),
        }
    }

    Ok(ExitCode::from_verdict(verdict.pass))
}
