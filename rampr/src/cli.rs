use clap::Parser;
use std::time::Duration;

use rampr_core::runner::{ScenarioInput, parse_duration};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    HumanReadable,
    /// Emit the final summary as a single JSON object.
    Json,
}

fn parse_timeout(input: &str) -> Result<Duration, String> {
    parse_duration(input)
}

#[derive(Debug, Parser)]
#[command(
    name = "rampr",
    version,
    about = "Ramping HTTP load generator with pass/fail thresholds",
    long_about = "rampr drives a fixed ramp-up / sustain / ramp-down virtual-user profile \
against a target HTTP service, checks every response, and asserts latency and \
error-rate thresholds at the end of the run.\n\n\
Every option can also be provided through its environment variable \
(VUS, DURATION, SERVICE_URL, DEPLOYMENT, NAMESPACE); flags take precedence.",
    after_help = "Examples:\n  rampr --service-url http://localhost:8080 --vus 50 --duration 1m\n  DEPLOYMENT=api NAMESPACE=prod rampr --duration 10m\n  rampr --service-url http://localhost:8080 --output json"
)]
pub struct Cli {
    /// Target virtual-user count during the sustain stage (default 10).
    /// Kept as a raw string so invalid input fails config validation
    /// instead of being silently replaced.
    #[arg(long, env = "VUS", value_name = "N")]
    pub vus: Option<String>,

    /// Sustain-stage length, e.g. 30s, 5m (default 5m)
    #[arg(long, env = "DURATION", value_name = "DURATION")]
    pub duration: Option<String>,

    /// Full target URL; takes precedence over --deployment/--namespace
    #[arg(long, env = "SERVICE_URL", value_name = "URL")]
    pub service_url: Option<String>,

    /// Deployment name, combined with --namespace into
    /// http://{deployment}.{namespace}.svc.cluster.local
    #[arg(long, env = "DEPLOYMENT", value_name = "NAME")]
    pub deployment: Option<String>,

    /// Namespace for the synthesized cluster-local target URL
    #[arg(long, env = "NAMESPACE", value_name = "NS")]
    pub namespace: Option<String>,

    /// Per-request timeout (default 30s)
    #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
    pub request_timeout: Option<Duration>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

impl Cli {
    /// The one place ambient configuration becomes an explicit value;
    /// everything downstream receives this struct.
    pub fn scenario_input(&self) -> ScenarioInput {
        ScenarioInput {
            vus: self.vus.clone(),
            duration: self.duration.clone(),
            service_url: self.service_url.clone(),
            deployment: self.deployment.clone(),
            namespace: self.namespace.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_full_flag_set() {
        let parsed = Cli::try_parse_from([
            "rampr",
            "--vus",
            "25",
            "--duration",
            "90s",
            "--service-url",
            "http://localhost:8080",
            "--request-timeout",
            "5s",
            "--output",
            "json",
        ]);

        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        assert_eq!(cli.vus.as_deref(), Some("25"));
        assert_eq!(cli.duration.as_deref(), Some("90s"));
        assert_eq!(cli.service_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cli.request_timeout, Some(Duration::from_secs(5)));
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn cli_rejects_invalid_request_timeout() {
        assert!(Cli::try_parse_from(["rampr", "--request-timeout", "10x"]).is_err());
    }

    #[test]
    fn scenario_input_carries_raw_values_through() {
        let cli = match Cli::try_parse_from(["rampr", "--vus", "not-a-number"]) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        // Non-numeric VUS must survive parsing so ScenarioConfig can
        // reject it explicitly.
        let input = cli.scenario_input();
        assert_eq!(input.vus.as_deref(), Some("not-a-number"));
    }
}
