use std::time::Duration;

use super::thresholds::ThresholdSet;

const DEFAULT_VUS: u64 = 10;
const DEFAULT_DURATION: &str = "5m";
const RAMP_DURATION: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One segment of the VU ramp profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid VUS `{0}` (expected a positive integer)")]
    InvalidVus(String),

    #[error("invalid DURATION `{0}` (expected e.g. 10s, 250ms, 1m)")]
    InvalidDuration(String),

    #[error("no target: set SERVICE_URL, or DEPLOYMENT and NAMESPACE")]
    UnresolvableTarget,

    #[error("invalid target url: {0}")]
    InvalidTargetUrl(String),
}

/// Raw environment-style options, collected once at startup. Nothing in
/// the runner reads process state directly; the CLI builds this from
/// flags and their environment fallbacks and hands it over.
#[derive(Debug, Clone, Default)]
pub struct ScenarioInput {
    pub vus: Option<String>,
    pub duration: Option<String>,
    pub service_url: Option<String>,
    pub deployment: Option<String>,
    pub namespace: Option<String>,
    pub request_timeout: Option<Duration>,
}

/// Fully resolved scenario: target, ramp profile, thresholds.
/// Read-only once the run starts.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub target_url: String,
    pub vus: u64,
    pub sustain: Duration,
    pub stages: Vec<Stage>,
    pub thresholds: Vec<ThresholdSet>,
    pub request_timeout: Duration,
}

impl ScenarioConfig {
    /// Validate the raw input and build the fixed ramp-up / sustain /
    /// ramp-down profile. Invalid numeric input fails here instead of
    /// silently defaulting.
    pub fn resolve(input: &ScenarioInput) -> Result<Self, ConfigError> {
        let vus = match &input.vus {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| ConfigError::InvalidVus(raw.clone()))?,
            None => DEFAULT_VUS,
        };

        let sustain_raw = input.duration.as_deref().unwrap_or(DEFAULT_DURATION);
        let sustain = parse_duration(sustain_raw)
            .map_err(|_| ConfigError::InvalidDuration(sustain_raw.to_string()))?;

        let target_url = resolve_target_url(input)?;
        let parsed =
            url::Url::parse(&target_url).map_err(|_| ConfigError::InvalidTargetUrl(target_url.clone()))?;
        if parsed.scheme() != "http" {
            return Err(ConfigError::InvalidTargetUrl(target_url));
        }

        let stages = vec![
            Stage {
                duration: RAMP_DURATION,
                target: vus,
            },
            Stage {
                duration: sustain,
                target: vus,
            },
            Stage {
                duration: RAMP_DURATION,
                target: 0,
            },
        ];

        Ok(Self {
            target_url,
            vus,
            sustain,
            stages,
            thresholds: default_thresholds(),
            request_timeout: input.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        })
    }

    pub fn total_duration(&self) -> Duration {
        self.stages
            .iter()
            .fold(Duration::ZERO, |acc, s| acc.saturating_add(s.duration))
    }
}

fn resolve_target_url(input: &ScenarioInput) -> Result<String, ConfigError> {
    if let Some(url) = &input.service_url
        && !url.is_empty()
    {
        return Ok(url.clone());
    }

    match (input.deployment.as_deref(), input.namespace.as_deref()) {
        (Some(deployment), Some(namespace)) if !deployment.is_empty() && !namespace.is_empty() => {
            Ok(format!("http://{deployment}.{namespace}.svc.cluster.local"))
        }
        _ => Err(ConfigError::UnresolvableTarget),
    }
}

fn default_thresholds() -> Vec<ThresholdSet> {
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

/// Parse a duration string like `10s`, `250ms`, `1m`, `2h`.
/// A bare number is seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 10s, 250ms, 1m)".to_string());
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);

    if number_end == 0 {
        return Err(format!(
            "invalid duration '{s}' (expected e.g. 10s, 250ms, 1m)"
        ));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' (expected e.g. 10s, 250ms, 1m)"))?;

    match unit_str.trim() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => Ok(Duration::from_secs(value)),
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => {
            Ok(Duration::from_millis(value))
        }
        "m" | "min" | "mins" | "minute" | "minutes" => {
            let secs = value
                .checked_mul(60)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        "h" | "hr" | "hrs" | "hour" | "hours" => {
            let secs = value
                .checked_mul(60)
                .and_then(|v| v.checked_mul(60))
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        _ => Err(format!(
            "invalid duration '{s}' (expected e.g. 10s, 250ms, 1m)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with_target() -> ScenarioInput {
        ScenarioInput {
            service_url: Some("http://localhost:8080".to_string()),
            ..ScenarioInput::default()
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let cfg = match ScenarioConfig::resolve(&input_with_target()) {
            Ok(v) => v,
            Err(err) => panic!("{err}"),
        };

        assert_eq!(cfg.vus, 10);
        assert_eq!(cfg.sustain, Duration::from_secs(300));
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.stages.len(), 3);
        assert_eq!(cfg.stages[0].duration, Duration::from_secs(30));
        assert_eq!(cfg.stages[0].target, 10);
        assert_eq!(cfg.stages[1].duration, Duration::from_secs(300));
        assert_eq!(cfg.stages[1].target, 10);
        assert_eq!(cfg.stages[2].duration, Duration::from_secs(30));
        assert_eq!(cfg.stages[2].target, 0);
        assert_eq!(cfg.total_duration(), Duration::from_secs(360));
    }

    #[test]
    fn resolve_synthesizes_cluster_local_url() {
        let input = ScenarioInput {
            deployment: Some("svc".to_string()),
            namespace: Some("prod".to_string()),
            ..ScenarioInput::default()
        };

        let cfg = match ScenarioConfig::resolve(&input) {
            Ok(v) => v,
            Err(err) => panic!("{err}"),
        };
        assert_eq!(cfg.target_url, "http://svc.prod.svc.cluster.local");
    }

    #[test]
    fn resolve_prefers_service_url_over_synthesis() {
        let input = ScenarioInput {
            service_url: Some("http://override:9000".to_string()),
            deployment: Some("svc".to_string()),
            namespace: Some("prod".to_string()),
            ..ScenarioInput::default()
        };

        let cfg = match ScenarioConfig::resolve(&input) {
            Ok(v) => v,
            Err(err) => panic!("{err}"),
        };
        assert_eq!(cfg.target_url, "http://override:9000");
    }

    #[test]
    fn resolve_fails_without_any_target() {
        let input = ScenarioInput {
            deployment: Some("svc".to_string()),
            ..ScenarioInput::default()
        };

        assert!(matches!(
            ScenarioConfig::resolve(&input),
            Err(ConfigError::UnresolvableTarget)
        ));
    }

    #[test]
    fn resolve_rejects_non_numeric_vus() {
        let input = ScenarioInput {
            vus: Some("ten".to_string()),
            ..input_with_target()
        };

        assert!(matches!(
            ScenarioConfig::resolve(&input),
            Err(ConfigError::InvalidVus(_))
        ));
    }

    #[test]
    fn resolve_rejects_zero_vus() {
        let input = ScenarioInput {
            vus: Some("0".to_string()),
            ..input_with_target()
        };

        assert!(matches!(
            ScenarioConfig::resolve(&input),
            Err(ConfigError::InvalidVus(_))
        ));
    }

    #[test]
    fn resolve_rejects_invalid_duration() {
        let input = ScenarioInput {
            duration: Some("5x".to_string()),
            ..input_with_target()
        };

        assert!(matches!(
            ScenarioConfig::resolve(&input),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn resolve_rejects_non_http_targets() {
        let input = ScenarioInput {
            service_url: Some("https://secure.example.com".to_string()),
            ..ScenarioInput::default()
        };

        assert!(matches!(
            ScenarioConfig::resolve(&input),
            Err(ConfigError::InvalidTargetUrl(_))
        ));
    }

    #[test]
    fn parse_duration_accepts_common_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(2 * 60 * 60)));
        assert_eq!(parse_duration("45"), Ok(Duration::from_secs(45)));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
    }
}
