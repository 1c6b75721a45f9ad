use std::time::Duration;

use crate::HttpTransportErrorKind;

const RESPONSE_TIME_LIMIT: Duration = Duration::from_millis(500);

/// Per-request validations. A fixed, named set instead of arbitrary
/// predicates: every check operates on the same `RequestOutcome` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    StatusIs200,
    ResponseTimeUnder500ms,
}

impl Check {
    pub const ALL: [Check; 2] = [Check::StatusIs200, Check::ResponseTimeUnder500ms];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Check::StatusIs200 => "status is 200",
            Check::ResponseTimeUnder500ms => "response time < 500ms",
        }
    }

    #[must_use]
    pub fn passes(self, status: Option<u16>, elapsed: Duration) -> bool {
        match self {
            Check::StatusIs200 => status == Some(200),
            Check::ResponseTimeUnder500ms => elapsed < RESPONSE_TIME_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub check: Check,
    pub passed: bool,
}

/// The result of a single VU iteration. `status` is `None` exactly when
/// the request failed in transport (`transport_error` says how); such
/// outcomes still carry an elapsed time and count toward the error rate.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub status: Option<u16>,
    pub transport_error: Option<HttpTransportErrorKind>,
    pub elapsed: Duration,
    pub checks: Vec<CheckResult>,
}

impl RequestOutcome {
    pub fn new(
        status: Option<u16>,
        transport_error: Option<HttpTransportErrorKind>,
        elapsed: Duration,
    ) -> Self {
        let checks = Check::ALL
            .iter()
            .map(|&check| CheckResult {
                check,
                passed: check.passes(status, elapsed),
            })
            .collect();

        Self {
            status,
            transport_error,
            elapsed,
            checks,
        }
    }

    /// Failed = transport error or non-2xx status.
    #[must_use]
    pub fn failed(&self) -> bool {
        match self.status {
            Some(status) => !(200..=299).contains(&status),
            None => true,
        }
    }
}
