use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Failure taxonomy for everything the orchestrator waits on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("rate limited: {detail}")]
    RateLimited {
        detail: String,
        retry_after_secs: Option<u64>,
    },
    #[error("job failed: {0}")]
    JobFailed(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("soft failure: {0}")]
    SoftFailure(String),
}

/// What the orchestrator does with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePolicy {
    /// Show a message to the user.
    pub surface: bool,
    /// Re-read the quota immediately.
    pub refresh_quota: bool,
    /// Stop the async loop that produced the failure.
    pub stops_loops: bool,
}

impl OrchestratorError {
    pub fn rate_limited(detail: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        let detail = detail.into();
        let retry_after_secs = retry_after_secs.or_else(|| parse_retry_seconds(&detail));
        OrchestratorError::RateLimited {
            detail,
            retry_after_secs,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        match self {
            OrchestratorError::Unreachable(_)
            | OrchestratorError::JobFailed(_)
            | OrchestratorError::Transport(_) => FailurePolicy {
                surface: true,
                refresh_quota: false,
                stops_loops: true,
            },
            OrchestratorError::RateLimited { .. } => FailurePolicy {
                surface: true,
                refresh_quota: true,
                stops_loops: true,
            },
            OrchestratorError::SoftFailure(_) => FailurePolicy {
                surface: false,
                refresh_quota: false,
                stops_loops: false,
            },
        }
    }

    /// Text shown to the user when [`FailurePolicy::surface`] is set.
    pub fn user_message(&self) -> String {
        match self {
            OrchestratorError::Unreachable(_) => {
                "Cannot reach the backend. Is the server running?".to_string()
            }
            OrchestratorError::RateLimited {
                detail,
                retry_after_secs: Some(secs),
            } => {
                if detail.is_empty() {
                    format!("Rate limit reached. Try again in {secs}s.")
                } else {
                    format!("Rate limit reached. Try again in {secs}s. ({detail})")
                }
            }
            OrchestratorError::RateLimited { detail, .. } => {
                format!("Rate limit reached: {detail}")
            }
            OrchestratorError::JobFailed(detail) => format!("Processing failed: {detail}"),
            OrchestratorError::Transport(detail) => {
                format!("Unexpected response from the backend: {detail}")
            }
            OrchestratorError::SoftFailure(detail) => detail.clone(),
        }
    }
}

static RETRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:retry|try again|wait)(?:\s+(?:in|after|for))?\s+(\d+)\s*(seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h)\b",
    )
    .unwrap()
});

/// Pulls a wait time out of free-form text such as `"retry in 60s"` or `"try again in 2 minutes"`.
///
/// Only numbers attached to a retry phrase count; `None` when the value does not fit in seconds.
pub fn parse_retry_seconds(text: &str) -> Option<u64> {
    let captures = RETRY_RE.captures(text)?;
    let value: u64 = captures[1].parse().ok()?;
    let unit = captures[2].to_ascii_lowercase();
    let scale = if unit.starts_with('h') {
        3600
    } else if unit.starts_with('m') {
        60
    } else {
        1
    };
    value.checked_mul(scale)
}

#[cfg(test)]
mod tests {
    use super::{parse_retry_seconds, OrchestratorError};

    #[test]
    fn retry_seconds_from_detail() {
        assert_eq!(parse_retry_seconds("retry in 60s"), Some(60));
        assert_eq!(parse_retry_seconds("Try again in 3600 seconds"), Some(3600));
        assert_eq!(parse_retry_seconds("wait 2 minutes"), Some(120));
        assert_eq!(parse_retry_seconds("limit 10 per hour reached"), None);
        assert_eq!(parse_retry_seconds("no numbers"), None);
        assert_eq!(
            parse_retry_seconds("Rate limit exceeded: 10 submissions per hour. Retry in 3600s"),
            Some(3600)
        );
        assert_eq!(parse_retry_seconds("Please retry after 2 hrs"), Some(7200));
    }

    #[test]
    fn oversized_retry_values_are_dropped() {
        assert_eq!(parse_retry_seconds("retry in 9999999999999999999 minutes"), None);
        assert_eq!(parse_retry_seconds("retry in 99999999999999999999999s"), None);
        let err = OrchestratorError::rate_limited("retry in 9999999999999999999 hours", None);
        assert_eq!(err.user_message(), "Rate limit reached: retry in 9999999999999999999 hours");
    }

    #[test]
    fn explicit_retry_after_wins_over_detail() {
        let err = OrchestratorError::rate_limited("retry in 60s", Some(30));
        assert_eq!(
            err,
            OrchestratorError::RateLimited {
                detail: "retry in 60s".to_string(),
                retry_after_secs: Some(30),
            }
        );
    }

    #[test]
    fn rate_limit_message_mentions_wait() {
        let err = OrchestratorError::rate_limited("retry in 60s", None);
        assert!(err.user_message().contains("60s"));
        assert!(err.policy().refresh_quota);
    }

    #[test]
    fn soft_failures_are_not_surfaced() {
        let policy = OrchestratorError::SoftFailure("history".into()).policy();
        assert!(!policy.surface);
        assert!(!policy.stops_loops);
    }
}
