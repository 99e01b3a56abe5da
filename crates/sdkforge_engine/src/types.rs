use std::path::PathBuf;

use sdkforge_core::{
    JobHandle, JobOutput, OrchestratorError, RateLimit, StreamEnd, Suggestion, Ticket,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Sdk,
    Spec,
}

/// Everything the engine reports back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    JobCreated {
        ticket: Ticket,
        result: Result<JobHandle, ApiError>,
    },
    StatusPolled {
        ticket: Ticket,
        seq: u64,
        result: Result<JobHandle, ApiError>,
    },
    StreamLine {
        ticket: Ticket,
        line: String,
    },
    StreamClosed {
        ticket: Ticket,
        end: StreamEnd,
    },
    OutputFetched {
        ticket: Ticket,
        result: Result<JobOutput, ApiError>,
    },
    SuggestionsFetched {
        ticket: Ticket,
        result: Result<Vec<Suggestion>, ApiError>,
    },
    HistoryListed(Result<Vec<JobHandle>, ApiError>),
    QuotaFetched(Result<RateLimit, ApiError>),
    PreviewReady {
        ticket: Ticket,
        revision: u64,
        language: String,
        result: Result<String, ApiError>,
    },
    ArtifactSaved {
        ticket: Ticket,
        kind: ArtifactKind,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("cannot connect: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("rate limited: {detail}")]
    RateLimited {
        detail: String,
        retry_after_secs: Option<u64>,
    },
    #[error("http status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not save artifact: {0}")]
    Save(String),
}

impl From<ApiError> for OrchestratorError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Connect(message) | ApiError::Timeout(message) => {
                OrchestratorError::Unreachable(message)
            }
            ApiError::RateLimited {
                detail,
                retry_after_secs,
            } => OrchestratorError::rate_limited(detail, retry_after_secs),
            other => OrchestratorError::Transport(other.to_string()),
        }
    }
}
