use std::path::PathBuf;

use crate::{
    CreateRequest, EndpointId, EndpointPatch, ExportFormat, JobHandle, JobId, JobOutput,
    OrchestratorError, RateLimit, StreamEnd, Suggestion, Ticket,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a documentation URL for processing.
    SubmitRequested(CreateRequest),
    /// Backend answered the create call.
    JobCreated {
        ticket: Ticket,
        result: Result<JobHandle, OrchestratorError>,
    },
    /// One status poll settled. `seq` increases per poll within a ticket.
    StatusPolled {
        ticket: Ticket,
        seq: u64,
        result: Result<JobHandle, OrchestratorError>,
    },
    /// A human-readable progress line from the push channel.
    LogLine { ticket: Ticket, line: String },
    /// The push channel closed.
    StreamClosed { ticket: Ticket, end: StreamEnd },
    OutputFetched {
        ticket: Ticket,
        result: Result<JobOutput, OrchestratorError>,
    },
    SuggestionsFetched {
        ticket: Ticket,
        result: Result<Vec<Suggestion>, OrchestratorError>,
    },
    HistoryListed(Result<Vec<JobHandle>, OrchestratorError>),
    QuotaFetched(Result<RateLimit, OrchestratorError>),
    /// User asked for fresh history and quota.
    RefreshRequested,
    /// User picked a job from the history list.
    HistorySelected { job_id: JobId },
    /// User entered edit mode on one endpoint.
    EditStarted { endpoint_id: EndpointId },
    EditCancelled,
    /// User committed an edit.
    EndpointEdited {
        endpoint_id: EndpointId,
        patch: EndpointPatch,
    },
    EndpointRemoved { endpoint_id: EndpointId },
    /// User discarded all local edits.
    EditsReset,
    PreviewRequested { language: String },
    PreviewReady {
        ticket: Ticket,
        revision: u64,
        language: String,
        result: Result<String, OrchestratorError>,
    },
    GenerateRequested { language: String },
    GenerateFinished {
        ticket: Ticket,
        result: Result<PathBuf, OrchestratorError>,
    },
    ExportRequested { format: ExportFormat },
    ExportFinished {
        ticket: Ticket,
        result: Result<PathBuf, OrchestratorError>,
    },
    /// The project view is going away; cancel everything.
    ViewClosed,
}
