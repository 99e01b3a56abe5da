use crate::{CreateRequest, Endpoint, ExportFormat, JobId, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Stop the poller and close the push channel, whatever job they belong to.
    CancelJobActivity,
    CreateJob {
        ticket: Ticket,
        request: CreateRequest,
    },
    StartPolling {
        ticket: Ticket,
        job_id: JobId,
    },
    /// Stop the poller if it still belongs to `ticket`.
    StopPolling { ticket: Ticket },
    OpenStream {
        ticket: Ticket,
        job_id: JobId,
    },
    FetchOutput {
        ticket: Ticket,
        job_id: JobId,
    },
    FetchSuggestions {
        ticket: Ticket,
        job_id: JobId,
    },
    RefreshHistory,
    RefreshQuota,
    Preview {
        ticket: Ticket,
        revision: u64,
        job_id: JobId,
        language: String,
        endpoints: Option<Vec<Endpoint>>,
    },
    Generate {
        ticket: Ticket,
        job_id: JobId,
        language: String,
        api_name: Option<String>,
        endpoints: Option<Vec<Endpoint>>,
    },
    Export {
        ticket: Ticket,
        job_id: JobId,
        format: ExportFormat,
        endpoints: Option<Vec<Endpoint>>,
    },
}
