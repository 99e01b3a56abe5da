use std::path::PathBuf;

use crate::{Endpoint, EndpointId, JobHandle, JobId, JobStatus, Phase, RateLimit, Suggestion};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub job: Option<JobHandle>,
    pub polling: bool,
    pub stream_open: bool,
    pub logs: Vec<String>,
    pub endpoints: Vec<Endpoint>,
    /// Entries left in the edit buffer ("N" of "N of M").
    pub endpoint_count: usize,
    /// Entries in the original snapshot ("M" of "N of M").
    pub original_count: usize,
    pub edited: bool,
    pub editing: Option<EndpointId>,
    pub api_name: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub preview: Option<PreviewView>,
    pub codegen_busy: bool,
    pub export_busy: bool,
    pub last_saved: Option<PathBuf>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub notice_seq: u64,
    pub history: Vec<HistoryRowView>,
    pub quota: Option<RateLimit>,
    pub closed: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub language: String,
    pub text: String,
    pub failed: bool,
    /// The buffer changed after this preview was produced.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub job_id: JobId,
    pub name: String,
    pub base_url: String,
    pub status: JobStatus,
}
