use std::path::PathBuf;

use crate::view_model::{AppViewModel, HistoryRowView, PreviewView};
use crate::{
    EditBuffer, EndpointId, FollowUpGate, FollowUpKind, JobHandle, SessionCache, Suggestion,
    Ticket,
};

/// Text shown in place of a preview that could not be produced.
pub const PREVIEW_PLACEHOLDER: &str = "// Preview unavailable for the current selection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Create call in flight.
    Submitting,
    /// Poller and push channel running.
    Processing,
    /// Job completed; output and suggestions being fetched.
    LoadingResults,
    /// Edit buffer ready.
    Review,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSnapshot {
    pub language: String,
    /// Buffer revision the preview was produced from.
    pub revision: u64,
    pub text: String,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    generation: u64,
    active: Option<Ticket>,
    closed: bool,
    phase: Phase,
    job: Option<JobHandle>,
    last_poll_seq: u64,
    polling: bool,
    stream_open: bool,
    logs: Vec<String>,
    buffer: Option<EditBuffer>,
    api_name: Option<String>,
    editing: Option<EndpointId>,
    suggestions: Vec<Suggestion>,
    gate: FollowUpGate,
    preview: Option<PreviewSnapshot>,
    last_saved: Option<PathBuf>,
    error: Option<String>,
    notice: Option<String>,
    /// Bumped on every notice, so a repeated message still counts as new.
    notice_seq: u64,
    cache: SessionCache,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let (endpoints, endpoint_count, original_count, edited, revision) = match &self.buffer {
            Some(buffer) => (
                buffer.endpoints().to_vec(),
                buffer.len(),
                buffer.original_len(),
                !buffer.is_pristine(),
                buffer.revision(),
            ),
            None => (Vec::new(), 0, 0, false, 0),
        };

        AppViewModel {
            phase: self.phase,
            job: self.job.clone(),
            polling: self.polling,
            stream_open: self.stream_open,
            logs: self.logs.clone(),
            endpoints,
            endpoint_count,
            original_count,
            edited,
            editing: self.editing.clone(),
            api_name: self.api_name.clone(),
            suggestions: self.suggestions.clone(),
            preview: self.preview.as_ref().map(|preview| PreviewView {
                language: preview.language.clone(),
                text: preview.text.clone(),
                failed: preview.failed,
                stale: preview.revision != revision,
            }),
            codegen_busy: self.gate.is_busy(FollowUpKind::Generate),
            export_busy: self.gate.is_busy(FollowUpKind::Export),
            last_saved: self.last_saved.clone(),
            error: self.error.clone(),
            notice: self.notice.clone(),
            notice_seq: self.notice_seq,
            history: self
                .cache
                .history()
                .iter()
                .map(|entry| HistoryRowView {
                    job_id: entry.id.clone(),
                    name: entry.display_name.clone(),
                    base_url: entry.base_url.clone(),
                    status: entry.status,
                })
                .collect(),
            quota: self.cache.quota(),
            closed: self.closed,
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_ticket(&self) -> Option<Ticket> {
        self.active
    }

    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        self.buffer.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a callback carrying `ticket` may still touch this state.
    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        !self.closed && self.active == Some(ticket)
    }

    /// Drops everything belonging to the previous job and mints a fresh ticket.
    pub(crate) fn begin_job(&mut self, phase: Phase) -> Ticket {
        self.generation += 1;
        let ticket = Ticket(self.generation);
        self.active = Some(ticket);
        self.phase = phase;
        self.job = None;
        self.last_poll_seq = 0;
        self.polling = false;
        self.stream_open = false;
        self.logs.clear();
        self.buffer = None;
        self.api_name = None;
        self.editing = None;
        self.suggestions.clear();
        self.gate = FollowUpGate::default();
        self.preview = None;
        self.last_saved = None;
        self.error = None;
        self.notice = None;
        self.mark_dirty();
        ticket
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.active = None;
        self.polling = false;
        self.stream_open = false;
        self.mark_dirty();
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.mark_dirty();
    }

    pub(crate) fn set_job(&mut self, handle: JobHandle) {
        self.job = Some(handle);
        self.mark_dirty();
    }

    /// Records the sequence number of a poll; false when it is not newer than the last one applied.
    pub(crate) fn accept_poll_seq(&mut self, seq: u64) -> bool {
        if seq <= self.last_poll_seq {
            return false;
        }
        self.last_poll_seq = seq;
        true
    }

    pub(crate) fn set_tracking(&mut self, polling: bool, stream_open: bool) {
        self.polling = polling;
        self.stream_open = stream_open;
        self.mark_dirty();
    }

    pub(crate) fn stop_polling(&mut self) {
        self.polling = false;
        self.mark_dirty();
    }

    pub(crate) fn stream_closed(&mut self) {
        self.stream_open = false;
        self.mark_dirty();
    }

    pub(crate) fn push_log(&mut self, line: String) {
        self.logs.push(line);
        self.mark_dirty();
    }

    pub(crate) fn install_output(&mut self, buffer: EditBuffer, api_name: Option<String>) {
        self.buffer = Some(buffer);
        self.api_name = api_name;
        self.editing = None;
        self.preview = None;
        self.mark_dirty();
    }

    pub(crate) fn api_name(&self) -> Option<&str> {
        self.api_name.as_deref()
    }

    pub(crate) fn set_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
        self.mark_dirty();
    }

    pub(crate) fn buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        self.buffer.as_mut()
    }

    pub(crate) fn editing(&self) -> Option<&EndpointId> {
        self.editing.as_ref()
    }

    pub(crate) fn set_editing(&mut self, endpoint_id: Option<EndpointId>) {
        self.editing = endpoint_id;
        self.mark_dirty();
    }

    pub(crate) fn gate_mut(&mut self) -> &mut FollowUpGate {
        &mut self.gate
    }

    pub(crate) fn set_preview(&mut self, preview: PreviewSnapshot) {
        self.preview = Some(preview);
        self.mark_dirty();
    }

    pub(crate) fn set_last_saved(&mut self, path: PathBuf) {
        self.last_saved = Some(path);
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
        self.notice_seq += 1;
        self.mark_dirty();
    }

    pub(crate) fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut SessionCache {
        self.mark_dirty();
        &mut self.cache
    }
}
