use std::path::PathBuf;

use forge_logging::{forge_debug, forge_info, forge_warn};

use crate::state::PreviewSnapshot;
use crate::{
    AppState, CreateRequest, EditBuffer, Effect, Endpoint, EndpointId, EndpointPatch,
    ExportFormat, FollowUpKind, JobHandle, JobId, JobOutput, JobStatus, Msg, OrchestratorError,
    Phase, Suggestion, Ticket, PREVIEW_PLACEHOLDER,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_closed() {
        forge_debug!("View closed; dropping {:?}", msg);
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::SubmitRequested(request) => submit(&mut state, request),
        Msg::JobCreated { ticket, result } => job_created(&mut state, ticket, result),
        Msg::StatusPolled {
            ticket,
            seq,
            result,
        } => status_polled(&mut state, ticket, seq, result),
        Msg::LogLine { ticket, line } => {
            if state.is_current(ticket) {
                state.push_log(line);
            } else {
                forge_debug!("Dropping log line from stale stream {}", ticket);
            }
            Vec::new()
        }
        Msg::StreamClosed { ticket, end } => {
            if state.is_current(ticket) {
                forge_debug!("Progress stream {} closed: {:?}", ticket, end);
                state.stream_closed();
            }
            Vec::new()
        }
        Msg::OutputFetched { ticket, result } => output_fetched(&mut state, ticket, result),
        Msg::SuggestionsFetched { ticket, result } => {
            suggestions_fetched(&mut state, ticket, result);
            Vec::new()
        }
        Msg::HistoryListed(result) => {
            match result {
                Ok(entries) => state.cache_mut().replace_history(entries),
                Err(err) => absorb(&err, "history"),
            }
            Vec::new()
        }
        Msg::QuotaFetched(result) => {
            match result {
                Ok(quota) => state.cache_mut().replace_quota(quota),
                Err(err) => absorb(&err, "quota"),
            }
            Vec::new()
        }
        Msg::RefreshRequested => vec![Effect::RefreshHistory, Effect::RefreshQuota],
        Msg::HistorySelected { job_id } => select_history(&mut state, job_id),
        Msg::EditStarted { endpoint_id } => {
            let known = state
                .buffer()
                .is_some_and(|buffer| buffer.get(&endpoint_id).is_some());
            if state.phase() == Phase::Review && known {
                state.set_editing(Some(endpoint_id));
            }
            Vec::new()
        }
        Msg::EditCancelled => {
            if state.editing().is_some() {
                state.set_editing(None);
            }
            Vec::new()
        }
        Msg::EndpointEdited { endpoint_id, patch } => {
            edit_endpoint(&mut state, endpoint_id, patch);
            Vec::new()
        }
        Msg::EndpointRemoved { endpoint_id } => {
            remove_endpoint(&mut state, endpoint_id);
            Vec::new()
        }
        Msg::EditsReset => {
            let reset = match state.buffer_mut() {
                Some(buffer) => {
                    buffer.reset();
                    true
                }
                None => false,
            };
            if reset {
                state.set_editing(None);
            }
            Vec::new()
        }
        Msg::PreviewRequested { language } => request_preview(&mut state, language),
        Msg::PreviewReady {
            ticket,
            revision,
            language,
            result,
        } => {
            preview_ready(&mut state, ticket, revision, language, result);
            Vec::new()
        }
        Msg::GenerateRequested { language } => request_generate(&mut state, language),
        Msg::GenerateFinished { ticket, result } => {
            artifact_saved(&mut state, FollowUpKind::Generate, ticket, result)
        }
        Msg::ExportRequested { format } => request_export(&mut state, format),
        Msg::ExportFinished { ticket, result } => {
            artifact_saved(&mut state, FollowUpKind::Export, ticket, result)
        }
        Msg::ViewClosed => {
            forge_info!("View closed; cancelling job activity");
            state.close();
            vec![Effect::CancelJobActivity]
        }
    };

    (state, effects)
}

fn submit(state: &mut AppState, request: CreateRequest) -> Vec<Effect> {
    if state.phase() == Phase::Submitting {
        forge_debug!("Submit ignored: a create call is already in flight");
        return Vec::new();
    }
    let request = CreateRequest {
        name: request.name.trim().to_string(),
        url: request.url.trim().to_string(),
        use_case: request
            .use_case
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        force_refresh: request.force_refresh,
    };
    if request.url.is_empty() || request.name.is_empty() {
        state.set_notice("A project name and documentation URL are required.");
        return Vec::new();
    }

    let ticket = state.begin_job(Phase::Submitting);
    forge_info!("Submitting {} ({}) as {}", request.name, request.url, ticket);
    vec![
        Effect::CancelJobActivity,
        Effect::CreateJob { ticket, request },
    ]
}

fn job_created(
    state: &mut AppState,
    ticket: Ticket,
    result: Result<JobHandle, OrchestratorError>,
) -> Vec<Effect> {
    if !state.is_current(ticket) {
        forge_debug!("Dropping create response for stale ticket {}", ticket);
        return Vec::new();
    }

    let mut effects = Vec::new();
    match result {
        Ok(handle) => {
            forge_info!("Job {} created with status {}", handle.id, handle.status);
            effects.extend(track_job(state, ticket, handle));
        }
        Err(err) => {
            state.set_phase(Phase::Idle);
            apply_failure(state, &err, &mut effects);
        }
    }
    // Every submission attempt may change the quota.
    push_unique(&mut effects, Effect::RefreshHistory);
    push_unique(&mut effects, Effect::RefreshQuota);
    effects
}

/// Installs `handle` as the active job and starts whatever its status calls for.
fn track_job(state: &mut AppState, ticket: Ticket, handle: JobHandle) -> Vec<Effect> {
    let job_id = handle.id.clone();
    let status = handle.status;
    state.set_job(handle);

    match status {
        JobStatus::Completed => {
            state.set_phase(Phase::LoadingResults);
            vec![Effect::FetchOutput { ticket, job_id }]
        }
        JobStatus::Failed => {
            state.set_phase(Phase::Failed);
            let err = OrchestratorError::JobFailed(format!("job {job_id} reported FAILED"));
            let mut effects = Vec::new();
            apply_failure(state, &err, &mut effects);
            effects
        }
        JobStatus::Pending | JobStatus::Scraping | JobStatus::Parsing => {
            state.set_phase(Phase::Processing);
            state.set_tracking(true, true);
            vec![
                Effect::StartPolling {
                    ticket,
                    job_id: job_id.clone(),
                },
                Effect::OpenStream { ticket, job_id },
            ]
        }
    }
}

fn status_polled(
    state: &mut AppState,
    ticket: Ticket,
    seq: u64,
    result: Result<JobHandle, OrchestratorError>,
) -> Vec<Effect> {
    if !state.is_current(ticket) {
        forge_debug!("Dropping poll #{} for stale ticket {}", seq, ticket);
        return Vec::new();
    }
    if state.phase() != Phase::Processing {
        forge_debug!("Dropping poll #{}: polling already settled", seq);
        return Vec::new();
    }
    if !state.accept_poll_seq(seq) {
        forge_debug!("Dropping out-of-order poll #{}", seq);
        return Vec::new();
    }

    let handle = match result {
        Ok(handle) => handle,
        Err(err) => {
            // Poll failures are terminal for the loop; no retry.
            state.stop_polling();
            state.set_phase(Phase::Failed);
            let mut effects = vec![Effect::StopPolling { ticket }];
            apply_failure(state, &err, &mut effects);
            return effects;
        }
    };

    if state.job().is_some_and(|job| job.id != handle.id) {
        forge_warn!(
            "Poll #{} returned job {} while tracking another job; ignoring",
            seq,
            handle.id
        );
        return Vec::new();
    }

    let job_id = handle.id.clone();
    let status = handle.status;
    state.set_job(handle);
    match status {
        JobStatus::Completed => {
            forge_info!("Job {} completed", job_id);
            state.stop_polling();
            state.set_phase(Phase::LoadingResults);
            vec![
                Effect::StopPolling { ticket },
                Effect::FetchOutput { ticket, job_id },
                Effect::RefreshHistory,
                Effect::RefreshQuota,
            ]
        }
        JobStatus::Failed => {
            state.stop_polling();
            state.set_phase(Phase::Failed);
            let mut effects = vec![Effect::StopPolling { ticket }];
            let err = OrchestratorError::JobFailed(format!("job {job_id} reported FAILED"));
            apply_failure(state, &err, &mut effects);
            effects.push(Effect::RefreshHistory);
            effects
        }
        JobStatus::Pending | JobStatus::Scraping | JobStatus::Parsing => Vec::new(),
    }
}

fn output_fetched(
    state: &mut AppState,
    ticket: Ticket,
    result: Result<JobOutput, OrchestratorError>,
) -> Vec<Effect> {
    if !state.is_current(ticket) || state.phase() != Phase::LoadingResults {
        forge_debug!("Dropping output for stale ticket {}", ticket);
        return Vec::new();
    }

    match result {
        Ok(output) => {
            if output.count != output.endpoints.len() {
                forge_warn!(
                    "Output reports {} endpoints but carries {}",
                    output.count,
                    output.endpoints.len()
                );
            }
            let Some(mut job) = state.job().cloned() else {
                return Vec::new();
            };
            if output.auth_scheme.is_some() {
                job.auth_scheme = output.auth_scheme.clone();
            }
            let job_id = job.id.clone();
            state.set_job(job);
            state.install_output(EditBuffer::new(output.endpoints), output.api_name);
            vec![Effect::FetchSuggestions { ticket, job_id }]
        }
        Err(err) => {
            state.set_phase(Phase::Failed);
            let mut effects = Vec::new();
            apply_failure(state, &err, &mut effects);
            effects
        }
    }
}

fn suggestions_fetched(
    state: &mut AppState,
    ticket: Ticket,
    result: Result<Vec<Suggestion>, OrchestratorError>,
) {
    if !state.is_current(ticket)
        || state.phase() != Phase::LoadingResults
        || state.buffer().is_none()
    {
        forge_debug!("Dropping suggestions for stale ticket {}", ticket);
        return;
    }
    match result {
        Ok(suggestions) => state.set_suggestions(suggestions),
        Err(err) => absorb(&err, "suggestions"),
    }
    state.set_phase(Phase::Review);
}

fn select_history(state: &mut AppState, job_id: JobId) -> Vec<Effect> {
    let Some(entry) = state.cache().find(&job_id).cloned() else {
        state.set_notice(format!("No job {job_id} in history."));
        return Vec::new();
    };

    let ticket = state.begin_job(Phase::Idle);
    forge_info!("Opening job {} from history as {}", entry.id, ticket);
    let mut effects = vec![Effect::CancelJobActivity];
    effects.extend(track_job(state, ticket, entry));
    effects
}

fn edit_endpoint(state: &mut AppState, endpoint_id: EndpointId, patch: EndpointPatch) {
    if state.phase() != Phase::Review || patch.is_empty() {
        return;
    }
    let changed = state
        .buffer_mut()
        .is_some_and(|buffer| buffer.update(&endpoint_id, &patch));
    if !changed {
        forge_debug!("Edit of {} had no effect", endpoint_id);
    }
    if state.editing() == Some(&endpoint_id) {
        state.set_editing(None);
    } else if changed {
        state.mark_dirty();
    }
}

fn remove_endpoint(state: &mut AppState, endpoint_id: EndpointId) {
    if state.phase() != Phase::Review {
        return;
    }
    let removed = state
        .buffer_mut()
        .is_some_and(|buffer| buffer.remove(&endpoint_id));
    if state.editing() == Some(&endpoint_id) {
        state.set_editing(None);
    } else if removed {
        state.mark_dirty();
    }
}

struct ReviewContext {
    ticket: Ticket,
    job_id: JobId,
    revision: u64,
    endpoints: Option<Vec<Endpoint>>,
}

/// Snapshot of the buffer taken at invocation time for a follow-up operation.
fn review_context(state: &AppState) -> Option<ReviewContext> {
    if state.phase() != Phase::Review {
        forge_debug!("Follow-up ignored outside review");
        return None;
    }
    let ticket = state.active_ticket()?;
    let job_id = state.job()?.id.clone();
    let buffer = state.buffer()?;
    Some(ReviewContext {
        ticket,
        job_id,
        revision: buffer.revision(),
        endpoints: buffer.payload(),
    })
}

fn reject(state: &mut AppState, kind: FollowUpKind) -> Vec<Effect> {
    forge_warn!("{:?} ignored: previous request still in flight", kind);
    state.set_notice("Please wait for the current request to finish.");
    Vec::new()
}

fn request_preview(state: &mut AppState, language: String) -> Vec<Effect> {
    let Some(ctx) = review_context(state) else {
        return Vec::new();
    };
    if !state.gate_mut().try_acquire(FollowUpKind::Preview) {
        return reject(state, FollowUpKind::Preview);
    }
    state.mark_dirty();
    vec![Effect::Preview {
        ticket: ctx.ticket,
        revision: ctx.revision,
        job_id: ctx.job_id,
        language,
        endpoints: ctx.endpoints,
    }]
}

fn request_generate(state: &mut AppState, language: String) -> Vec<Effect> {
    let Some(ctx) = review_context(state) else {
        return Vec::new();
    };
    if !state.gate_mut().try_acquire(FollowUpKind::Generate) {
        return reject(state, FollowUpKind::Generate);
    }
    forge_info!("Generating {} SDK for job {}", language, ctx.job_id);
    state.mark_dirty();
    vec![Effect::Generate {
        ticket: ctx.ticket,
        job_id: ctx.job_id,
        language,
        api_name: state.api_name().map(ToOwned::to_owned),
        endpoints: ctx.endpoints,
    }]
}

fn request_export(state: &mut AppState, format: ExportFormat) -> Vec<Effect> {
    let Some(ctx) = review_context(state) else {
        return Vec::new();
    };
    if !state.gate_mut().try_acquire(FollowUpKind::Export) {
        return reject(state, FollowUpKind::Export);
    }
    forge_info!("Exporting job {} as {}", ctx.job_id, format);
    state.mark_dirty();
    vec![Effect::Export {
        ticket: ctx.ticket,
        job_id: ctx.job_id,
        format,
        endpoints: ctx.endpoints,
    }]
}

fn preview_ready(
    state: &mut AppState,
    ticket: Ticket,
    revision: u64,
    language: String,
    result: Result<String, OrchestratorError>,
) {
    if !state.is_current(ticket) {
        forge_debug!("Dropping preview for stale ticket {}", ticket);
        return;
    }
    state.gate_mut().release(FollowUpKind::Preview);
    let (text, failed) = match result {
        Ok(text) => (text, false),
        Err(err) => {
            absorb(&err, "preview");
            (PREVIEW_PLACEHOLDER.to_string(), true)
        }
    };
    state.set_preview(PreviewSnapshot {
        language,
        revision,
        text,
        failed,
    });
}

fn artifact_saved(
    state: &mut AppState,
    kind: FollowUpKind,
    ticket: Ticket,
    result: Result<PathBuf, OrchestratorError>,
) -> Vec<Effect> {
    if !state.is_current(ticket) {
        forge_debug!("Dropping {:?} result for stale ticket {}", kind, ticket);
        return Vec::new();
    }
    state.gate_mut().release(kind);
    state.mark_dirty();
    let mut effects = Vec::new();
    match result {
        Ok(path) => {
            forge_info!("Saved {}", path.display());
            state.set_notice(format!("Saved {}", path.display()));
            state.set_last_saved(path);
        }
        Err(err) => apply_failure(state, &err, &mut effects),
    }
    effects
}

/// Applies the taxonomy's policy for a hard failure.
fn apply_failure(state: &mut AppState, err: &OrchestratorError, effects: &mut Vec<Effect>) {
    let policy = err.policy();
    if policy.surface {
        forge_warn!("{}", err);
        state.set_error(err.user_message());
    } else {
        forge_debug!("{}", err);
    }
    if policy.refresh_quota {
        push_unique(effects, Effect::RefreshQuota);
    }
}

fn absorb(err: &OrchestratorError, what: &str) {
    forge_debug!("Ignoring {} failure: {}", what, err);
}

fn push_unique(effects: &mut Vec<Effect>, effect: Effect) {
    if !effects.contains(&effect) {
        effects.push(effect);
    }
}
