use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use sdkforge_core::{
    update, AppState, CreateRequest, Effect, Endpoint, EndpointPatch, ExportFormat, JobHandle,
    JobOutput, JobStatus, Msg, OrchestratorError, Ticket, PREVIEW_PLACEHOLDER,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(forge_logging::initialize_for_tests);
}

fn endpoint(id: &str) -> Endpoint {
    Endpoint {
        id: id.to_string(),
        method: "GET".to_string(),
        path: format!("/{}", id.to_lowercase()),
        summary: format!("Endpoint {id}"),
        ..Endpoint::default()
    }
}

/// Drives a cache-hit job with endpoints A, B, C into review.
fn review_state() -> (AppState, Ticket) {
    let (state, effects) = update(
        AppState::new(),
        Msg::SubmitRequested(CreateRequest {
            name: "Stripe".to_string(),
            url: "https://stripe.com/docs/api".to_string(),
            use_case: Some("billing".to_string()),
            force_refresh: false,
        }),
    );
    let ticket = match &effects[1] {
        Effect::CreateJob { ticket, .. } => *ticket,
        other => panic!("unexpected effect {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::JobCreated {
            ticket,
            result: Ok(JobHandle {
                id: "p1".to_string(),
                display_name: "Stripe".to_string(),
                base_url: "https://stripe.com/docs/api".to_string(),
                status: JobStatus::Completed,
                auth_scheme: None,
            }),
        },
    );
    let (state, _) = update(
        state,
        Msg::OutputFetched {
            ticket,
            result: Ok(JobOutput {
                endpoints: vec![endpoint("A"), endpoint("B"), endpoint("C")],
                auth_scheme: None,
                count: 3,
                api_name: Some("Stripe".to_string()),
            }),
        },
    );
    let (state, _) = update(
        state,
        Msg::SuggestionsFetched {
            ticket,
            result: Ok(Vec::new()),
        },
    );
    (state, ticket)
}

fn ids(endpoints: &[Endpoint]) -> Vec<&str> {
    endpoints.iter().map(|e| e.id.as_str()).collect()
}

#[test]
fn generate_sends_buffer_contents_after_removal() {
    init_logging();
    let (state, ticket) = review_state();
    let (state, _) = update(
        state,
        Msg::EndpointRemoved {
            endpoint_id: "B".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::GenerateRequested {
            language: "python".to_string(),
        },
    );

    match effects.as_slice() {
        [Effect::Generate {
            ticket: t,
            job_id,
            language,
            api_name,
            endpoints: Some(endpoints),
        }] => {
            assert_eq!(*t, ticket);
            assert_eq!(job_id, "p1");
            assert_eq!(language, "python");
            assert_eq!(api_name.as_deref(), Some("Stripe"));
            assert_eq!(ids(endpoints), vec!["A", "C"]);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    assert!(state.view().codegen_busy);
    assert_eq!(state.view().endpoint_count, 2);
    assert_eq!(state.view().original_count, 3);
}

#[test]
fn pristine_buffer_omits_endpoint_payload() {
    init_logging();
    let (state, _) = review_state();
    let (_state, effects) = update(
        state,
        Msg::ExportRequested {
            format: ExportFormat::Yaml,
        },
    );

    match effects.as_slice() {
        [Effect::Export {
            format, endpoints, ..
        }] => {
            assert_eq!(*format, ExportFormat::Yaml);
            assert_eq!(*endpoints, None);
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn follow_up_reads_buffer_at_invocation_time() {
    init_logging();
    let (state, ticket) = review_state();
    let (state, effects) = update(
        state,
        Msg::PreviewRequested {
            language: "typescript".to_string(),
        },
    );
    let revision = match &effects[0] {
        Effect::Preview {
            revision,
            endpoints,
            ..
        } => {
            assert_eq!(*endpoints, None);
            *revision
        }
        other => panic!("unexpected effect {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::PreviewReady {
            ticket,
            revision,
            language: "typescript".to_string(),
            result: Ok("class Client {}".to_string()),
        },
    );
    assert!(!state.view().preview.unwrap().stale);

    // Edit after the preview was opened, then download.
    let (state, _) = update(
        state,
        Msg::EndpointEdited {
            endpoint_id: "A".to_string(),
            patch: EndpointPatch::summary("Renamed"),
        },
    );
    assert!(state.view().preview.unwrap().stale);

    let (_state, effects) = update(
        state,
        Msg::GenerateRequested {
            language: "typescript".to_string(),
        },
    );
    match &effects[0] {
        Effect::Generate {
            endpoints: Some(endpoints),
            ..
        } => assert_eq!(endpoints[0].summary, "Renamed"),
        other => panic!("unexpected effect {other:?}"),
    }
}

#[test]
fn overlapping_generate_is_rejected_until_result_arrives() {
    init_logging();
    let (state, ticket) = review_state();
    let (state, first) = update(
        state,
        Msg::GenerateRequested {
            language: "python".to_string(),
        },
    );
    assert_eq!(first.len(), 1);

    let (state, second) = update(
        state,
        Msg::GenerateRequested {
            language: "python".to_string(),
        },
    );
    assert!(second.is_empty());
    let after_second = state.view();
    let (state, preview) = update(
        state,
        Msg::PreviewRequested {
            language: "python".to_string(),
        },
    );
    assert!(preview.is_empty());
    let after_preview = state.view();
    assert_eq!(after_preview.notice, after_second.notice);
    assert_eq!(after_preview.notice_seq, after_second.notice_seq + 1);

    // Export has its own slot.
    let (state, export) = update(
        state,
        Msg::ExportRequested {
            format: ExportFormat::Json,
        },
    );
    assert_eq!(export.len(), 1);

    let (state, _) = update(
        state,
        Msg::GenerateFinished {
            ticket,
            result: Ok(PathBuf::from("downloads/Stripe_python_sdk.zip")),
        },
    );
    let view = state.view();
    assert!(!view.codegen_busy);
    assert!(view.export_busy);
    assert_eq!(
        view.last_saved,
        Some(PathBuf::from("downloads/Stripe_python_sdk.zip"))
    );

    let (_state, third) = update(
        state,
        Msg::GenerateRequested {
            language: "go".to_string(),
        },
    );
    assert_eq!(third.len(), 1);
}

#[test]
fn preview_failure_is_soft() {
    init_logging();
    let (state, ticket) = review_state();
    let (state, _) = update(
        state,
        Msg::PreviewRequested {
            language: "python".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::PreviewReady {
            ticket,
            revision: 1,
            language: "python".to_string(),
            result: Err(OrchestratorError::Transport("500".into())),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.error.is_none());
    assert!(!view.codegen_busy);
    let preview = view.preview.unwrap();
    assert!(preview.failed);
    assert_eq!(preview.text, PREVIEW_PLACEHOLDER);
}

#[test]
fn generate_failure_surfaces_error_and_reenables_trigger() {
    init_logging();
    let (state, ticket) = review_state();
    let (state, _) = update(
        state,
        Msg::GenerateRequested {
            language: "python".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::GenerateFinished {
            ticket,
            result: Err(OrchestratorError::Transport("HTTP 500".into())),
        },
    );

    let view = state.view();
    assert!(view.error.unwrap().contains("HTTP 500"));
    assert!(!view.codegen_busy);

    let (_state, effects) = update(
        state,
        Msg::GenerateRequested {
            language: "python".to_string(),
        },
    );
    assert_eq!(effects.len(), 1);
}

#[test]
fn update_after_remove_is_noop() {
    init_logging();
    let (state, _) = review_state();
    let (state, _) = update(
        state,
        Msg::EndpointRemoved {
            endpoint_id: "B".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::EndpointEdited {
            endpoint_id: "B".to_string(),
            patch: EndpointPatch::summary("ghost"),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().endpoint_count, 2);
    assert_eq!(ids(state.buffer().unwrap().endpoints()), vec!["A", "C"]);
}

#[test]
fn reset_restores_snapshot_and_leaves_edit_mode() {
    init_logging();
    let (state, _) = review_state();
    let original = state.buffer().unwrap().original().to_vec();

    let (state, _) = update(
        state,
        Msg::EndpointEdited {
            endpoint_id: "C".to_string(),
            patch: EndpointPatch {
                method: Some("POST".to_string()),
                ..EndpointPatch::default()
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::EndpointRemoved {
            endpoint_id: "A".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::EditStarted {
            endpoint_id: "B".to_string(),
        },
    );
    assert_eq!(state.view().editing.as_deref(), Some("B"));
    assert!(state.view().edited);

    let (state, _) = update(state, Msg::EditsReset);

    let view = state.view();
    assert_eq!(view.editing, None);
    assert!(!view.edited);
    assert_eq!(view.endpoints, original);
}

#[test]
fn edit_commit_queued_before_reset_is_overwritten_by_reset() {
    init_logging();
    let (state, _) = review_state();
    let (state, _) = update(
        state,
        Msg::EditStarted {
            endpoint_id: "A".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::EndpointEdited {
            endpoint_id: "A".to_string(),
            patch: EndpointPatch::summary("blurred"),
        },
    );
    assert_eq!(state.view().editing, None);
    let (state, _) = update(state, Msg::EditsReset);

    assert_eq!(state.buffer().unwrap().get("A").unwrap().summary, "Endpoint A");
}

#[test]
fn edits_are_ignored_outside_review() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::EndpointRemoved {
            endpoint_id: "A".to_string(),
        },
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::GenerateRequested {
            language: "python".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.buffer().is_none());
}

#[test]
fn stale_artifact_result_does_not_release_new_job_gate() {
    init_logging();
    let (state, old_ticket) = review_state();
    let (state, _) = update(
        state,
        Msg::GenerateRequested {
            language: "python".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::SubmitRequested(CreateRequest {
            name: "Other".to_string(),
            url: "https://other.example.com".to_string(),
            use_case: None,
            force_refresh: true,
        }),
    );
    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            ticket: old_ticket,
            result: Ok(PathBuf::from("old.zip")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().last_saved, None);
    assert!(!state.view().codegen_busy);
}
