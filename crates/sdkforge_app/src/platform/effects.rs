use std::sync::{mpsc, Arc};
use std::thread;

use forge_logging::{forge_debug, forge_warn};
use sdkforge_core::{Effect, Msg, OrchestratorError};
use sdkforge_engine::{
    ApiError, ArtifactKind, Backend, EngineEvent, EngineHandle, EngineSettings,
};

use super::app::Input;

/// Hands core effects to the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn start(
        backend: Arc<dyn Backend>,
        settings: EngineSettings,
        input_tx: mpsc::Sender<Input>,
    ) -> std::io::Result<Self> {
        let (engine, events) = EngineHandle::spawn(backend, settings)?;
        thread::Builder::new()
            .name("sdkforge-events".to_string())
            .spawn(move || {
                for event in events {
                    if input_tx.send(Input::Engine(event_to_msg(event))).is_err() {
                        break;
                    }
                }
                forge_debug!("engine event channel closed");
            })?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.engine.dispatch(effect);
        }
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

/// Failures of auxiliary calls never become a job failure.
fn soft(err: ApiError) -> OrchestratorError {
    match OrchestratorError::from(err) {
        limited @ OrchestratorError::RateLimited { .. } => limited,
        other => OrchestratorError::SoftFailure(other.to_string()),
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::JobCreated { ticket, result } => Msg::JobCreated {
            ticket,
            result: result.map_err(Into::into),
        },
        EngineEvent::StatusPolled {
            ticket,
            seq,
            result,
        } => Msg::StatusPolled {
            ticket,
            seq,
            result: result.map_err(Into::into),
        },
        EngineEvent::StreamLine { ticket, line } => Msg::LogLine { ticket, line },
        EngineEvent::StreamClosed { ticket, end } => Msg::StreamClosed { ticket, end },
        EngineEvent::OutputFetched { ticket, result } => Msg::OutputFetched {
            ticket,
            result: result.map_err(Into::into),
        },
        EngineEvent::SuggestionsFetched { ticket, result } => Msg::SuggestionsFetched {
            ticket,
            result: result.map_err(soft),
        },
        EngineEvent::HistoryListed(result) => Msg::HistoryListed(result.map_err(soft)),
        EngineEvent::QuotaFetched(result) => Msg::QuotaFetched(result.map_err(soft)),
        EngineEvent::PreviewReady {
            ticket,
            revision,
            language,
            result,
        } => Msg::PreviewReady {
            ticket,
            revision,
            language,
            result: result.map_err(soft),
        },
        EngineEvent::ArtifactSaved {
            ticket,
            kind,
            result,
        } => {
            if let Err(err) = &result {
                forge_warn!("{:?} artifact for {} not saved: {}", kind, ticket, err);
            }
            let result = result.map_err(Into::into);
            match kind {
                ArtifactKind::Sdk => Msg::GenerateFinished { ticket, result },
                ArtifactKind::Spec => Msg::ExportFinished { ticket, result },
            }
        }
    }
}
