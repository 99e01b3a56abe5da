use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use forge_logging::{forge_debug, forge_warn};
use sdkforge_core::Effect;
use tokio::runtime::Runtime;

use crate::backend::Backend;
use crate::filename::{export_filename, sdk_archive_filename};
use crate::persist::ArtifactWriter;
use crate::poller::run_poller;
use crate::subscriber::run_subscriber;
use crate::tasks::JobTasks;
use crate::{ApiError, ArtifactKind, EngineEvent};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    /// Where generated SDK archives and exported specs are written.
    pub output_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            output_dir: PathBuf::from("downloads"),
        }
    }
}

enum EngineCommand {
    Run(Effect),
    Shutdown,
}

/// Executes effects on a background tokio runtime and reports [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn spawn(
        backend: Arc<dyn Backend>,
        settings: EngineSettings,
    ) -> io::Result<(Self, mpsc::Receiver<EngineEvent>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("sdkforge-io")
            .build()?;

        let thread = thread::Builder::new()
            .name("sdkforge-engine".to_string())
            .spawn(move || {
                let mut worker = Worker::new(runtime, backend, settings, event_tx);
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Run(effect) => worker.run(effect),
                        EngineCommand::Shutdown => break,
                    }
                }
                worker.shutdown();
            })?;

        Ok((
            Self {
                cmd_tx,
                thread: Some(thread),
            },
            event_rx,
        ))
    }

    pub fn dispatch(&self, effect: Effect) {
        if self.cmd_tx.send(EngineCommand::Run(effect)).is_err() {
            forge_warn!("engine thread is gone; effect dropped");
        }
    }

    /// Cancels background work and waits for the engine thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    runtime: Runtime,
    backend: Arc<dyn Backend>,
    poll_interval: Duration,
    writer: ArtifactWriter,
    events: mpsc::Sender<EngineEvent>,
    tasks: JobTasks,
}

impl Worker {
    fn new(
        runtime: Runtime,
        backend: Arc<dyn Backend>,
        settings: EngineSettings,
        events: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self {
            runtime,
            backend,
            poll_interval: settings.poll_interval,
            writer: ArtifactWriter::new(settings.output_dir),
            events,
            tasks: JobTasks::default(),
        }
    }

    fn run(&mut self, effect: Effect) {
        forge_debug!("effect {:?}", effect);
        let backend = self.backend.clone();
        match effect {
            Effect::CancelJobActivity => self.tasks.cancel_all(),
            Effect::CreateJob { ticket, request } => self.report(async move {
                let result = backend.create(&request).await;
                EngineEvent::JobCreated { ticket, result }
            }),
            Effect::StartPolling { ticket, job_id } => {
                let cancel = self.tasks.replace_poller(ticket);
                self.runtime.spawn(run_poller(
                    backend,
                    ticket,
                    job_id,
                    self.poll_interval,
                    cancel,
                    self.events.clone(),
                ));
            }
            Effect::StopPolling { ticket } => {
                self.tasks.stop_poller(ticket);
            }
            Effect::OpenStream { ticket, job_id } => {
                let cancel = self.tasks.replace_stream(ticket);
                self.runtime.spawn(run_subscriber(
                    backend,
                    ticket,
                    job_id,
                    cancel,
                    self.events.clone(),
                ));
            }
            Effect::FetchOutput { ticket, job_id } => self.report(async move {
                let result = backend.output(&job_id).await;
                EngineEvent::OutputFetched { ticket, result }
            }),
            Effect::FetchSuggestions { ticket, job_id } => self.report(async move {
                let result = backend.suggestions(&job_id).await;
                EngineEvent::SuggestionsFetched { ticket, result }
            }),
            Effect::RefreshHistory => self.report(async move {
                EngineEvent::HistoryListed(backend.history().await)
            }),
            Effect::RefreshQuota => {
                self.report(async move { EngineEvent::QuotaFetched(backend.quota().await) })
            }
            Effect::Preview {
                ticket,
                revision,
                job_id,
                language,
                endpoints,
            } => self.report(async move {
                let result = backend
                    .preview(&job_id, &language, endpoints.as_deref())
                    .await;
                EngineEvent::PreviewReady {
                    ticket,
                    revision,
                    language,
                    result,
                }
            }),
            Effect::Generate {
                ticket,
                job_id,
                language,
                api_name,
                endpoints,
            } => {
                let writer = self.writer.clone();
                self.report(async move {
                    let filename = sdk_archive_filename(api_name.as_deref(), &language);
                    let result = match backend
                        .generate(&job_id, &language, endpoints.as_deref())
                        .await
                    {
                        Ok(bytes) => save(writer, filename, bytes).await,
                        Err(err) => Err(err),
                    };
                    EngineEvent::ArtifactSaved {
                        ticket,
                        kind: ArtifactKind::Sdk,
                        result,
                    }
                })
            }
            Effect::Export {
                ticket,
                job_id,
                format,
                endpoints,
            } => {
                let writer = self.writer.clone();
                self.report(async move {
                    let result = match backend.export(&job_id, format, endpoints.as_deref()).await
                    {
                        Ok(bytes) => save(writer, export_filename(format), bytes).await,
                        Err(err) => Err(err),
                    };
                    EngineEvent::ArtifactSaved {
                        ticket,
                        kind: ArtifactKind::Spec,
                        result,
                    }
                })
            }
        }
    }

    /// Runs a one-off call and sends whatever event it produces.
    fn report<F>(&self, call: F)
    where
        F: Future<Output = EngineEvent> + Send + 'static,
    {
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let _ = events.send(call.await);
        });
    }

    fn shutdown(mut self) {
        self.tasks.cancel_all();
        self.runtime.shutdown_timeout(Duration::from_millis(500));
    }
}

async fn save(writer: ArtifactWriter, filename: String, bytes: Bytes) -> Result<PathBuf, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || writer.write(&filename, &bytes)).await;
    match outcome {
        Ok(Ok(path)) => Ok(path),
        Ok(Err(err)) => Err(ApiError::Save(err.to_string())),
        Err(join) => Err(ApiError::Save(join.to_string())),
    }
}
