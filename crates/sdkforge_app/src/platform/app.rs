use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{anyhow, Context};
use forge_logging::{forge_debug, forge_info};
use sdkforge_core::{update, AppState, CreateRequest, JobId, Msg};
use sdkforge_engine::ReqwestBackend;

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{self, Command, HELP};
use super::ui::render::{endpoint_lines, history_lines, quota_line, Renderer};
use crate::cli::{self, Cli};

/// Everything the session loop reacts to.
pub(crate) enum Input {
    Engine(Msg),
    User(Command),
    /// A line that did not parse; already formatted for display.
    Rejected(String),
    /// Stdin reached end of file.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Interactive,
    /// Print the history once it arrives, then exit.
    History,
    /// Print the quota once it arrives, then exit.
    Quota,
}

enum Flow {
    Continue,
    Exit,
}

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    logging::initialize(config.log_destination, config.level());
    forge_info!("sdkforge starting against {}", config.api_base_url);

    let backend = ReqwestBackend::new(config.client_settings())
        .with_context(|| format!("configuring backend {}", config.api_base_url))?;
    let (input_tx, input_rx) = mpsc::channel();
    let runner = EffectRunner::start(
        Arc::new(backend),
        config.engine_settings(),
        input_tx.clone(),
    )
    .context("starting engine")?;

    let (mode, initial) = initial_messages(cli.command);
    let mut session = Session {
        state: AppState::new(),
        runner,
        renderer: Renderer::default(),
        mode,
        pending_open: None,
    };
    for msg in initial {
        match msg {
            Msg::HistorySelected { job_id } => session.pending_open = Some(job_id),
            msg => session.dispatch(msg),
        }
    }
    if mode == Mode::Interactive {
        println!("Type `help` for commands.");
        spawn_stdin_reader(input_tx, config.default_language.clone())?;
    }

    let outcome = session.run(input_rx);
    session.runner.shutdown();
    outcome
}

/// Opening a job waits for the history, so it is returned as a deferred selection.
fn initial_messages(command: Option<cli::Command>) -> (Mode, Vec<Msg>) {
    match command {
        None => (Mode::Interactive, vec![Msg::RefreshRequested]),
        Some(cli::Command::New(args)) => (
            Mode::Interactive,
            vec![
                Msg::RefreshRequested,
                Msg::SubmitRequested(CreateRequest {
                    name: args.name,
                    url: args.url,
                    use_case: args.use_case,
                    force_refresh: args.force_refresh,
                }),
            ],
        ),
        Some(cli::Command::Open { job_id }) => (
            Mode::Interactive,
            vec![Msg::RefreshRequested, Msg::HistorySelected { job_id }],
        ),
        Some(cli::Command::History) => (Mode::History, vec![Msg::RefreshRequested]),
        Some(cli::Command::Quota) => (Mode::Quota, vec![Msg::RefreshRequested]),
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>, default_language: String) -> io::Result<()> {
    thread::Builder::new()
        .name("sdkforge-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let input = match commands::parse(&line, &default_language) {
                    Ok(Some(command)) => Input::User(command),
                    Ok(None) => continue,
                    Err(err) => Input::Rejected(err.to_string()),
                };
                if input_tx.send(input).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(Input::Closed);
        })?;
    Ok(())
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    mode: Mode,
    pending_open: Option<JobId>,
}

impl Session {
    /// Drains inputs in batches and renders once per batch.
    fn run(&mut self, inputs: mpsc::Receiver<Input>) -> anyhow::Result<()> {
        while let Ok(first) = inputs.recv() {
            let mut next = Some(first);
            while let Some(input) = next {
                if let Flow::Exit = self.handle(input)? {
                    self.render();
                    return Ok(());
                }
                next = inputs.try_recv().ok();
            }
            self.render();
        }
        Ok(())
    }

    fn handle(&mut self, input: Input) -> anyhow::Result<Flow> {
        match input {
            Input::Engine(msg) => return self.handle_engine(msg),
            Input::User(Command::Send(msg)) => self.dispatch(msg),
            Input::User(Command::List) => print_lines(endpoint_lines(&self.state.view())),
            Input::User(Command::Help) => print_lines(HELP.iter().map(|line| line.to_string())),
            Input::User(Command::Quit) | Input::Closed => {
                self.dispatch(Msg::ViewClosed);
                return Ok(Flow::Exit);
            }
            Input::Rejected(reason) => println!("{reason}"),
        }
        Ok(Flow::Continue)
    }

    fn handle_engine(&mut self, msg: Msg) -> anyhow::Result<Flow> {
        match (self.mode, &msg) {
            (Mode::History, Msg::HistoryListed(Err(err)))
            | (Mode::Quota, Msg::QuotaFetched(Err(err))) => {
                return Err(anyhow!(err.user_message()));
            }
            _ => {}
        }
        let history_arrived = matches!(msg, Msg::HistoryListed(_));
        let quota_arrived = matches!(msg, Msg::QuotaFetched(_));
        self.dispatch(msg);

        match self.mode {
            Mode::History if history_arrived => {
                print_lines(history_lines(&self.state.view()));
                Ok(Flow::Exit)
            }
            Mode::Quota if quota_arrived => {
                if let Some(quota) = &self.state.view().quota {
                    println!("{}", quota_line(quota));
                }
                Ok(Flow::Exit)
            }
            Mode::Interactive if history_arrived => {
                if let Some(job_id) = self.pending_open.take() {
                    self.dispatch(Msg::HistorySelected { job_id });
                }
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Continue),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        if !effects.is_empty() {
            forge_debug!("dispatching {} effect(s)", effects.len());
        }
        self.runner.enqueue(effects);
    }

    fn render(&mut self) {
        if self.mode != Mode::Interactive || !self.state.consume_dirty() {
            return;
        }
        let view = self.state.view();
        print_lines(self.renderer.render(&view));
    }
}

fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}
