//! RON configuration for the `sdkforge` binary.
//!
//! Values come from `./sdkforge.ron` (or `--config`), then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use sdkforge_engine::{ClientSettings, EngineSettings};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;
use crate::cli::Cli;

const DEFAULT_CONFIG_FILENAME: &str = "sdkforge.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub output_dir: PathBuf,
    pub default_language: String,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: ClientSettings::default().base_url,
            poll_interval_ms: 2_000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 60_000,
            output_dir: PathBuf::from("./downloads"),
            default_language: "python".to_string(),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the explicit path, or the default file if it exists.
    ///
    /// A missing default file yields defaults; a missing explicit file or a
    /// malformed one is an error.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(api) = &cli.api {
            self.api_base_url = api.clone();
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(ms) = cli.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if cli.verbose {
            self.log_level = "debug".to_string();
        }
    }

    pub fn level(&self) -> LevelFilter {
        forge_logging::parse_level(&self.log_level)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            // A zero period would spin the poller.
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(100)),
            output_dir: self.output_dir.clone(),
        }
    }
}
