//! Command-line surface of the `sdkforge` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Turn API documentation into editable endpoint sets, SDKs and OpenAPI specs.
#[derive(Debug, Parser)]
#[command(name = "sdkforge", version, about)]
pub struct Cli {
    /// Backend API root, e.g. http://localhost:8000/api/v1
    #[arg(long, global = true, env = "SDKFORGE_API")]
    pub api: Option<String>,

    /// RON configuration file (defaults to ./sdkforge.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for generated SDK archives and exported specs
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start processing a documentation site and review the result
    New(NewArgs),
    /// Reopen a job from the history
    Open { job_id: String },
    /// Print previously processed jobs and exit
    History,
    /// Print the current rate-limit quota and exit
    Quota,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    #[arg(long)]
    pub name: String,
    /// Documentation URL to scrape
    #[arg(long)]
    pub url: String,
    /// What the SDK will be used for; steers the integration suggestions
    #[arg(long)]
    pub use_case: Option<String>,
    /// Ignore cached results for this URL
    #[arg(long)]
    pub force_refresh: bool,
}
