//! SdkForge engine: backend client and effect execution.
mod backend;
mod client;
mod engine;
mod filename;
mod persist;
mod poller;
mod subscriber;
mod tasks;
mod types;
mod wire;

pub use backend::{Backend, LineStream};
pub use client::{ClientSettings, ReqwestBackend};
pub use engine::{EngineHandle, EngineSettings};
pub use filename::{export_filename, sdk_archive_filename};
pub use persist::{ensure_output_dir, ArtifactWriter, PersistError};
pub use types::{ApiError, ArtifactKind, EngineEvent};
