//! SdkForge core: pure project-processing state machine and view-model helpers.
mod buffer;
mod cache;
mod effect;
mod endpoint;
mod error;
mod followup;
mod job;
mod msg;
mod state;
pub mod stream;
mod update;
mod view_model;

pub use buffer::EditBuffer;
pub use cache::{RateLimit, SessionCache};
pub use effect::Effect;
pub use endpoint::{Endpoint, EndpointId, EndpointPatch, ParamLocation, Parameter};
pub use error::{parse_retry_seconds, FailurePolicy, OrchestratorError};
pub use followup::{ExportFormat, FollowUpGate, FollowUpKind};
pub use job::{
    AuthScheme, CreateRequest, JobHandle, JobId, JobOutput, JobStatus, Suggestion, Ticket,
};
pub use msg::Msg;
pub use state::{AppState, Phase, PreviewSnapshot, PREVIEW_PLACEHOLDER};
pub use stream::{StreamEnd, StreamMessage, StreamTerminal};
pub use update::update;
pub use view_model::{AppViewModel, HistoryRowView, PreviewView};
