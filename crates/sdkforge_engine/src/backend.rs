use bytes::Bytes;
use futures_util::stream::BoxStream;
use sdkforge_core::{
    CreateRequest, Endpoint, ExportFormat, JobHandle, JobOutput, RateLimit, Suggestion,
};

use crate::ApiError;

/// Raw payloads of the progress push channel, in arrival order.
pub type LineStream = BoxStream<'static, Result<String, ApiError>>;

/// The processing backend as seen by the client.
///
/// Every call is a single request/response except [`Backend::subscribe`],
/// which yields progress payloads until the server closes the channel or the
/// stream is dropped.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn create(&self, request: &CreateRequest) -> Result<JobHandle, ApiError>;

    async fn status(&self, job_id: &str) -> Result<JobHandle, ApiError>;

    async fn output(&self, job_id: &str) -> Result<JobOutput, ApiError>;

    async fn suggestions(&self, job_id: &str) -> Result<Vec<Suggestion>, ApiError>;

    async fn quota(&self) -> Result<RateLimit, ApiError>;

    async fn history(&self) -> Result<Vec<JobHandle>, ApiError>;

    /// `endpoints: None` means "use the server's snapshot".
    async fn generate(
        &self,
        job_id: &str,
        language: &str,
        endpoints: Option<&[Endpoint]>,
    ) -> Result<Bytes, ApiError>;

    async fn preview(
        &self,
        job_id: &str,
        language: &str,
        endpoints: Option<&[Endpoint]>,
    ) -> Result<String, ApiError>;

    async fn export(
        &self,
        job_id: &str,
        format: ExportFormat,
        endpoints: Option<&[Endpoint]>,
    ) -> Result<Bytes, ApiError>;

    async fn subscribe(&self, job_id: &str) -> Result<LineStream, ApiError>;
}
