use std::time::Duration;

use bytes::Bytes;
use forge_logging::forge_debug;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use sdkforge_core::{
    CreateRequest, Endpoint, ExportFormat, JobHandle, JobOutput, RateLimit, Suggestion,
};
use serde::de::DeserializeOwned;
use sse_stream::SseStream;
use url::Url;

use crate::backend::{Backend, LineStream};
use crate::wire::{
    error_detail, preview_text, CreateBody, EndpointsBody, HistoryDto, OutputDto, ProjectDto,
    SuggestionsDto,
};
use crate::ApiError;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API root, e.g. `http://localhost:8000/api/v1`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to request/response calls; the progress stream has no total timeout.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(settings.base_url.clone()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.settings.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_query(
        &self,
        segments: &[&str],
        key: &str,
        value: &str,
    ) -> Result<Url, ApiError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        forge_debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .timeout(self.settings.request_timeout)
    }

    /// GET without a body, or POST carrying the edited endpoint set.
    fn request_with_endpoints(&self, url: Url, endpoints: Option<&[Endpoint]>) -> RequestBuilder {
        match endpoints {
            None => self.request(Method::GET, url),
            Some(endpoints) => self.request(Method::POST, url).json(&EndpointsBody {
                endpoints: Some(endpoints),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = send(self.request(Method::GET, url)).await?;
        decode_json(response).await
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn create(&self, request: &CreateRequest) -> Result<JobHandle, ApiError> {
        let url = self.endpoint(&["projects", ""])?;
        let response = send(
            self.request(Method::POST, url)
                .json(&CreateBody::from(request)),
        )
        .await?;
        let dto: ProjectDto = decode_json(response).await?;
        Ok(dto.into())
    }

    async fn status(&self, job_id: &str) -> Result<JobHandle, ApiError> {
        let dto: ProjectDto = self.get_json(self.endpoint(&["projects", job_id])?).await?;
        Ok(dto.into())
    }

    async fn output(&self, job_id: &str) -> Result<JobOutput, ApiError> {
        let dto: OutputDto = self
            .get_json(self.endpoint(&["projects", job_id, "endpoints"])?)
            .await?;
        Ok(dto.into())
    }

    async fn suggestions(&self, job_id: &str) -> Result<Vec<Suggestion>, ApiError> {
        let dto: SuggestionsDto = self
            .get_json(self.endpoint(&["projects", job_id, "suggestions"])?)
            .await?;
        Ok(dto.suggestions)
    }

    async fn quota(&self) -> Result<RateLimit, ApiError> {
        self.get_json(self.endpoint(&["rate-limit"])?).await
    }

    async fn history(&self) -> Result<Vec<JobHandle>, ApiError> {
        let dto: HistoryDto = self.get_json(self.endpoint(&["projects", ""])?).await?;
        Ok(dto.into_handles())
    }

    async fn generate(
        &self,
        job_id: &str,
        language: &str,
        endpoints: Option<&[Endpoint]>,
    ) -> Result<Bytes, ApiError> {
        let url = self.endpoint_with_query(&["projects", job_id, "generate"], "language", language)?;
        let response = send(
            self.request(Method::POST, url)
                .json(&EndpointsBody { endpoints }),
        )
        .await?;
        response.bytes().await.map_err(map_reqwest_error)
    }

    async fn preview(
        &self,
        job_id: &str,
        language: &str,
        endpoints: Option<&[Endpoint]>,
    ) -> Result<String, ApiError> {
        let url = self.endpoint_with_query(&["projects", job_id, "preview"], "language", language)?;
        let response = send(self.request_with_endpoints(url, endpoints)).await?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(preview_text(body))
    }

    async fn export(
        &self,
        job_id: &str,
        format: ExportFormat,
        endpoints: Option<&[Endpoint]>,
    ) -> Result<Bytes, ApiError> {
        let url =
            self.endpoint_with_query(&["projects", job_id, "export"], "format", format.as_str())?;
        let response = send(self.request_with_endpoints(url, endpoints)).await?;
        response.bytes().await.map_err(map_reqwest_error)
    }

    async fn subscribe(&self, job_id: &str) -> Result<LineStream, ApiError> {
        let url = self.endpoint(&["projects", job_id, "logs", "stream"])?;
        forge_debug!("GET {} (stream)", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response).await?;
        Ok(event_payloads(response))
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    let response = builder.send().await.map_err(map_reqwest_error)?;
    check_status(response).await
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let (detail, hinted_retry) = error_detail(&body);
    let detail = if detail.is_empty() {
        status.to_string()
    } else {
        detail
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimited {
            detail,
            retry_after_secs: retry_after.or(hinted_retry),
        });
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Turns an SSE response body into a stream of `data:` payloads.
///
/// Events without a `data` field (comments, bare `event:` lines) are skipped.
fn event_payloads(response: Response) -> LineStream {
    SseStream::from_byte_stream(response.bytes_stream())
        .filter_map(|event| async move {
            match event {
                Ok(event) => event.data.map(Ok),
                Err(err) => Some(Err(ApiError::Network(err.to_string()))),
            }
        })
        .boxed()
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(err.to_string());
    }
    if err.is_connect() {
        return ApiError::Connect(err.to_string());
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
