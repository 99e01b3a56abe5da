//! JSON shapes exchanged with the backend and their mapping onto core types.

use sdkforge_core::{
    AuthScheme, CreateRequest, Endpoint, JobHandle, JobOutput, JobStatus, ParamLocation,
    Parameter, Suggestion,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct CreateBody<'a> {
    pub name: &'a str,
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<&'a str>,
    pub force_refresh: bool,
}

impl<'a> From<&'a CreateRequest> for CreateBody<'a> {
    fn from(request: &'a CreateRequest) -> Self {
        Self {
            name: &request.name,
            url: &request.url,
            use_case: request.use_case.as_deref(),
            force_refresh: request.force_refresh,
        }
    }
}

/// Body of generate/preview/export calls; `{}` lets the server use its own snapshot.
#[derive(Debug, Serialize)]
pub(crate) struct EndpointsBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<&'a [Endpoint]>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    pub status: JobStatus,
    #[serde(default)]
    pub auth_scheme: Option<Value>,
}

impl From<ProjectDto> for JobHandle {
    fn from(dto: ProjectDto) -> Self {
        JobHandle {
            id: dto.id,
            display_name: dto.name,
            base_url: dto.base_url,
            status: dto.status,
            auth_scheme: dto.auth_scheme.as_ref().and_then(auth_scheme_from_value),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParameterDto {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: Option<String>,
    #[serde(alias = "in", default)]
    pub location: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EndpointDto {
    pub id: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub parameters: Option<Vec<ParameterDto>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl From<EndpointDto> for Endpoint {
    fn from(dto: EndpointDto) -> Self {
        Endpoint {
            id: dto.id,
            method: dto.method.to_ascii_uppercase(),
            path: dto.path,
            summary: dto.summary.unwrap_or_default(),
            parameters: dto
                .parameters
                .unwrap_or_default()
                .into_iter()
                .map(|param| Parameter {
                    name: param.name,
                    param_type: param.param_type.unwrap_or_else(|| "string".to_string()),
                    location: parse_location(param.location.as_deref()),
                    required: param.required.unwrap_or(false),
                    description: param.description.unwrap_or_default(),
                })
                .collect(),
            tags: dto.tags.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputDto {
    pub endpoints: Vec<EndpointDto>,
    #[serde(default, alias = "authScheme")]
    pub auth_scheme: Option<Value>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default, alias = "apiName")]
    pub api_name: Option<String>,
}

impl From<OutputDto> for JobOutput {
    fn from(dto: OutputDto) -> Self {
        let endpoints: Vec<Endpoint> = dto.endpoints.into_iter().map(Endpoint::from).collect();
        JobOutput {
            count: dto.count.unwrap_or(endpoints.len()),
            endpoints,
            auth_scheme: dto.auth_scheme.as_ref().and_then(auth_scheme_from_value),
            api_name: dto.api_name.filter(|name| !name.trim().is_empty()),
        }
    }
}

/// History comes back either as a bare list or wrapped in `{"projects": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HistoryDto {
    List(Vec<ProjectDto>),
    Wrapped { projects: Vec<ProjectDto> },
}

impl HistoryDto {
    pub fn into_handles(self) -> Vec<JobHandle> {
        let projects = match self {
            HistoryDto::List(projects) | HistoryDto::Wrapped { projects } => projects,
        };
        projects.into_iter().map(JobHandle::from).collect()
    }
}

/// Preview text is either the raw body or `{"code": "..."}`.
pub(crate) fn preview_text(body: String) -> String {
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => match map.get("code").or_else(|| map.get("preview")) {
            Some(Value::String(code)) => code.clone(),
            _ => body,
        },
        _ => body,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionsDto {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

fn parse_location(raw: Option<&str>) -> ParamLocation {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("path") => ParamLocation::Path,
        Some("header") => ParamLocation::Header,
        Some("cookie") => ParamLocation::Cookie,
        Some("body") | Some("formdata") => ParamLocation::Body,
        _ => ParamLocation::Query,
    }
}

/// Accepts either `"bearer"` or an object such as `{"type": "apiKey", "in": "header", "name": "X-Key"}`.
fn auth_scheme_from_value(value: &Value) -> Option<AuthScheme> {
    match value {
        Value::String(kind) if !kind.is_empty() => Some(AuthScheme {
            kind: kind.clone(),
            ..AuthScheme::default()
        }),
        Value::Object(map) => {
            let text = |keys: &[&str]| {
                keys.iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(ToOwned::to_owned)
            };
            let kind = text(&["type", "scheme"])?;
            Some(AuthScheme {
                kind,
                location: text(&["location", "in"]),
                name: text(&["name", "header_name"]),
            })
        }
        _ => None,
    }
}

/// Pulls a readable message and optional retry hint out of an error body.
///
/// Handles `{"detail": "..."}`, `{"detail": {"message": "...", "retry_after": 60}}` and plain text.
pub(crate) fn error_detail(body: &str) -> (String, Option<u64>) {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return (trimmed.to_string(), None);
    };
    match value.get("detail") {
        Some(Value::String(detail)) => (detail.clone(), None),
        Some(Value::Object(map)) => {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string());
            let retry = map
                .get("retry_after")
                .or_else(|| map.get("retry_after_seconds"))
                .and_then(Value::as_u64);
            (message, retry)
        }
        Some(other) => (other.to_string(), None),
        None => (trimmed.to_string(), None),
    }
}
