use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Endpoint;

pub type JobId = String;

/// Processing status reported by the backend.
///
/// Progresses strictly forward; `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[default]
    Pending,
    Scraping,
    Parsing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Scraping => "SCRAPING",
            JobStatus::Parsing => "PARSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthScheme {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Identifier plus the last status snapshot for one processing job.
///
/// Poll responses replace the handle wholesale; fields are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: JobId,
    pub display_name: String,
    pub base_url: String,
    pub status: JobStatus,
    pub auth_scheme: Option<AuthScheme>,
}

/// Parameters for starting a new job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateRequest {
    pub name: String,
    pub url: String,
    pub use_case: Option<String>,
    pub force_refresh: bool,
}

/// Structured output of a completed job; becomes the Original Snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobOutput {
    pub endpoints: Vec<Endpoint>,
    pub auth_scheme: Option<AuthScheme>,
    pub count: usize,
    pub api_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Suggestion {
    pub approach: String,
    pub language: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, alias = "recommendedLibraries")]
    pub recommended_libraries: Vec<String>,
    #[serde(default, alias = "codeSnippet")]
    pub code_snippet: String,
    #[serde(default, alias = "isRecommended")]
    pub is_recommended: bool,
}

/// Authorization token for engine callbacks.
///
/// A new ticket is minted every time the orchestrator switches jobs; callbacks
/// carrying any other ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
