use serde::{Deserialize, Serialize};

pub type EndpointId = String;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    #[default]
    Query,
    Header,
    Cookie,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: String,
    #[serde(default)]
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

/// One discovered API operation.
///
/// `id` is the identity; everything else may be edited inside the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Field overrides applied by [`crate::EditBuffer::update`]. `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointPatch {
    pub method: Option<String>,
    pub path: Option<String>,
    pub summary: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    pub tags: Option<Vec<String>>,
}

impl EndpointPatch {
    pub fn summary(value: impl Into<String>) -> Self {
        Self {
            summary: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.method.is_none()
            && self.path.is_none()
            && self.summary.is_none()
            && self.parameters.is_none()
            && self.tags.is_none()
    }

    pub(crate) fn apply_to(&self, endpoint: &Endpoint) -> Endpoint {
        Endpoint {
            id: endpoint.id.clone(),
            method: self.method.clone().unwrap_or_else(|| endpoint.method.clone()),
            path: self.path.clone().unwrap_or_else(|| endpoint.path.clone()),
            summary: self
                .summary
                .clone()
                .unwrap_or_else(|| endpoint.summary.clone()),
            parameters: self
                .parameters
                .clone()
                .unwrap_or_else(|| endpoint.parameters.clone()),
            tags: self.tags.clone().unwrap_or_else(|| endpoint.tags.clone()),
        }
    }
}
