use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::location::LatLng;

/// The generative model collaborator.
///
/// Implementations make exactly one upstream call per `generate` and never
/// retry on their own.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

/// One piece of the user turn sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Bare base64 body plus its MIME type.
    InlineImage { mime_type: String, data: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GoogleMaps,
    GoogleSearch,
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoogleMaps => write!(f, "google_maps"),
            Self::GoogleSearch => write!(f, "google_search"),
        }
    }
}

/// Retrieval hint passed alongside map tooling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolConfig {
    pub lat_lng: LatLng,
}

/// Fully specified outbound request. Built without I/O by
/// [`crate::intelligence::request::RequestBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub system_instruction: String,
    pub parts: Vec<ContentPart>,
    pub tools: Vec<Tool>,
    pub tool_config: Option<ToolConfig>,
}

impl GenerateRequest {
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::InlineImage { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, ContentPart::InlineImage { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateResponse {
    pub text: String,
    pub grounding: GroundingMetadata,
    pub images: Vec<InlineImage>,
}

impl GenerateResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Citations attached to a response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// A chunk carries a map result, a web result, or neither.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    #[serde(default)]
    pub maps: Option<Citation>,
    #[serde(default)]
    pub web: Option<Citation>,
}

impl GroundingChunk {
    pub fn maps(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            maps: Some(Citation::new(title, uri)),
            web: None,
        }
    }

    pub fn web(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            maps: None,
            web: Some(Citation::new(title, uri)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub distance: Option<String>,
}

impl Citation {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            title: Some(title.into()),
            rating: None,
            distance: None,
        }
    }
}
