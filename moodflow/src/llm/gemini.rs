use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{looks_like_authorization_failure, MoodflowError, Result};
use crate::llm::types::{
    ContentPart, GenerateRequest, GenerateResponse, GenerativeBackend, GroundingMetadata,
    InlineImage, Tool,
};
use crate::location::LatLng;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Native `generateContent` client. The only backend that supports map and
/// search grounding.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    google_maps: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<EmptyObject>,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<WireToolConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| MoodflowError::LlmUnavailable("API key required for Gemini".to_string()))?;

        let base_url = match config.base_url.as_deref() {
            Some(raw) => url::Url::parse(raw)?.as_str().trim_end_matches('/').to_string(),
            None => GEMINI_BASE_URL.to_string(),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MoodflowError::Llm(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let (_, model) = parse_llm_provider_model(model);
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_body(request: &GenerateRequest) -> GenerateContentRequest {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => Part {
                    text: Some(text.clone()),
                    ..Default::default()
                },
                ContentPart::InlineImage { mime_type, data } => Part {
                    inline_data: Some(InlineImage {
                        mime_type: mime_type.clone(),
                        data: data.clone(),
                    }),
                    ..Default::default()
                },
            })
            .collect();

        let system_instruction = (!request.system_instruction.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: Some(request.system_instruction.clone()),
                ..Default::default()
            }],
        });

        let tools = request
            .tools
            .iter()
            .map(|tool| match tool {
                Tool::GoogleMaps => WireTool {
                    google_maps: Some(EmptyObject {}),
                    ..Default::default()
                },
                Tool::GoogleSearch => WireTool {
                    google_search: Some(EmptyObject {}),
                    ..Default::default()
                },
            })
            .collect();

        let tool_config = request.tool_config.map(|config| WireToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: config.lat_lng,
            },
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction,
            tools,
            tool_config,
        }
    }

    fn into_response(body: GenerateContentResponse) -> Result<GenerateResponse> {
        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| MoodflowError::Llm("Gemini response contained no candidates".to_string()))?;

        let mut text = String::new();
        let mut images = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(chunk) = part.text {
                text.push_str(&chunk);
            }
            if let Some(image) = part.inline_data {
                images.push(image);
            }
        }

        if text.trim().is_empty() && images.is_empty() {
            return Err(MoodflowError::Llm(format!(
                "Gemini response contained empty content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(GenerateResponse {
            text,
            grounding: candidate.grounding_metadata.unwrap_or_default(),
            images,
        })
    }

    fn map_error_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> MoodflowError {
        let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (envelope.error.message, envelope.error.status),
            Err(_) => (body.chars().take(200).collect(), None),
        };
        let detail = format!(
            "Gemini API error {}{}: {}",
            status.as_u16(),
            api_status.as_deref().map(|s| format!(" {s}")).unwrap_or_default(),
            message
        );

        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || api_status.as_deref() == Some("PERMISSION_DENIED")
            || api_status.as_deref() == Some("UNAUTHENTICATED")
        {
            return MoodflowError::AuthorizationRequired(detail);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return MoodflowError::LlmRateLimit { retry_after };
        }
        // Gemini reports a rejected key as 400 INVALID_ARGUMENT
        if looks_like_authorization_failure(&message) {
            return MoodflowError::AuthorizationRequired(detail);
        }
        MoodflowError::Llm(detail)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let body = Self::build_body(request);
        let url = self.endpoint(&request.model);

        tracing::debug!(
            model = %request.model,
            tools = ?request.tools,
            has_image = request.has_image(),
            has_location = request.tool_config.is_some(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| MoodflowError::Llm(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            let text = response.text().await.unwrap_or_default();
            let error = Self::map_error_status(status, retry_after, &text);
            tracing::warn!(status = status.as_u16(), error = %error, "Gemini request rejected");
            return Err(error);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| MoodflowError::Llm(format!("Failed to parse Gemini response: {e}")))?;

        let result = Self::into_response(parsed)?;
        tracing::debug!(
            response_len = result.text.len(),
            citations = result.grounding.grounding_chunks.len(),
            images = result.images.len(),
            "Gemini response received"
        );
        Ok(result)
    }
}
