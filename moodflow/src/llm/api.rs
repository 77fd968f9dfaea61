use std::time::Duration;

use async_openai::{
    error::ApiError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageUrl,
    },
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    config::{parse_llm_provider_model, LlmConfig},
    error::{looks_like_authorization_failure, MoodflowError, Result},
    llm::types::{ContentPart, GenerateRequest, GenerateResponse, GenerativeBackend},
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Text-only backend for OpenAI-compatible chat endpoints.
///
/// Map and search tools have no equivalent here, so they are dropped and
/// responses never carry citations. Wire types come from async-openai; the
/// request is sent directly so the HTTP status of a failure is always known.
#[derive(Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config)?;

        let (provider, _) = parse_llm_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && api_config.api_key.is_none() {
            return Err(MoodflowError::LlmUnavailable(
                "API key required for this provider".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| {
                MoodflowError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        Ok(Self {
            client,
            config: api_config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn build_request(&self, request: &GenerateRequest) -> Result<CreateChatCompletionRequest> {
        let (_, model) = parse_llm_provider_model(&request.model);
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if !request.system_instruction.trim().is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_instruction.as_str())
                    .build()
                    .map_err(|error| {
                        MoodflowError::Validation(format!("Invalid system prompt: {error}"))
                    })?
                    .into(),
            );
        }

        let content = if request.has_image() {
            let parts = request
                .parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text(text) => ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText { text: text.clone() },
                    ),
                    ContentPart::InlineImage { mime_type, data } => {
                        ChatCompletionRequestUserMessageContentPart::ImageUrl(
                            ChatCompletionRequestMessageContentPartImage {
                                image_url: ImageUrl {
                                    url: format!("data:{mime_type};base64,{data}"),
                                    detail: None,
                                },
                            },
                        )
                    }
                })
                .collect();
            ChatCompletionRequestUserMessageContent::Array(parts)
        } else {
            ChatCompletionRequestUserMessageContent::Text(request.text())
        };

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|error| MoodflowError::Validation(format!("Invalid user prompt: {error}")))?
                .into(),
        );

        CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()
            .map_err(|error| {
                MoodflowError::Validation(format!("Invalid LLM completion request: {error}"))
            })
    }

    fn extract_content(response: CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MoodflowError::Llm("LLM response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if message.trim().is_empty() {
            return Err(MoodflowError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(message)
    }

    fn map_error_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> MoodflowError {
        let api_error = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error);
        let message = match &api_error {
            Some(api_error) => api_error.message.clone(),
            None => body.chars().take(200).collect(),
        };
        let detail = format!("{}: {}", status.as_u16(), message);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return MoodflowError::AuthorizationRequired(format!(
                "LLM authentication failed ({detail})"
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return MoodflowError::LlmRateLimit { retry_after };
        }
        match &api_error {
            Some(api_error) if Self::is_auth_api_error(api_error) => {
                MoodflowError::AuthorizationRequired(format!("LLM authentication failed ({detail})"))
            }
            Some(api_error) if Self::is_rate_limit_api_error(api_error) => {
                MoodflowError::LlmRateLimit { retry_after }
            }
            None if looks_like_authorization_failure(&message) => {
                MoodflowError::AuthorizationRequired(format!("LLM authentication failed ({detail})"))
            }
            _ => MoodflowError::Llm(format!("LLM API error {detail}")),
        }
    }

    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
            || code == "insufficient_quota"
    }

    fn is_auth_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("unauthorized")
            || message.contains("forbidden")
            || message.contains("authentication")
            || message.contains("invalid api key")
            || message.contains("permission")
            || code.contains("invalid_api_key")
            || code.contains("authentication")
            || error_type.contains("authentication")
            || error_type.contains("permission")
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiCompatClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        if request.text().trim().is_empty() && !request.has_image() {
            return Err(MoodflowError::Validation("Prompt cannot be empty".to_string()));
        }

        if !request.tools.is_empty() {
            tracing::debug!(
                tools = ?request.tools,
                "Tools are not supported by OpenAI-compatible backends, sending without them"
            );
        }

        let chat_request = self.build_request(request)?;

        let mut http_request = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .json(&chat_request);
        if let Some(api_key) = self.config.api_key.as_deref() {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|error| MoodflowError::Llm(format!("LLM request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            let error = Self::map_error_status(status, retry_after, &body);
            tracing::warn!(status = status.as_u16(), error = %error, "LLM request rejected");
            return Err(error);
        }

        let parsed: CreateChatCompletionResponse = response
            .json()
            .await
            .map_err(|error| MoodflowError::Llm(format!("Failed to parse LLM response: {error}")))?;

        let text = Self::extract_content(parsed)?;
        tracing::debug!(response_len = text.len(), "LLM response received");
        Ok(GenerateResponse::from_text(text))
    }
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Result<Self> {
        let (provider, _) = parse_llm_provider_model(&config.model);

        let base_url = match config.base_url.as_deref() {
            Some(raw) => url::Url::parse(raw)?.as_str().trim_end_matches('/').to_string(),
            None => default_base_url(provider).to_string(),
        };

        Ok(Self {
            base_url,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            timeout_secs: config.timeout_secs,
        })
    }
}

pub(crate) fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => OPENAI_BASE_URL,
        "openrouter" => OPENROUTER_BASE_URL,
        "ollama" => OLLAMA_BASE_URL,
        "lmstudio" => LMSTUDIO_BASE_URL,
        _ => OPENAI_BASE_URL,
    }
}
