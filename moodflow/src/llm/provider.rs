use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{MoodflowError, Result};
use crate::llm::api::{default_base_url, OpenAiCompatClient};
use crate::llm::gemini::{GeminiClient, GEMINI_BASE_URL};
use crate::llm::types::{GenerateRequest, GenerateResponse, GenerativeBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    Gemini,
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

impl LlmBackend {
    /// Only the native Gemini protocol returns grounding citations.
    pub fn supports_grounding(&self) -> bool {
        matches!(self, Self::Gemini)
    }
}

#[derive(Debug, Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let backend = backend_for(&config.model, config.base_url.as_deref());

        tracing::info!(backend = ?backend, model = %config.model, "LLM provider configured");

        Self {
            backend,
            config: Some(Arc::new(config.clone())),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    /// Endpoint the default model talks to.
    pub fn base_url(&self) -> Option<&str> {
        let config = self.config()?;
        if let Some(base_url) = config.base_url.as_deref() {
            return Some(base_url);
        }
        match &self.backend {
            LlmBackend::Gemini => Some(GEMINI_BASE_URL),
            LlmBackend::Unavailable { .. } => None,
            LlmBackend::OpenAICompatible { base_url } => Some(base_url),
            _ => Some(default_base_url(parse_llm_provider_model(&config.model).0)),
        }
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "No config available".to_string(),
        }
    }
}

#[async_trait]
impl GenerativeBackend for LlmProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        if !self.is_available() {
            return Err(MoodflowError::LlmUnavailable(self.unavailable_reason()));
        }

        let config = self
            .config()
            .ok_or_else(|| MoodflowError::LlmUnavailable(self.unavailable_reason()))?;

        // Grounded and image requests may name a different model than the
        // default one, so the client follows the request.
        let routed = route(config, &self.backend, &request.model)?;
        match backend_for(&routed.model, routed.base_url.as_deref()) {
            LlmBackend::Gemini => GeminiClient::new(&routed)?.generate(request).await,
            LlmBackend::Unavailable { reason } => Err(MoodflowError::LlmUnavailable(reason)),
            _ => OpenAiCompatClient::new(&routed)?.generate(request).await,
        }
    }
}

/// Configuration for a request on `model`. The default provider's key and
/// endpoint only travel with requests to that same provider.
fn route(config: &LlmConfig, default_backend: &LlmBackend, model: &str) -> Result<LlmConfig> {
    let mut routed = config.clone();
    routed.model = model.to_string();

    let backend = backend_for(model, config.base_url.as_deref());
    if &backend == default_backend {
        return Ok(routed);
    }

    routed.base_url = None;
    match backend {
        LlmBackend::Gemini => {
            let Some(key) = config.gemini_api_key.clone() else {
                return Err(MoodflowError::LlmUnavailable(format!(
                    "{model} needs GEMINI_API_KEY when the default model is on another provider"
                )));
            };
            routed.api_key = Some(key);
        }
        LlmBackend::OpenAICompatible { .. } => {
            return Err(MoodflowError::LlmUnavailable(format!(
                "{model} names no known provider"
            )));
        }
        _ => routed.api_key = None,
    }

    tracing::debug!(model, backend = ?backend, "Routing request away from the default provider");
    Ok(routed)
}

fn backend_for(model: &str, base_url: Option<&str>) -> LlmBackend {
    let (provider, _model) = parse_llm_provider_model(model);

    match provider.to_lowercase().as_str() {
        "gemini" => LlmBackend::Gemini,
        "openai" => LlmBackend::OpenAI,
        "openrouter" => LlmBackend::OpenRouter,
        "ollama" => LlmBackend::Ollama,
        "lmstudio" => LlmBackend::LmStudio,
        _ => match base_url {
            Some(base_url) => LlmBackend::OpenAICompatible {
                base_url: base_url.to_string(),
            },
            None => LlmBackend::Unavailable {
                reason: format!("Unknown provider in model: {model}"),
            },
        },
    }
}
