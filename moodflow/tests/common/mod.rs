#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use moodflow::config::{InsightConfig, LlmConfig};
use moodflow::error::{MoodflowError, Result};
use moodflow::llm::{GenerateRequest, GenerateResponse, GenerativeBackend, GroundingChunk};
use moodflow::InsightService;

pub const PLAIN_MODEL: &str = "gemini/plain";
pub const GROUNDED_MODEL: &str = "gemini/grounded";
pub const IMAGE_MODEL: &str = "gemini/image";

/// In-process backend that replays scripted replies and records every
/// request it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<GenerateResponse>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(text: &str) -> Arc<Self> {
        let backend = Self::new();
        backend.push_text(text);
        backend
    }

    pub fn failing(error: MoodflowError) -> Arc<Self> {
        let backend = Self::new();
        backend.push(Err(error));
        backend
    }

    pub fn push(&self, reply: Result<GenerateResponse>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_text(&self, text: &str) {
        self.push(Ok(GenerateResponse::from_text(text)));
    }

    pub fn push_grounded(&self, text: &str, chunks: Vec<GroundingChunk>) {
        let mut response = GenerateResponse::from_text(text);
        response.grounding.grounding_chunks = chunks;
        self.push(Ok(response));
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> GenerateRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("backend was never called")
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MoodflowError::Llm("no scripted reply left".to_string())))
    }
}

pub fn llm_config() -> LlmConfig {
    let mut config = LlmConfig::new(PLAIN_MODEL, Some("test-key".to_string()));
    config.grounded_model = GROUNDED_MODEL.to_string();
    config.image_model = IMAGE_MODEL.to_string();
    config
}

pub fn service(backend: Arc<ScriptedBackend>) -> InsightService {
    InsightService::new(backend, &llm_config(), InsightConfig::default())
}

pub const INSIGHT_JSON: &str = r#"{
  "title": "Quiet evening",
  "analysis": "It sounds like a gentle day.",
  "refinedEmotion": "soft calm",
  "keywords": ["tea", "rain"],
  "affirmation": "You are enough.",
  "news": "Otters hold hands while sleeping.",
  "music": {"title": "Weightless", "artist": "Marconi Union"},
  "petComment": "Woof, let's nap!"
}"#;

// 1x1 transparent PNG
pub const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";
