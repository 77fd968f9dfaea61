mod api;
mod gemini;
pub mod prompts;
mod provider;
mod types;

pub use api::OpenAiCompatClient;
pub use gemini::{GeminiClient, GEMINI_BASE_URL};
pub use provider::{LlmBackend, LlmProvider};
pub use types::{
    Citation, ContentPart, GenerateRequest, GenerateResponse, GenerativeBackend, GroundingChunk,
    GroundingMetadata, InlineImage, Tool, ToolConfig,
};
