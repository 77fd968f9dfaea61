use thiserror::Error;

/// Markers a backend failure message may carry when the credential was
/// rejected. Matched case-insensitively.
const AUTHORIZATION_MARKERS: &[&str] = &[
    "403",
    "401",
    "permission",
    "permission_denied",
    "unauthorized",
    "forbidden",
    "api key not valid",
    "invalid api key",
    "unauthenticated",
];

#[derive(Error, Debug)]
pub enum MoodflowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    /// The backend rejected the credential. UI shells should prompt the user
    /// to re-authorize instead of showing a generic failure.
    #[error("Authorization required: {0}")]
    AuthorizationRequired(String),
}

impl MoodflowError {
    pub fn is_authorization_required(&self) -> bool {
        matches!(self, MoodflowError::AuthorizationRequired(_))
    }

    /// Re-raise backend failures whose message looks like a permission
    /// rejection as `AuthorizationRequired`. Everything else passes through.
    pub fn classify_backend_failure(self) -> Self {
        match self {
            MoodflowError::Llm(message) if looks_like_authorization_failure(&message) => {
                MoodflowError::AuthorizationRequired(message)
            }
            MoodflowError::Http(error)
                if matches!(
                    error.status(),
                    Some(reqwest::StatusCode::UNAUTHORIZED) | Some(reqwest::StatusCode::FORBIDDEN)
                ) =>
            {
                MoodflowError::AuthorizationRequired(error.to_string())
            }
            other => other,
        }
    }
}

pub fn looks_like_authorization_failure(message: &str) -> bool {
    let message = message.to_lowercase();
    AUTHORIZATION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

pub type Result<T> = std::result::Result<T, MoodflowError>;
