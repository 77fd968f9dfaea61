use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// First non-empty value among the given variables.
fn first_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

pub const DEFAULT_MODEL: &str = "gemini/gemini-3-flash-preview";
pub const DEFAULT_GROUNDED_MODEL: &str = "gemini/gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini/gemini-2.5-flash-image";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: Option<LlmConfig>,
    pub insight: InsightConfig,
}

/// Generative backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Model for plain (tool-less) requests, in `provider/model` form.
    pub model: String,
    /// Model used when map search tooling is enabled.
    pub grounded_model: String,
    /// Model used for pet portraits.
    pub image_model: String,
    /// Credential and endpoint of the default model's provider.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Key for `gemini/` grounded or image models when the default model
    /// lives on another provider. Never sent anywhere but Gemini.
    pub gemini_api_key: Option<String>,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Grounded and image models default to the Gemini ones only when
    /// `model` is itself on Gemini; otherwise every request uses `model`.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        let model = model.into();
        let on_gemini = is_gemini_model(&model);

        Self {
            grounded_model: companion_model(&model, DEFAULT_GROUNDED_MODEL),
            image_model: companion_model(&model, DEFAULT_IMAGE_MODEL),
            gemini_api_key: api_key.clone().filter(|_| on_gemini),
            model,
            api_key,
            base_url: None,
            timeout_secs: 60,
        }
    }
}

pub fn is_gemini_model(model: &str) -> bool {
    parse_llm_provider_model(model).0.eq_ignore_ascii_case("gemini")
}

fn companion_model(model: &str, gemini_default: &str) -> String {
    if is_gemini_model(model) {
        gemini_default.to_string()
    } else {
        model.to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightConfig {
    pub pattern: PatternConfig,
    pub grounding: GroundingConfig,
    pub location: LocationConfig,
    /// Number of most recent entries kept in the report trend series.
    pub trend_window: usize,
    /// Number of recent moods quoted back to the model for context.
    pub recent_mood_window: usize,
    /// Most recent entries sent in a report journal. Older ones only count
    /// toward the local aggregates.
    pub report_max_entries: usize,
    /// Notes longer than this are truncated before entering a prompt.
    pub max_note_graphemes: usize,
}

/// Gates for the recurring-pattern heuristic.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PatternConfig {
    /// Prior entries sharing the new entry's tag needed before looking closer.
    pub min_tagged_entries: usize,
    /// Shared keywords needed for two entries to count as similar.
    pub min_keyword_overlap: usize,
    /// Similar prior entries needed before a pattern alert is generated.
    pub min_similar_entries: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_tagged_entries: 2,
            min_keyword_overlap: 2,
            min_similar_entries: 2,
        }
    }
}

/// Filler values used when a citation carries no display metadata.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GroundingConfig {
    pub rating_baseline: f32,
    /// Number of 0.1 increments added on top of the baseline.
    pub rating_steps: u8,
    pub distance_step_km: f32,
    pub vibe_min: u8,
    pub vibe_max: u8,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            rating_baseline: 4.5,
            rating_steps: 5,
            distance_step_km: 0.4,
            vibe_min: 85,
            vibe_max: 97,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LocationConfig {
    pub timeout_ms: u64,
    pub cache_ttl_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            cache_ttl_secs: 600,
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            pattern: PatternConfig::default(),
            grounding: GroundingConfig::default(),
            location: LocationConfig::default(),
            trend_window: 7,
            recent_mood_window: 5,
            report_max_entries: 200,
            max_note_graphemes: 2000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let model = parse_env_opt::<String>("LLM_MODEL").filter(|m| !m.trim().is_empty());
        let gemini_api_key = first_env(&["GEMINI_API_KEY"]);
        let on_gemini = model.as_deref().map_or(true, is_gemini_model);

        // A Gemini key is only the default credential when the default model is on Gemini
        let api_key = if on_gemini {
            first_env(&["GEMINI_API_KEY", "API_KEY", "LLM_API_KEY"])
        } else {
            first_env(&["LLM_API_KEY", "API_KEY"])
        };

        let llm = if model.is_some() || api_key.is_some() {
            let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
            Some(LlmConfig {
                grounded_model: first_env(&["LLM_GROUNDED_MODEL"])
                    .unwrap_or_else(|| companion_model(&model, DEFAULT_GROUNDED_MODEL)),
                image_model: first_env(&["LLM_IMAGE_MODEL"])
                    .unwrap_or_else(|| companion_model(&model, DEFAULT_IMAGE_MODEL)),
                gemini_api_key: gemini_api_key.or_else(|| api_key.clone().filter(|_| on_gemini)),
                model,
                api_key,
                base_url: first_env(&["LLM_BASE_URL"]),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
            })
        } else {
            None
        };

        let defaults = InsightConfig::default();

        Self {
            llm,
            insight: InsightConfig {
                pattern: PatternConfig {
                    min_tagged_entries: parse_env_or(
                        "PATTERN_MIN_TAGGED",
                        defaults.pattern.min_tagged_entries,
                    ),
                    min_keyword_overlap: parse_env_or(
                        "PATTERN_MIN_OVERLAP",
                        defaults.pattern.min_keyword_overlap,
                    ),
                    min_similar_entries: parse_env_or(
                        "PATTERN_MIN_SIMILAR",
                        defaults.pattern.min_similar_entries,
                    ),
                },
                grounding: defaults.grounding,
                location: LocationConfig {
                    timeout_ms: parse_env_or("LOCATION_TIMEOUT_MS", defaults.location.timeout_ms),
                    cache_ttl_secs: parse_env_or(
                        "LOCATION_CACHE_TTL_SECS",
                        defaults.location.cache_ttl_secs,
                    ),
                },
                trend_window: parse_env_or("REPORT_TREND_WINDOW", defaults.trend_window),
                recent_mood_window: defaults.recent_mood_window,
                report_max_entries: parse_env_or(
                    "REPORT_MAX_ENTRIES",
                    defaults.report_max_entries,
                ),
                max_note_graphemes: defaults.max_note_graphemes,
            },
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::default()
    }
}

/// Known LLM providers. `gemini` talks the native REST protocol, the rest
/// are OpenAI-compatible.
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["gemini", "openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
