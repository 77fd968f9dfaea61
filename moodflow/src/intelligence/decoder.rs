//! Turns raw model text into typed records.
//!
//! Model output is supposed to be a single JSON object but regularly arrives
//! wrapped in markdown fences, followed by prose, truncated, or with trailing
//! commas. Everything here is infallible: values are read field by field from
//! an untyped `serde_json::Value` and anything missing or malformed is
//! replaced by a language-appropriate default.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::fallback::Fallback;
use crate::models::{
    GroundingPlace, InsightKind, Language, MusicSuggestion, PatternAnalysis, Recipe,
    UnifiedInsight,
};

static RE_FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```[ \t]*(?:json)?[ \t]*\r?\n?").expect("valid regex"));
static RE_FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?[ \t]*```[ \t]*$").expect("valid regex"));

const PREVIEW_CHARS: usize = 120;

/// Insight fields after validation. Display fields are always non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInsight {
    pub title: Option<String>,
    pub analysis: String,
    pub keywords: Vec<String>,
    pub affirmation: String,
    pub news: String,
    pub tip: Option<String>,
    pub music: MusicSuggestion,
    pub recipe: Option<Recipe>,
    pub refined_emotion: Option<String>,
    pub pet_comment: String,
    /// False when the raw text could not be parsed and every field is a default.
    pub parsed: bool,
}

impl DecodedInsight {
    /// Assemble the card. Kind-specific fields that do not belong to `kind`
    /// are dropped.
    pub fn into_insight(self, kind: InsightKind, places: Vec<GroundingPlace>) -> UnifiedInsight {
        let (recipe, refined_emotion) = match kind {
            InsightKind::Food => (self.recipe, None),
            InsightKind::Daily => (None, self.refined_emotion),
        };

        UnifiedInsight {
            kind,
            title: self.title,
            analysis: self.analysis,
            keywords: self.keywords,
            affirmation: Some(self.affirmation),
            news: Some(self.news),
            tip: self.tip,
            music: Some(self.music),
            recipe,
            places,
            refined_emotion,
            pet_comment: self.pet_comment,
        }
    }
}

/// Narrative half of a periodic report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportNarrative {
    pub summary: String,
    pub chef_advice: String,
    pub emotional_insight: Option<String>,
}

/// Strip a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = RE_FENCE_OPEN.find(text) else {
        return text;
    };
    let inner = &text[open.end()..];
    match RE_FENCE_CLOSE.find(inner) {
        Some(close) => inner[..close.start()].trim(),
        None => inner.trim(),
    }
}

/// Best-effort extraction of the JSON object embedded in `raw`.
///
/// Returns `None` for empty input, input without a `{ .. }` span, or a span
/// that still fails to parse after trailing commas outside strings are removed.
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        tracing::warn!("Model response was empty");
        return None;
    }

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        tracing::warn!(
            response_preview = %preview(text),
            "Model response contained no JSON object"
        );
        return None;
    };
    if end < start {
        tracing::warn!(response_preview = %preview(text), "Model response braces out of order");
        return None;
    }

    let span = &text[start..=end];
    let parsed = serde_json::from_str::<Value>(span)
        .or_else(|_| serde_json::from_str::<Value>(&strip_trailing_commas(span)));

    match parsed {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            tracing::warn!(kind = %json_kind(&other), "Model response JSON was not an object");
            None
        }
        Err(error) => {
            tracing::warn!(
                response_len = text.len(),
                response_preview = %preview(text),
                error = %error,
                "Failed to parse model response, using fallback"
            );
            None
        }
    }
}

/// Drop commas that directly precede a closing `}` or `]`. String literals
/// are copied through untouched.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let rest = chars.clone().find(|next| !next.is_whitespace());
                if !matches!(rest, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Decode an insight card. Never fails.
pub fn decode(raw: &str, language: Language) -> DecodedInsight {
    let defaults = Fallback::for_language(language);
    let Some(map) = extract_json_object(raw) else {
        return fallback_insight(defaults);
    };

    DecodedInsight {
        title: text_field(&map, &["title"]),
        analysis: text_field(&map, &["analysis"]).unwrap_or_else(|| defaults.analysis.to_string()),
        keywords: string_list(&map, "keywords"),
        affirmation: text_field(&map, &["affirmation"])
            .unwrap_or_else(|| defaults.affirmation.to_string()),
        news: text_field(&map, &["news"]).unwrap_or_else(|| defaults.news.to_string()),
        tip: text_field(&map, &["tip"]),
        music: music_field(&map).unwrap_or_else(|| defaults.music()),
        recipe: recipe_field(&map),
        refined_emotion: text_field(&map, &["refinedEmotion", "refined_emotion"]),
        pet_comment: text_field(&map, &["petComment", "pet_comment"])
            .unwrap_or_else(|| defaults.pet_comment.to_string()),
        parsed: true,
    }
}

/// Decode a recurring-pattern analysis. When the model omits the detected
/// keywords, `observed_keywords` is used instead.
pub fn decode_pattern(raw: &str, language: Language, observed_keywords: &[String]) -> PatternAnalysis {
    let defaults = Fallback::for_language(language);
    let map = extract_json_object(raw).unwrap_or_default();

    let mut detected_keywords = string_list(&map, "detectedKeywords");
    if detected_keywords.is_empty() {
        detected_keywords = string_list(&map, "detected_keywords");
    }
    if detected_keywords.is_empty() {
        detected_keywords = observed_keywords.to_vec();
    }

    PatternAnalysis {
        pattern_summary: text_field(&map, &["patternSummary", "pattern_summary"])
            .unwrap_or_else(|| defaults.pattern_summary.to_string()),
        detected_keywords,
        advice: text_field(&map, &["advice"]).unwrap_or_else(|| defaults.pattern_advice.to_string()),
    }
}

pub fn decode_report(raw: &str, language: Language) -> ReportNarrative {
    let defaults = Fallback::for_language(language);
    let map = extract_json_object(raw).unwrap_or_default();

    ReportNarrative {
        summary: text_field(&map, &["summary"]).unwrap_or_else(|| defaults.report_summary.to_string()),
        chef_advice: text_field(&map, &["chefAdvice", "chef_advice", "advice"])
            .unwrap_or_else(|| defaults.chef_advice.to_string()),
        emotional_insight: text_field(&map, &["emotionalInsight", "emotional_insight"]),
    }
}

fn fallback_insight(defaults: &Fallback) -> DecodedInsight {
    DecodedInsight {
        title: None,
        analysis: defaults.analysis.to_string(),
        keywords: Vec::new(),
        affirmation: defaults.affirmation.to_string(),
        news: defaults.news.to_string(),
        tip: None,
        music: defaults.music(),
        recipe: None,
        refined_emotion: None,
        pet_comment: defaults.pet_comment.to_string(),
        parsed: false,
    }
}

/// First key holding a non-blank string.
fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Non-blank strings of an array field, deduplicated in order. A field that
/// is present but not an array yields an empty list.
fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = map.get(key) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_string()))
        .map(str::to_string)
        .collect()
}

fn music_field(map: &Map<String, Value>) -> Option<MusicSuggestion> {
    ["music", "musicSuggestion"]
        .iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_object)
        .find_map(|music| {
            Some(MusicSuggestion {
                title: text_field(music, &["title"])?,
                artist: text_field(music, &["artist"])?,
            })
        })
}

fn recipe_field(map: &Map<String, Value>) -> Option<Recipe> {
    let recipe = map.get("recipe")?.as_object()?;
    Some(Recipe {
        title: text_field(recipe, &["title"])?,
        difficulty: text_field(recipe, &["difficulty"]).unwrap_or_default(),
        key_ingredients: string_list(recipe, "keyIngredients"),
    })
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
