use serde::{Deserialize, Serialize};

use super::GroundingPlace;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    #[default]
    Daily,
    Food,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MusicSuggestion {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub difficulty: String,
    #[serde(default)]
    pub key_ingredients: Vec<String>,
}

/// Result of one insight generation call, rendered as a card.
///
/// `kind` decides which optional fields are meaningful: `recipe` and `tip`
/// belong to food insights, `refined_emotion` to daily ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedInsight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub analysis: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affirmation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(default)]
    pub places: Vec<GroundingPlace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_emotion: Option<String>,
    pub pet_comment: String,
}

/// Ephemeral result of the recurring-pattern check. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub pattern_summary: String,
    pub detected_keywords: Vec<String>,
    pub advice: String,
}
