use serde::{Deserialize, Serialize};

/// Which display fields of a [`GroundingPlace`] were filled in locally
/// rather than supplied by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FillerFields {
    pub distance: bool,
    pub rating: bool,
    pub match_reason: bool,
    pub vibe_score: bool,
}

impl FillerFields {
    pub fn any(&self) -> bool {
        self.distance || self.rating || self.match_reason || self.vibe_score
    }
}

/// A recommended venue taken from a grounding citation.
///
/// The `is_visited` .. `review_id` group is only populated by joining
/// against the user's own history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroundingPlace {
    pub title: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibe_score: Option<u8>,
    #[serde(default)]
    pub filler: FillerFields,
    #[serde(default)]
    pub is_visited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personal_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
}

impl GroundingPlace {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }
}
