use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{CraveType, CuisineType, MoodType, UnifiedInsight};
use crate::error::{MoodflowError, Result};

/// Primary tag of an entry. The cuisine and mood tag sets are disjoint, so
/// the untagged representation round-trips unambiguously.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EntryCategory {
    Cuisine(CuisineType),
    Mood(MoodType),
}

/// Secondary tag the pattern detector groups entries by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternTag {
    Crave(CraveType),
    Mood(MoodType),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantReview {
    #[validate(length(min = 1, max = 200))]
    pub restaurant_name: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    pub recommended_dishes: Vec<String>,
    #[serde(default)]
    pub avoid_dishes: Vec<String>,
    #[serde(default)]
    pub wishlist_dishes: Vec<String>,
    #[serde(default)]
    pub user_review: String,
    pub food_photo: Option<String>,
}

/// One logged mood or meal. Immutable once created: edits replace the whole
/// entry by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub category: EntryCategory,
    pub crave: Option<CraveType>,
    pub mood: Option<MoodType>,
    pub note: Option<String>,
    pub photo: Option<String>,
    pub review: Option<RestaurantReview>,
    pub insight: Option<UnifiedInsight>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Entry {
    pub fn new(category: EntryCategory) -> Self {
        let mood = match category {
            EntryCategory::Mood(mood) => Some(mood),
            EntryCategory::Cuisine(_) => None,
        };

        Self {
            id: nanoid!(),
            timestamp: Utc::now(),
            category,
            crave: None,
            mood,
            note: None,
            photo: None,
            review: None,
            insight: None,
            keywords: Vec::new(),
        }
    }

    pub fn mood_log(mood: MoodType) -> Self {
        Self::new(EntryCategory::Mood(mood))
    }

    pub fn food_log(cuisine: CuisineType, crave: CraveType) -> Self {
        let mut entry = Self::new(EntryCategory::Cuisine(cuisine));
        entry.crave = Some(crave);
        entry
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_review(mut self, review: RestaurantReview) -> Self {
        self.review = Some(review);
        self
    }

    /// Attach a generated insight; its keywords become the entry keywords.
    pub fn with_insight(mut self, insight: UnifiedInsight) -> Self {
        self.keywords = insight.keywords.clone();
        self.insight = Some(insight);
        self
    }

    pub fn cuisine(&self) -> Option<CuisineType> {
        match self.category {
            EntryCategory::Cuisine(cuisine) => Some(cuisine),
            EntryCategory::Mood(_) => None,
        }
    }

    /// The craving if present, else the mood.
    pub fn pattern_tag(&self) -> Option<PatternTag> {
        self.crave
            .map(PatternTag::Crave)
            .or(self.mood.map(PatternTag::Mood))
    }

    pub fn validate_review(&self) -> Result<()> {
        if let Some(review) = &self.review {
            review
                .validate()
                .map_err(|e| MoodflowError::Validation(format!("Invalid review: {e}")))?;
        }
        Ok(())
    }
}

/// Ordered history of entries, unique by id. Insertion order is
/// chronological order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(try_from = "Vec<Entry>", into = "Vec<Entry>")]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) -> Result<()> {
        if self.get(&entry.id).is_some() {
            return Err(MoodflowError::Validation(format!(
                "Entry {} already exists",
                entry.id
            )));
        }
        entry.validate_review()?;
        self.entries.push(entry);
        Ok(())
    }

    /// Replace the entry with the same id, keeping its position.
    pub fn replace(&mut self, entry: Entry) -> Result<()> {
        entry.validate_review()?;
        let slot = self
            .entries
            .iter_mut()
            .find(|existing| existing.id == entry.id)
            .ok_or_else(|| MoodflowError::Validation(format!("Entry {} not found", entry.id)))?;
        *slot = entry;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<Entry>> for History {
    type Error = MoodflowError;

    fn try_from(entries: Vec<Entry>) -> Result<Self> {
        let mut history = History::new();
        for entry in entries {
            history.push(entry)?;
        }
        Ok(history)
    }
}

impl From<History> for Vec<Entry> {
    fn from(history: History) -> Self {
        history.entries
    }
}
