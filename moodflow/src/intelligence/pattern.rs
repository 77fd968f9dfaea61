//! Recurring-pattern detection over the user's history.

use async_trait::async_trait;

use super::utils::keyword_overlap;
use crate::config::PatternConfig;
use crate::error::Result;
use crate::models::{Entry, Language, PatternAnalysis};

/// Turns a batch of similar entries into a user-facing alert.
#[async_trait]
pub trait PatternAdvisor: Send + Sync {
    async fn detect_pattern(&self, batch: &[Entry], language: Language) -> Result<PatternAnalysis>;
}

pub struct PatternDetector {
    config: PatternConfig,
}

impl PatternDetector {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// Prior entries similar enough to `new_entry` to justify an alert,
    /// followed by `new_entry` itself. `None` when a gate is not met.
    ///
    /// Pure: the advisor is only consulted by [`Self::detect`].
    pub fn similar_batch(&self, new_entry: &Entry, history: &[Entry]) -> Option<Vec<Entry>> {
        let tag = new_entry.pattern_tag()?;

        let tagged: Vec<&Entry> = history
            .iter()
            .filter(|entry| entry.id != new_entry.id)
            .filter(|entry| entry.pattern_tag() == Some(tag))
            .collect();

        if tagged.len() < self.config.min_tagged_entries {
            tracing::debug!(
                tagged = tagged.len(),
                required = self.config.min_tagged_entries,
                "Not enough tagged entries for a pattern"
            );
            return None;
        }

        let similar: Vec<&Entry> = tagged
            .into_iter()
            .filter(|entry| {
                keyword_overlap(&entry.keywords, &new_entry.keywords) >= self.config.min_keyword_overlap
            })
            .collect();

        if similar.len() < self.config.min_similar_entries {
            tracing::debug!(
                similar = similar.len(),
                required = self.config.min_similar_entries,
                "Not enough similar entries for a pattern"
            );
            return None;
        }

        let mut batch: Vec<Entry> = similar.into_iter().cloned().collect();
        batch.push(new_entry.clone());
        Some(batch)
    }

    /// Run the gates and, if they pass, ask `advisor` for the alert text.
    pub async fn detect(
        &self,
        new_entry: &Entry,
        history: &[Entry],
        advisor: &dyn PatternAdvisor,
        language: Language,
    ) -> Result<Option<PatternAnalysis>> {
        let Some(batch) = self.similar_batch(new_entry, history) else {
            return Ok(None);
        };

        tracing::info!(batch = batch.len(), entry_id = %new_entry.id, "Recurring pattern detected");
        advisor.detect_pattern(&batch, language).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CraveType, CuisineType, MoodType};

    fn spicy(keywords: &[&str]) -> Entry {
        Entry::food_log(CuisineType::Chinese, CraveType::Spicy).with_keywords(keywords.iter().copied())
    }

    fn detector() -> PatternDetector {
        PatternDetector::new(PatternConfig::default())
    }

    #[test]
    fn test_too_few_tagged_entries() {
        let history = vec![
            spicy(&["a", "b"]),
            Entry::food_log(CuisineType::Chinese, CraveType::Sweet).with_keywords(["a", "b"]),
        ];
        assert!(detector().similar_batch(&spicy(&["a", "b", "c"]), &history).is_none());
    }

    #[test]
    fn test_batch_is_chronological_with_new_entry_last() {
        let first = spicy(&["a", "b"]);
        let unrelated = spicy(&["x"]);
        let second = spicy(&["a", "c", "d"]);
        let new_entry = spicy(&["a", "b", "c"]);
        let history = vec![first.clone(), unrelated, second.clone()];

        let batch = detector().similar_batch(&new_entry, &history).unwrap();
        let ids: Vec<&str> = batch.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str(), new_entry.id.as_str()]);
    }

    #[test]
    fn test_gate_counts_similar_entries_not_raw_overlap() {
        let history = vec![spicy(&["numb", "sichuan"]), spicy(&["numb", "hotpot"])];
        let new_entry = spicy(&["numb", "sichuan", "night"]);
        assert!(detector().similar_batch(&new_entry, &history).is_none());
    }

    #[test]
    fn test_new_entry_already_in_history_is_not_counted() {
        let new_entry = spicy(&["a", "b"]);
        let history = vec![spicy(&["a", "b"]), new_entry.clone()];
        assert!(detector().similar_batch(&new_entry, &history).is_none());
    }

    #[test]
    fn test_mood_entries_group_by_mood() {
        let history = vec![
            Entry::mood_log(MoodType::Anxious).with_keywords(["work", "deadline"]),
            Entry::mood_log(MoodType::Anxious).with_keywords(["deadline", "work", "sleep"]),
        ];
        let new_entry = Entry::mood_log(MoodType::Anxious).with_keywords(["work", "deadline"]);
        assert_eq!(detector().similar_batch(&new_entry, &history).map(|b| b.len()), Some(3));
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let relaxed = PatternDetector::new(PatternConfig {
            min_tagged_entries: 1,
            min_keyword_overlap: 1,
            min_similar_entries: 1,
        });
        let history = vec![spicy(&["numb"])];
        assert!(relaxed.similar_batch(&spicy(&["numb"]), &history).is_some());
    }
}
