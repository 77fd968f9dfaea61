//! Report aggregates computed from history alone.

use std::collections::BTreeMap;

use crate::models::{CuisineType, Entry, MoodType, TrendPoint};

/// Chart score for a mood.
pub fn mood_score(mood: MoodType) -> u8 {
    match mood {
        MoodType::Happy => 90,
        MoodType::Energetic => 80,
        MoodType::Calm => 70,
        MoodType::Neutral => 50,
        MoodType::Anxious => 30,
        MoodType::Sad => 20,
    }
}

/// The last `window` entries as chart points, oldest first.
///
/// Entries without a mood score as neutral, so the series is non-empty
/// whenever `history` is.
pub fn mood_trend(history: &[Entry], window: usize) -> Vec<TrendPoint> {
    let window = window.max(1);
    let start = history.len().saturating_sub(window);

    history[start..]
        .iter()
        .map(|entry| {
            let mood = entry.mood.unwrap_or(MoodType::Neutral);
            TrendPoint {
                date: entry.timestamp,
                value: mood_score(mood),
                mood,
            }
        })
        .collect()
}

pub fn cuisine_distribution(history: &[Entry]) -> BTreeMap<CuisineType, usize> {
    let mut counts = BTreeMap::new();
    for cuisine in history.iter().filter_map(Entry::cuisine) {
        *counts.entry(cuisine).or_insert(0) += 1;
    }
    counts
}

/// Most frequent cuisine; ties go to whichever appeared first.
pub fn dominant_cuisine(history: &[Entry]) -> Option<CuisineType> {
    let counts = cuisine_distribution(history);
    let mut best: Option<(CuisineType, usize)> = None;

    for cuisine in history.iter().filter_map(Entry::cuisine) {
        let count = counts.get(&cuisine).copied().unwrap_or(0);
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((cuisine, count)),
        }
    }

    best.map(|(cuisine, _)| cuisine)
}
