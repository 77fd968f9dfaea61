use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CuisineType, Entry, Language, MoodType, ReportPeriod};
use crate::intelligence::{fallback, trend};

/// One point on the mood chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub value: u8,
    pub mood: MoodType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub period: ReportPeriod,
    pub summary: String,
    pub cuisine_distribution: BTreeMap<CuisineType, usize>,
    pub chef_advice: String,
    pub dominant_cuisine: Option<CuisineType>,
    pub emotional_insight: Option<String>,
    pub mood_trend: Vec<TrendPoint>,
}

impl ReportData {
    /// Report built from history alone, with default narrative text.
    ///
    /// The chart data never depends on the backend, so this is what a caller
    /// renders when generation fails.
    pub fn local(history: &[Entry], period: ReportPeriod, language: Language, trend_window: usize) -> Self {
        let defaults = fallback::Fallback::for_language(language);
        let cuisine_distribution = trend::cuisine_distribution(history);

        Self {
            period,
            summary: defaults.report_summary.to_string(),
            dominant_cuisine: trend::dominant_cuisine(history),
            cuisine_distribution,
            chef_advice: defaults.chef_advice.to_string(),
            emotional_insight: None,
            mood_trend: trend::mood_trend(history, trend_window),
        }
    }
}
