use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, InsightConfig, LlmConfig};
use crate::error::{MoodflowError, Result};
use crate::intelligence::utils::{keyword_set, normalize_keyword};
use crate::intelligence::{
    annotate_visited, decode, decode_pattern, decode_report, extract_places, ContextTag,
    InsightRequest, PatternAdvisor, PatternDetector, RequestBuilder,
};
use crate::llm::{prompts, GenerateResponse, GenerativeBackend, LlmProvider};
use crate::location::LocationResolver;
use crate::models::{
    CraveType, CuisineType, Entry, GroundingPlace, InsightKind, Language, MoodType,
    PatternAnalysis, PetProfile, ReportData, ReportPeriod, UnifiedInsight,
};

/// A meal about to be logged.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodLog {
    pub cuisine: CuisineType,
    pub crave: CraveType,
    pub note: Option<String>,
    /// Data URL or bare base64.
    pub photo: Option<String>,
}

impl FoodLog {
    pub fn new(cuisine: CuisineType, crave: CraveType) -> Self {
        Self {
            cuisine,
            crave,
            note: None,
            photo: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }
}

/// Public entry points of the insight pipeline.
///
/// Each operation is one backend call followed by decoding and grounding
/// extraction. History is only ever borrowed. Backend failures are returned
/// unretried, with permission rejections surfaced as
/// [`MoodflowError::AuthorizationRequired`].
pub struct InsightService {
    backend: Arc<dyn GenerativeBackend>,
    builder: RequestBuilder,
    config: InsightConfig,
    detector: PatternDetector,
    locator: Option<LocationResolver>,
    pet: Option<PetProfile>,
}

impl InsightService {
    pub fn new(backend: Arc<dyn GenerativeBackend>, llm: &LlmConfig, config: InsightConfig) -> Self {
        Self {
            backend,
            builder: RequestBuilder::new(llm, &config),
            detector: PatternDetector::new(config.pattern.clone()),
            config,
            locator: None,
            pet: None,
        }
    }

    /// Service backed by the configured [`LlmProvider`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm = config.llm.as_ref().ok_or_else(|| {
            MoodflowError::LlmUnavailable("No LLM configuration provided".to_string())
        })?;
        let provider = LlmProvider::new(Some(llm));
        Ok(Self::new(Arc::new(provider), llm, config.insight.clone()))
    }

    pub fn with_locator(mut self, locator: LocationResolver) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Companion whose voice is used for `pet_comment`.
    pub fn with_pet(mut self, pet: PetProfile) -> Self {
        self.pet = Some(pet);
        self
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub async fn mood_insight(
        &self,
        mood: MoodType,
        history: &[Entry],
        language: Language,
    ) -> Result<UnifiedInsight> {
        let window = self.config.recent_mood_window;
        let moods: Vec<MoodType> = history.iter().filter_map(|entry| entry.mood).collect();
        let recent = moods[moods.len().saturating_sub(window)..].to_vec();

        let tag = ContextTag::Mood { mood, recent };
        let request = InsightRequest::new(tag, language).with_pet(self.pet.as_ref());
        let response = self.generate(request).await?;

        let places = extract_places(&response.grounding, &self.config.grounding, language);
        let places = annotate_visited(places, history);
        Ok(decode(&response.text, language).into_insight(InsightKind::Daily, places))
    }

    pub async fn food_insight(&self, log: &FoodLog, language: Language) -> Result<UnifiedInsight> {
        let tag = ContextTag::Food {
            cuisine: log.cuisine,
            crave: log.crave,
        };
        let request = InsightRequest::new(tag, language)
            .with_note(log.note.as_deref())
            .with_image(log.photo.as_deref())
            .with_pet(self.pet.as_ref());
        let response = self.generate(request).await?;

        let places = extract_places(&response.grounding, &self.config.grounding, language);
        Ok(decode(&response.text, language).into_insight(InsightKind::Food, places))
    }

    /// Report over `history`. The trend series and cuisine counts are always
    /// computed locally; only the narrative comes from the backend.
    ///
    /// Only the newest `report_max_entries` entries are sent as the journal.
    /// Empty history yields the local report without a backend call. On
    /// failure callers can fall back to [`ReportData::local`].
    pub async fn generate_periodic_report(
        &self,
        history: &[Entry],
        period: ReportPeriod,
        language: Language,
    ) -> Result<ReportData> {
        let mut report = ReportData::local(history, period, language, self.config.trend_window);
        if history.is_empty() {
            tracing::debug!(%period, "Empty history, returning local report");
            return Ok(report);
        }

        let limit = self.config.report_max_entries.max(1);
        let recent = &history[history.len().saturating_sub(limit)..];
        if recent.len() < history.len() {
            tracing::debug!(
                %period,
                total = history.len(),
                sent = recent.len(),
                "Report journal capped to most recent entries"
            );
        }

        let journal = prompts::journal_lines(recent);
        let request = InsightRequest::new(ContextTag::Report(period), language).with_note(Some(&journal));
        let response = self.generate(request).await?;

        let narrative = decode_report(&response.text, language);
        report.summary = narrative.summary;
        report.chef_advice = narrative.chef_advice;
        report.emotional_insight = narrative.emotional_insight;
        Ok(report)
    }

    pub async fn search_places(&self, query: &str, language: Language) -> Result<Vec<GroundingPlace>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MoodflowError::Validation("Search query cannot be empty".to_string()));
        }

        let request = InsightRequest::new(ContextTag::Discovery, language).with_note(Some(query));
        let response = self.generate(request).await?;
        Ok(extract_places(&response.grounding, &self.config.grounding, language))
    }

    /// Summarise a batch of similar entries, newest last.
    pub async fn detect_pattern(&self, batch: &[Entry], language: Language) -> Result<PatternAnalysis> {
        let Some(newest) = batch.last() else {
            return Err(MoodflowError::Validation("Pattern batch cannot be empty".to_string()));
        };

        let journal = prompts::journal_lines(batch);
        let request = InsightRequest::new(ContextTag::Pattern, language).with_note(Some(&journal));
        let response = self.generate(request).await?;

        let observed = recurring_keywords(newest, &batch[..batch.len() - 1]);
        Ok(decode_pattern(&response.text, language, &observed))
    }

    /// Run the pattern gates for a freshly saved entry and generate an
    /// alert when they pass.
    pub async fn check_pattern(
        &self,
        new_entry: &Entry,
        history: &[Entry],
        language: Language,
    ) -> Result<Option<PatternAnalysis>> {
        self.detector.detect(new_entry, history, self, language).await
    }

    /// Portrait of the companion as a `data:` URL.
    pub async fn generate_pet_image(&self, pet: &PetProfile) -> Result<String> {
        let request = InsightRequest::new(ContextTag::PetPortrait, Language::default()).with_pet(Some(pet));
        let response = self.generate(request).await?;

        response
            .images
            .first()
            .map(|image| image.data_url())
            .ok_or_else(|| MoodflowError::Llm("Image model returned no image".to_string()))
    }

    async fn generate(&self, mut request: InsightRequest<'_>) -> Result<GenerateResponse> {
        if request.tag.wants_location() && request.location.is_none() {
            if let Some(locator) = &self.locator {
                request.location = locator.resolve().await;
            }
        }

        let intent = request.tag.name();
        let built = self.builder.build(&request)?;
        tracing::info!(
            intent,
            model = %built.model,
            tools = ?built.tools,
            has_location = built.tool_config.is_some(),
            "Requesting insight"
        );

        match self.backend.generate(&built).await {
            Ok(response) => {
                tracing::debug!(
                    intent,
                    response_len = response.text.len(),
                    citations = response.grounding.grounding_chunks.len(),
                    "Insight response received"
                );
                Ok(response)
            }
            Err(error) => {
                let error = error.classify_backend_failure();
                if error.is_authorization_required() {
                    tracing::warn!(intent, error = %error, "Backend requires re-authorization");
                } else {
                    tracing::error!(intent, error = %error, "Insight request failed");
                }
                Err(error)
            }
        }
    }
}

#[async_trait]
impl PatternAdvisor for InsightService {
    async fn detect_pattern(&self, batch: &[Entry], language: Language) -> Result<PatternAnalysis> {
        InsightService::detect_pattern(self, batch, language).await
    }
}

/// Keywords of `newest` that also occur in at least one earlier entry, in
/// the order `newest` lists them.
fn recurring_keywords(newest: &Entry, earlier: &[Entry]) -> Vec<String> {
    let seen: HashSet<String> = earlier
        .iter()
        .flat_map(|entry| keyword_set(&entry.keywords))
        .collect();

    let mut emitted = HashSet::new();
    newest
        .keywords
        .iter()
        .filter(|keyword| {
            let normalized = normalize_keyword(keyword);
            seen.contains(&normalized) && emitted.insert(normalized)
        })
        .map(|keyword| keyword.trim().to_string())
        .collect()
}
