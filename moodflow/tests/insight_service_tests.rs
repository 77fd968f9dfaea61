mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use common::{llm_config, service, ScriptedBackend, GROUNDED_MODEL, IMAGE_MODEL, INSIGHT_JSON, PLAIN_MODEL, PNG_B64};
use moodflow::config::InsightConfig;
use moodflow::error::MoodflowError;
use moodflow::llm::{ContentPart, GroundingChunk, InlineImage, Tool, ToolConfig};
use moodflow::location::{FixedLocation, LatLng, LocationCache, LocationResolver};
use moodflow::models::{
    CraveType, CuisineType, Entry, InsightKind, Language, MoodType, PetProfile, PetType,
    ReportData, ReportPeriod, RestaurantReview,
};
use moodflow::{FoodLog, InsightService};

fn shanghai() -> LatLng {
    LatLng::new(31.23, 121.47)
}

fn with_fixed_location(service: InsightService) -> InsightService {
    let locator = LocationResolver::new(
        Arc::new(FixedLocation(shanghai())),
        Arc::new(LocationCache::new(Duration::from_secs(600))),
        Duration::from_secs(5),
    );
    service.with_locator(locator)
}

#[tokio::test]
async fn test_calm_mood_uses_plain_model_without_tools() {
    let backend = ScriptedBackend::replying(INSIGHT_JSON);
    let service = with_fixed_location(service(backend.clone()));

    let history = vec![Entry::mood_log(MoodType::Happy), Entry::mood_log(MoodType::Sad)];
    let insight = service
        .mood_insight(MoodType::Calm, &history, Language::En)
        .await
        .unwrap();

    assert_eq!(insight.kind, InsightKind::Daily);
    assert_eq!(insight.analysis, "It sounds like a gentle day.");
    assert_eq!(insight.refined_emotion.as_deref(), Some("soft calm"));
    assert_eq!(insight.keywords, vec!["tea", "rain"]);

    let request = backend.last_request();
    assert_eq!(request.model, PLAIN_MODEL);
    assert!(request.tools.is_empty());
    assert_eq!(request.tool_config, None);
    assert!(request.text().contains("happy, sad"));
}

#[tokio::test]
async fn test_anxious_mood_gets_maps_location_and_visited_places() {
    let backend = ScriptedBackend::new();
    backend.push_grounded(
        INSIGHT_JSON,
        vec![
            GroundingChunk::maps("Lakeside Tea House", "https://maps/tea"),
            GroundingChunk::maps("Lakeside Tea House", "https://maps/tea"),
            GroundingChunk::maps("Botanical Garden", "https://maps/garden"),
        ],
    );
    let service = with_fixed_location(service(backend.clone()));

    let visit = Entry::food_log(CuisineType::Cafe, CraveType::Comfort).with_review(RestaurantReview {
        restaurant_name: "lakeside tea".to_string(),
        rating: 5,
        recommended_dishes: vec!["oolong".to_string()],
        avoid_dishes: vec![],
        wishlist_dishes: vec![],
        user_review: "lovely".to_string(),
        food_photo: None,
    });
    let history = vec![visit.clone()];

    let insight = service
        .mood_insight(MoodType::Anxious, &history, Language::Zh)
        .await
        .unwrap();

    let request = backend.last_request();
    assert_eq!(request.model, GROUNDED_MODEL);
    assert_eq!(request.tools, vec![Tool::GoogleMaps]);
    assert_eq!(request.tool_config, Some(ToolConfig { lat_lng: shanghai() }));

    assert_eq!(insight.places.len(), 2);
    assert!(insight.places[0].is_visited);
    assert_eq!(insight.places[0].review_id.as_deref(), Some(visit.id.as_str()));
    assert!(!insight.places[1].is_visited);
}

#[tokio::test]
async fn test_food_insight_attaches_photo_and_recipe() {
    let backend = ScriptedBackend::replying(
        "```json\n{\"analysis\":\"Great pick.\",\"keywords\":[\"ramen\"],\"recipe\":{\"title\":\"Shoyu ramen\",\"difficulty\":\"medium\",\"keyIngredients\":[\"noodles\"]},\"refinedEmotion\":\"ignored\",}\n```",
    );
    let service = service(backend.clone()).with_pet(PetProfile::new(PetType::Cat, "Tofu"));

    let log = FoodLog::new(CuisineType::Japanese, CraveType::Comfort)
        .with_note("late ramen")
        .with_photo(format!("data:image/png;base64,{PNG_B64}"));
    let insight = service.food_insight(&log, Language::En).await.unwrap();

    assert_eq!(insight.kind, InsightKind::Food);
    assert_eq!(insight.analysis, "Great pick.");
    assert_eq!(insight.recipe.map(|r| r.title), Some("Shoyu ramen".to_string()));
    assert_eq!(insight.refined_emotion, None);
    assert!(!insight.pet_comment.is_empty());

    let request = backend.last_request();
    assert_eq!(request.parts.len(), 2);
    assert!(matches!(&request.parts[1], ContentPart::InlineImage { mime_type, .. } if mime_type == "image/png"));
    assert!(request.system_instruction.contains("cat named Tofu"));
    // No locator configured: maps still enabled, location omitted
    assert_eq!(request.tools, vec![Tool::GoogleMaps]);
    assert_eq!(request.tool_config, None);
}

#[tokio::test]
async fn test_malformed_photo_is_rejected_before_calling_backend() {
    let backend = ScriptedBackend::replying(INSIGHT_JSON);
    let service = service(backend.clone());

    let log = FoodLog::new(CuisineType::Other, CraveType::Surprise).with_photo("data:image/png;base64,");
    let err = service.food_insight(&log, Language::En).await.unwrap_err();

    assert!(matches!(err, MoodflowError::Validation(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_garbage_response_still_renders_a_card() {
    let backend = ScriptedBackend::replying("Sorry, I can't help with that.");
    let service = service(backend);

    let insight = service
        .mood_insight(MoodType::Neutral, &[], Language::En)
        .await
        .unwrap();

    assert!(!insight.analysis.is_empty());
    assert!(insight.affirmation.is_some_and(|a| !a.is_empty()));
    assert!(insight.news.is_some_and(|n| !n.is_empty()));
    assert!(!insight.pet_comment.is_empty());
    assert!(insight.keywords.is_empty());
}

#[tokio::test]
async fn test_search_places_dedups_in_first_seen_order() {
    let backend = ScriptedBackend::new();
    backend.push_grounded(
        "{}",
        vec![
            GroundingChunk::web("Guide", "https://web/guide"),
            GroundingChunk::maps("Noodle Bar", "https://maps/noodle"),
            GroundingChunk::default(),
            GroundingChunk::web("Guide again", "https://web/guide"),
        ],
    );
    let service = service(backend.clone());

    let places = service.search_places("  late night noodles ", Language::En).await.unwrap();
    let uris: Vec<&str> = places.iter().map(|p| p.uri.as_str()).collect();
    assert_eq!(uris, vec!["https://web/guide", "https://maps/noodle"]);

    let request = backend.last_request();
    assert_eq!(request.tools, vec![Tool::GoogleMaps, Tool::GoogleSearch]);
    assert!(request.text().ends_with("late night noodles"));
}

#[tokio::test]
async fn test_empty_search_query_is_validation_error() {
    let backend = ScriptedBackend::new();
    let err = service(backend.clone())
        .search_places("   ", Language::En)
        .await
        .unwrap_err();
    assert!(matches!(err, MoodflowError::Validation(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_report_merges_narrative_with_local_trend() {
    let backend = ScriptedBackend::replying(
        r#"Here you go: {"summary":"A balanced week.","chefAdvice":"Try more greens.","emotionalInsight":"Ramen lifts you up."} Enjoy!"#,
    );
    let service = service(backend.clone());
    let history = vec![
        Entry::mood_log(MoodType::Sad),
        Entry::food_log(CuisineType::Japanese, CraveType::Comfort),
        Entry::mood_log(MoodType::Happy),
    ];

    let report = service
        .generate_periodic_report(&history, ReportPeriod::Weekly, Language::En)
        .await
        .unwrap();

    assert_eq!(report.summary, "A balanced week.");
    assert_eq!(report.chef_advice, "Try more greens.");
    assert_eq!(report.emotional_insight.as_deref(), Some("Ramen lifts you up."));
    assert_eq!(report.mood_trend.iter().map(|p| p.value).collect::<Vec<_>>(), vec![20, 50, 90]);
    assert_eq!(report.dominant_cuisine, Some(CuisineType::Japanese));

    let request = backend.last_request();
    assert!(request.tools.is_empty());
    assert_eq!(request.text().lines().count(), 3);
}

#[tokio::test]
async fn test_report_journal_keeps_only_newest_entries() {
    let backend = ScriptedBackend::replying(r#"{"summary":"A long year.","chefAdvice":"Keep cooking."}"#);
    let config = InsightConfig {
        report_max_entries: 2,
        ..InsightConfig::default()
    };
    let service = InsightService::new(backend.clone(), &llm_config(), config);
    let history = vec![
        Entry::mood_log(MoodType::Sad),
        Entry::mood_log(MoodType::Calm),
        Entry::mood_log(MoodType::Happy),
    ];

    let report = service
        .generate_periodic_report(&history, ReportPeriod::Yearly, Language::En)
        .await
        .unwrap();

    let journal = backend.last_request().text();
    let lines: Vec<&str> = journal.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("mood: calm"));
    assert!(lines[1].contains("mood: happy"));

    // Local aggregates still cover the whole history
    assert_eq!(report.mood_trend.len(), 3);
}

#[tokio::test]
async fn test_report_failure_leaves_local_trend_available() {
    let backend = ScriptedBackend::failing(MoodflowError::Llm("upstream timed out".to_string()));
    let service = service(backend);
    let history = vec![Entry::mood_log(MoodType::Calm), Entry::mood_log(MoodType::Anxious)];

    let result = service
        .generate_periodic_report(&history, ReportPeriod::Monthly, Language::Zh)
        .await;
    assert!(matches!(result, Err(MoodflowError::Llm(_))));

    let fallback = ReportData::local(&history, ReportPeriod::Monthly, Language::Zh, service.config().trend_window);
    assert_eq!(fallback.mood_trend.len(), 2);
    assert!(!fallback.summary.is_empty());
}

#[tokio::test]
async fn test_empty_history_report_skips_backend() {
    let backend = ScriptedBackend::new();
    let report = service(backend.clone())
        .generate_periodic_report(&[], ReportPeriod::Yearly, Language::En)
        .await
        .unwrap();

    assert!(report.mood_trend.is_empty());
    assert!(!report.summary.is_empty());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_pet_image_returns_data_url() {
    let backend = ScriptedBackend::new();
    let mut response = moodflow::llm::GenerateResponse::default();
    response.images.push(InlineImage {
        mime_type: "image/png".to_string(),
        data: PNG_B64.to_string(),
    });
    backend.push(Ok(response));
    let service = service(backend.clone());

    let url = service
        .generate_pet_image(&PetProfile::new(PetType::Koala, "Gum"))
        .await
        .unwrap();
    assert_eq!(url, format!("data:image/png;base64,{PNG_B64}"));
    assert_eq!(backend.last_request().model, IMAGE_MODEL);
}

#[tokio::test]
async fn test_pet_image_without_image_is_an_error() {
    let backend = ScriptedBackend::replying("I drew a koala for you!");
    let err = service(backend)
        .generate_pet_image(&PetProfile::new(PetType::Koala, "Gum"))
        .await
        .unwrap_err();
    assert!(matches!(err, MoodflowError::Llm(_)));
}
