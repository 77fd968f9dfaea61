mod common;

use pretty_assertions::assert_eq;

use common::{service, ScriptedBackend};
use moodflow::error::MoodflowError;
use moodflow::models::{CraveType, CuisineType, Entry, Language, MoodType, PetProfile, PetType, ReportPeriod};
use moodflow::FoodLog;

fn sad(keywords: &[&str]) -> Entry {
    Entry::mood_log(MoodType::Sad).with_keywords(keywords.iter().copied())
}

fn denied() -> MoodflowError {
    MoodflowError::Llm("Gemini API error 403: PERMISSION_DENIED".to_string())
}

#[tokio::test]
async fn test_pattern_alert_when_gates_pass() {
    let backend = ScriptedBackend::replying(
        r#"{"patternSummary":"Rainy Mondays weigh on you.","detectedKeywords":["rain","monday"],"advice":"Plan something cosy."}"#,
    );
    let service = service(backend.clone());

    let history = vec![
        sad(&["rain", "monday", "bus"]),
        Entry::mood_log(MoodType::Happy).with_keywords(["rain", "monday"]),
        sad(&["Rain", "Monday"]),
    ];
    let new_entry = sad(&["rain", "monday", "work"]);

    let analysis = service
        .check_pattern(&new_entry, &history, Language::En)
        .await
        .unwrap()
        .expect("pattern expected");

    assert_eq!(analysis.pattern_summary, "Rainy Mondays weigh on you.");
    assert_eq!(analysis.detected_keywords, vec!["rain", "monday"]);
    assert_eq!(backend.call_count(), 1);

    // Two similar sad entries plus the new one, newest last
    let journal = backend.last_request().text();
    assert_eq!(journal.lines().count(), 3);
    assert!(journal.lines().last().unwrap().contains("work"));
}

#[tokio::test]
async fn test_pattern_uses_observed_keywords_when_model_omits_them() {
    let backend = ScriptedBackend::replying("not json at all");
    let service = service(backend);

    let history = vec![sad(&["rain", "monday"]), sad(&["rain", "monday", "tea"])];
    let new_entry = sad(&["monday", "rain", "work"]);

    let analysis = service
        .check_pattern(&new_entry, &history, Language::Zh)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(analysis.detected_keywords, vec!["monday", "rain"]);
    assert!(!analysis.pattern_summary.is_empty());
    assert!(!analysis.advice.is_empty());
}

#[tokio::test]
async fn test_too_few_tagged_entries_skips_backend() {
    let backend = ScriptedBackend::new();
    let service = service(backend.clone());

    let history = vec![sad(&["rain", "monday"])];
    let new_entry = sad(&["rain", "monday"]);

    let result = service.check_pattern(&new_entry, &history, Language::En).await.unwrap();
    assert_eq!(result, None);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_single_shared_keyword_is_not_similar() {
    let backend = ScriptedBackend::new();
    let service = service(backend.clone());

    let history = vec![sad(&["rain", "bus"]), sad(&["rain", "tea"]), sad(&["rain"])];
    let new_entry = sad(&["rain", "work"]);

    let result = service.check_pattern(&new_entry, &history, Language::En).await.unwrap();
    assert_eq!(result, None);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_new_entry_already_in_history_is_not_counted() {
    let backend = ScriptedBackend::new();
    let service = service(backend.clone());

    let new_entry = sad(&["rain", "monday"]);
    let history = vec![sad(&["rain", "monday"]), new_entry.clone()];

    let result = service.check_pattern(&new_entry, &history, Language::En).await.unwrap();
    assert_eq!(result, None);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_food_cravings_group_by_crave_not_cuisine() {
    let backend = ScriptedBackend::replying(r#"{"patternSummary":"Late spicy cravings.","advice":"Try a calmer dinner."}"#);
    let service = service(backend.clone());

    let spicy = |cuisine| Entry::food_log(cuisine, CraveType::Spicy).with_keywords(["late", "stress"]);
    let history = vec![spicy(CuisineType::Chinese), spicy(CuisineType::StreetFood)];
    let new_entry = spicy(CuisineType::Western);

    let analysis = service
        .check_pattern(&new_entry, &history, Language::En)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(analysis.pattern_summary, "Late spicy cravings.");
    assert_eq!(analysis.detected_keywords, vec!["late", "stress"]);
}

#[tokio::test]
async fn test_permission_denied_surfaces_as_authorization_required_everywhere() {
    let history = vec![Entry::mood_log(MoodType::Sad)];

    let backend = ScriptedBackend::failing(denied());
    let err = service(backend)
        .mood_insight(MoodType::Sad, &history, Language::En)
        .await
        .unwrap_err();
    assert!(err.is_authorization_required());

    let backend = ScriptedBackend::failing(denied());
    let log = FoodLog::new(CuisineType::Italian, CraveType::Comfort);
    let err = service(backend).food_insight(&log, Language::En).await.unwrap_err();
    assert!(err.is_authorization_required());

    let backend = ScriptedBackend::failing(denied());
    let err = service(backend)
        .generate_periodic_report(&history, ReportPeriod::Weekly, Language::En)
        .await
        .unwrap_err();
    assert!(err.is_authorization_required());

    let backend = ScriptedBackend::failing(denied());
    let err = service(backend).search_places("quiet park", Language::En).await.unwrap_err();
    assert!(err.is_authorization_required());

    let backend = ScriptedBackend::failing(denied());
    let err = service(backend).detect_pattern(&history, Language::En).await.unwrap_err();
    assert!(err.is_authorization_required());

    let backend = ScriptedBackend::failing(denied());
    let err = service(backend)
        .generate_pet_image(&PetProfile::new(PetType::Dog, "Bao"))
        .await
        .unwrap_err();
    assert!(err.is_authorization_required());
}

#[tokio::test]
async fn test_ordinary_failures_are_not_authorization_errors() {
    let backend = ScriptedBackend::failing(MoodflowError::LlmRateLimit { retry_after: Some(30) });
    let err = service(backend.clone())
        .search_places("dumplings", Language::En)
        .await
        .unwrap_err();

    assert!(!err.is_authorization_required());
    assert!(matches!(err, MoodflowError::LlmRateLimit { retry_after: Some(30) }));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_empty_pattern_batch_is_rejected() {
    let backend = ScriptedBackend::new();
    let err = service(backend.clone()).detect_pattern(&[], Language::En).await.unwrap_err();
    assert!(matches!(err, MoodflowError::Validation(_)));
    assert_eq!(backend.call_count(), 0);
}
