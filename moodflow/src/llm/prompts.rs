//! Prompt templates for every insight intent.
//!
//! Templates use plain `format!()` interpolation. Every JSON-producing
//! instruction ends with the same output contract; the decoder still copes
//! when the model ignores it.

use crate::intelligence::utils::truncate_graphemes;
use crate::models::{CraveType, CuisineType, Entry, Language, MoodType, PetProfile, ReportPeriod};

const JOURNAL_NOTE_GRAPHEMES: usize = 280;

const JSON_CONTRACT: &str = "Respond with exactly one JSON object matching the schema above. \
Do not wrap it in markdown. Do not write any text before or after the JSON.";

fn language_rule(language: Language) -> &'static str {
    match language {
        Language::Zh => "Write every string value in Simplified Chinese.",
        Language::En => "Write every string value in English.",
    }
}

fn companion_line(pet: Option<&PetProfile>) -> String {
    match pet {
        Some(pet) if !pet.name.trim().is_empty() => format!(
            "The user's companion is a {} named {}. Write \"petComment\" in its voice: one short, playful, caring line.",
            pet.persona(),
            pet.name.trim()
        ),
        Some(pet) => format!(
            "The user's companion is a {}. Write \"petComment\" in its voice: one short, playful, caring line.",
            pet.persona()
        ),
        None => "Write \"petComment\" as a small companion pet: one short, playful, caring line.".to_string(),
    }
}

/// System instruction for a mood check-in.
pub fn mood_system_instruction(language: Language, pet: Option<&PetProfile>, with_places: bool) -> String {
    let places_rule = if with_places {
        "\nUse map search to suggest one or two calm, comforting places nearby and mention them in \"analysis\"."
    } else {
        ""
    };

    format!(
        r#"You are a gentle mood companion. Read the user's mood and recent history and answer with empathy.
{companion}{places_rule}

Schema:
{{
  "title": "short heading",
  "analysis": "two or three warm sentences about how the user feels",
  "refinedEmotion": "a short poetic label for the emotion",
  "keywords": ["two to four short tags describing the situation"],
  "affirmation": "one short healing sentence",
  "news": "one real, heart-warming news item or fun fact",
  "music": {{"title": "song title", "artist": "artist"}},
  "petComment": "line in the companion's voice"
}}

{language}
{contract}"#,
        companion = companion_line(pet),
        language = language_rule(language),
        contract = JSON_CONTRACT,
    )
}

/// System instruction for a food log.
pub fn food_system_instruction(language: Language, pet: Option<&PetProfile>, with_places: bool) -> String {
    let places_rule = if with_places {
        "\nUse map search to recommend restaurants nearby that fit the craving."
    } else {
        ""
    };

    format!(
        r#"You are a warm, professional private chef and food critic. Read the user's meal log and respond.
{companion}{places_rule}

Schema:
{{
  "title": "short heading",
  "analysis": "professional but friendly commentary on the choice",
  "keywords": ["two to four short tags describing the meal or mood"],
  "tip": "one practical eating or cooking tip",
  "recipe": {{"title": "dish to cook at home", "difficulty": "easy | medium | hard", "keyIngredients": ["ingredient"]}},
  "affirmation": "one short encouraging sentence",
  "news": "one food fact or story",
  "music": {{"title": "song title", "artist": "artist"}},
  "petComment": "line in the companion's voice"
}}

{language}
{contract}"#,
        companion = companion_line(pet),
        language = language_rule(language),
        contract = JSON_CONTRACT,
    )
}

/// System instruction for a free-text place search.
pub fn discovery_system_instruction(language: Language) -> String {
    format!(
        r#"You are a local food scout. Use map and web search to find places that match the user's request.

Schema:
{{
  "analysis": "one or two sentences explaining the picks",
  "keywords": ["short tags describing the request"]
}}

{language}
{contract}"#,
        language = language_rule(language),
        contract = JSON_CONTRACT,
    )
}

/// System instruction for a periodic report narrative.
pub fn report_system_instruction(language: Language, period: ReportPeriod) -> String {
    format!(
        r#"You are a caring nutrition and wellbeing coach writing a {period} review of the user's journal.

Schema:
{{
  "summary": "three or four sentences summarising the period",
  "chefAdvice": "one concrete suggestion for the next period",
  "emotionalInsight": "one sentence connecting food and mood"
}}

{language}
{contract}"#,
        language = language_rule(language),
        contract = JSON_CONTRACT,
    )
}

/// System instruction for a recurring-pattern alert.
pub fn pattern_system_instruction(language: Language) -> String {
    format!(
        r#"You are a gentle wellbeing companion. The entries below share a recurring theme. The last entry is the newest.
Name the pattern kindly and suggest one small, practical change. Do not diagnose.

Schema:
{{
  "patternSummary": "one or two sentences describing the pattern",
  "detectedKeywords": ["the recurring keywords"],
  "advice": "one short, practical suggestion"
}}

{language}
{contract}"#,
        language = language_rule(language),
        contract = JSON_CONTRACT,
    )
}

pub fn mood_prompt(mood: MoodType, recent_moods: &[MoodType], note: Option<&str>) -> String {
    let recent = if recent_moods.is_empty() {
        "none".to_string()
    } else {
        recent_moods
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut prompt = format!("Current mood: {mood}\nRecent moods (oldest first): {recent}");
    if let Some(note) = note {
        prompt.push_str(&format!("\nNote from the user:\n{note}"));
    }
    prompt
}

pub fn food_prompt(cuisine: CuisineType, crave: CraveType, note: Option<&str>, has_photo: bool) -> String {
    let mut prompt = format!("Cuisine: {cuisine}\nCraving: {crave}");
    if let Some(note) = note {
        prompt.push_str(&format!("\nNote from the user:\n{note}"));
    }
    if has_photo {
        prompt.push_str("\nA photo of the meal is attached.");
    }
    prompt
}

pub fn discovery_prompt(query: &str) -> String {
    format!("Find places for: {query}")
}

/// One line per entry, oldest first.
pub fn journal_lines(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let mut line = format!("- {} | ", entry.timestamp.format("%Y-%m-%d %H:%M"));
            match (entry.cuisine(), entry.mood) {
                (Some(cuisine), _) => line.push_str(&format!("meal: {cuisine}")),
                (None, Some(mood)) => line.push_str(&format!("mood: {mood}")),
                (None, None) => line.push_str("entry"),
            }
            if let Some(crave) = entry.crave {
                line.push_str(&format!(", craving: {crave}"));
            }
            if let Some(review) = &entry.review {
                line.push_str(&format!(
                    ", visited: {} ({}/5)",
                    review.restaurant_name, review.rating
                ));
            }
            if !entry.keywords.is_empty() {
                line.push_str(&format!(", keywords: {}", entry.keywords.join(", ")));
            }
            if let Some(note) = entry.note.as_deref().filter(|n| !n.trim().is_empty()) {
                // One line per entry
                let flat = note.split_whitespace().collect::<Vec<_>>().join(" ");
                line.push_str(&format!(
                    ", note: {}",
                    truncate_graphemes(&flat, JOURNAL_NOTE_GRAPHEMES)
                ));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn pet_portrait_prompt(pet: &PetProfile) -> String {
    format!(
        "A cute, soft, pastel illustration of a {} as a friendly companion pet, \
         round shapes, gentle smile, plain light background, no text.",
        pet.persona()
    )
}

pub fn pet_portrait_system_instruction() -> String {
    "You are an illustrator. Produce a single square image.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PetType;

    #[test]
    fn test_json_instructions_share_the_contract() {
        let instructions = [
            mood_system_instruction(Language::En, None, false),
            food_system_instruction(Language::Zh, None, true),
            discovery_system_instruction(Language::En),
            report_system_instruction(Language::En, ReportPeriod::Weekly),
            pattern_system_instruction(Language::Zh),
        ];
        for instruction in &instructions {
            assert!(instruction.contains(JSON_CONTRACT));
            assert!(instruction.contains("Schema:"));
        }
    }

    #[test]
    fn test_language_rule_follows_language() {
        assert!(mood_system_instruction(Language::Zh, None, false).contains("Simplified Chinese"));
        assert!(mood_system_instruction(Language::En, None, false).contains("in English"));
    }

    #[test]
    fn test_companion_voice_uses_pet_name() {
        let pet = PetProfile::new(PetType::Koala, "Mochi");
        let instruction = food_system_instruction(Language::En, Some(&pet), false);
        assert!(instruction.contains("koala named Mochi"));
    }

    #[test]
    fn test_places_rule_only_when_requested() {
        assert!(mood_system_instruction(Language::En, None, true).contains("map search"));
        assert!(!mood_system_instruction(Language::En, None, false).contains("map search"));
    }

    #[test]
    fn test_mood_prompt_lists_recent_moods() {
        let prompt = mood_prompt(MoodType::Sad, &[MoodType::Calm, MoodType::Anxious], Some("rainy"));
        assert!(prompt.contains("Current mood: sad"));
        assert!(prompt.contains("calm, anxious"));
        assert!(prompt.contains("rainy"));
        assert!(mood_prompt(MoodType::Happy, &[], None).contains("none"));
    }

    #[test]
    fn test_journal_lines_one_per_entry() {
        let entries = vec![
            Entry::mood_log(MoodType::Calm).with_keywords(["tea"]),
            Entry::food_log(CuisineType::Japanese, CraveType::Comfort).with_note("ramen\n  at midnight"),
        ];
        let lines = journal_lines(&entries);
        assert_eq!(lines.lines().count(), 2);
        assert!(lines.contains("mood: calm, keywords: tea"));
        assert!(lines.contains("craving: comfort"));
        assert!(lines.contains("note: ramen at midnight"));
    }
}
