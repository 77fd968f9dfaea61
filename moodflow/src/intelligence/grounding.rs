//! Turns grounding citations into recommended places.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use super::fallback::Fallback;
use super::utils::mutual_contains;
use crate::config::GroundingConfig;
use crate::llm::{Citation, GroundingMetadata};
use crate::models::{Entry, GroundingPlace, Language};

/// Places cited in `metadata`, deduplicated by uri in first-seen order.
///
/// Display fields the backend leaves out are filled deterministically from
/// the uri and chunk position, and flagged in [`GroundingPlace::filler`].
pub fn extract_places(
    metadata: &GroundingMetadata,
    config: &GroundingConfig,
    language: Language,
) -> Vec<GroundingPlace> {
    let match_reason = Fallback::for_language(language).match_reason;
    let mut seen = HashSet::new();
    let mut places = Vec::new();

    for (ordinal, chunk) in metadata.grounding_chunks.iter().enumerate() {
        // A map citation without a usable title or uri yields to its web sibling
        let identified = chunk
            .maps
            .as_ref()
            .and_then(|maps| citation_identity(maps).map(|id| (maps, true, id)))
            .or_else(|| {
                chunk
                    .web
                    .as_ref()
                    .and_then(|web| citation_identity(web).map(|id| (web, false, id)))
            });
        let Some((citation, is_map, (title, uri))) = identified else {
            continue;
        };
        if !seen.insert(uri.to_string()) {
            continue;
        }

        places.push(build_place(title, uri, citation, is_map, ordinal, config, match_reason));
    }

    tracing::debug!(
        chunks = metadata.grounding_chunks.len(),
        places = places.len(),
        "Extracted grounded places"
    );
    places
}

fn citation_identity(citation: &Citation) -> Option<(&str, &str)> {
    let title = citation.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let uri = citation.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
    Some((title, uri))
}

fn build_place(
    title: &str,
    uri: &str,
    citation: &Citation,
    is_map: bool,
    ordinal: usize,
    config: &GroundingConfig,
    match_reason: &str,
) -> GroundingPlace {
    let seed = uri_seed(uri);
    let mut place = GroundingPlace::new(title, uri);

    match citation.distance.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(distance) => place.distance = Some(distance.to_string()),
        None if is_map => {
            place.distance = Some(synthetic_distance(ordinal, config.distance_step_km));
            place.filler.distance = true;
        }
        None => {}
    }

    match citation.rating.filter(|r| r.is_finite()) {
        Some(rating) => place.google_rating = Some(rating),
        None => {
            place.google_rating = Some(synthetic_rating(seed, config));
            place.filler.rating = true;
        }
    }

    place.match_reason = Some(match_reason.to_string());
    place.filler.match_reason = true;

    place.vibe_score = Some(synthetic_vibe(seed, config));
    place.filler.vibe_score = true;

    place
}

fn uri_seed(uri: &str) -> u64 {
    let digest = Sha256::digest(uri.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn synthetic_distance(ordinal: usize, step_km: f32) -> String {
    format!("{:.1} km", (ordinal as f32 + 1.0) * step_km)
}

fn synthetic_rating(seed: u64, config: &GroundingConfig) -> f32 {
    let steps = u64::from(config.rating_steps.max(1));
    let tenths = (config.rating_baseline * 10.0).round() + (seed % steps) as f32;
    (tenths / 10.0).min(5.0)
}

fn synthetic_vibe(seed: u64, config: &GroundingConfig) -> u8 {
    let low = config.vibe_min.min(config.vibe_max);
    let high = config.vibe_min.max(config.vibe_max);
    let span = u64::from(high - low) + 1;
    // span <= 256, so the offset fits
    low.saturating_add((seed % span) as u8)
}

/// Join places against the user's reviewed visits.
///
/// A place is visited when a review's restaurant name and the place title
/// contain one another, ignoring case. The first matching entry wins.
pub fn annotate_visited(places: Vec<GroundingPlace>, history: &[Entry]) -> Vec<GroundingPlace> {
    places
        .into_iter()
        .map(|mut place| {
            let visit = history.iter().find(|entry| {
                entry
                    .review
                    .as_ref()
                    .is_some_and(|review| mutual_contains(&review.restaurant_name, &place.title))
            });

            match visit {
                Some(entry) => {
                    place.is_visited = true;
                    place.personal_rating = entry.review.as_ref().map(|r| r.rating);
                    place.personal_keywords = entry
                        .insight
                        .as_ref()
                        .map(|insight| insight.keywords.clone())
                        .filter(|keywords| !keywords.is_empty())
                        .unwrap_or_else(|| entry.keywords.clone());
                    place.review_id = Some(entry.id.clone());
                }
                None => {
                    place.is_visited = false;
                    place.personal_rating = None;
                    place.personal_keywords = Vec::new();
                    place.review_id = None;
                }
            }
            place
        })
        .collect()
}
