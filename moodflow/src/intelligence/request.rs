//! Pure assembly of outbound generation requests.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::utils::truncate_graphemes;
use crate::config::{InsightConfig, LlmConfig};
use crate::error::{MoodflowError, Result};
use crate::llm::{prompts, ContentPart, GenerateRequest, Tool, ToolConfig};
use crate::location::LatLng;
use crate::models::{CraveType, CuisineType, Language, MoodType, PetProfile, ReportPeriod};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// What a request is for. Decides tooling, model and instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextTag {
    Mood { mood: MoodType, recent: Vec<MoodType> },
    Food { cuisine: CuisineType, crave: CraveType },
    Discovery,
    Report(ReportPeriod),
    Pattern,
    PetPortrait,
}

impl ContextTag {
    /// Map and search tooling is slower and costlier, so only intents that
    /// benefit from physical recommendations get it.
    pub fn tools(&self) -> Vec<Tool> {
        match self {
            Self::Mood { mood, .. } if mood.wants_calming_place() => vec![Tool::GoogleMaps],
            Self::Food { .. } => vec![Tool::GoogleMaps],
            Self::Discovery => vec![Tool::GoogleMaps, Tool::GoogleSearch],
            Self::Mood { .. } | Self::Report(_) | Self::Pattern | Self::PetPortrait => Vec::new(),
        }
    }

    pub fn wants_location(&self) -> bool {
        self.tools().contains(&Tool::GoogleMaps)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mood { .. } => "mood",
            Self::Food { .. } => "food",
            Self::Discovery => "discovery",
            Self::Report(_) => "report",
            Self::Pattern => "pattern",
            Self::PetPortrait => "pet_portrait",
        }
    }
}

/// Inputs for one request.
#[derive(Debug, Clone)]
pub struct InsightRequest<'a> {
    pub tag: ContextTag,
    pub note: Option<&'a str>,
    /// Data URL or bare base64.
    pub image: Option<&'a str>,
    pub location: Option<LatLng>,
    pub language: Language,
    pub pet: Option<&'a PetProfile>,
}

impl<'a> InsightRequest<'a> {
    pub fn new(tag: ContextTag, language: Language) -> Self {
        Self {
            tag,
            note: None,
            image: None,
            location: None,
            language,
            pet: None,
        }
    }

    pub fn with_note(mut self, note: Option<&'a str>) -> Self {
        self.note = note;
        self
    }

    pub fn with_image(mut self, image: Option<&'a str>) -> Self {
        self.image = image;
        self
    }

    pub fn with_location(mut self, location: Option<LatLng>) -> Self {
        self.location = location;
        self
    }

    pub fn with_pet(mut self, pet: Option<&'a PetProfile>) -> Self {
        self.pet = pet;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
    grounded_model: String,
    image_model: String,
    max_note_graphemes: usize,
}

impl RequestBuilder {
    pub fn new(llm: &LlmConfig, insight: &InsightConfig) -> Self {
        Self {
            model: llm.model.clone(),
            grounded_model: llm.grounded_model.clone(),
            image_model: llm.image_model.clone(),
            max_note_graphemes: insight.max_note_graphemes,
        }
    }

    /// Build the request descriptor. No I/O.
    ///
    /// Fails only when an attached image cannot be split into MIME type and
    /// base64 body.
    pub fn build(&self, request: &InsightRequest<'_>) -> Result<GenerateRequest> {
        let tools = request.tag.tools();
        let note = request.note.map(str::trim).filter(|n| !n.is_empty());
        // Report and pattern prompts carry a journal that is bounded per entry
        let note = match request.tag {
            ContextTag::Report(_) | ContextTag::Pattern => note,
            _ => note.map(|n| truncate_graphemes(n, self.max_note_graphemes)),
        };

        let model = match &request.tag {
            ContextTag::PetPortrait => &self.image_model,
            _ if tools.contains(&Tool::GoogleMaps) => &self.grounded_model,
            _ => &self.model,
        };

        let mut parts = vec![ContentPart::Text(self.user_text(request, note))];
        if let Some(image) = request.image {
            let (mime_type, data) = split_image(image)?;
            parts.push(ContentPart::InlineImage { mime_type, data });
        }

        let tool_config = match request.location {
            Some(lat_lng) if tools.contains(&Tool::GoogleMaps) => Some(ToolConfig { lat_lng }),
            _ => None,
        };

        Ok(GenerateRequest {
            model: model.clone(),
            system_instruction: self.system_instruction(request),
            parts,
            tools,
            tool_config,
        })
    }

    fn user_text(&self, request: &InsightRequest<'_>, note: Option<&str>) -> String {
        match &request.tag {
            ContextTag::Mood { mood, recent } => prompts::mood_prompt(*mood, recent, note),
            ContextTag::Food { cuisine, crave } => {
                prompts::food_prompt(*cuisine, *crave, note, request.image.is_some())
            }
            ContextTag::Discovery => prompts::discovery_prompt(note.unwrap_or_default()),
            ContextTag::Report(_) | ContextTag::Pattern => note.unwrap_or_default().to_string(),
            ContextTag::PetPortrait => match request.pet {
                Some(pet) => prompts::pet_portrait_prompt(pet),
                None => prompts::pet_portrait_prompt(&PetProfile::default()),
            },
        }
    }

    fn system_instruction(&self, request: &InsightRequest<'_>) -> String {
        let with_places = request.tag.wants_location();
        match &request.tag {
            ContextTag::Mood { .. } => {
                prompts::mood_system_instruction(request.language, request.pet, with_places)
            }
            ContextTag::Food { .. } => {
                prompts::food_system_instruction(request.language, request.pet, with_places)
            }
            ContextTag::Discovery => prompts::discovery_system_instruction(request.language),
            ContextTag::Report(period) => prompts::report_system_instruction(request.language, *period),
            ContextTag::Pattern => prompts::pattern_system_instruction(request.language),
            ContextTag::PetPortrait => prompts::pet_portrait_system_instruction(),
        }
    }
}

/// Split an image payload into MIME type and bare base64 body.
///
/// Accepts `data:<mime>;base64,<body>` URLs and bare base64. For bare
/// payloads the MIME type is sniffed from the decoded bytes.
pub fn split_image(payload: &str) -> Result<(String, String)> {
    let payload = payload.trim();

    if let Some(rest) = payload.strip_prefix("data:") {
        let (header, body) = rest
            .split_once(',')
            .ok_or_else(|| MoodflowError::Validation("Image data URL has no body".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| MoodflowError::Validation("Image data URL is not base64".to_string()))?;
        let mime = if mime.trim().is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            mime.trim()
        };
        let body = body.trim();
        decode_body(body)?;
        return Ok((mime.to_string(), body.to_string()));
    }

    let bytes = decode_body(payload)?;
    let mime = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or(DEFAULT_IMAGE_MIME);
    Ok((mime.to_string(), payload.to_string()))
}

fn decode_body(body: &str) -> Result<Vec<u8>> {
    if body.is_empty() {
        return Err(MoodflowError::Validation("Image payload is empty".to_string()));
    }
    STANDARD
        .decode(body)
        .map_err(|e| MoodflowError::Validation(format!("Image payload is not valid base64: {e}")))
}
