use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zh => write!(f, "zh"),
            Self::En => write!(f, "en"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zh" | "zh-cn" | "chinese" => Ok(Self::Zh),
            "en" | "en-us" | "english" => Ok(Self::En),
            _ => Err(format!("Unknown language: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoodType {
    Happy,
    Energetic,
    Calm,
    Neutral,
    Anxious,
    Sad,
}

impl MoodType {
    pub const ALL: [MoodType; 6] = [
        Self::Happy,
        Self::Energetic,
        Self::Calm,
        Self::Neutral,
        Self::Anxious,
        Self::Sad,
    ];

    /// Moods where suggesting a calming place nearby is worth a grounded request.
    pub fn wants_calming_place(&self) -> bool {
        matches!(self, Self::Anxious | Self::Sad)
    }
}

impl std::fmt::Display for MoodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Happy => write!(f, "happy"),
            Self::Energetic => write!(f, "energetic"),
            Self::Calm => write!(f, "calm"),
            Self::Neutral => write!(f, "neutral"),
            Self::Anxious => write!(f, "anxious"),
            Self::Sad => write!(f, "sad"),
        }
    }
}

impl std::str::FromStr for MoodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "energetic" => Ok(Self::Energetic),
            "calm" => Ok(Self::Calm),
            "neutral" => Ok(Self::Neutral),
            "anxious" => Ok(Self::Anxious),
            "sad" => Ok(Self::Sad),
            _ => Err(format!("Unknown mood: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CuisineType {
    Chinese,
    Japanese,
    Italian,
    French,
    Western,
    StreetFood,
    Cafe,
    Other,
}

impl std::fmt::Display for CuisineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chinese => write!(f, "Chinese"),
            Self::Japanese => write!(f, "Japanese"),
            Self::Italian => write!(f, "Italian"),
            Self::French => write!(f, "French"),
            Self::Western => write!(f, "Western"),
            Self::StreetFood => write!(f, "StreetFood"),
            Self::Cafe => write!(f, "Cafe"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for CuisineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chinese" => Ok(Self::Chinese),
            "japanese" => Ok(Self::Japanese),
            "italian" => Ok(Self::Italian),
            "french" => Ok(Self::French),
            "western" => Ok(Self::Western),
            "streetfood" | "street_food" => Ok(Self::StreetFood),
            "cafe" => Ok(Self::Cafe),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown cuisine: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CraveType {
    Comfort,
    Healthy,
    Spicy,
    Sweet,
    Social,
    Surprise,
}

impl std::fmt::Display for CraveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comfort => write!(f, "comfort"),
            Self::Healthy => write!(f, "healthy"),
            Self::Spicy => write!(f, "spicy"),
            Self::Sweet => write!(f, "sweet"),
            Self::Social => write!(f, "social"),
            Self::Surprise => write!(f, "surprise"),
        }
    }
}

impl std::str::FromStr for CraveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comfort" => Ok(Self::Comfort),
            "healthy" => Ok(Self::Healthy),
            "spicy" => Ok(Self::Spicy),
            "sweet" => Ok(Self::Sweet),
            "social" => Ok(Self::Social),
            "surprise" => Ok(Self::Surprise),
            _ => Err(format!("Unknown craving: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    #[default]
    Dog,
    Cat,
    Mouse,
    Kangaroo,
    Koala,
    Custom,
}

impl std::fmt::Display for PetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dog => write!(f, "dog"),
            Self::Cat => write!(f, "cat"),
            Self::Mouse => write!(f, "mouse"),
            Self::Kangaroo => write!(f, "kangaroo"),
            Self::Koala => write!(f, "koala"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for PetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dog" => Ok(Self::Dog),
            "cat" => Ok(Self::Cat),
            "mouse" => Ok(Self::Mouse),
            "kangaroo" => Ok(Self::Kangaroo),
            "koala" => Ok(Self::Koala),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown pet type: {s}")),
        }
    }
}

/// The companion that voices `pet_comment` and appears in pet portraits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PetProfile {
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub name: String,
    pub custom_description: Option<String>,
}

impl PetProfile {
    pub fn new(pet_type: PetType, name: impl Into<String>) -> Self {
        Self {
            pet_type,
            name: name.into(),
            custom_description: None,
        }
    }

    /// Short description used inside prompts.
    pub fn persona(&self) -> String {
        match (&self.pet_type, self.custom_description.as_deref()) {
            (PetType::Custom, Some(description)) if !description.trim().is_empty() => {
                description.trim().to_string()
            }
            (pet_type, _) => pet_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown report period: {s}")),
        }
    }
}
