pub mod decoder;
pub mod fallback;
pub mod grounding;
pub mod pattern;
pub mod request;
pub mod trend;
pub mod utils;

pub use decoder::{decode, decode_pattern, decode_report, DecodedInsight, ReportNarrative};
pub use fallback::Fallback;
pub use grounding::{annotate_visited, extract_places};
pub use pattern::{PatternAdvisor, PatternDetector};
pub use request::{split_image, ContextTag, InsightRequest, RequestBuilder};
