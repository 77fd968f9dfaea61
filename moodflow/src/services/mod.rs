mod insight;

pub use insight::{FoodLog, InsightService};
