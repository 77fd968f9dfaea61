//! Insight orchestration for a mood and food companion.
//!
//! Builds requests for a generative backend, decodes whatever text comes
//! back into typed cards, turns grounding citations into place
//! recommendations and decides when repeated entries deserve a pattern alert.

pub mod config;
pub mod error;
pub mod intelligence;
pub mod llm;
pub mod location;
pub mod logging;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{MoodflowError, Result};
pub use services::{FoodLog, InsightService};
