//! Crop suitability scoring.
//!
//! Combines soil attributes from a recommendation request with a weather
//! summary and ranks a fixed catalog of crop profiles.

pub mod catalog;
pub mod engine;
pub mod types;

pub use catalog::{default_catalog, CropProfile, RainWindow};
pub use engine::{ScoringEngine, Weights};
pub use types::{CropScore, RecommendRequest};
