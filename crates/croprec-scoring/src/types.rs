//! Request and result types for crop scoring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inbound "recommend" request. Field validation happens before this point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub lat: f64,
    pub lon: f64,
    pub soil_type: String,
    pub ph: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

/// One ranked crop. `reasons` maps each sub-score and raw weather value to
/// the number that produced the score; unknown weather values are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropScore {
    pub crop: String,
    pub score: f64,
    pub reasons: BTreeMap<String, Option<f64>>,
}

impl CropScore {
    pub fn reason(&self, name: &str) -> Option<f64> {
        self.reasons.get(name).copied().flatten()
    }
}
