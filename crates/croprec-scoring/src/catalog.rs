//! Static crop reference data.

use serde::{Deserialize, Serialize};

/// Acceptable precipitation range in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainWindow {
    pub min_mm: f64,
    pub max_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    pub preferred_texture: String,
    pub min_ph: f64,
    pub max_ph: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub rain_window: RainWindow,
}

impl CropProfile {
    fn new(
        name: &str,
        preferred_texture: &str,
        ph: (f64, f64),
        temp: (f64, f64),
        rain: (f64, f64),
    ) -> Self {
        Self {
            name: name.to_string(),
            preferred_texture: preferred_texture.to_string(),
            min_ph: ph.0,
            max_ph: ph.1,
            min_temp: temp.0,
            max_temp: temp.1,
            rain_window: RainWindow {
                min_mm: rain.0,
                max_mm: rain.1,
            },
        }
    }
}

/// The six supported crops, in ranking tie-break order.
pub fn default_catalog() -> Vec<CropProfile> {
    vec![
        CropProfile::new("Rice", "loamy", (5.5, 7.0), (20.0, 35.0), (50.0, 200.0)),
        CropProfile::new("Wheat", "loamy", (6.0, 7.5), (10.0, 25.0), (20.0, 100.0)),
        CropProfile::new("Maize", "loamy", (5.5, 7.5), (18.0, 32.0), (25.0, 150.0)),
        CropProfile::new("Millet", "sandy", (5.0, 8.0), (18.0, 35.0), (10.0, 120.0)),
        CropProfile::new("Sorghum", "sandy", (5.5, 8.0), (20.0, 38.0), (15.0, 140.0)),
        CropProfile::new("Pulses", "loamy", (6.0, 7.5), (15.0, 30.0), (15.0, 110.0)),
    ]
}
