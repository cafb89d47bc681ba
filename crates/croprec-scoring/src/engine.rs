//! Crop ranking.
//!
//! Each crop gets four independent sub-scores in [0, 1] (soil texture, pH,
//! temperature, rain). Their weighted sum is the 0-100 score. Weather
//! sub-scores follow the summary's mode:
//!
//! | mode     | temperature                  | rain                      | weights (tex/pH/temp/rain) |
//! |----------|------------------------------|---------------------------|----------------------------|
//! | current  | inside `[min, max]`, binary  | inside window, binary     | 30 / 30 / 20 / 20          |
//! | forecast | range overlap ratio          | piecewise linear window   | 25 / 25 / 30 / 20          |
//!
//! Without a weather signal both weather sub-scores are zero.

use croprec_weather::{CurrentSummary, ForecastSummary, WeatherMode, WeatherSummary};
use std::collections::BTreeMap;

use crate::catalog::{default_catalog, CropProfile, RainWindow};
use crate::types::{CropScore, RecommendRequest};

/// Texture credit when the soil does not match the crop's preference.
const TEXTURE_MISMATCH: f64 = 0.5;
/// Extra pH tolerance beyond the half-range, in pH units.
const PH_MARGIN: f64 = 0.5;

/// Points awarded per sub-score at full fit. Sums to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub texture: f64,
    pub ph: f64,
    pub temp: f64,
    pub rain: f64,
}

impl Weights {
    pub const POINT_IN_TIME: Self = Self {
        texture: 30.0,
        ph: 30.0,
        temp: 20.0,
        rain: 20.0,
    };

    pub const FORECAST: Self = Self {
        texture: 25.0,
        ph: 25.0,
        temp: 30.0,
        rain: 20.0,
    };

    pub fn for_mode(mode: WeatherMode) -> Self {
        match mode {
            WeatherMode::Current => Self::POINT_IN_TIME,
            WeatherMode::Forecast => Self::FORECAST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Vec<CropProfile>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    pub fn with_catalog(catalog: Vec<CropProfile>) -> Self {
        Self { catalog }
    }

    /// Rank every crop for `request` under `weather`, best first. Ties keep
    /// catalog order.
    pub fn score(&self, request: &RecommendRequest, weather: &WeatherSummary) -> Vec<CropScore> {
        if let Some(season) = &request.season {
            tracing::debug!("Season '{}' supplied; not used for scoring", season);
        }

        let weights = Weights::for_mode(weather.mode());
        let mut results: Vec<CropScore> = self
            .catalog
            .iter()
            .map(|crop| score_crop(crop, request, weather, weights))
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}

fn score_crop(
    crop: &CropProfile,
    request: &RecommendRequest,
    weather: &WeatherSummary,
    weights: Weights,
) -> CropScore {
    let texture = texture_score(&request.soil_type, &crop.preferred_texture);
    let ph = ph_score(request.ph, crop.min_ph, crop.max_ph);

    let mut reasons = BTreeMap::new();
    reasons.insert("texture_match".to_string(), Some(round_to(texture, 2)));
    reasons.insert("ph_fit".to_string(), Some(round_to(ph, 2)));

    let (temp, rain) = match weather {
        WeatherSummary::Current(current) => point_in_time_fits(crop, current, &mut reasons),
        WeatherSummary::Forecast(forecast) => forecast_fits(crop, forecast, &mut reasons),
        WeatherSummary::NoSignal { requested } => {
            no_signal_reasons(*requested, &mut reasons);
            (0.0, 0.0)
        }
    };

    let total = weights.texture * texture
        + weights.ph * ph
        + weights.temp * temp
        + weights.rain * rain;

    CropScore {
        crop: crop.name.clone(),
        score: round_to(total, 1),
        reasons,
    }
}

fn point_in_time_fits(
    crop: &CropProfile,
    current: &CurrentSummary,
    reasons: &mut BTreeMap<String, Option<f64>>,
) -> (f64, f64) {
    let temp = temp_point_fit(current.temp_c, crop.min_temp, crop.max_temp);
    let rain = rain_point_fit(current.precip_1h_mm, crop.rain_window);

    reasons.insert("temp_c".to_string(), current.temp_c);
    reasons.insert("temp_fit".to_string(), Some(round_to(temp, 2)));
    reasons.insert("rain_1h_mm".to_string(), Some(current.precip_1h_mm));
    reasons.insert("rain_fit".to_string(), Some(round_to(rain, 2)));
    (temp, rain)
}

fn forecast_fits(
    crop: &CropProfile,
    forecast: &ForecastSummary,
    reasons: &mut BTreeMap<String, Option<f64>>,
) -> (f64, f64) {
    let temp = temp_overlap_fit(
        forecast.min_temp_c,
        forecast.max_temp_c,
        crop.min_temp,
        crop.max_temp,
    );
    let rain = rain_window_fit(forecast.precip_sum_mm, crop.rain_window);

    reasons.insert("min_temp_c".to_string(), forecast.min_temp_c);
    reasons.insert("max_temp_c".to_string(), forecast.max_temp_c);
    reasons.insert("temp_overlap".to_string(), Some(round_to(temp, 2)));
    reasons.insert("rain_sum_mm".to_string(), Some(forecast.precip_sum_mm));
    reasons.insert("rain_window".to_string(), Some(round_to(rain, 2)));
    (temp, rain)
}

/// Reason keys for a missing weather signal: raw values unknown, fits zero.
fn no_signal_reasons(mode: WeatherMode, reasons: &mut BTreeMap<String, Option<f64>>) {
    let (raw, fits): (&[&str], &[&str]) = match mode {
        WeatherMode::Current => (&["temp_c", "rain_1h_mm"], &["temp_fit", "rain_fit"]),
        WeatherMode::Forecast => (
            &["min_temp_c", "max_temp_c", "rain_sum_mm"],
            &["temp_overlap", "rain_window"],
        ),
    };
    for key in raw {
        reasons.insert(key.to_string(), None);
    }
    for key in fits {
        reasons.insert(key.to_string(), Some(0.0));
    }
}

/// 1.0 on a case-insensitive match, partial credit otherwise.
pub fn texture_score(soil: &str, preferred: &str) -> f64 {
    if soil.to_lowercase() == preferred.to_lowercase() {
        1.0
    } else {
        TEXTURE_MISMATCH
    }
}

/// Triangular falloff around the middle of `[min_ph, max_ph]`.
pub fn ph_score(ph: f64, min_ph: f64, max_ph: f64) -> f64 {
    let mid = (min_ph + max_ph) / 2.0;
    let tolerance = (max_ph - min_ph) / 2.0 + PH_MARGIN;
    (1.0 - (ph - mid).abs() / tolerance).max(0.0)
}

/// Binary, bounds inclusive. Unknown temperature scores zero.
pub fn temp_point_fit(temp_c: Option<f64>, min_temp: f64, max_temp: f64) -> f64 {
    match temp_c {
        Some(t) if (min_temp..=max_temp).contains(&t) => 1.0,
        _ => 0.0,
    }
}

/// Binary, bounds inclusive.
pub fn rain_point_fit(precip_mm: f64, window: RainWindow) -> f64 {
    if (window.min_mm..=window.max_mm).contains(&precip_mm) {
        1.0
    } else {
        0.0
    }
}

/// Overlap of the forecast range with the crop's range, as a share of the
/// crop's range width (width floored at 1 degree). Zero if either forecast
/// bound is unknown.
pub fn temp_overlap_fit(
    forecast_min: Option<f64>,
    forecast_max: Option<f64>,
    min_temp: f64,
    max_temp: f64,
) -> f64 {
    let (Some(lo), Some(hi)) = (forecast_min, forecast_max) else {
        return 0.0;
    };
    let overlap = (hi.min(max_temp) - lo.max(min_temp)).max(0.0);
    (overlap / (max_temp - min_temp).max(1.0)).min(1.0)
}

/// 1.0 inside the window (inclusive). Below it the score ramps up linearly
/// from zero precipitation; above it the score falls linearly and reaches
/// zero at twice the upper bound.
pub fn rain_window_fit(precip_mm: f64, window: RainWindow) -> f64 {
    if precip_mm < window.min_mm {
        if window.min_mm <= 0.0 {
            return 1.0;
        }
        (precip_mm / window.min_mm).clamp(0.0, 1.0)
    } else if precip_mm <= window.max_mm {
        1.0
    } else {
        let excess = precip_mm - window.max_mm;
        (1.0 - excess / window.max_mm.max(1.0)).max(0.0)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
