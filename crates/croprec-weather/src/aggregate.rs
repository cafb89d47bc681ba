//! Reduce a 3-hourly forecast series into one horizon summary.

use serde_json::Value;

use crate::types::{forecast_steps, ForecastStep, ForecastSummary};

pub const DEFAULT_HORIZON_HOURS: u32 = 72;

/// Resolution of the provider's forecast series.
const STEP_HOURS: u32 = 3;

/// Number of leading steps covering `horizon_hours` (never fewer than one).
pub fn steps_for_horizon(horizon_hours: u32) -> usize {
    horizon_hours.div_ceil(STEP_HOURS).max(1) as usize
}

/// Temperature range and accumulated precipitation over the first
/// `horizon_hours` of `series`.
pub fn aggregate(series: &[ForecastStep], horizon_hours: u32) -> ForecastSummary {
    let window = series.iter().take(steps_for_horizon(horizon_hours));

    let mut min_temp: Option<f64> = None;
    let mut max_temp: Option<f64> = None;
    let mut precip = 0.0;

    for step in window {
        if let Some(t) = step.temp_c() {
            min_temp = Some(min_temp.map_or(t, |m| m.min(t)));
            max_temp = Some(max_temp.map_or(t, |m| m.max(t)));
        }
        precip += step.precip_mm();
    }

    ForecastSummary {
        min_temp_c: min_temp,
        max_temp_c: max_temp,
        precip_sum_mm: (precip * 10.0).round() / 10.0,
    }
}

/// [`aggregate`] over a raw forecast document's `list[]`.
pub fn aggregate_payload(payload: &Value, horizon_hours: u32) -> ForecastSummary {
    aggregate(&forecast_steps(payload), horizon_hours)
}
