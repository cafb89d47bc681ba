//! Weather modes, summaries and the lenient provider payload shapes.

use serde::{Deserialize, Serialize};

/// Which provider endpoint a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    /// Point-in-time conditions ("current weather" endpoint)
    #[default]
    Current,
    /// 5-day / 3-hour forecast, reduced to a bounded horizon
    Forecast,
}

impl WeatherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
        }
    }
}

impl std::str::FromStr for WeatherMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "forecast" => Ok(Self::Forecast),
            other => Err(format!("unknown weather mode: {}", other)),
        }
    }
}

impl std::fmt::Display for WeatherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time weather signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CurrentSummary {
    pub temp_c: Option<f64>,
    pub precip_1h_mm: f64,
}

/// Forecast signal reduced over the configured horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ForecastSummary {
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub precip_sum_mm: f64,
}

/// Weather input to scoring.
///
/// `NoSignal` is returned when no provider credential is configured. It is
/// a valid input, not an error: scoring degrades the weather sub-scores to
/// zero and keeps the weight split of the requested mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WeatherSummary {
    Current(CurrentSummary),
    Forecast(ForecastSummary),
    NoSignal { requested: WeatherMode },
}

impl WeatherSummary {
    pub fn no_signal(mode: WeatherMode) -> Self {
        Self::NoSignal { requested: mode }
    }

    pub fn mode(&self) -> WeatherMode {
        match self {
            Self::Current(_) => WeatherMode::Current,
            Self::Forecast(_) => WeatherMode::Forecast,
            Self::NoSignal { requested } => *requested,
        }
    }

    pub fn has_signal(&self) -> bool {
        !matches!(self, Self::NoSignal { .. })
    }
}

// Provider payload shapes. Only the fields scoring reads are modelled; every
// field is optional so a sparse document degrades instead of failing.

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MainBlock {
    #[serde(default)]
    pub temp: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PrecipBlock {
    #[serde(rename = "1h", default)]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h", default)]
    pub three_hours: Option<f64>,
}

/// Body of the "current weather" endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CurrentPayload {
    #[serde(default)]
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub rain: Option<PrecipBlock>,
}

/// One 3-hour step of the forecast `list[]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastStep {
    #[serde(default)]
    pub(crate) main: Option<MainBlock>,
    #[serde(default)]
    pub(crate) rain: Option<PrecipBlock>,
    #[serde(default)]
    pub(crate) snow: Option<PrecipBlock>,
}

impl ForecastStep {
    pub fn temp_c(&self) -> Option<f64> {
        self.main.as_ref().and_then(|m| m.temp)
    }

    /// Rain plus snow over the step, missing parts counting as zero.
    pub fn precip_mm(&self) -> f64 {
        let rain = self.rain.as_ref().and_then(|r| r.three_hours).unwrap_or(0.0);
        let snow = self.snow.as_ref().and_then(|s| s.three_hours).unwrap_or(0.0);
        rain + snow
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ForecastPayload {
    #[serde(default)]
    pub list: Vec<serde_json::Value>,
}

impl CurrentSummary {
    /// Read `main.temp` and `rain.1h` out of a raw current-weather document.
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        let parsed: CurrentPayload = match serde_json::from_value(payload.clone()) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Current weather payload unreadable, no signal: {}", e);
                CurrentPayload::default()
            }
        };

        Self {
            temp_c: parsed.main.and_then(|m| m.temp),
            precip_1h_mm: parsed.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
        }
    }
}

/// Parse the forecast `list[]` leniently: steps that do not match the
/// expected shape count as empty samples rather than being dropped, so
/// the horizon still covers the same number of leading steps.
pub fn forecast_steps(payload: &serde_json::Value) -> Vec<ForecastStep> {
    let parsed: ForecastPayload = serde_json::from_value(payload.clone()).unwrap_or_default();
    parsed
        .list
        .into_iter()
        .map(|step| serde_json::from_value(step).unwrap_or_default())
        .collect()
}
