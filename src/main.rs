use anyhow::{Context, Result};
use clap::Parser;
use croprec_scoring::RecommendRequest;
use croprec_weather::WeatherMode;

/// Recommend crops for a field from its location and soil.
#[derive(Parser)]
#[command(name = "croprec", about = "Crop recommendations from soil and weather")]
struct Cli {
    /// Field latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Field longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Soil texture, e.g. loamy, sandy, clay
    #[arg(long)]
    soil_type: String,

    /// Soil pH
    #[arg(long)]
    ph: f64,

    /// Growing season (informational)
    #[arg(long)]
    season: Option<String>,

    /// Weather signal to score against: current or forecast
    #[arg(long)]
    mode: Option<WeatherMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply
    let _ = dotenvy::dotenv();
    croprec_core::init()?;

    let cli = Cli::parse();
    let config = croprec_core::Config::load()?;
    let mode = cli.mode.unwrap_or(config.weather.mode);
    let app = match croprec_core::App::new(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            anyhow::bail!("{}", e.user_message());
        }
    };

    let request = RecommendRequest {
        lat: cli.lat,
        lon: cli.lon,
        soil_type: cli.soil_type,
        ph: cli.ph,
        season: cli.season,
    };

    let scores = match app.recommend_with_mode(&request, mode).await {
        Ok(scores) => scores,
        Err(e) => {
            tracing::error!("Recommendation failed: {}", e);
            anyhow::bail!("{}", e.user_message());
        }
    };

    let output = serde_json::to_string_pretty(&scores).context("Failed to serialize scores")?;
    println!("{}", output);

    Ok(())
}
