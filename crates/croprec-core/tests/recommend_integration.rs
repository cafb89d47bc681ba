//! End-to-end tests for the recommend operation against a mock provider.

use croprec_core::{App, AppError, Config};
use croprec_scoring::{CropScore, RecommendRequest};
use croprec_weather::WeatherMode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(soil: &str, ph: f64) -> RecommendRequest {
    RecommendRequest {
        lat: 12.9716,
        lon: 77.5946,
        soil_type: soil.to_string(),
        ph,
        season: Some("kharif".to_string()),
    }
}

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.weather.api_key = Some("test-key".to_string());
    config.weather.base_url = server.uri();
    config.weather.min_interval_secs = 0.0;
    config.retry.base_delay_secs = 0.01;
    config.retry.rate_limit_delay_secs = 0.01;
    config
}

fn names(scores: &[CropScore]) -> Vec<&str> {
    scores.iter().map(|s| s.crop.as_str()).collect()
}

#[tokio::test]
async fn test_recommend_with_current_weather() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 25.0},
            "rain": {"1h": 60.0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::new(config_for(&server)).unwrap();
    let scores = app.recommend(&request("loamy", 6.5)).await.unwrap();

    assert_eq!(scores.len(), 6);
    assert_eq!(scores[0].crop, "Maize");
    assert_eq!(scores[0].score, 100.0);
    assert_eq!(scores[0].reason("temp_c"), Some(25.0));

    // Same bucket again: answered from cache, mock expects one call
    let again = app.recommend(&request("loamy", 6.5)).await.unwrap();
    assert_eq!(scores, again);
}

#[tokio::test]
async fn test_recommend_with_forecast() {
    let server = MockServer::start().await;
    let list: Vec<_> = (0..40)
        .map(|_| json!({"main": {"temp": 22.0}, "rain": {"3h": 3.0}}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": list})))
        .mount(&server)
        .await;

    let app = App::new(config_for(&server)).unwrap();
    let scores = app
        .recommend_with_mode(&request("loamy", 6.5), WeatherMode::Forecast)
        .await
        .unwrap();

    let rice = scores.iter().find(|s| s.crop == "Rice").unwrap();
    assert_eq!(rice.reason("rain_sum_mm"), Some(72.0));
    assert_eq!(rice.reason("rain_window"), Some(1.0));
    // a single-point forecast range has no overlap width
    assert_eq!(rice.reason("temp_overlap"), Some(0.0));
}

#[tokio::test]
async fn test_recommend_without_api_key_uses_soil_only() {
    let mut config = Config::default();
    config.weather.api_key = None;

    let app = App::new(config).unwrap();
    assert!(app.weather().is_degraded());

    let scores = app.recommend(&request("sandy", 6.5)).await.unwrap();
    assert_eq!(names(&scores)[..2], ["Millet", "Sorghum"]);
    for score in &scores {
        assert_eq!(score.reason("temp_fit"), Some(0.0));
        assert_eq!(score.reason("rain_fit"), Some(0.0));
    }
}

#[tokio::test]
async fn test_provider_outage_is_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let app = App::new(config_for(&server)).unwrap();
    let err = app.recommend(&request("loamy", 6.5)).await.unwrap_err();

    assert!(err.is_upstream());
    assert!(matches!(err, AppError::Weather(_)));
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let mut config = Config::default();
    config.weather.base_url = "not a url".to_string();

    let err = App::new(config).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
