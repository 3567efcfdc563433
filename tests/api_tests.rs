//! Router tests against the demo dataset

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use ambiental::api::AppState;
use ambiental::config::{AmbientalConfig, DefaultsConfig};
use ambiental::source::MockSource;
use ambiental::web;

fn app() -> axum::Router {
    let state = AppState::new(Arc::new(MockSource), DefaultsConfig::default());
    web::app(state, &AmbientalConfig::default().server)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["source"], "mock");
}

#[tokio::test]
async fn test_air_quality() {
    let (status, body) = get("/api/air-quality?lat=40.4168&lon=-3.7038").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["station"]["name"], "Estación Centro (Demo)");
    assert_eq!(body["station"]["distance"], 0);
    assert_eq!(body["airQuality"]["NO2"], 45.0);
    assert!(body["airQuality"]["SO2"].is_null());
    assert_eq!(body["airQuality"]["level"], "Buena");
    assert_eq!(body["airQuality"]["color"], "#ffff00");
    assert_eq!(body["city"]["city"], "Madrid");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_missing_coordinates_is_bad_request() {
    let (status, body) = get("/api/air-quality").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("lat and lon"));

    let (status, _) = get("/api/recommendations?lat=40.4").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparsable_coordinates_is_bad_request() {
    let (status, body) = get("/api/recycling-points?lat=north&lon=-3.7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_str().unwrap().contains("lat must be a number"));
}

#[tokio::test]
async fn test_out_of_range_coordinates_is_bad_request() {
    let (status, body) = get("/api/air-quality?lat=91&lon=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("out of range"));
}

#[tokio::test]
async fn test_recycling_points_default_radius() {
    let (status, body) = get("/api/recycling-points?lat=40.4168&lon=-3.7038").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["radius"], 2000.0);
    assert_eq!(body["count"], 4);
    assert_eq!(body["points"][0]["name"], "Punto Limpio Centro");
    assert_eq!(body["points"][0]["type"], "punto_limpio");

    let distances: Vec<u64> = body["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["distance"].as_u64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_recycling_points_radius_is_capped_and_checked() {
    let (status, body) = get("/api/recycling-points?lat=40.4168&lon=-3.7038&radius=999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["radius"], 10_000.0);
    assert_eq!(body["count"], 5);

    let (status, _) = get("/api/recycling-points?lat=40.4168&lon=-3.7038&radius=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations() {
    let (status, body) = get("/api/recommendations?lat=40.4168&lon=-3.7038").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentAirQuality"]["station"], "Estación Centro (Demo)");

    let kinds: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["success", "recycling"]);
    assert_eq!(body["totalRecommendations"], 2);
}

#[tokio::test]
async fn test_recommendations_without_nearby_station() {
    // Barcelona is far outside the 5 km window around the demo station
    let (status, body) = get("/api/recommendations?lat=41.3874&lon=2.1686").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No data available for this location");
}

#[tokio::test]
async fn test_zone_stats() {
    let (status, body) = get("/api/zone-stats?district=Centro").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["district"], "Centro");
    assert_eq!(body["stationsCount"], 1);
    assert_eq!(body["recyclingPoints"], 145);
    assert_eq!(body["avgAirQuality"]["NO2"], 45.0);
}

#[tokio::test]
async fn test_zone_stats_by_coordinates() {
    let (status, body) = get("/api/zone-stats?lat=40.4168&lon=-3.7038").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["district"], "Centro");

    let (status, body) = get("/api/zone-stats?lat=40.4345&lon=-3.7036").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["district"], "Chamberí");
}

#[tokio::test]
async fn test_zone_stats_outside_every_district() {
    let (status, body) = get("/api/zone-stats?lat=39.8628&lon=-4.0273").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["district"], "Área Sur");
    assert_eq!(body["stationsCount"], 0);
    assert!(body["avgAirQuality"].is_null());
    assert!(body["message"].as_str().unwrap().contains("Área Sur"));
}

#[tokio::test]
async fn test_zone_stats_unknown_district() {
    let (status, body) = get("/api/zone-stats?district=Springfield").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Springfield"));

    let (status, _) = get("/api/zone-stats").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_districts() {
    let (status, body) = get("/api/districts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["districts"].as_array().unwrap().len(), 21);
}
