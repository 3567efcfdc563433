use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::DefaultsConfig,
    error::AmbientalError,
    geo::{DISTRICTS, GeoPoint},
    models::{AirQualityReport, RecommendationsReport, RecyclingReport, ZoneStats},
    services::{air_quality, recommendations, recycling, zone_stats},
    source::DataSource,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DataSource>,
    pub defaults: DefaultsConfig,
}

impl AppState {
    pub fn new(source: Arc<dyn DataSource>, defaults: DefaultsConfig) -> Self {
        Self { source, defaults }
    }
}

// Raw strings so bad numbers produce our own 400 body
#[derive(Debug, Default, Deserialize)]
pub struct PointQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecyclingQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ZoneQuery {
    pub district: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub source: String,
}

#[derive(Serialize)]
pub struct Districts {
    pub districts: &'static [&'static str],
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<f64>, AmbientalError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| AmbientalError::validation(format!("{name} must be a number"))),
    }
}

fn optional_point(lat: Option<&str>, lon: Option<&str>) -> Result<Option<GeoPoint>, AmbientalError> {
    match (parse_number("lat", lat)?, parse_number("lon", lon)?) {
        (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude).map(Some),
        (None, None) => Ok(None),
        _ => Err(AmbientalError::validation(
            "lat and lon must be given together",
        )),
    }
}

fn required_point(lat: Option<&str>, lon: Option<&str>) -> Result<GeoPoint, AmbientalError> {
    optional_point(lat, lon)?.ok_or_else(|| {
        AmbientalError::validation("Missing required parameters: lat and lon")
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/air-quality", get(get_air_quality))
        .route("/recycling-points", get(get_recycling_points))
        .route("/recommendations", get(get_recommendations))
        .route("/zone-stats", get(get_zone_stats))
        .route("/districts", get(get_districts))
        .with_state(state)
}

async fn get_health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: crate::VERSION,
        source: state.source.name().to_string(),
    })
}

async fn get_districts() -> Json<Districts> {
    Json(Districts {
        districts: &DISTRICTS,
    })
}

async fn get_air_quality(
    State(state): State<AppState>,
    Query(query): Query<PointQuery>,
) -> Result<Json<AirQualityReport>, AmbientalError> {
    let point = required_point(query.lat.as_deref(), query.lon.as_deref())?;
    let report = air_quality::report(state.source.as_ref(), point).await?;
    Ok(Json(report))
}

async fn get_recycling_points(
    State(state): State<AppState>,
    Query(query): Query<RecyclingQuery>,
) -> Result<Json<RecyclingReport>, AmbientalError> {
    let point = required_point(query.lat.as_deref(), query.lon.as_deref())?;
    let radius = parse_number("radius", query.radius.as_deref())?
        .unwrap_or(state.defaults.recycling_radius_m);
    if radius < 0.0 {
        return Err(AmbientalError::validation("radius cannot be negative"));
    }
    let radius = radius.min(state.defaults.max_radius_m);

    let report = recycling::points_within(state.source.as_ref(), point, radius).await?;
    Ok(Json(report))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<PointQuery>,
) -> Result<Json<RecommendationsReport>, AmbientalError> {
    let point = required_point(query.lat.as_deref(), query.lon.as_deref())?;
    let report = recommendations::recommend(
        state.source.as_ref(),
        point,
        state.defaults.recommendation_radius_m,
    )
    .await?;
    Ok(Json(report))
}

async fn get_zone_stats(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> Result<Json<ZoneStats>, AmbientalError> {
    let point = optional_point(query.lat.as_deref(), query.lon.as_deref())?;
    let district = query.district.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let stats = zone_stats::stats(state.source.as_ref(), district, point).await?;
    Ok(Json(stats))
}
