//! Per-district air quality averages

use tracing::instrument;

use crate::error::AmbientalError;
use crate::geo::{
    Candidate, GeoClassifier, GeoPoint, Pollutants, describe_area, is_district, locate_district,
};
use crate::models::{AirQualitySummary, CityInfo, StationReading, ZoneStation, ZoneStats};
use crate::services::madrid_now;
use crate::source::DataSource;

const MADRID_CENTER: GeoPoint = GeoPoint {
    latitude: 40.4168,
    longitude: -3.7038,
};

/// Known recycling point counts, unlisted districts have no estimate
#[must_use]
pub fn recycling_estimate(district: &str) -> Option<u32> {
    match district {
        "Centro" => Some(145),
        "Salamanca" => Some(120),
        "Chamberí" => Some(98),
        "Retiro" => Some(87),
        _ => None,
    }
}

/// Where a zone-stats query landed
#[derive(Debug, Clone, PartialEq)]
pub enum Zone {
    District(String),
    /// Outside every district, named by area or region
    Outside(String),
}

/// District named explicitly, or the one containing `point`
pub fn resolve_zone(
    district: Option<&str>,
    point: Option<GeoPoint>,
) -> Result<Zone, AmbientalError> {
    match (district, point) {
        (Some(name), _) if is_district(name) => Ok(Zone::District(name.to_string())),
        (Some(name), _) => Err(AmbientalError::not_found(format!(
            "District '{name}' not found"
        ))),
        (None, Some(point)) => match locate_district(point)? {
            Some(name) => Ok(Zone::District(name.to_string())),
            None => Ok(Zone::Outside(describe_area(point)?)),
        },
        (None, None) => Err(AmbientalError::validation(
            "Missing required parameter: district (or lat and lon)",
        )),
    }
}

fn belongs_to(station: &Candidate<StationReading>, district: &str) -> bool {
    station.payload.locality.as_deref() == Some(district)
        || station
            .name
            .as_deref()
            .is_some_and(|name| name.contains(district))
}

fn outside_stats(area: String) -> ZoneStats {
    let message =
        format!("{area} está fuera de los distritos de Madrid, sin estadísticas de distrito");
    ZoneStats {
        district: area,
        avg_air_quality: None,
        stations_count: 0,
        stations: Vec::new(),
        recycling_points: None,
        message: Some(message),
        last_update: madrid_now(),
    }
}

#[instrument(skip(source))]
pub async fn stats(
    source: &dyn DataSource,
    district: Option<&str>,
    point: Option<GeoPoint>,
) -> Result<ZoneStats, AmbientalError> {
    let district = match resolve_zone(district, point)? {
        Zone::District(name) => name,
        Zone::Outside(area) => return Ok(outside_stats(area)),
    };
    let dataset = source
        .air_stations(MADRID_CENTER, &CityInfo::madrid())
        .await?;

    let stations: Vec<&Candidate<StationReading>> = dataset
        .items
        .iter()
        .filter(|station| belongs_to(station, &district))
        .collect();

    let (avg_air_quality, message) = if stations.is_empty() {
        (
            None,
            Some("No hay estaciones de medición en este distrito".to_string()),
        )
    } else {
        let average = Pollutants::average(stations.iter().map(|s| &s.payload.pollutants)).rounded();
        let level = GeoClassifier::classify(&average);
        (Some(AirQualitySummary::new(average, level)), None)
    };

    Ok(ZoneStats {
        recycling_points: recycling_estimate(&district),
        stations_count: stations.len(),
        stations: stations
            .iter()
            .map(|s| ZoneStation {
                name: s.name.clone().unwrap_or_default(),
                location: s.point.into(),
            })
            .collect(),
        district,
        avg_air_quality,
        message,
        last_update: madrid_now(),
    })
}
