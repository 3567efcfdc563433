//! Nearest-station air quality report

use tracing::instrument;

use crate::error::AmbientalError;
use crate::geo::{GeoClassifier, GeoPoint};
use crate::models::{AirQualityReport, AirQualitySummary, StationInfo};
use crate::services::{locate_city, madrid_now, whole_meters};
use crate::source::DataSource;

#[instrument(skip(source))]
pub async fn report(
    source: &dyn DataSource,
    point: GeoPoint,
) -> Result<AirQualityReport, AmbientalError> {
    point.validate()?;
    let city = locate_city(source, point).await;
    let dataset = source.air_stations(point, &city).await?;

    let nearest = GeoClassifier::nearest(point, &dataset.items)?
        .ok_or_else(|| AmbientalError::not_found("No air quality data found for this location"))?;

    let station = nearest.candidate;
    let pollutants = station.payload.pollutants;
    let level = GeoClassifier::classify(&pollutants);
    tracing::debug!(station = ?station.name, level = level.label(), "Classified nearest station");

    Ok(AirQualityReport {
        location: point.into(),
        city,
        station: StationInfo {
            name: station
                .name
                .clone()
                .unwrap_or_else(|| "Estación de medición".to_string()),
            address: station.address.clone(),
            distance: whole_meters(nearest.distance_meters),
        },
        air_quality: AirQualitySummary::new(pollutants, level),
        recommendation: level.recommendation().to_string(),
        timestamp: madrid_now(),
        source: dataset.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;

    #[tokio::test]
    async fn test_report_from_mock() {
        let point = GeoPoint::new(40.4268, -3.7038).unwrap();
        let report = report(&MockSource, point).await.unwrap();

        assert_eq!(report.station.name, "Estación Centro (Demo)");
        assert!((1101..=1123).contains(&report.station.distance));
        assert_eq!(report.air_quality.level, "Buena");
        assert_eq!(report.air_quality.index, 2);
        assert_eq!(report.air_quality.pollutants.no2, Some(45.0));
        assert!(report.air_quality.pollutants.so2.is_none());
        assert_eq!(report.source, "mock");
        assert!(report.recommendation.contains("buena"));
    }

    #[tokio::test]
    async fn test_invalid_point_rejected() {
        let point = GeoPoint {
            latitude: 95.0,
            longitude: 0.0,
        };
        let err = report(&MockSource, point).await.unwrap_err();
        assert!(matches!(err, AmbientalError::InvalidCoordinate { .. }));
    }
}
