//! Recycling points within a radius

use tracing::instrument;

use crate::error::AmbientalError;
use crate::geo::{GeoClassifier, GeoPoint};
use crate::models::{RecyclingPoint, RecyclingReport};
use crate::services::{locate_city, whole_meters};
use crate::source::DataSource;

#[instrument(skip(source))]
pub async fn points_within(
    source: &dyn DataSource,
    point: GeoPoint,
    radius_meters: f64,
) -> Result<RecyclingReport, AmbientalError> {
    point.validate()?;
    let city = locate_city(source, point).await;
    let dataset = source
        .recycling_points(point, radius_meters, &city)
        .await?;

    let points: Vec<RecyclingPoint> = GeoClassifier::within(point, &dataset.items, radius_meters)?
        .into_iter()
        .map(|hit| {
            let candidate = hit.candidate;
            let info = &candidate.payload;
            RecyclingPoint {
                name: candidate
                    .name
                    .clone()
                    .unwrap_or_else(|| info.kind.display_name().to_string()),
                kind: info.kind,
                address: candidate.address.clone(),
                description: info.description.clone(),
                schedule: info.schedule.clone(),
                phone: info.phone.clone(),
                lat: candidate.point.latitude,
                lon: candidate.point.longitude,
                distance: whole_meters(hit.distance_meters),
            }
        })
        .collect();
    tracing::debug!(count = points.len(), "Recycling points in radius");

    Ok(RecyclingReport {
        location: point.into(),
        radius: radius_meters,
        count: points.len(),
        points,
        source: dataset.source,
    })
}
