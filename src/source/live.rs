//! Upstream-backed source: Madrid open data plus OpenStreetMap

use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use crate::geo::{Candidate, GeoClassifier, GeoPoint};
use crate::models::{CityInfo, RecyclingInfo, RecyclingKind, StationReading};
use crate::source::{DataSource, Dataset};
use crate::upstream::Upstream;
use crate::upstream::normalize::{NO_SCHEDULE, ORIGIN_MADRID, ORIGIN_OSM};

/// Two records closer than this are the same facility
const SAME_PLACE_METERS: f64 = 100.0;
/// Official points are only added when OSM found fewer than this
const ENRICH_BELOW: usize = 10;

const ORIGIN_MERGED: &str = "OpenStreetMap + Madrid Open Data";

#[derive(Debug, Clone)]
pub struct LiveSource {
    upstream: Upstream,
}

impl LiveSource {
    #[must_use]
    pub fn new(upstream: Upstream) -> Self {
        Self { upstream }
    }
}

/// Enrich OSM puntos limpios with official metadata and add official points
/// the OSM result is missing.
pub fn merge_official_points(
    points: &mut Vec<Candidate<RecyclingInfo>>,
    official: &[Candidate<RecyclingInfo>],
    query: GeoPoint,
    radius_meters: f64,
) -> Result<()> {
    for point in points
        .iter_mut()
        .filter(|p| p.payload.kind == RecyclingKind::PuntoLimpio)
    {
        let Some(hit) = GeoClassifier::nearest(point.point, official)? else {
            continue;
        };
        if hit.distance_meters >= SAME_PLACE_METERS {
            continue;
        }

        let source = hit.candidate;
        if let Some(name) = &source.name {
            point.name = Some(name.clone());
        }
        if source.address.is_some() {
            point.address.clone_from(&source.address);
        }
        if source.payload.schedule != NO_SCHEDULE {
            point.payload.schedule.clone_from(&source.payload.schedule);
        }
        if source.payload.phone.is_some() {
            point.payload.phone.clone_from(&source.payload.phone);
        }
        point.payload.origin = ORIGIN_MERGED.to_string();
    }

    if points.len() < ENRICH_BELOW {
        for hit in GeoClassifier::within(query, official, radius_meters)? {
            let duplicate = GeoClassifier::nearest(hit.candidate.point, points.as_slice())?
                .is_some_and(|existing| existing.distance_meters < SAME_PLACE_METERS);
            if !duplicate {
                points.push(hit.candidate.clone());
            }
        }
    }

    Ok(())
}

#[async_trait]
impl DataSource for LiveSource {
    fn name(&self) -> &str {
        "live"
    }

    #[instrument(skip(self))]
    async fn locate(&self, point: GeoPoint) -> Result<CityInfo> {
        self.upstream.nominatim.reverse(point).await
    }

    #[instrument(skip(self))]
    async fn air_stations(
        &self,
        _point: GeoPoint,
        city: &CityInfo,
    ) -> Result<Dataset<StationReading>> {
        if !city.is_madrid() {
            tracing::debug!(city = %city.city, "No live air quality feed for this city");
            return Ok(Dataset::new(ORIGIN_MADRID, Vec::new()));
        }
        let stations = self.upstream.madrid.air_stations().await?;
        Ok(Dataset::new(ORIGIN_MADRID, stations))
    }

    #[instrument(skip(self))]
    async fn recycling_points(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        city: &CityInfo,
    ) -> Result<Dataset<RecyclingInfo>> {
        let overpass = self.upstream.overpass.recycling_points(point, radius_meters);

        if !city.is_madrid() {
            return Ok(Dataset::new(ORIGIN_OSM, overpass.await?));
        }

        let (osm, official) = futures::join!(overpass, self.upstream.madrid.clean_points());
        let mut points = match osm {
            Ok(points) => points,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "Overpass failed, using official points only");
                Vec::new()
            }
        };

        match official {
            Ok(official) => {
                merge_official_points(&mut points, &official, point, radius_meters)?;
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "Could not enrich with Madrid puntos limpios");
            }
        }

        let origin = if points.iter().any(|p| p.payload.origin != ORIGIN_OSM) {
            ORIGIN_MERGED
        } else {
            ORIGIN_OSM
        };
        Ok(Dataset::new(origin, points))
    }
}
