//! Primary source with a secondary one for failures and empty results

use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use crate::geo::GeoPoint;
use crate::models::{CityInfo, RecyclingInfo, StationReading};
use crate::source::{DataSource, Dataset};

pub struct FallbackSource {
    primary: Box<dyn DataSource>,
    fallback: Box<dyn DataSource>,
    name: String,
}

impl FallbackSource {
    #[must_use]
    pub fn new(primary: Box<dyn DataSource>, fallback: Box<dyn DataSource>) -> Self {
        let name = format!("{}|{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            name,
        }
    }

    fn usable<T>(&self, result: Result<Dataset<T>>, what: &str) -> Option<Dataset<T>> {
        match result {
            Ok(dataset) if !dataset.is_empty() => Some(dataset),
            Ok(_) => {
                tracing::info!(primary = self.primary.name(), "No {what} from primary source");
                None
            }
            Err(err) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    error = %format!("{err:#}"),
                    "Primary source failed for {what}"
                );
                None
            }
        }
    }
}

#[async_trait]
impl DataSource for FallbackSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self))]
    async fn locate(&self, point: GeoPoint) -> Result<CityInfo> {
        match self.primary.locate(point).await {
            Ok(city) => Ok(city),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "Primary source could not locate point");
                self.fallback.locate(point).await
            }
        }
    }

    #[instrument(skip(self))]
    async fn air_stations(
        &self,
        point: GeoPoint,
        city: &CityInfo,
    ) -> Result<Dataset<StationReading>> {
        let primary = self.primary.air_stations(point, city).await;
        match self.usable(primary, "air quality stations") {
            Some(dataset) => Ok(dataset),
            None => self.fallback.air_stations(point, city).await,
        }
    }

    #[instrument(skip(self))]
    async fn recycling_points(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        city: &CityInfo,
    ) -> Result<Dataset<RecyclingInfo>> {
        let primary = self
            .primary
            .recycling_points(point, radius_meters, city)
            .await;
        match self.usable(primary, "recycling points") {
            Some(dataset) => Ok(dataset),
            None => {
                self.fallback
                    .recycling_points(point, radius_meters, city)
                    .await
            }
        }
    }
}
