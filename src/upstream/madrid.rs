//! datos.madrid.es open-data feeds

use anyhow::{Context, Result};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use tracing::instrument;

use crate::geo::Candidate;
use crate::models::{RecyclingInfo, StationReading};
use crate::upstream::normalize;

#[derive(Debug, Clone)]
pub struct MadridClient {
    client: ClientWithMiddleware,
    air_url: String,
    recycling_url: String,
}

impl MadridClient {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, air_url: &str, recycling_url: &str) -> Self {
        Self {
            client,
            air_url: air_url.to_string(),
            recycling_url: recycling_url.to_string(),
        }
    }

    /// Real-time air quality stations
    #[instrument(skip(self))]
    pub async fn air_stations(&self) -> Result<Vec<Candidate<StationReading>>> {
        let document = self
            .fetch(&self.air_url)
            .await
            .context("Failed to fetch Madrid air quality feed")?;
        let stations = normalize::air_stations(&document);
        tracing::debug!(count = stations.len(), "Parsed air quality stations");
        Ok(stations)
    }

    /// Official puntos limpios
    #[instrument(skip(self))]
    pub async fn clean_points(&self) -> Result<Vec<Candidate<RecyclingInfo>>> {
        let document = self
            .fetch(&self.recycling_url)
            .await
            .context("Failed to fetch Madrid puntos limpios feed")?;
        let points = normalize::clean_points(&document);
        tracing::debug!(count = points.len(), "Parsed puntos limpios");
        Ok(points)
    }

    async fn fetch(&self, url: &str) -> Result<Value> {
        tracing::debug!(%url, "Calling the API");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
