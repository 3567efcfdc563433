//! OpenStreetMap recycling nodes via the Overpass API

use anyhow::{Context, Result};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use tracing::instrument;

use crate::geo::{Candidate, GeoPoint};
use crate::models::RecyclingInfo;
use crate::upstream::normalize;

#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: ClientWithMiddleware,
    url: String,
}

/// Overpass QL for recycling and waste disposal nodes around a point
#[must_use]
pub fn recycling_query(point: GeoPoint, radius_meters: f64) -> String {
    let around = format!(
        "around:{:.0},{},{}",
        radius_meters, point.latitude, point.longitude
    );
    format!(
        "[out:json][timeout:15];(node[\"amenity\"=\"recycling\"]({around});node[\"amenity\"=\"waste_disposal\"]({around}););out body;"
    )
}

impl OverpassClient {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    #[instrument(skip(self))]
    pub async fn recycling_points(
        &self,
        point: GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<Candidate<RecyclingInfo>>> {
        tracing::debug!("Calling the API");
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(recycling_query(point, radius_meters))
            .send()
            .await
            .context("Overpass request failed")?
            .error_for_status()
            .context("Overpass returned an error status")?;

        let document: Value = response
            .json()
            .await
            .context("Overpass returned invalid JSON")?;
        let points = normalize::osm_points(&document);
        tracing::debug!(count = points.len(), "Parsed OSM recycling nodes");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mentions_both_amenities() {
        let query = recycling_query(
            GeoPoint {
                latitude: 40.4168,
                longitude: -3.7038,
            },
            2000.0,
        );
        assert!(query.starts_with("[out:json][timeout:15];"));
        assert!(query.contains("node[\"amenity\"=\"recycling\"](around:2000,40.4168,-3.7038)"));
        assert!(query.contains("node[\"amenity\"=\"waste_disposal\"](around:2000,40.4168,-3.7038)"));
        assert!(query.ends_with("out body;"));
    }
}
