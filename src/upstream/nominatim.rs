//! Reverse geocoding with Nominatim

use anyhow::{Context, Result};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::instrument;

use crate::geo::GeoPoint;
use crate::models::CityInfo;

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    province: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    address: Address,
}

impl From<Address> for CityInfo {
    fn from(address: Address) -> Self {
        Self {
            city: address
                .city
                .or(address.town)
                .or(address.village)
                .or(address.municipality)
                .unwrap_or_else(|| "Ubicación desconocida".to_string()),
            province: address.state.or(address.province).unwrap_or_default(),
            country: address.country.unwrap_or_else(|| "España".to_string()),
        }
    }
}

impl NominatimClient {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// City, province and country for a point
    #[instrument(skip(self))]
    pub async fn reverse(&self, point: GeoPoint) -> Result<CityInfo> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url,
            urlencoding::encode(&point.latitude.to_string()),
            urlencoding::encode(&point.longitude.to_string()),
        );
        tracing::debug!("Calling the API");

        let response: ApiResponse = self
            .client
            .get(url)
            .send()
            .await
            .context("Nominatim request failed")?
            .error_for_status()
            .context("Nominatim returned an error status")?
            .json()
            .await
            .context("Nominatim returned an unexpected payload")?;

        Ok(response.address.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_falls_through_to_town() {
        let address = Address {
            town: Some("Alcobendas".to_string()),
            state: Some("Comunidad de Madrid".to_string()),
            ..Address::default()
        };
        let city: CityInfo = address.into();
        assert_eq!(city.city, "Alcobendas");
        assert_eq!(city.province, "Comunidad de Madrid");
        assert_eq!(city.country, "España");
    }

    #[test]
    fn test_empty_address_defaults() {
        let city: CityInfo = Address::default().into();
        assert_eq!(city.city, "Ubicación desconocida");
        assert_eq!(city.province, "");
    }
}
