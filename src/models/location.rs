//! Location models for query points and reverse-geocoded places

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Query coordinates echoed back in responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryLocation {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for QueryLocation {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.latitude,
            lon: point.longitude,
        }
    }
}

/// City a query point belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityInfo {
    pub city: String,
    pub province: String,
    pub country: String,
}

impl CityInfo {
    /// Used whenever reverse geocoding is unavailable
    #[must_use]
    pub fn madrid() -> Self {
        Self {
            city: "Madrid".to_string(),
            province: "Madrid".to_string(),
            country: "España".to_string(),
        }
    }

    /// Whether the Madrid open-data feeds cover this city
    #[must_use]
    pub fn is_madrid(&self) -> bool {
        self.city.eq_ignore_ascii_case("madrid")
    }

    /// Big cities get the urban profile in estimated readings
    #[must_use]
    pub fn is_big_city(&self) -> bool {
        const BIG_CITIES: [&str; 5] = ["Madrid", "Barcelona", "Valencia", "Sevilla", "Málaga"];
        BIG_CITIES.iter().any(|c| self.city.eq_ignore_ascii_case(c))
    }
}

impl Default for CityInfo {
    fn default() -> Self {
        Self::madrid()
    }
}
