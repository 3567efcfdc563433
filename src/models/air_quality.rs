//! Air quality station readings and reports

use serde::{Deserialize, Serialize};

use crate::geo::{Pollutants, QualityLevel};
use crate::models::{CityInfo, QueryLocation};

/// Payload carried by every station candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub pollutants: Pollutants,
    /// District or town reported by the feed, if any
    pub locality: Option<String>,
}

impl StationReading {
    #[must_use]
    pub fn new(pollutants: Pollutants) -> Self {
        Self {
            pollutants,
            locality: None,
        }
    }

    #[must_use]
    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationInfo {
    pub name: String,
    pub address: Option<String>,
    /// Whole meters from the query point
    pub distance: u64,
}

/// Readings plus their classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySummary {
    #[serde(flatten)]
    pub pollutants: Pollutants,
    pub level: String,
    pub color: String,
    pub index: u8,
}

impl AirQualitySummary {
    #[must_use]
    pub fn new(pollutants: Pollutants, level: QualityLevel) -> Self {
        Self {
            pollutants,
            level: level.label().to_string(),
            color: level.color().to_string(),
            index: level.index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReport {
    pub location: QueryLocation,
    pub city: CityInfo,
    pub station: StationInfo,
    pub air_quality: AirQualitySummary,
    pub recommendation: String,
    /// RFC 3339, Europe/Madrid
    pub timestamp: String,
    /// Data source that answered
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_flat_with_nulls() {
        let pollutants = Pollutants {
            no2: Some(45.0),
            ..Pollutants::default()
        };
        let summary = AirQualitySummary::new(pollutants, QualityLevel::Good);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["NO2"], 45.0);
        assert!(json["PM10"].is_null());
        assert_eq!(json["level"], "Buena");
        assert_eq!(json["color"], "#ffff00");
        assert_eq!(json["index"], 2);
    }
}
