//! District statistics

use serde::{Deserialize, Serialize};

use crate::models::{AirQualitySummary, QueryLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStation {
    pub name: String,
    pub location: QueryLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStats {
    pub district: String,
    /// Absent when no station reports for the district
    pub avg_air_quality: Option<AirQualitySummary>,
    pub stations_count: usize,
    pub stations: Vec<ZoneStation>,
    /// Known estimate of recycling points, absent for unlisted districts
    pub recycling_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_update: String,
}
