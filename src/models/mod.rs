//! Data models for the `ambiental` service
//!
//! This module contains the domain models organized by concern:
//! - Location: reverse-geocoded city information
//! - Air quality: station readings and the per-location report
//! - Recycling: typed recycling points
//! - Recommendation and zone: derived advice and district statistics

pub mod air_quality;
pub mod location;
pub mod recommendation;
pub mod recycling;
pub mod zone;

// Re-export all public types for convenient access
pub use air_quality::{AirQualityReport, AirQualitySummary, StationInfo, StationReading};
pub use location::{CityInfo, QueryLocation};
pub use recommendation::{
    Alternative, CurrentAirQuality, Priority, Recommendation, RecommendationKind,
    RecommendationsReport,
};
pub use recycling::{RecyclingInfo, RecyclingKind, RecyclingPoint, RecyclingReport};
pub use zone::{ZoneStation, ZoneStats};
