//! `ambiental` - Environmental open data for Madrid
//!
//! This library provides nearest-station lookup over geolocated open data,
//! air quality classification, recycling point search and the HTTP API that
//! serves them.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod services;
pub mod source;
pub mod telemetry;
pub mod upstream;
pub mod web;

// Re-export core types for public API
pub use cache::BoundedCache;
pub use config::AmbientalConfig;
pub use error::AmbientalError;
pub use geo::{Candidate, DistanceResult, GeoClassifier, GeoPoint, Pollutants, QualityLevel};
pub use models::{AirQualityReport, CityInfo, RecyclingPoint};
pub use source::{DataSource, Dataset};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AmbientalError>;
