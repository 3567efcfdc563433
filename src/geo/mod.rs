pub mod areas;
pub mod classifier;
pub mod quality;

pub use areas::{DISTRICTS, MadridArea, describe_area, is_district, locate_area, locate_district};
pub use classifier::{Candidate, DistanceResult, GeoClassifier, GeoPoint};
pub use quality::{Pollutant, Pollutants, QualityLevel};
