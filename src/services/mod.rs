//! Request-level operations built on a [`DataSource`](crate::source::DataSource)

pub mod air_quality;
pub mod recommendations;
pub mod recycling;
pub mod zone_stats;

use chrono::Utc;
use chrono_tz::Europe::Madrid;

use crate::geo::GeoPoint;
use crate::models::CityInfo;
use crate::source::DataSource;

/// Current time in Madrid as RFC 3339
#[must_use]
pub fn madrid_now() -> String {
    Utc::now().with_timezone(&Madrid).to_rfc3339()
}

/// City for `point`, assuming Madrid when it cannot be resolved
pub async fn locate_city(source: &dyn DataSource, point: GeoPoint) -> CityInfo {
    match source.locate(point).await {
        Ok(city) => city,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "Could not resolve city, assuming Madrid");
            CityInfo::madrid()
        }
    }
}

/// Distance rounded to whole meters
#[must_use]
pub fn whole_meters(distance: f64) -> u64 {
    if distance.is_finite() && distance > 0.0 {
        // distances here never approach u64::MAX
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meters = distance.round() as u64;
        meters
    } else {
        0
    }
}
