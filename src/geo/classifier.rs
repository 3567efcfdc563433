//! Nearest-candidate search over geolocated records
//!
//! Distances use the haversine great-circle formula on a spherical Earth
//! (R = 6 371 km). That is accurate enough within a metropolitan area; the
//! formula degrades near antipodal points, which never occur here.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::AmbientalError;
use crate::geo::quality::{Pollutants, QualityLevel};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees, valid within [-90, 90]
    pub latitude: f64,
    /// Longitude in decimal degrees, valid within [-180, 180]
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting coordinates outside the valid range
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AmbientalError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Whether both coordinates are finite and within range
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<(), AmbientalError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AmbientalError::invalid_coordinate(
                self.latitude,
                self.longitude,
            ))
        }
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }
}

impl From<GeoPoint> for haversine::Location {
    fn from(point: GeoPoint) -> Self {
        haversine::Location {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Any geolocated record considered in a nearest-match query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<T> {
    pub point: GeoPoint,
    pub name: Option<String>,
    pub address: Option<String>,
    pub payload: T,
}

impl<T> Candidate<T> {
    #[must_use]
    pub fn new(point: GeoPoint, payload: T) -> Self {
        Self {
            point,
            name: None,
            address: None,
            payload,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// A candidate paired with its distance to the query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceResult<'a, T> {
    pub candidate: &'a Candidate<T>,
    pub distance_meters: f64,
}

/// Geographic lookup and quality classification
pub struct GeoClassifier;

impl GeoClassifier {
    /// Great-circle distance between two points in meters
    pub fn distance(a: GeoPoint, b: GeoPoint) -> Result<f64, AmbientalError> {
        a.validate()?;
        b.validate()?;
        Ok(Self::distance_unchecked(a, b))
    }

    fn distance_unchecked(a: GeoPoint, b: GeoPoint) -> f64 {
        // fixed argument order keeps the float result exactly symmetric
        let (first, second) = match a
            .latitude
            .total_cmp(&b.latitude)
            .then_with(|| a.longitude.total_cmp(&b.longitude))
        {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        haversine::distance(first.into(), second.into(), haversine::Units::Kilometers) * 1000.0
    }

    /// Closest candidate to `query`, first one wins on ties.
    ///
    /// Candidates whose coordinates are out of range are skipped. Returns
    /// `Ok(None)` when no candidate is usable.
    pub fn nearest<'a, T>(
        query: GeoPoint,
        candidates: &'a [Candidate<T>],
    ) -> Result<Option<DistanceResult<'a, T>>, AmbientalError> {
        query.validate()?;

        let mut closest: Option<DistanceResult<'a, T>> = None;
        for candidate in candidates.iter().filter(|c| c.point.is_valid()) {
            let distance_meters = Self::distance_unchecked(query, candidate.point);
            match &closest {
                Some(best) if best.distance_meters <= distance_meters => {}
                _ => {
                    closest = Some(DistanceResult {
                        candidate,
                        distance_meters,
                    });
                }
            }
        }

        Ok(closest)
    }

    /// All candidates within `radius_meters` of `query`, closest first.
    ///
    /// The sort is stable so equal distances keep their input order. A
    /// negative or NaN radius yields nothing; a zero radius only keeps
    /// candidates sitting exactly on the query point.
    pub fn within<'a, T>(
        query: GeoPoint,
        candidates: &'a [Candidate<T>],
        radius_meters: f64,
    ) -> Result<Vec<DistanceResult<'a, T>>, AmbientalError> {
        query.validate()?;

        if radius_meters.is_nan() || radius_meters < 0.0 {
            return Ok(Vec::new());
        }

        let mut results: Vec<DistanceResult<'a, T>> = candidates
            .iter()
            .filter(|c| c.point.is_valid())
            .map(|candidate| DistanceResult {
                candidate,
                distance_meters: Self::distance_unchecked(query, candidate.point),
            })
            .filter(|result| result.distance_meters <= radius_meters)
            .collect();

        results.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        Ok(results)
    }

    /// Overall quality level of a set of readings
    #[must_use]
    pub fn classify(pollutants: &Pollutants) -> QualityLevel {
        pollutants.quality_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MADRID_CENTER: GeoPoint = GeoPoint {
        latitude: 40.4168,
        longitude: -3.7038,
    };

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    fn candidate(name: &str, latitude: f64, longitude: f64) -> Candidate<&'static str> {
        Candidate::new(point(latitude, longitude), "payload").with_name(name)
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let d = GeoClassifier::distance(MADRID_CENTER, MADRID_CENTER).unwrap();
        assert_eq!(d, 0.0);

        let pole = point(90.0, 180.0);
        assert_eq!(GeoClassifier::distance(pole, pole).unwrap(), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (MADRID_CENTER, point(40.4268, -3.7038)),
            (point(40.3800, -3.7400), point(40.5470, -3.6420)),
            (point(-33.8688, 151.2093), point(51.5074, -0.1278)),
        ];

        for (a, b) in pairs {
            let ab = GeoClassifier::distance(a, b).unwrap();
            let ba = GeoClassifier::distance(b, a).unwrap();
            assert_eq!(ab, ba);
        }
    }

    #[test]
    fn test_distance_is_exactly_symmetric_across_madrid() {
        let mut mismatches = 0;
        for i in 0..40 {
            for j in 0..40 {
                let a = point(40.30 + f64::from(i) * 0.0043, -3.80 + f64::from(j) * 0.0051);
                let b = point(40.52 - f64::from(j) * 0.0037, -3.55 - f64::from(i) * 0.0061);
                if GeoClassifier::distance(a, b).unwrap() != GeoClassifier::distance(b, a).unwrap() {
                    mismatches += 1;
                }
            }
        }
        assert_eq!(mismatches, 0);

        let a = point(40.3, -3.7645);
        let b = point(40.3645, -3.6);
        assert_eq!(
            GeoClassifier::distance(a, b).unwrap(),
            GeoClassifier::distance(b, a).unwrap()
        );
    }

    #[test]
    fn test_distance_one_hundredth_degree_north() {
        let north = point(40.4268, -3.7038);
        let d = GeoClassifier::distance(MADRID_CENTER, north).unwrap();
        assert!((d - 1112.0).abs() < 11.12, "got {d}");
    }

    #[test]
    fn test_distance_grows_with_separation() {
        let near = GeoClassifier::distance(MADRID_CENTER, point(40.42, -3.70)).unwrap();
        let mid = GeoClassifier::distance(MADRID_CENTER, point(40.45, -3.70)).unwrap();
        let far = GeoClassifier::distance(MADRID_CENTER, point(40.55, -3.70)).unwrap();
        assert!(near < mid && mid < far);
    }

    #[test]
    fn test_distance_rejects_invalid_coordinates() {
        let err = GeoClassifier::distance(point(91.0, 0.0), MADRID_CENTER).unwrap_err();
        assert!(matches!(err, AmbientalError::InvalidCoordinate { .. }));

        let err = GeoClassifier::distance(MADRID_CENTER, point(0.0, -180.5)).unwrap_err();
        assert!(matches!(err, AmbientalError::InvalidCoordinate { .. }));

        let err = GeoClassifier::distance(point(f64::NAN, 0.0), MADRID_CENTER).unwrap_err();
        assert!(matches!(err, AmbientalError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_geopoint_new_validates() {
        assert!(GeoPoint::new(40.4168, -3.7038).is_ok());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
        assert!(GeoPoint::new(90.1, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_nearest_empty_is_none() {
        let candidates: Vec<Candidate<()>> = Vec::new();
        let result = GeoClassifier::nearest(MADRID_CENTER, &candidates).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_nearest_single_candidate() {
        let candidates = vec![candidate("Plaza Mayor", 40.4155, -3.7074)];
        let result = GeoClassifier::nearest(MADRID_CENTER, &candidates)
            .unwrap()
            .unwrap();

        let expected = GeoClassifier::distance(MADRID_CENTER, candidates[0].point).unwrap();
        assert_eq!(result.candidate.name.as_deref(), Some("Plaza Mayor"));
        assert_eq!(result.distance_meters, expected);
    }

    #[test]
    fn test_nearest_picks_closest() {
        let candidates = vec![
            candidate("Retiro", 40.4190, -3.6789),
            candidate("Gran Via", 40.4192, -3.7032),
            candidate("Getafe", 40.3050, -3.7300),
        ];
        let result = GeoClassifier::nearest(MADRID_CENTER, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(result.candidate.name.as_deref(), Some("Gran Via"));
    }

    #[test]
    fn test_nearest_first_wins_ties() {
        let candidates = vec![
            candidate("first", 40.4268, -3.7038),
            candidate("second", 40.4268, -3.7038),
        ];
        let result = GeoClassifier::nearest(MADRID_CENTER, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(result.candidate.name.as_deref(), Some("first"));
    }

    #[test]
    fn test_nearest_skips_invalid_candidates() {
        let candidates = vec![candidate("broken", 123.0, -3.7), candidate("nan", f64::NAN, 0.0)];
        assert!(
            GeoClassifier::nearest(MADRID_CENTER, &candidates)
                .unwrap()
                .is_none()
        );

        let candidates = vec![
            candidate("broken", 123.0, -3.7),
            candidate("ok", 40.42, -3.70),
        ];
        let result = GeoClassifier::nearest(MADRID_CENTER, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(result.candidate.name.as_deref(), Some("ok"));
    }

    #[test]
    fn test_nearest_rejects_invalid_query() {
        let candidates = vec![candidate("ok", 40.42, -3.70)];
        let err = GeoClassifier::nearest(point(0.0, 190.0), &candidates).unwrap_err();
        assert!(matches!(err, AmbientalError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_within_filters_and_sorts() {
        let candidates = vec![
            candidate("far", 40.4500, -3.7038),
            candidate("near", 40.4178, -3.7038),
            candidate("outside", 40.5500, -3.7038),
            candidate("mid", 40.4268, -3.7038),
        ];

        let results = GeoClassifier::within(MADRID_CENTER, &candidates, 5000.0).unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.candidate.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["near", "mid", "far"]);
        assert!(results.iter().all(|r| r.distance_meters <= 5000.0));
        assert!(
            results
                .windows(2)
                .all(|w| w[0].distance_meters <= w[1].distance_meters)
        );
    }

    #[test]
    fn test_within_is_stable_for_equal_distances() {
        let candidates = vec![
            candidate("b", 40.4268, -3.7038),
            candidate("a", 40.4268, -3.7038),
            candidate("c", 40.4178, -3.7038),
        ];
        let results = GeoClassifier::within(MADRID_CENTER, &candidates, 2000.0).unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.candidate.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_within_zero_radius_keeps_only_coincident() {
        let candidates = vec![
            candidate("elsewhere", 40.4178, -3.7038),
            candidate("here", MADRID_CENTER.latitude, MADRID_CENTER.longitude),
        ];
        let results = GeoClassifier::within(MADRID_CENTER, &candidates, 0.0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].candidate.name.as_deref(), Some("here"));

        let candidates = vec![candidate("elsewhere", 40.4178, -3.7038)];
        assert!(
            GeoClassifier::within(MADRID_CENTER, &candidates, 0.0)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_within_negative_radius_is_empty() {
        let candidates = vec![candidate("here", MADRID_CENTER.latitude, MADRID_CENTER.longitude)];
        assert!(
            GeoClassifier::within(MADRID_CENTER, &candidates, -1.0)
                .unwrap()
                .is_empty()
        );
        assert!(
            GeoClassifier::within(MADRID_CENTER, &candidates, f64::NAN)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_rounded_coordinates() {
        let p = point(40.416_834, -3.703_791);
        assert_eq!(p.rounded(2), (40.42, -3.70));
    }
}
