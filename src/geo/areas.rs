//! Madrid districts, neighbourhoods and metropolitan towns
//!
//! Each area is a center point and a radius. A query point resolves to the
//! closest area whose radius contains it.

use serde::Serialize;

use crate::error::AmbientalError;
use crate::geo::{Candidate, GeoClassifier, GeoPoint};

/// The 21 administrative districts of the city of Madrid
pub const DISTRICTS: [&str; 21] = [
    "Centro",
    "Arganzuela",
    "Retiro",
    "Salamanca",
    "Chamartín",
    "Tetuán",
    "Chamberí",
    "Fuencarral-El Pardo",
    "Moncloa-Aravaca",
    "Latina",
    "Carabanchel",
    "Usera",
    "Puente de Vallecas",
    "Moratalaz",
    "Ciudad Lineal",
    "Hortaleza",
    "Villaverde",
    "Villa de Vallecas",
    "Vicálvaro",
    "San Blas-Canillejas",
    "Barajas",
];

/// Whether `name` is one of the city's districts
#[must_use]
pub fn is_district(name: &str) -> bool {
    DISTRICTS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MadridArea {
    pub name: &'static str,
    pub radius_km: f64,
}

// (name, lat, lon, radius km)
const AREAS: [(&str, f64, f64, f64); 35] = [
    ("Centro", 40.4168, -3.7038, 2.0),
    ("Sol", 40.4168, -3.7038, 0.5),
    ("Malasaña", 40.4290, -3.7020, 0.5),
    ("Chueca", 40.4250, -3.6960, 0.5),
    ("Chamartín", 40.4620, -3.6760, 2.0),
    ("Tetuán", 40.4600, -3.7000, 2.0),
    ("Fuencarral-El Pardo", 40.4900, -3.7200, 3.0),
    ("Moncloa-Aravaca", 40.4400, -3.7200, 2.0),
    ("Salamanca", 40.4300, -3.6800, 2.0),
    ("Retiro", 40.4150, -3.6800, 2.0),
    ("Moratalaz", 40.4000, -3.6500, 2.0),
    ("Vicálvaro", 40.4000, -3.6000, 2.0),
    ("Villa de Vallecas", 40.3700, -3.6200, 2.0),
    ("Villaverde", 40.3500, -3.7000, 2.0),
    ("Usera", 40.3900, -3.7100, 2.0),
    ("Carabanchel", 40.3800, -3.7400, 2.0),
    ("Latina", 40.3900, -3.7500, 2.0),
    ("Arganzuela", 40.4000, -3.7000, 2.0),
    ("Puente de Vallecas", 40.3900, -3.6500, 2.0),
    ("Chamberí", 40.4385, -3.7040, 1.0),
    ("Ciudad Lineal", 40.4480, -3.6500, 2.0),
    ("Hortaleza", 40.4720, -3.6410, 2.5),
    ("San Blas-Canillejas", 40.4330, -3.6080, 2.5),
    ("Barajas", 40.4740, -3.5790, 3.0),
    ("Pozuelo de Alarcón", 40.4330, -3.8130, 3.0),
    ("Las Rozas", 40.4920, -3.8740, 3.0),
    ("Majadahonda", 40.4730, -3.8720, 3.0),
    ("Boadilla del Monte", 40.4050, -3.8770, 3.0),
    ("Alcobendas", 40.5470, -3.6420, 3.0),
    ("San Sebastián de los Reyes", 40.5450, -3.6250, 3.0),
    ("Getafe", 40.3050, -3.7300, 3.0),
    ("Leganés", 40.3270, -3.7630, 3.0),
    ("Móstoles", 40.3230, -3.8650, 3.0),
    ("Fuenlabrada", 40.2830, -3.7940, 3.0),
    ("Alcorcón", 40.3490, -3.8290, 3.0),
];

/// All known areas as classifier candidates
#[must_use]
pub fn area_candidates() -> Vec<Candidate<MadridArea>> {
    AREAS
        .iter()
        .map(|(name, latitude, longitude, radius_km)| {
            Candidate::new(
                GeoPoint {
                    latitude: *latitude,
                    longitude: *longitude,
                },
                MadridArea {
                    name,
                    radius_km: *radius_km,
                },
            )
            .with_name(*name)
        })
        .collect()
}

/// Closest area whose radius covers `point`, if any
pub fn locate_area(point: GeoPoint) -> Result<Option<MadridArea>, AmbientalError> {
    let candidates = area_candidates();
    let max_radius_m = AREAS
        .iter()
        .map(|(_, _, _, radius)| radius * 1000.0)
        .fold(0.0, f64::max);

    let area = GeoClassifier::within(point, &candidates, max_radius_m)?
        .into_iter()
        .find(|hit| hit.distance_meters <= hit.candidate.payload.radius_km * 1000.0)
        .map(|hit| hit.candidate.payload);

    Ok(area)
}

/// Area name for display, falling back to a broad region of the metro area
pub fn describe_area(point: GeoPoint) -> Result<String, AmbientalError> {
    if let Some(area) = locate_area(point)? {
        return Ok(area.name.to_string());
    }

    let region = if point.latitude > 40.45 {
        "Área Norte"
    } else if point.latitude < 40.35 {
        "Área Sur"
    } else if point.longitude > -3.65 {
        "Área Este"
    } else if point.longitude < -3.75 {
        "Área Oeste"
    } else {
        "Área Metropolitana"
    };
    Ok(region.to_string())
}

/// Closest district of the city proper, if `point` falls inside one.
///
/// Neighbourhoods and metropolitan towns are skipped so the result can be
/// used as a zone-stats key.
pub fn locate_district(point: GeoPoint) -> Result<Option<&'static str>, AmbientalError> {
    let candidates: Vec<_> = area_candidates()
        .into_iter()
        .filter(|c| is_district(c.payload.name))
        .collect();

    let district = GeoClassifier::within(point, &candidates, 3000.0)?
        .into_iter()
        .find(|hit| hit.distance_meters <= hit.candidate.payload.radius_km * 1000.0)
        .map(|hit| hit.candidate.payload.name);

    Ok(district)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_shared_center_resolves_to_first_listed() {
        let area = locate_area(GeoPoint::new(40.4168, -3.7038).unwrap())
            .unwrap()
            .unwrap();
        // Centro and Sol share a center; the first one listed wins the tie.
        assert_eq!(area.name, "Centro");
    }

    #[test]
    fn test_locate_metropolitan_town() {
        let area = locate_area(GeoPoint::new(40.3060, -3.7310).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(area.name, "Getafe");
    }

    #[test]
    fn test_point_outside_every_area() {
        let toledo = GeoPoint::new(39.8628, -4.0273).unwrap();
        assert!(locate_area(toledo).unwrap().is_none());
        assert!(locate_district(toledo).unwrap().is_none());
    }

    #[test]
    fn test_locate_district_skips_neighbourhoods() {
        let malasana = GeoPoint::new(40.4290, -3.7020).unwrap();
        let district = locate_district(malasana).unwrap().unwrap();
        assert!(is_district(district));
        assert_eq!(district, "Centro");
    }

    #[rstest]
    #[case(40.4345, -3.7036, "Chamberí")]
    #[case(40.4720, -3.6410, "Hortaleza")]
    #[case(40.4480, -3.6500, "Ciudad Lineal")]
    #[case(40.4330, -3.6080, "San Blas-Canillejas")]
    #[case(40.4740, -3.5790, "Barajas")]
    #[case(40.4150, -3.6800, "Retiro")]
    fn test_locate_district_by_landmark(
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] expected: &str,
    ) {
        let point = GeoPoint::new(latitude, longitude).unwrap();
        assert_eq!(locate_district(point).unwrap(), Some(expected));
    }

    #[test]
    fn test_every_district_has_an_area() {
        let names: Vec<_> = area_candidates()
            .into_iter()
            .map(|c| c.payload.name)
            .collect();
        for district in DISTRICTS {
            assert!(names.contains(&district), "{district} has no area");
        }
    }

    #[test]
    fn test_describe_area_falls_back_to_region() {
        let getafe = GeoPoint::new(40.3060, -3.7310).unwrap();
        assert_eq!(describe_area(getafe).unwrap(), "Getafe");

        let north = GeoPoint::new(40.70, -3.70).unwrap();
        assert_eq!(describe_area(north).unwrap(), "Área Norte");

        let south = GeoPoint::new(40.10, -3.70).unwrap();
        assert_eq!(describe_area(south).unwrap(), "Área Sur");
    }

    #[test]
    fn test_district_list() {
        assert_eq!(DISTRICTS.len(), 21);
        assert!(is_district("Chamberí"));
        assert!(!is_district("Getafe"));
    }

    #[test]
    fn test_invalid_point_is_rejected() {
        let bad = GeoPoint {
            latitude: 100.0,
            longitude: 0.0,
        };
        assert!(locate_area(bad).is_err());
    }
}
