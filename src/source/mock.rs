//! Fixed Madrid demo dataset for offline front-end work

use anyhow::Result;
use async_trait::async_trait;

use crate::geo::{Candidate, GeoPoint, Pollutants};
use crate::models::{CityInfo, RecyclingInfo, RecyclingKind, StationReading};
use crate::source::{DataSource, Dataset};

const SOURCE: &str = "mock";

// (name, kind, lat, lon, address)
const DEMO_POINTS: [(&str, RecyclingKind, f64, f64, &str); 5] = [
    (
        "Punto Limpio Centro",
        RecyclingKind::PuntoLimpio,
        40.4168,
        -3.7038,
        "Calle de la Princesa 1",
    ),
    (
        "Contenedor de Reciclaje",
        RecyclingKind::Contenedor,
        40.4155,
        -3.7074,
        "Plaza Mayor",
    ),
    (
        "Punto Limpio Retiro",
        RecyclingKind::PuntoLimpio,
        40.4190,
        -3.6789,
        "Calle de Alcalá 45",
    ),
    (
        "Papelera Selectiva",
        RecyclingKind::ContenedorPapel,
        40.4192,
        -3.7032,
        "Gran Vía 12",
    ),
    (
        "Contenedor Orgánico",
        RecyclingKind::ContenedorOrganico,
        40.4180,
        -3.7035,
        "Calle de Preciados 8",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

impl MockSource {
    #[must_use]
    pub fn demo_station() -> Candidate<StationReading> {
        let pollutants = Pollutants {
            no2: Some(45.0),
            pm10: Some(32.0),
            pm2_5: Some(18.0),
            o3: Some(65.0),
            ..Pollutants::default()
        };
        Candidate::new(
            GeoPoint {
                latitude: 40.4168,
                longitude: -3.7038,
            },
            StationReading::new(pollutants).with_locality("Centro"),
        )
        .with_name("Estación Centro (Demo)")
        .with_address("Puerta del Sol")
    }

    #[must_use]
    pub fn demo_points() -> Vec<Candidate<RecyclingInfo>> {
        DEMO_POINTS
            .iter()
            .map(|(name, kind, latitude, longitude, address)| {
                Candidate::new(
                    GeoPoint {
                        latitude: *latitude,
                        longitude: *longitude,
                    },
                    RecyclingInfo::new(*kind, SOURCE),
                )
                .with_name(*name)
                .with_address(*address)
            })
            .collect()
    }
}

#[async_trait]
impl DataSource for MockSource {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn locate(&self, _point: GeoPoint) -> Result<CityInfo> {
        Ok(CityInfo::madrid())
    }

    async fn air_stations(
        &self,
        _point: GeoPoint,
        _city: &CityInfo,
    ) -> Result<Dataset<StationReading>> {
        Ok(Dataset::new(SOURCE, vec![Self::demo_station()]))
    }

    async fn recycling_points(
        &self,
        _point: GeoPoint,
        _radius_meters: f64,
        _city: &CityInfo,
    ) -> Result<Dataset<RecyclingInfo>> {
        Ok(Dataset::new(SOURCE, Self::demo_points()))
    }
}
