//! Rule-based advice from the stations around a point

use tracing::instrument;

use crate::error::AmbientalError;
use crate::geo::{DistanceResult, GeoClassifier, GeoPoint, Pollutant, QualityLevel};
use crate::models::{
    Alternative, CurrentAirQuality, Priority, Recommendation, RecommendationKind,
    RecommendationsReport, StationReading,
};
use crate::services::{locate_city, madrid_now, whole_meters};
use crate::source::DataSource;

/// A station counts as cleaner below this share of the current readings
const CLEANER_RATIO: f64 = 0.7;
const MAX_ALTERNATIVES: usize = 3;
/// NO2 above this suggests leaving the car at home
const TRANSPORT_NO2: f64 = 80.0;

fn cleaner_areas(
    current: &DistanceResult<'_, StationReading>,
    nearby: &[DistanceResult<'_, StationReading>],
) -> Vec<Alternative> {
    let no2 = current.candidate.payload.pollutants.value_or_zero(Pollutant::No2);
    let pm10 = current.candidate.payload.pollutants.value_or_zero(Pollutant::Pm10);

    nearby
        .iter()
        .filter(|hit| {
            let p = &hit.candidate.payload.pollutants;
            p.value_or_zero(Pollutant::No2) < no2 * CLEANER_RATIO
                && p.value_or_zero(Pollutant::Pm10) < pm10 * CLEANER_RATIO
        })
        .take(MAX_ALTERNATIVES)
        .map(|hit| {
            let area_no2 = hit.candidate.payload.pollutants.value_or_zero(Pollutant::No2);
            let improvement = ((no2 - area_no2) / no2 * 100.0).round();
            Alternative {
                name: hit.candidate.name.clone().unwrap_or_default(),
                distance: whole_meters(hit.distance_meters),
                improvement: format!("{improvement}% menos NO2"),
            }
        })
        .collect()
}

/// Advice for a classified level, plus cleaner alternatives on bad air
fn air_advice(level: QualityLevel, alternatives: Vec<Alternative>) -> Vec<Recommendation> {
    let mut advice = Vec::new();

    if level.is_unhealthy() {
        advice.push(
            Recommendation::new(
                RecommendationKind::Warning,
                Priority::High,
                "⚠️",
                "Alta contaminación detectada",
                "Se recomienda evitar actividades al aire libre prolongadas.",
            )
            .with_actions(&[
                "Usar mascarilla si sales",
                "Cerrar ventanas",
                "Usar transporte público",
            ]),
        );
        if !alternatives.is_empty() {
            advice.push(
                Recommendation::new(
                    RecommendationKind::Route,
                    Priority::Medium,
                    "🗺️",
                    "Zonas con mejor calidad de aire cercanas",
                    format!(
                        "Encontramos {} zonas con mejor aire cerca de ti",
                        alternatives.len()
                    ),
                )
                .with_alternatives(alternatives),
            );
        }
    } else if level == QualityLevel::Moderate {
        advice.push(
            Recommendation::new(
                RecommendationKind::Info,
                Priority::Medium,
                "ℹ️",
                "Calidad del aire moderada",
                "Personas sensibles deberían considerar limitar actividades intensas al aire libre.",
            )
            .with_actions(&[
                "Reducir ejercicio intenso al aire libre",
                "Grupos sensibles: niños, ancianos, asmáticos",
            ]),
        );
    } else {
        advice.push(
            Recommendation::new(
                RecommendationKind::Success,
                Priority::Low,
                "✅",
                "Buena calidad del aire",
                "Perfecto para actividades al aire libre.",
            )
            .with_actions(&[
                "Ideal para hacer ejercicio",
                "Buen momento para pasear",
                "Ventilación recomendada",
            ]),
        );
    }

    advice
}

#[instrument(skip(source))]
pub async fn recommend(
    source: &dyn DataSource,
    point: GeoPoint,
    radius_meters: f64,
) -> Result<RecommendationsReport, AmbientalError> {
    point.validate()?;
    let city = locate_city(source, point).await;
    let dataset = source.air_stations(point, &city).await?;

    let nearby = GeoClassifier::within(point, &dataset.items, radius_meters)?;
    let current = nearby
        .first()
        .ok_or_else(|| AmbientalError::not_found("No data available for this location"))?;

    let pollutants = &current.candidate.payload.pollutants;
    let level = GeoClassifier::classify(pollutants);
    let alternatives = if level.is_unhealthy() {
        cleaner_areas(current, &nearby)
    } else {
        Vec::new()
    };

    let mut recommendations = air_advice(level, alternatives);
    recommendations.push(
        Recommendation::new(
            RecommendationKind::Recycling,
            Priority::Low,
            "♻️",
            "Recicla en tu zona",
            "Hay puntos de reciclaje cerca. Ayuda al medio ambiente.",
        )
        .with_actions(&[
            "Ver puntos de reciclaje cercanos",
            "Separar residuos correctamente",
        ]),
    );
    if pollutants.value_or_zero(Pollutant::No2) > TRANSPORT_NO2 {
        recommendations.push(
            Recommendation::new(
                RecommendationKind::Transport,
                Priority::Medium,
                "🚇",
                "Usa transporte público",
                "Reduce emisiones usando metro, autobús o bicicleta.",
            )
            .with_actions(&["Metro: líneas cercanas", "BiciMAD disponible", "Autobuses EMT"]),
        );
    }

    Ok(RecommendationsReport {
        location: point.into(),
        current_air_quality: CurrentAirQuality {
            no2: pollutants.no2,
            pm10: pollutants.pm10,
            pm25: pollutants.pm2_5,
            station: current.candidate.name.clone().unwrap_or_default(),
            level: level.label().to_string(),
        },
        total_recommendations: recommendations.len(),
        recommendations,
        timestamp: madrid_now(),
    })
}
