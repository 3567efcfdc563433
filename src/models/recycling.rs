//! Recycling point models

use serde::{Deserialize, Serialize};

use crate::models::QueryLocation;

/// Kind of recycling facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecyclingKind {
    PuntoLimpio,
    ContenedorVidrio,
    ContenedorPapel,
    ContenedorPlastico,
    ContenedorOrganico,
    Contenedor,
}

impl RecyclingKind {
    /// Default description shown when the feed has none
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            RecyclingKind::PuntoLimpio => {
                "Punto limpio - Acepta residuos voluminosos, electrónicos y peligrosos"
            }
            RecyclingKind::ContenedorVidrio => "Contenedor de vidrio",
            RecyclingKind::ContenedorPapel => "Contenedor de papel y cartón",
            RecyclingKind::ContenedorPlastico => "Contenedor de envases y plásticos",
            RecyclingKind::ContenedorOrganico => "Contenedor de residuos orgánicos",
            RecyclingKind::Contenedor => "Punto de reciclaje",
        }
    }

    /// Display name used when the feed does not name the point
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            RecyclingKind::PuntoLimpio => "Punto Limpio",
            RecyclingKind::ContenedorVidrio => "Contenedor de Vidrio",
            RecyclingKind::ContenedorPapel => "Contenedor de Papel",
            RecyclingKind::ContenedorPlastico => "Contenedor de Plástico",
            RecyclingKind::ContenedorOrganico => "Contenedor Orgánico",
            RecyclingKind::Contenedor => "Contenedor de Reciclaje",
        }
    }
}

pub const UNKNOWN_SCHEDULE: &str = "Horario no especificado";

/// Payload carried by every recycling candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecyclingInfo {
    pub kind: RecyclingKind,
    pub description: String,
    pub schedule: String,
    pub phone: Option<String>,
    /// Where the record came from, e.g. `osm` or `madrid`
    pub origin: String,
}

impl RecyclingInfo {
    #[must_use]
    pub fn new(kind: RecyclingKind, origin: impl Into<String>) -> Self {
        Self {
            kind,
            description: kind.description().to_string(),
            schedule: UNKNOWN_SCHEDULE.to_string(),
            phone: None,
            origin: origin.into(),
        }
    }
}

/// A recycling point as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecyclingPoint {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecyclingKind,
    pub address: Option<String>,
    pub description: String,
    pub schedule: String,
    pub phone: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Whole meters from the query point
    pub distance: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecyclingReport {
    pub location: QueryLocation,
    pub radius: f64,
    pub count: usize,
    pub points: Vec<RecyclingPoint>,
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(RecyclingKind::ContenedorVidrio).unwrap();
        assert_eq!(json, "contenedor_vidrio");
        let json = serde_json::to_value(RecyclingKind::PuntoLimpio).unwrap();
        assert_eq!(json, "punto_limpio");
    }

    #[test]
    fn test_info_defaults() {
        let info = RecyclingInfo::new(RecyclingKind::Contenedor, "osm");
        assert_eq!(info.description, "Punto de reciclaje");
        assert_eq!(info.schedule, UNKNOWN_SCHEDULE);
        assert!(info.phone.is_none());
    }
}
