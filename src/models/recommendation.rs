//! Rule-based recommendation models

use serde::{Deserialize, Serialize};

use crate::models::QueryLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Warning,
    Route,
    Info,
    Success,
    Recycling,
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A nearby station with noticeably cleaner air
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    pub distance: u64,
    pub improvement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub icon: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternatives: Vec<Alternative>,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationKind,
        priority: Priority,
        icon: &str,
        title: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            icon: icon.to_string(),
            title: title.to_string(),
            message: message.into(),
            actions: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_alternatives(mut self, alternatives: Vec<Alternative>) -> Self {
        self.alternatives = alternatives;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentAirQuality {
    pub no2: Option<f64>,
    pub pm10: Option<f64>,
    pub pm25: Option<f64>,
    pub station: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsReport {
    pub location: QueryLocation,
    pub current_air_quality: CurrentAirQuality,
    pub recommendations: Vec<Recommendation>,
    pub total_recommendations: usize,
    pub timestamp: String,
}
