//! Air quality classification
//!
//! A single five-level scheme is applied everywhere. Every pollutant is
//! checked against its own breakpoints and the worst level wins. A missing
//! reading counts as zero; callers that must tell "no data" apart from a
//! clean reading check [`Pollutants::is_empty`] before classifying.

use serde::{Deserialize, Serialize};

/// Ordered air quality level, from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLevel {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl QualityLevel {
    pub const ALL: [QualityLevel; 5] = [
        QualityLevel::Excellent,
        QualityLevel::Good,
        QualityLevel::Moderate,
        QualityLevel::Poor,
        QualityLevel::VeryPoor,
    ];

    /// Display label shown to Madrid users
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QualityLevel::Excellent => "Excelente",
            QualityLevel::Good => "Buena",
            QualityLevel::Moderate => "Moderada",
            QualityLevel::Poor => "Mala",
            QualityLevel::VeryPoor => "Muy Mala",
        }
    }

    /// Display color as a hex string
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            QualityLevel::Excellent => "#00e400",
            QualityLevel::Good => "#ffff00",
            QualityLevel::Moderate => "#ff7e00",
            QualityLevel::Poor => "#ff0000",
            QualityLevel::VeryPoor => "#99004c",
        }
    }

    /// 1-based index, 1 is the cleanest
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            QualityLevel::Excellent => 1,
            QualityLevel::Good => 2,
            QualityLevel::Moderate => 3,
            QualityLevel::Poor => 4,
            QualityLevel::VeryPoor => 5,
        }
    }

    /// Fixed advisory text for this level
    #[must_use]
    pub fn recommendation(self) -> &'static str {
        match self {
            QualityLevel::Excellent => {
                "Calidad del aire excelente. Ideal para actividades al aire libre."
            }
            QualityLevel::Good => {
                "Calidad del aire buena. Puedes realizar actividades al aire libre sin restricciones."
            }
            QualityLevel::Moderate => {
                "Calidad del aire moderada. Personas sensibles deberían limitar actividades intensas al aire libre."
            }
            QualityLevel::Poor => {
                "Calidad del aire mala. Se recomienda reducir actividades al aire libre, especialmente para grupos sensibles."
            }
            QualityLevel::VeryPoor => {
                "Calidad del aire muy mala. Evita actividades al aire libre. Mantén ventanas cerradas."
            }
        }
    }

    /// Whether outdoor activity should be discouraged
    #[must_use]
    pub fn is_unhealthy(self) -> bool {
        self >= QualityLevel::Poor
    }
}

/// Pollutant the breakpoint table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pollutant {
    No2,
    Pm10,
    Pm2_5,
    O3,
    So2,
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::No2,
        Pollutant::Pm10,
        Pollutant::Pm2_5,
        Pollutant::O3,
        Pollutant::So2,
        Pollutant::Co,
    ];

    /// Inclusive upper bounds for Excellent, Good, Moderate and Poor.
    /// Anything above the last bound is `VeryPoor`.
    #[must_use]
    pub fn breakpoints(self) -> [f64; 4] {
        match self {
            Pollutant::No2 => [40.0, 100.0, 200.0, 400.0],
            Pollutant::Pm10 => [20.0, 50.0, 100.0, 150.0],
            Pollutant::Pm2_5 => [10.0, 35.0, 55.0, 75.0],
            Pollutant::O3 => [50.0, 100.0, 130.0, 240.0],
            Pollutant::So2 => [100.0, 200.0, 350.0, 500.0],
            // mg/m³
            Pollutant::Co => [2.0, 5.0, 10.0, 15.0],
        }
    }

    /// Level triggered by a single reading
    #[must_use]
    pub fn level_for(self, value: f64) -> QualityLevel {
        let value = if value.is_nan() { 0.0 } else { value };
        self.breakpoints()
            .iter()
            .position(|bound| value <= *bound)
            .map_or(QualityLevel::VeryPoor, |i| QualityLevel::ALL[i])
    }
}

/// Pollutant readings from one station, any of which may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pollutants {
    #[serde(rename = "NO2")]
    pub no2: Option<f64>,
    #[serde(rename = "PM10")]
    pub pm10: Option<f64>,
    #[serde(rename = "PM2_5")]
    pub pm2_5: Option<f64>,
    #[serde(rename = "O3")]
    pub o3: Option<f64>,
    #[serde(rename = "SO2")]
    pub so2: Option<f64>,
    #[serde(rename = "CO")]
    pub co: Option<f64>,
}

impl Pollutants {
    #[must_use]
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::No2 => self.no2,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Pm2_5 => self.pm2_5,
            Pollutant::O3 => self.o3,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
        }
    }

    pub fn set(&mut self, pollutant: Pollutant, value: Option<f64>) {
        match pollutant {
            Pollutant::No2 => self.no2 = value,
            Pollutant::Pm10 => self.pm10 = value,
            Pollutant::Pm2_5 => self.pm2_5 = value,
            Pollutant::O3 => self.o3 = value,
            Pollutant::So2 => self.so2 = value,
            Pollutant::Co => self.co = value,
        }
    }

    /// Reading with missing values taken as zero
    #[must_use]
    pub fn value_or_zero(&self, pollutant: Pollutant) -> f64 {
        self.get(pollutant).filter(|v| !v.is_nan()).unwrap_or(0.0)
    }

    /// True when no pollutant was reported at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Pollutant::ALL.iter().all(|p| self.get(*p).is_none())
    }

    /// Worst level triggered by any single pollutant
    #[must_use]
    pub fn quality_level(&self) -> QualityLevel {
        Pollutant::ALL
            .iter()
            .map(|p| p.level_for(self.value_or_zero(*p)))
            .max()
            .unwrap_or(QualityLevel::Excellent)
    }

    /// Mean of each pollutant over the readings that report it
    #[must_use]
    pub fn average<'a>(readings: impl IntoIterator<Item = &'a Pollutants>) -> Pollutants {
        let mut sums = [0.0_f64; 6];
        let mut counts = [0_u32; 6];

        for reading in readings {
            for (i, pollutant) in Pollutant::ALL.iter().enumerate() {
                if let Some(value) = reading.get(*pollutant).filter(|v| !v.is_nan()) {
                    sums[i] += value;
                    counts[i] += 1;
                }
            }
        }

        let mut average = Pollutants::default();
        for (i, pollutant) in Pollutant::ALL.iter().enumerate() {
            if counts[i] > 0 {
                average.set(*pollutant, Some(sums[i] / f64::from(counts[i])));
            }
        }
        average
    }

    /// Copy with every reading rounded to the nearest integer
    #[must_use]
    pub fn rounded(&self) -> Pollutants {
        let mut rounded = *self;
        for pollutant in Pollutant::ALL {
            rounded.set(pollutant, self.get(pollutant).map(f64::round));
        }
        rounded
    }
}
