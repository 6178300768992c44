use serde::{Deserialize, Serialize};

use crate::{error::WeatherError, icon::ConditionIcon};

/// A validated "current conditions" query for one city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub city: String,
}

impl WeatherRequest {
    /// Build a request from raw user input, rejecting blank text.
    pub fn new(query: &str) -> Result<Self, WeatherError> {
        let city = query.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        Ok(Self { city: city.to_string() })
    }
}

/// Snapshot of one API response. Any field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub condition: Option<String>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<u32>,
    pub visibility_km: Option<f64>,
    pub pressure_mb: Option<f64>,
    pub wind_degree: Option<u32>,
    pub wind_kph: Option<f64>,
    pub wind_dir: Option<String>,
}

impl WeatherReport {
    pub fn icon(&self) -> ConditionIcon {
        self.condition
            .as_deref()
            .map(ConditionIcon::from_condition)
            .unwrap_or_default()
    }
}

/// A device location fix, as handed over by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
