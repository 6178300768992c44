use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{icon::ConditionIcon, model::WeatherReport};

/// Placeholder for any field the API left out.
pub const PLACEHOLDER: &str = "N/A";

/// Text for every widget on the weather screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub city: String,
    pub condition: String,
    pub temperature: String,
    pub humidity: String,
    pub visibility: String,
    pub pressure: String,
    pub wind_degree: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub day_name: String,
    pub date: String,
    #[serde(serialize_with = "serialize_icon")]
    pub icon: ConditionIcon,
}

impl DisplayFields {
    pub fn new(report: &WeatherReport, city: &str, fetched_at: DateTime<Local>) -> Self {
        Self {
            city: city.to_string(),
            condition: text_or_placeholder(report.condition.as_deref()),
            temperature: decimal_with_unit(report.temperature_c, "°C"),
            humidity: with_unit(report.humidity_pct, " %"),
            visibility: decimal_with_unit(report.visibility_km, " km"),
            pressure: decimal_with_unit(report.pressure_mb, " mb"),
            wind_degree: with_unit(report.wind_degree, "°"),
            wind_speed: decimal_with_unit(report.wind_kph, " km/h"),
            wind_direction: text_or_placeholder(report.wind_dir.as_deref()),
            day_name: fetched_at.format("%A").to_string(),
            date: fetched_at.format("%d %B %Y").to_string(),
            icon: report.icon(),
        }
    }
}

fn text_or_placeholder(text: Option<&str>) -> String {
    text.unwrap_or(PLACEHOLDER).to_string()
}

fn with_unit<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Prints the value as received; whole numbers keep a trailing `.0`.
fn decimal_with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}{unit}"),
        Some(v) => format!("{v}{unit}"),
        None => PLACEHOLDER.to_string(),
    }
}

fn serialize_icon<S: serde::Serializer>(icon: &ConditionIcon, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(icon.as_str())
}
