use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    config::DEFAULT_BASE_URL,
    error::{TransportFailure, WeatherError},
    model::{WeatherReport, WeatherRequest},
};

use super::WeatherProvider;

/// Client for the WeatherAPI.com `current.json` endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug)]
pub struct WeatherApiClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl WeatherApiClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.timeout = secs.map(Duration::from_secs);
        self
    }

    pub fn build(self) -> anyhow::Result<WeatherApiClient> {
        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(WeatherApiClient {
            api_key: self.api_key,
            base_url: self.base_url,
            http: http.build()?,
        })
    }
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    pub fn builder(api_key: &str) -> WeatherApiClientBuilder {
        WeatherApiClientBuilder {
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    fn current_url(&self) -> String {
        format!("{}/current.json", self.base_url)
    }

    async fn fetch_current(&self, request: &WeatherRequest) -> Result<WeatherReport, WeatherError> {
        let res = self
            .http
            .get(self.current_url())
            .query(&[
                ("q", request.city.as_str()),
                ("key", self.api_key.as_str()),
                ("aqi", "no"),
            ])
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!(error = %e, "WeatherAPI request failed");
                WeatherError::from(e)
            })?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "WeatherAPI returned an error status");
            return Err(WeatherError::from_status(status));
        }

        let body = res.text().await.map_err(reqwest::Error::without_url)?;
        parse_current(&body)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    #[instrument(skip(self), fields(city = %request.city))]
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherReport, WeatherError> {
        debug!("Fetching current weather");
        let report = self.fetch_current(request).await?;
        debug!(condition = ?report.condition, "Current weather received");
        Ok(report)
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: Option<f64>,
    condition: Option<WaCondition>,
    humidity: Option<u32>,
    vis_km: Option<f64>,
    pressure_mb: Option<f64>,
    wind_degree: Option<u32>,
    wind_kph: Option<f64>,
    wind_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: Option<WaCurrent>,
}

/// Turn a 2xx body into a report. An empty body is `EmptyBody`; an object
/// without `current` is a report with every field missing.
fn parse_current(body: &str) -> Result<WeatherReport, WeatherError> {
    if body.trim().is_empty() {
        return Err(WeatherError::EmptyBody);
    }

    let parsed: Option<WaResponse> = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, body = %truncate_body(body), "Failed to parse WeatherAPI JSON");
        TransportFailure::Other(e.to_string())
    })?;

    let Some(parsed) = parsed else {
        return Err(WeatherError::EmptyBody);
    };

    Ok(parsed.current.map(WeatherReport::from).unwrap_or_default())
}

impl From<WaCurrent> for WeatherReport {
    fn from(current: WaCurrent) -> Self {
        WeatherReport {
            condition: current.condition.and_then(|c| c.text),
            temperature_c: current.temp_c,
            humidity_pct: current.humidity,
            visibility_km: current.vis_km,
            pressure_mb: current.pressure_mb,
            wind_degree: current.wind_degree,
            wind_kph: current.wind_kph,
            wind_dir: current.wind_dir,
        }
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
