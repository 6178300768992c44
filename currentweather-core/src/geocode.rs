//! Reverse geocoding: turn a location fix into a locality name.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tracing::{debug, instrument};

use crate::{config::DEFAULT_GEOCODER_URL, model::Coordinates};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("currentweather/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Locality for the coordinates, or `None` if the service knows of none.
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<String>>;
}

/// OpenStreetMap Nominatim `/reverse` client.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create geocoding client")?;

        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_GEOCODER_URL)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
}

impl NominatimAddress {
    fn locality(self) -> Option<String> {
        [self.city, self.town, self.village, self.municipality, self.county]
            .into_iter()
            .flatten()
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip_all, fields(coords = %coords))]
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<String>> {
        let url = format!("{}/reverse", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
            .context("Failed to send reverse geocoding request")?;

        let status = res.status();
        if !status.is_success() {
            anyhow::bail!("Reverse geocoding failed with status {status}");
        }

        let body: NominatimResponse =
            res.json().await.context("Failed to parse reverse geocoding JSON")?;

        let locality = body.address.and_then(NominatimAddress::locality);
        debug!(?locality, "Reverse geocoded");
        Ok(locality)
    }
}
