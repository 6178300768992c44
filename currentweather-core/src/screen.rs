//! The weather screen, independent of any UI toolkit.
//!
//! [`WeatherScreen`] reacts to host callbacks (`on_submit_query`,
//! `on_permission_result`, `on_location_resolved`) and emits [`ScreenEvent`]s on
//! a channel. The host drains that channel on its UI task, normally through a
//! [`Presenter`](crate::view::Presenter).
//!
//! Every issued request takes a new generation number. A completion is only
//! emitted while its generation is still the latest, so a slow earlier request
//! can never overwrite a newer one.

use chrono::{DateTime, Local};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    geocode::Geocoder,
    model::{Coordinates, WeatherReport, WeatherRequest},
    network::NetworkMonitor,
    provider::WeatherProvider,
};

pub const LOCATION_DENIED: &str = "Location permission denied";
pub const LOCATION_UNAVAILABLE: &str = "Unable to get your location";
pub const LOCALITY_UNKNOWN: &str = "Unable to determine your city";

/// Where the first city shown on the screen comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Query(String),
    Device,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// A request was issued.
    Loading { generation: u64 },
    Loaded {
        generation: u64,
        city: String,
        report: WeatherReport,
        fetched_at: DateTime<Local>,
    },
    Failed { generation: u64, error: WeatherError },
    /// Transient message that does not change what is displayed.
    Notice(String),
    /// The host should ask for location permission and call `on_permission_result`.
    PermissionRequested,
    /// The host should obtain a fix and call `on_location_resolved`.
    LocationRequested,
}

#[derive(Debug)]
pub struct WeatherScreen {
    provider: Arc<dyn WeatherProvider>,
    network: Arc<dyn NetworkMonitor>,
    geocoder: Arc<dyn Geocoder>,
    source: LocationSource,
    latest: AtomicU64,
    events: mpsc::UnboundedSender<ScreenEvent>,
}

impl WeatherScreen {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        network: Arc<dyn NetworkMonitor>,
        geocoder: Arc<dyn Geocoder>,
        source: LocationSource,
    ) -> (Self, mpsc::UnboundedReceiver<ScreenEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let screen = Self { provider, network, geocoder, source, latest: AtomicU64::new(0), events };
        (screen, rx)
    }

    pub fn source(&self) -> &LocationSource {
        &self.source
    }

    /// Show the initial location.
    pub async fn start(&self) {
        match &self.source {
            LocationSource::Query(city) => self.on_submit_query(city).await,
            LocationSource::Device => self.emit(ScreenEvent::PermissionRequested),
        }
    }

    pub async fn on_submit_query(&self, query: &str) {
        match WeatherRequest::new(query) {
            Ok(request) => self.fetch(request).await,
            Err(e) => self.emit(ScreenEvent::Notice(e.to_string())),
        }
    }

    pub async fn on_permission_result(&self, granted: bool) {
        if granted {
            self.emit(ScreenEvent::LocationRequested);
        } else {
            self.emit(ScreenEvent::Notice(LOCATION_DENIED.to_string()));
        }
    }

    pub async fn on_location_resolved(&self, coords: Option<Coordinates>) {
        let Some(coords) = coords else {
            self.emit(ScreenEvent::Notice(LOCATION_UNAVAILABLE.to_string()));
            return;
        };

        let locality = match self.geocoder.reverse_geocode(coords).await {
            Ok(locality) => locality,
            Err(e) => {
                warn!(error = %e, %coords, "Reverse geocoding failed");
                None
            }
        };

        match locality.as_deref().map(WeatherRequest::new) {
            Some(Ok(request)) => self.fetch(request).await,
            _ => self.emit(ScreenEvent::Notice(LOCALITY_UNKNOWN.to_string())),
        }
    }

    /// Generation of the most recently issued request; 0 before the first.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    async fn fetch(&self, request: WeatherRequest) {
        if !self.network.is_available().await {
            self.emit(ScreenEvent::Notice(WeatherError::NetworkUnavailable.to_string()));
            return;
        }

        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.emit(ScreenEvent::Loading { generation });

        let result = self.provider.get_weather(&request).await;

        if generation != self.latest_generation() {
            debug!(generation, city = %request.city, "Discarding stale weather result");
            return;
        }

        let event = match result {
            Ok(report) => ScreenEvent::Loaded {
                generation,
                city: request.city,
                report,
                fetched_at: Local::now(),
            },
            Err(error) => {
                warn!(generation, city = %request.city, %error, "Weather request failed");
                ScreenEvent::Failed { generation, error }
            }
        };
        self.emit(event);
    }

    fn emit(&self, event: ScreenEvent) {
        if self.events.send(event).is_err() {
            debug!("Screen event dropped, receiver closed");
        }
    }
}
