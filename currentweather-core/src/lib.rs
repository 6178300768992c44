//! Core library for the `currentweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The WeatherAPI.com client and its error classification
//! - Shared domain models and display formatting
//! - A UI-agnostic weather screen driven by host callbacks
//!
//! It is used by `currentweather-cli`, but can also back other front ends.

pub mod config;
pub mod display;
pub mod error;
pub mod geocode;
pub mod icon;
pub mod model;
pub mod network;
pub mod provider;
pub mod screen;
pub mod view;

pub use config::Config;
pub use display::DisplayFields;
pub use error::{TransportFailure, WeatherError};
pub use geocode::{Geocoder, NominatimGeocoder};
pub use icon::ConditionIcon;
pub use model::{Coordinates, WeatherReport, WeatherRequest};
pub use network::{AlwaysOnline, NetworkMonitor, TcpProbe};
pub use provider::{WeatherProvider, provider_from_config, weatherapi::WeatherApiClient};
pub use screen::{LocationSource, ScreenEvent, WeatherScreen};
pub use view::{Phase, Presenter, WeatherView};
