use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use currentweather_core::{
    AlwaysOnline, Config, Coordinates, LocationSource, NetworkMonitor, NominatimGeocoder, Phase,
    Presenter, ScreenEvent, TcpProbe, WeatherScreen, WeatherView, provider_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::terminal::TerminalView;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "currentweather", version, about = "Current weather from WeatherAPI.com")]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// API key, overriding the one in the config file.
    #[arg(long, global = true, env = "WEATHERAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default city.
    Configure,

    /// Show current weather once.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,

        #[command(flatten)]
        position: Position,

        /// Print the display fields as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the default city, then look up each city you enter.
    Search {
        /// City shown first; defaults to the configured city.
        city: Option<String>,
    },
}

/// A location fix given on the command line instead of a city.
#[derive(Debug, Args)]
pub struct Position {
    /// Latitude of the device location.
    #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the device location.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl Position {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let mut config = Config::load()?;
        if let Some(key) = self.api_key {
            config.set_api_key(key);
        }

        match self.command {
            Command::Configure => configure(config).map(|()| ExitCode::SUCCESS),
            Command::Show { city, position, json } => {
                let city = city.unwrap_or_else(|| config.initial_city().to_string());
                show(&config, city, position.coordinates(), json).await
            }
            Command::Search { city } => {
                let city = city.unwrap_or_else(|| config.initial_city().to_string());
                search(&config, city).await.map(|()| ExitCode::SUCCESS)
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let mut prompt = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked);
    if config.is_configured() {
        prompt = prompt.with_help_message("Leave empty to keep the current key");
    }
    let key = prompt.prompt()?;
    if !key.trim().is_empty() {
        config.set_api_key(key);
    }
    if !config.is_configured() {
        anyhow::bail!("An API key is required. Get one at https://www.weatherapi.com/");
    }

    let city = Text::new("Default city:").with_default(config.initial_city()).prompt()?;
    config.default_city = Some(city.trim().to_string());

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn build_screen(
    config: &Config,
    source: LocationSource,
) -> anyhow::Result<(WeatherScreen, UnboundedReceiver<ScreenEvent>)> {
    let provider = provider_from_config(config)?;

    let network: Arc<dyn NetworkMonitor> = if config.connectivity_check {
        Arc::new(TcpProbe::for_url(&config.base_url)?)
    } else {
        Arc::new(AlwaysOnline)
    };

    let geocoder = NominatimGeocoder::new(&config.geocoder_url)?;

    Ok(WeatherScreen::new(provider, network, Arc::new(geocoder), source))
}

async fn show(
    config: &Config,
    city: String,
    coords: Option<Coordinates>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let source = if coords.is_some() { LocationSource::Device } else { LocationSource::Query(city) };
    let (screen, mut rx) = build_screen(config, source)?;

    screen.start().await;
    if let Some(coords) = coords {
        // The fix comes from the command line, so permission is implied.
        screen.on_permission_result(true).await;
        screen.on_location_resolved(Some(coords)).await;
    }
    drop(screen);

    let mut presenter = Presenter::new(TerminalView::stdout(json));
    while let Some(event) = rx.recv().await {
        presenter.handle(event);
    }

    match presenter.phase() {
        Phase::Ready(_) => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::FAILURE),
    }
}

async fn search(config: &Config, city: String) -> anyhow::Result<()> {
    let (screen, mut rx) = build_screen(config, LocationSource::Query(city))?;
    let mut presenter = Presenter::new(TerminalView::stdout(false));

    // Each lookup is drawn before the next prompt opens.
    screen.start().await;
    drain_events(&mut rx, &mut presenter);

    loop {
        let answer = tokio::task::spawn_blocking(|| {
            Text::new("City:").with_help_message("Esc to quit").prompt()
        })
        .await
        .context("Prompt task failed")?;

        match answer {
            Ok(query) => {
                screen.on_submit_query(&query).await;
                drain_events(&mut rx, &mut presenter);
            }
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        }
    }

    debug!("Leaving search");
    Ok(())
}

/// Apply every event already queued by the screen.
fn drain_events<V: WeatherView>(
    rx: &mut UnboundedReceiver<ScreenEvent>,
    presenter: &mut Presenter<V>,
) {
    while let Ok(event) = rx.try_recv() {
        presenter.handle(event);
    }
}
