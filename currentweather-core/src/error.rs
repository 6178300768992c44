use thiserror::Error;

/// Failure of a single weather request.
///
/// The `Display` output is the short message shown to the user, so the wording
/// of every variant is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The query was blank; no request is issued.
    #[error("Please enter a city name")]
    EmptyQuery,

    /// The connectivity check failed before the request was sent.
    #[error("No internet connection")]
    NetworkUnavailable,

    /// The API answered with a non-2xx status.
    #[error("{}", status_message(.status))]
    Http { status: u16 },

    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(#[from] TransportFailure),

    /// The API answered 2xx but with nothing in the body.
    #[error("No weather data available")]
    EmptyBody,
}

impl WeatherError {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        WeatherError::Http { status: status.as_u16() }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(TransportFailure::from(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("Request timeout")]
    Timeout,

    /// Connection refused, DNS failure or no route to host.
    #[error("No internet connection")]
    Unreachable,

    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        // A connect timeout reports both flags; it counts as a timeout.
        if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Unreachable
        } else {
            // The request URL carries the API key.
            TransportFailure::Other(err.without_url().to_string())
        }
    }
}

fn status_message(status: &u16) -> String {
    match status {
        404 => "City not found".to_string(),
        401 => "Invalid API key".to_string(),
        429 => "Too many requests".to_string(),
        other => format!("Error: {other}"),
    }
}
