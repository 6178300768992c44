use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use std::{fmt::Debug, time::Duration};
use tokio::{net::TcpStream, time::timeout};
use tracing::debug;

/// Answers "is there a network?" before a request is issued.
#[async_trait]
pub trait NetworkMonitor: Send + Sync + Debug {
    async fn is_available(&self) -> bool;
}

/// Skips the check entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl NetworkMonitor for AlwaysOnline {
    async fn is_available(&self) -> bool {
        true
    }
}

/// Opens (and drops) a TCP connection to the API host.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, timeout: Self::DEFAULT_TIMEOUT }
    }

    /// Probe the host and port a base URL points at.
    pub fn for_url(url: &str) -> anyhow::Result<Self> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
        let host = parsed.host_str().ok_or_else(|| anyhow!("URL has no host: {url}"))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| anyhow!("URL has no known port: {url}"))?;

        Ok(Self::new(host, port))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl NetworkMonitor for TcpProbe {
    async fn is_available(&self) -> bool {
        let addr = self.address();
        match timeout(self.timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "Connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(%addr, "Connectivity probe timed out");
                false
            }
        }
    }
}
