//! Client configuration

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Default quiet period before the fiscal-data autocomplete fires
pub const DEFAULT_AUTOCOMPLETE_DELAY: Duration = Duration::from_millis(400);

/// Client configuration for connecting to the portal API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Quiet period after the last folio edit before autocomplete runs
    pub autocomplete_delay: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            autocomplete_delay: DEFAULT_AUTOCOMPLETE_DELAY,
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `PORTAL_API_URL` (default `http://localhost:3000`)
    /// - `PORTAL_TIMEOUT_SECS` (default 30)
    /// - `PORTAL_AUTOCOMPLETE_DELAY_MS` (default 400)
    pub fn from_env() -> ClientResult<Self> {
        let base_url =
            std::env::var("PORTAL_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let mut config = Self::new(base_url);

        if let Some(secs) = env_number("PORTAL_TIMEOUT_SECS")? {
            config.timeout = secs;
        }
        if let Some(ms) = env_number("PORTAL_AUTOCOMPLETE_DELAY_MS")? {
            config.autocomplete_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the autocomplete quiet period
    pub fn with_autocomplete_delay(mut self, delay: Duration) -> Self {
        self.autocomplete_delay = delay;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<crate::NetworkPortalClient> {
        crate::NetworkPortalClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

fn env_number(name: &str) -> ClientResult<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{name} must be a number, got {raw:?}"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.autocomplete_delay, Duration::from_millis(400));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://facturacion.example.mx")
            .with_timeout(5)
            .with_autocomplete_delay(Duration::from_millis(250));
        assert_eq!(config.base_url, "https://facturacion.example.mx");
        assert_eq!(config.timeout, 5);
        assert_eq!(config.autocomplete_delay, Duration::from_millis(250));
    }
}
