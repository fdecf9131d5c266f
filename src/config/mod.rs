//! Configuration management for the Wialon gateway

use crate::error::{Result, WialonError};
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use url::Url;

/// Production Wialon remote API endpoint
const DEFAULT_API_URL: &str = "https://hst-api.wialon.com/wialon/ajax.html";

/// Fixed upstream request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Upstream Wialon API configuration
    pub wialon: WialonConfig,
}

/// Wialon API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WialonConfig {
    /// Remote API endpoint (e.g. "https://hst-api.wialon.com/wialon/ajax.html")
    pub base_url: Url,

    /// Long-lived API token exchanged for a session id at login
    #[serde(skip_serializing)]
    pub token: String,

    /// Request timeout for every upstream call
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl WialonConfig {
    /// Build a configuration with the default endpoint and timeout
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_URL
                .parse()
                .expect("default API URL is valid"),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// `WIALON_TOKEN` is mandatory - without the upstream credential the
    /// gateway cannot do anything, so its absence is a hard error surfaced
    /// before any vendor call. `WIALON_API_URL` and `WIALON_TIMEOUT`
    /// (seconds) override the defaults.
    pub fn from_env() -> Result<Self> {
        let token = env::var("WIALON_TOKEN")
            .map_err(|_| WialonError::config("WIALON_TOKEN is not set"))?;
        if token.trim().is_empty() {
            return Err(WialonError::config("WIALON_TOKEN is empty"));
        }

        let mut wialon = WialonConfig::new(token);

        if let Ok(url) = env::var("WIALON_API_URL") {
            wialon.base_url = url
                .parse()
                .map_err(|e| WialonError::config(format!("Invalid WIALON_API_URL: {e}")))?;
        }

        if let Ok(timeout) = env::var("WIALON_TIMEOUT") {
            let secs: u64 = timeout
                .parse()
                .map_err(|e| WialonError::config(format!("Invalid WIALON_TIMEOUT: {e}")))?;
            wialon.timeout = Duration::from_secs(secs);
        }

        Ok(Self { wialon })
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_production_endpoint() {
        let config = WialonConfig::new("abc");
        assert_eq!(config.base_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
