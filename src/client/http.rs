//! HTTP transport for the Wialon remote API
//!
//! The Wialon protocol is HTTP GET against a single endpoint with the
//! service name, a JSON-encoded parameter object and the session id in the
//! query string.

use crate::client::WialonTransport;
use crate::config::WialonConfig;
use crate::error::{Result, WialonError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// reqwest-based transport with a fixed per-request timeout
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a new transport from the gateway configuration
    pub fn new(config: &WialonConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(format!("wialon-gateway/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WialonError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Build the request URL for one remote call
    fn build_url(&self, svc: &str, params: &Value, sid: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("svc", svc);
            query.append_pair("params", &params.to_string());
            if let Some(sid) = sid {
                query.append_pair("sid", sid);
            }
        }
        url
    }
}

#[async_trait]
impl WialonTransport for HttpTransport {
    async fn execute(&self, svc: &str, params: &Value, sid: Option<&str>) -> Result<Value> {
        let url = self.build_url(svc, params, sid);
        debug!("Wialon request: svc={svc}");

        let response = self.client.get(url).send().await.map_err(|e| {
            let msg = format!("Wialon request failed: {e}");
            if e.is_timeout() {
                WialonError::timeout(msg)
            } else if e.is_connect() {
                WialonError::transport(msg)
            } else {
                WialonError::Http(e)
            }
        })?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| WialonError::transport(format!("Failed to decode response: {e}")))?;

        Ok(body)
    }
}
