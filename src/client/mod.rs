//! Upstream Wialon API client: transport, session lifecycle and data flags

pub mod flags;
pub mod http;
pub mod session;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpTransport;
pub use session::SessionClient;

/// Transport seam for the Wialon remote-procedure protocol.
///
/// One remote call is a service name, a JSON parameter object and an
/// optional session id; the response is the decoded JSON body. Keeping the
/// wire behind a trait lets the session layer be exercised against a
/// scripted transport in tests.
#[async_trait]
pub trait WialonTransport: Send + Sync {
    /// Execute a single remote call and decode the JSON response body
    async fn execute(&self, svc: &str, params: &Value, sid: Option<&str>) -> Result<Value>;
}
