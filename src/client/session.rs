//! Session lifecycle against the Wialon remote API
//!
//! Wialon issues an opaque session id (`eid`) in exchange for a long-lived
//! API token. The session is created lazily, carried on every subsequent
//! call and recreated at most once per logical call when the upstream
//! reports it expired.

use crate::client::WialonTransport;
use crate::error::{Result, WialonError};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Wialon error code meaning the session id is invalid or expired
pub const ERROR_INVALID_SESSION: i64 = 1;

/// Client owning the authenticated-request protocol for one upstream
/// credential.
///
/// Construct one instance per configured token and share it via `Arc`;
/// there is no process-global registry. Overlapping calls share the session
/// id, and two callers that both observe an expired session may both
/// re-login - upstream logins are idempotent, so the second `eid` simply
/// replaces the first.
pub struct SessionClient {
    transport: Arc<dyn WialonTransport>,
    token: String,
    sid: Arc<RwLock<Option<String>>>,
}

impl SessionClient {
    /// Create a client for one upstream credential
    pub fn new(token: impl Into<String>, transport: Arc<dyn WialonTransport>) -> Self {
        Self {
            transport,
            token: token.into(),
            sid: Arc::new(RwLock::new(None)),
        }
    }

    /// Whether a session id is currently held.
    ///
    /// Says nothing about upstream liveness - that is discovered lazily on
    /// the next authenticated call.
    pub async fn has_session(&self) -> bool {
        self.sid.read().await.is_some()
    }

    /// Exchange the API token for a session id.
    ///
    /// Returns false when the response carries no `eid` field (bad token,
    /// upstream refusal); transport failures are errors.
    pub async fn login(&self) -> Result<bool> {
        let result = self
            .transport
            .execute("token/login", &json!({ "token": self.token }), None)
            .await?;

        match result.get("eid").and_then(Value::as_str) {
            Some(eid) => {
                info!("Wialon login succeeded");
                *self.sid.write().await = Some(eid.to_string());
                Ok(true)
            }
            None => {
                warn!("Wialon login response carried no session id");
                Ok(false)
            }
        }
    }

    /// Make sure a session id is held, logging in if necessary
    pub async fn ensure_session(&self) -> Result<bool> {
        if self.has_session().await {
            return Ok(true);
        }
        self.login().await
    }

    /// Execute one raw remote call, attaching the current session id when
    /// one is held. The decoded body is returned as-is, error envelope
    /// included.
    pub async fn call(&self, svc: &str, params: &Value) -> Result<Value> {
        let sid = self.sid.read().await.clone();
        self.transport.execute(svc, params, sid.as_deref()).await
    }

    /// Execute a remote call under a live session, transparently recovering
    /// from session expiry exactly once.
    ///
    /// Vendor error envelopes become tagged errors: session expiry that
    /// survives the single re-login is `AuthRetryExhausted`, any other code
    /// is `Vendor { code, reason }`.
    pub async fn authenticated_call(&self, svc: &str, params: &Value) -> Result<Value> {
        if !self.ensure_session().await? {
            return Err(WialonError::authentication(
                "could not establish Wialon session",
            ));
        }

        let result = self.call(svc, params).await?;

        match vendor_error_code(&result) {
            None => Ok(result),
            Some(ERROR_INVALID_SESSION) => {
                debug!("Session expired during {svc}, re-logging in");
                *self.sid.write().await = None;

                if !self.login().await? {
                    return Err(WialonError::AuthRetryExhausted);
                }

                let retried = self.call(svc, params).await?;
                match vendor_error_code(&retried) {
                    None => Ok(retried),
                    Some(ERROR_INVALID_SESSION) => Err(WialonError::AuthRetryExhausted),
                    Some(code) => Err(WialonError::vendor(code, vendor_reason(&retried))),
                }
            }
            Some(code) => Err(WialonError::vendor(code, vendor_reason(&result))),
        }
    }
}

/// Extract a nonzero vendor error code from a decoded response body
fn vendor_error_code(result: &Value) -> Option<i64> {
    match result.get("error").and_then(Value::as_i64) {
        Some(0) | None => None,
        Some(code) => Some(code),
    }
}

fn vendor_reason(result: &Value) -> String {
    result
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
