//! Error types for the Wialon gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, WialonError>;

/// Error types for Wialon gateway operations
#[derive(Error, Debug)]
pub enum WialonError {
    /// Configuration errors (missing token, malformed endpoint, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level errors talking to the Wialon API
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the fixed upstream timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Login failures against the Wialon session endpoint
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Structured error reported by the Wialon API (other than session expiry
    /// resolved by the retry path)
    #[error("Wialon API error {code}: {reason}")]
    Vendor { code: i64, reason: String },

    /// Session-expiry error persisted after the single allowed re-login
    #[error("Session expired and re-login retry exhausted")]
    AuthRetryExhausted,

    /// No matching item upstream for a requested id
    #[error("Not found: {0}")]
    NotFound(String),
}

impl WialonError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a vendor error from a decoded error envelope
    pub fn vendor(code: i64, reason: impl Into<String>) -> Self {
        Self::Vendor {
            code,
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Check if error indicates an authentication issue
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            WialonError::Authentication(_) | WialonError::AuthRetryExhausted
        )
    }

    /// Check if the error originates upstream rather than on the wire.
    ///
    /// `list_units` degrades to an empty list for exactly this class;
    /// transport and timeout failures always surface.
    pub fn is_vendor_side(&self) -> bool {
        matches!(
            self,
            WialonError::Vendor { .. }
                | WialonError::AuthRetryExhausted
                | WialonError::Authentication(_)
        )
    }
}
