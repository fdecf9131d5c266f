//! Wialon fleet-tracking gateway
//!
//! This crate authenticates against the Wialon remote API with a long-lived
//! token, maintains the resulting session id (re-logging in transparently
//! when the upstream reports it expired), and reshapes the vendor's compact
//! flag-gated JSON schema into stable normalized unit, sensor and parameter
//! records.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wialon_gateway::{FleetService, GatewayConfig, HttpTransport, SessionClient};
//!
//! #[tokio::main]
//! async fn main() -> wialon_gateway::Result<()> {
//!     let config = GatewayConfig::from_env()?;
//!     let transport = Arc::new(HttpTransport::new(&config.wialon)?);
//!     let client = Arc::new(SessionClient::new(config.wialon.token.clone(), transport));
//!     let fleet = FleetService::new(client);
//!
//!     for unit in fleet.list_units().await? {
//!         println!("{} [{}] online={}", unit.name, unit.unit_type, unit.is_online);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock;
pub mod model;
pub mod services;

// Re-export main types
pub use crate::{
    client::{HttpTransport, SessionClient, WialonTransport},
    config::{GatewayConfig, WialonConfig},
    error::{Result, WialonError},
    services::FleetService,
};
