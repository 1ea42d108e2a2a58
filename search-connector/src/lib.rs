//! # Search Connector
//!
//! Startup wiring for the search core connections: reads settings from the
//! environment, builds the HTTP transport and response cache, and publishes
//! one connection per configured core.
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization

pub mod config;

pub use config::Dependencies;

use search_connector_repository::SearchConnectionError;
use thiserror::Error;

/// Errors that can occur during connector startup.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Connection setup or validation error.
    #[error("Connection error: {0}")]
    Connection(#[from] SearchConnectionError),
}

impl ConnectorError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
