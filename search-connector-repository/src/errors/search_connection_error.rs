//! Search connection error types.
//!
//! Covers startup failures (bad settings, double initialization, collaborators
//! that cannot produce a handle) and failures of the requests sent later
//! through a connection.

use thiserror::Error;

/// Unified errors from connection setup and use.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchConnectionError {
    /// A setting is malformed (e.g., a non-integer timeout).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A non-empty registry is already active.
    #[error("Search connections already initialized ({active_indexes} active indexes)")]
    AlreadyInitialized { active_indexes: usize },

    /// The transport factory or cache provider failed for an index.
    #[error("Failed to construct transport for index '{index}': {message}")]
    TransportConstruction { index: String, message: String },

    /// The search provider is switched off in configuration.
    #[error("Search provider is not enabled")]
    Disabled,

    /// A request sent through a connection failed or returned a non-2xx status.
    #[error("Request error: {message}")]
    RequestError {
        status: Option<u16>,
        message: String,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Internal state is unusable (e.g., a poisoned lock).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchConnectionError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an already-initialized error.
    pub fn already_initialized(active_indexes: usize) -> Self {
        Self::AlreadyInitialized { active_indexes }
    }

    /// Create a transport construction error for an index.
    pub fn transport_construction(index: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TransportConstruction {
            index: index.into(),
            message: msg.into(),
        }
    }

    /// Create a request error without an HTTP status.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a request error for a non-2xx status.
    pub fn status(status: u16, msg: impl Into<String>) -> Self {
        Self::RequestError {
            status: Some(status),
            message: format!("status {}: {}", status, msg.into()),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The index a construction error is attributed to.
    pub fn index(&self) -> Option<&str> {
        match self {
            Self::TransportConstruction { index, .. } => Some(index),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchConnectionError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestError {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SearchConnectionError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

/// Result alias used across the repository crate.
pub type Result<T> = std::result::Result<T, SearchConnectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            SearchConnectionError::already_initialized(2).to_string(),
            "Search connections already initialized (2 active indexes)"
        );
        assert_eq!(
            SearchConnectionError::transport_construction("b", "refused").to_string(),
            "Failed to construct transport for index 'b': refused"
        );
        assert_eq!(
            SearchConnectionError::status(404, "missing").to_string(),
            "Request error: status 404: missing"
        );
        assert_eq!(
            SearchConnectionError::request("reset").to_string(),
            "Request error: reset"
        );
    }

    #[test]
    fn test_index() {
        let err = SearchConnectionError::transport_construction("web", "boom");
        assert_eq!(err.index(), Some("web"));
        assert_eq!(SearchConnectionError::Disabled.index(), None);
    }
}
