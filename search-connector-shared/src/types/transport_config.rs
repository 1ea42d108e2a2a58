//! Process-wide transport settings shared by every connection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::request_method::RequestMethod;

/// Transport settings resolved once per initialization.
///
/// `timeout_millis` only ever holds a positive value. Zero or negative inputs
/// mean "use the transport default" and are stored as `None`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TransportConfig {
    /// Method used for query submissions.
    pub method: RequestMethod,
    /// Per-request timeout override in milliseconds.
    pub timeout_millis: Option<u64>,
    /// Whether connections get a response cache.
    pub cache_enabled: bool,
}

impl TransportConfig {
    /// Create a config, normalizing the timeout.
    pub fn new(method: RequestMethod, timeout_millis: Option<i64>, cache_enabled: bool) -> Self {
        Self {
            method,
            timeout_millis: normalize_timeout(timeout_millis),
            cache_enabled,
        }
    }

    /// The timeout override, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_millis.map(Duration::from_millis)
    }
}

/// Keep only positive timeouts.
pub fn normalize_timeout(timeout_millis: Option<i64>) -> Option<u64> {
    timeout_millis
        .filter(|t| *t > 0)
        .and_then(|t| u64::try_from(t).ok())
}
