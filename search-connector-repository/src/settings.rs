//! Setting names, defaults and the settings resolved once per initialization.

use search_connector_shared::TransportConfig;
use tracing::debug;
use url::Url;

use crate::errors::{Result, SearchConnectionError};
use crate::interfaces::ConfigSource;
use crate::selector::resolve_method;

/// Request method preference. Only `"post"` (any case) selects POST.
pub const REQUEST_METHOD: &str = "SOLR_REQUEST_METHOD";

/// Whether the search provider is switched on.
pub const ENABLED: &str = "SOLR_ENABLED";

/// Base address of the search service, e.g. `http://localhost:8983/solr`.
pub const SERVICE_ADDRESS: &str = "SOLR_SERVICE_ADDRESS";

/// Whether connections get a response cache.
pub const ENABLE_HTTP_CACHE: &str = "SOLR_ENABLE_HTTP_CACHE";

/// Per-request timeout in milliseconds. Zero keeps the transport default.
pub const REQUEST_TIMEOUT_MS: &str = "SOLR_REQUEST_TIMEOUT_MS";

/// Comma-separated index names.
pub const CORES: &str = "SOLR_CORES";

/// Run the core status check after initialization.
pub const VALIDATE_ON_STARTUP: &str = "SOLR_VALIDATE_ON_STARTUP";

/// Default service address.
pub const DEFAULT_SERVICE_ADDRESS: &str = "http://localhost:8983/solr";

/// Settings shared by every connection built in one initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub enabled: bool,
    /// Service address with trailing slashes removed.
    pub service_address: String,
    pub transport: TransportConfig,
}

impl ConnectionSettings {
    /// Resolve all settings from `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionSettings)` - The resolved settings
    /// * `Err(SearchConnectionError::ConfigurationError)` - If the timeout is not
    ///   an integer or the service address is not an absolute http(s) URL
    pub fn from_source(config: &dyn ConfigSource) -> Result<Self> {
        let enabled = config.get_bool(ENABLED, true);
        let service_address = config
            .get_string(SERVICE_ADDRESS)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_ADDRESS.to_string());
        let service_address = validate_service_address(&service_address)?;

        let method = resolve_method(config);
        let cache_enabled = config.get_bool(ENABLE_HTTP_CACHE, false);
        let timeout = config.get_int(REQUEST_TIMEOUT_MS, 0)?;
        let transport = TransportConfig::new(method, Some(timeout), cache_enabled);

        debug!(
            enabled,
            service_address = %service_address,
            method = %transport.method,
            timeout_millis = ?transport.timeout_millis,
            cache_enabled,
            "Resolved connection settings"
        );

        Ok(Self {
            enabled,
            service_address,
            transport,
        })
    }
}

/// Check that `address` is an absolute http(s) URL and strip trailing slashes.
pub fn validate_service_address(address: &str) -> Result<String> {
    let parsed = Url::parse(address).map_err(|e| {
        SearchConnectionError::configuration(format!(
            "{} '{}' is not a valid URL: {}",
            SERVICE_ADDRESS, address, e
        ))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SearchConnectionError::configuration(format!(
            "{} must use http or https, got '{}'",
            SERVICE_ADDRESS,
            parsed.scheme()
        )));
    }
    Ok(address.trim_end_matches('/').to_string())
}
