//! Dependency initialization and wiring for the search connector.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::ConnectorError;
use search_connector_repository::settings::{CORES, VALIDATE_ON_STARTUP};
use search_connector_repository::utils::parse_index_names;
use search_connector_repository::{
    CacheProvider, ConfigSource, ConnectionRegistry, ConnectionSelector, EnvConfigSource,
    ReqwestTransportFactory, SharedCacheProvider, TransportFactory, TransportOptions,
};

/// Client-wide timeout applied when no per-request timeout is configured.
const CONNECTION_TIMEOUT_MS: &str = "SOLR_CONNECTION_TIMEOUT_MS";

/// Bypass system proxies for search traffic.
const DISABLE_PROXY: &str = "SOLR_DISABLE_PROXY";

/// Default client-wide timeout in milliseconds.
const DEFAULT_CONNECTION_TIMEOUT_MS: i64 = 30_000;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The selector owning the published registry.
    pub selector: Arc<ConnectionSelector>,
    /// The registry published at startup.
    pub registry: Arc<ConnectionRegistry>,
    /// Whether `main` should check the cores exist before reporting ready.
    pub validate_on_startup: bool,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SOLR_SERVICE_ADDRESS`: Search service base address (default: http://localhost:8983/solr)
    /// - `SOLR_CORES`: Comma-separated core names
    /// - `SOLR_REQUEST_METHOD`: `post` to submit queries as POST bodies (default: GET)
    /// - `SOLR_ENABLE_HTTP_CACHE`: Attach a response cache to every connection (default: false)
    /// - `SOLR_REQUEST_TIMEOUT_MS`: Per-request timeout, 0 for the client default (default: 0)
    /// - `SOLR_CONNECTION_TIMEOUT_MS`: Client default timeout (default: 30000)
    /// - `SOLR_DISABLE_PROXY`: Bypass system proxies (default: false)
    /// - `SOLR_ENABLED`: Switch the provider off entirely (default: true)
    /// - `SOLR_VALIDATE_ON_STARTUP`: Check every core exists after startup (default: false)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ConnectorError)` - If any setting is invalid or a connection cannot be built
    pub fn new() -> Result<Self, ConnectorError> {
        Self::from_source(&EnvConfigSource::new())
    }

    /// Initialize dependencies from an arbitrary configuration source.
    pub fn from_source(config: &dyn ConfigSource) -> Result<Self, ConnectorError> {
        let connection_timeout = config.get_int(CONNECTION_TIMEOUT_MS, DEFAULT_CONNECTION_TIMEOUT_MS)?;
        let options = TransportOptions {
            default_timeout: u64::try_from(connection_timeout)
                .ok()
                .filter(|t| *t > 0)
                .map(Duration::from_millis),
            disable_proxy: config.get_bool(DISABLE_PROXY, false),
        };

        let transport_factory = ReqwestTransportFactory::new(options)?;
        let cache_provider = SharedCacheProvider::in_memory();

        Self::with_collaborators(config, &transport_factory, &cache_provider)
    }

    /// Initialize dependencies with explicit transport and cache collaborators.
    pub fn with_collaborators(
        config: &dyn ConfigSource,
        transport_factory: &dyn TransportFactory,
        cache_provider: &dyn CacheProvider,
    ) -> Result<Self, ConnectorError> {
        let cores = parse_index_names(&config.get_string(CORES).unwrap_or_default());
        if cores.is_empty() {
            warn!(setting = CORES, "No search cores configured");
        }
        let validate_on_startup = config.get_bool(VALIDATE_ON_STARTUP, false);

        info!(
            cores = ?cores,
            validate_on_startup,
            "Initializing dependencies"
        );

        let selector = Arc::new(ConnectionSelector::new());
        let registry = selector.initialize(cores, config, transport_factory, cache_provider)?;

        Ok(Self {
            selector,
            registry,
            validate_on_startup,
        })
    }

    /// Check that every core exists on the server.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every configured core is present
    /// * `Err(ConnectorError::ConfigError)` - If a core is missing
    /// * `Err(ConnectorError::Connection)` - If the status request fails
    pub async fn validate(&self) -> Result<(), ConnectorError> {
        if self.selector.validate_setup().await? {
            Ok(())
        } else {
            Err(ConnectorError::config(
                "One or more configured search cores are not present on the server",
            ))
        }
    }
}
