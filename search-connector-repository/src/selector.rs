//! Connection strategy selection and registry publication.
//!
//! The selector resolves the transport settings once, builds one connection
//! per index, and publishes the finished [`ConnectionRegistry`] with a single
//! atomic swap. Readers load the current registry without locking and keep
//! the snapshot they loaded even if a replacement is published later.
//!
//! # Lifecycle
//!
//! `Uninitialized → Initializing → Ready`. The state and the registry are
//! published together, so a reader never sees a registry without the state it
//! was published in. A failed initialization returns to the state it started
//! from and leaves the published registry untouched. A
//! second initialization while a non-empty registry is active is rejected
//! unless [`ConnectionSelector::force_initialize`] is used.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use search_connector_shared::{IndexTarget, RequestMethod};
use tracing::{error, info, warn};

use crate::admin::CoreAdmin;
use crate::connection::Connection;
use crate::errors::{Result, SearchConnectionError};
use crate::interfaces::{CacheProvider, ConfigSource, TransportFactory};
use crate::registry::ConnectionRegistry;
use crate::settings::{ConnectionSettings, REQUEST_METHOD};
use crate::utils::validate_index_name;

/// Lifecycle of a [`ConnectionSelector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Uninitialized,
    Initializing,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitMode {
    Guarded,
    Force,
}

/// Resolve the query method from the `SOLR_REQUEST_METHOD` setting.
///
/// Only a case-insensitive `"post"` selects POST. Absent, empty and unknown
/// values all select GET.
pub fn resolve_method(config: &dyn ConfigSource) -> RequestMethod {
    RequestMethod::from_setting(config.get_string(REQUEST_METHOD).as_deref())
}

/// Reject initialization while a non-empty registry is active.
///
/// The condition is logged at error level before the error is returned.
pub fn guard_against_double_initialization(current: &ConnectionRegistry) -> Result<()> {
    if current.is_empty() {
        return Ok(());
    }
    error!(
        active_indexes = current.len(),
        indexes = ?current.names(),
        "Double search connection initialization detected. Initialize search connections once during startup"
    );
    Err(SearchConnectionError::already_initialized(current.len()))
}

/// What readers observe: a lifecycle state and the registry published with it.
#[derive(Debug)]
struct Snapshot {
    state: SelectorState,
    registry: Arc<ConnectionRegistry>,
}

impl Snapshot {
    fn new(state: SelectorState, registry: Arc<ConnectionRegistry>) -> Arc<Self> {
        Arc::new(Self { state, registry })
    }
}

/// Owns the active registry and serializes its initialization.
pub struct ConnectionSelector {
    active: ArcSwap<Snapshot>,
    init_lock: Mutex<()>,
}

impl ConnectionSelector {
    /// A selector in the `Uninitialized` state with an empty registry.
    pub fn new() -> Self {
        Self {
            active: ArcSwap::new(Snapshot::new(
                SelectorState::Uninitialized,
                Arc::new(ConnectionRegistry::empty()),
            )),
            init_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SelectorState {
        self.active.load().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SelectorState::Ready
    }

    /// The active registry. Lock-free.
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.active.load().registry.clone()
    }

    /// The active connection for `name`, if any. Lock-free.
    pub fn connection(&self, name: &str) -> Option<Connection> {
        self.active.load().registry.get(name).cloned()
    }

    /// Build and publish connections for `index_names`.
    ///
    /// Names are de-duplicated and processed in sorted order. Settings are
    /// resolved once for the whole call. Nothing is published unless every
    /// connection is built.
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<ConnectionRegistry>)` - The newly published registry
    /// * `Err(SearchConnectionError::AlreadyInitialized)` - A non-empty registry is active
    /// * `Err(SearchConnectionError::ConfigurationError)` - A setting or index name is malformed
    /// * `Err(SearchConnectionError::Disabled)` - The provider is switched off
    /// * `Err(SearchConnectionError::TransportConstruction)` - A collaborator failed for an index
    pub fn initialize<I, S>(
        &self,
        index_names: I,
        config: &dyn ConfigSource,
        transport_factory: &dyn TransportFactory,
        cache_provider: &dyn CacheProvider,
    ) -> Result<Arc<ConnectionRegistry>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(
            index_names,
            config,
            transport_factory,
            cache_provider,
            InitMode::Guarded,
        )
    }

    /// Like [`initialize`](Self::initialize), but replaces an active registry
    /// instead of rejecting the call.
    pub fn force_initialize<I, S>(
        &self,
        index_names: I,
        config: &dyn ConfigSource,
        transport_factory: &dyn TransportFactory,
        cache_provider: &dyn CacheProvider,
    ) -> Result<Arc<ConnectionRegistry>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(
            index_names,
            config,
            transport_factory,
            cache_provider,
            InitMode::Force,
        )
    }

    /// Check that every registered core exists on the server.
    ///
    /// Returns `Ok(false)` when the selector is not ready or a core is missing.
    pub async fn validate_setup(&self) -> Result<bool> {
        let snapshot = self.active.load_full();
        if snapshot.state != SelectorState::Ready {
            return Ok(false);
        }
        let registry = &snapshot.registry;
        let Some(admin) = registry.admin() else {
            return Ok(false);
        };

        for name in registry.names() {
            let status = admin.core_status(name).await?;
            if !status.present {
                warn!(core = name, "Search core is not present on the server");
                return Ok(false);
            }
        }
        info!(cores = registry.len(), "Search setup validated");
        Ok(true)
    }

    fn run<I, S>(
        &self,
        index_names: I,
        config: &dyn ConfigSource,
        transport_factory: &dyn TransportFactory,
        cache_provider: &dyn CacheProvider,
        mode: InitMode,
    ) -> Result<Arc<ConnectionRegistry>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let _single_flight = self
            .init_lock
            .lock()
            .map_err(|_| SearchConnectionError::internal("initialization lock poisoned"))?;

        let previous = self.active.load_full();
        let current = &previous.registry;
        match mode {
            InitMode::Guarded => guard_against_double_initialization(current)?,
            InitMode::Force if !current.is_empty() => {
                warn!(
                    active_indexes = current.len(),
                    "Forcing replacement of active search connections"
                );
            }
            InitMode::Force => {}
        }

        self.active.store(Snapshot::new(
            SelectorState::Initializing,
            previous.registry.clone(),
        ));
        let names: BTreeSet<String> = index_names.into_iter().map(Into::into).collect();

        match build_registry(&names, config, transport_factory, cache_provider) {
            Ok(registry) => {
                let registry = Arc::new(registry);
                self.active
                    .store(Snapshot::new(SelectorState::Ready, registry.clone()));
                info!(
                    indexes = ?registry.names(),
                    method = %registry.config().method,
                    timeout_millis = ?registry.config().timeout_millis,
                    cache_enabled = registry.config().cache_enabled,
                    "Published search connections"
                );
                Ok(registry)
            }
            Err(e) => {
                self.active.store(previous);
                error!(error = %e, "Search connection initialization failed");
                Err(e)
            }
        }
    }
}

impl Default for ConnectionSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a complete registry without publishing it.
fn build_registry(
    names: &BTreeSet<String>,
    config: &dyn ConfigSource,
    transport_factory: &dyn TransportFactory,
    cache_provider: &dyn CacheProvider,
) -> Result<ConnectionRegistry> {
    for name in names {
        validate_index_name(name)?;
    }

    let settings = ConnectionSettings::from_source(config)?;
    if !settings.enabled {
        return Err(SearchConnectionError::Disabled);
    }

    let mut connections = HashMap::with_capacity(names.len());
    for name in names {
        let target = IndexTarget::under(&settings.service_address, name.as_str());
        let connection =
            Connection::wire(target, settings.transport, transport_factory, cache_provider)?;
        connections.insert(name.clone(), connection);
    }

    let admin = CoreAdmin::build(
        &settings.service_address,
        settings.transport,
        transport_factory,
        cache_provider,
    )?;

    Ok(ConnectionRegistry::new(
        connections,
        Some(admin),
        settings.transport,
    ))
}
