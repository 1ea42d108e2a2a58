//! The published set of connections.

use std::collections::HashMap;

use search_connector_shared::TransportConfig;

use crate::admin::CoreAdmin;
use crate::connection::Connection;

/// Connections keyed by index name, plus the core admin built alongside them.
///
/// Immutable once built. Re-initialization publishes a new registry rather
/// than mutating this one.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, Connection>,
    admin: Option<CoreAdmin>,
    config: TransportConfig,
}

impl ConnectionRegistry {
    /// The registry active before any initialization.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        connections: HashMap<String, Connection>,
        admin: Option<CoreAdmin>,
        config: TransportConfig,
    ) -> Self {
        Self {
            connections,
            admin,
            config,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Connection> {
        self.connections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Index names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Connection)> {
        self.connections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The core admin bound to the bare service address.
    pub fn admin(&self) -> Option<&CoreAdmin> {
        self.admin.as_ref()
    }

    /// The transport settings every connection was built with.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}
