//! Configuration sources.
//!
//! [`EnvConfigSource`] reads the process environment and is what the binary
//! uses. [`MapConfigSource`] holds settings in memory for tests and for
//! embedders that load settings from elsewhere.

use std::collections::HashMap;
use std::env;

use crate::interfaces::ConfigSource;

/// Reads settings from environment variables.
///
/// An optional prefix is prepended to every setting name, so
/// `EnvConfigSource::with_prefix("APP_")` resolves `SOLR_CORES` from
/// `APP_SOLR_CORES`.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigSource {
    prefix: String,
}

impl EnvConfigSource {
    /// Create a source reading unprefixed variable names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source reading `<prefix><name>` variables.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl ConfigSource for EnvConfigSource {
    fn get_string(&self, name: &str) -> Option<String> {
        env::var(format!("{}{}", self.prefix, name)).ok()
    }
}

/// Settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set or replace a setting.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove a setting.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }
}

impl<K, V> FromIterator<(K, V)> for MapConfigSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapConfigSource {
    fn get_string(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
