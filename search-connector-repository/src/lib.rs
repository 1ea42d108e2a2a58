//! # Search Connector Repository
//!
//! This crate builds and publishes the connections used to talk to search
//! cores. It includes the collaborator traits connections are wired from
//! (configuration, transport, response cache), their production
//! implementations, and the [`ConnectionSelector`] that owns the active
//! [`ConnectionRegistry`].

pub mod admin;
pub mod config;
pub mod connection;
pub mod errors;
pub mod http;
pub mod interfaces;
pub mod mock;
pub mod registry;
pub mod selector;
pub mod settings;
pub mod utils;

pub use admin::{CoreAdmin, CoreStatus};
pub use config::{EnvConfigSource, MapConfigSource};
pub use connection::{build_connection, Connection};
pub use errors::{Result, SearchConnectionError};
pub use http::{InMemoryResponseCache, ReqwestTransportFactory, SharedCacheProvider, TransportOptions};
pub use interfaces::{
    CacheHandle, CacheProvider, ConfigSource, ResponseCache, Transport, TransportFactory,
    TransportHandle,
};
pub use registry::ConnectionRegistry;
pub use selector::{
    guard_against_double_initialization, resolve_method, ConnectionSelector, SelectorState,
};
pub use settings::ConnectionSettings;
