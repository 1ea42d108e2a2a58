//! Interface definitions for the collaborators a connection is wired from.
//!
//! The selector never reaches for ambient global state: configuration,
//! transports and caches are all injected through these traits so the
//! production implementations can be swapped for mocks in tests.

mod cache;
mod config_source;
mod transport;

pub use cache::{CacheHandle, CacheProvider, ResponseCache};
pub use config_source::ConfigSource;
pub use transport::{Transport, TransportFactory, TransportHandle};
