//! Production implementations of the transport and cache collaborators.
//!
//! [`ReqwestTransportFactory`] hands every index the same pooled
//! `reqwest::Client`. [`SharedCacheProvider`] hands every index the same
//! [`InMemoryResponseCache`].

mod memory_cache;
mod reqwest_transport;

pub use memory_cache::{InMemoryResponseCache, SharedCacheProvider};
pub use reqwest_transport::{ReqwestTransport, ReqwestTransportFactory, TransportOptions};
