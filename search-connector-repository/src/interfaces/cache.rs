//! Response cache trait definitions.

use std::sync::Arc;

use search_connector_shared::{HttpResponse, IndexTarget};

use crate::errors::Result;

/// Caches query responses by key.
///
/// Entries are revalidated against the server before reuse, so a cache only
/// ever holds responses that carry an entity tag.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<HttpResponse>;

    fn put(&self, key: &str, response: HttpResponse);

    fn remove(&self, key: &str);

    /// Drop every entry whose key starts with `prefix`. Returns the number removed.
    fn remove_prefix(&self, prefix: &str) -> usize;
}

/// Shared handle to a response cache.
pub type CacheHandle = Arc<dyn ResponseCache>;

/// Produces the response cache for each index.
///
/// Only consulted when caching is enabled.
pub trait CacheProvider: Send + Sync {
    fn create(&self, target: &IndexTarget) -> Result<CacheHandle>;
}
