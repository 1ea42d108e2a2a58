//! Mock transport collaborators for testing and local development.
//!
//! [`MockTransport`] records every request and answers with a configurable
//! canned response, honouring `If-None-Match` against the response's entity
//! tag. [`MockTransportFactory`] hands out a shared mock (or one per index)
//! and [`MockCacheProvider`] hands out a shared in-memory cache. Both can be
//! told to fail for specific index names.
//!
//! # Example
//!
//! ```ignore
//! use search_connector_repository::mock::{MockTransport, MockTransportFactory};
//! use search_connector_shared::HttpResponse;
//!
//! let transport = Arc::new(MockTransport::new());
//! transport.respond_with(HttpResponse::new(200, "{}"));
//! let factory = MockTransportFactory::with_transport(transport.clone()).fail_for("broken");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use search_connector_shared::{
    HttpRequest, HttpResponse, IndexTarget, IF_NONE_MATCH, NOT_MODIFIED,
};

use crate::errors::{Result, SearchConnectionError};
use crate::http::InMemoryResponseCache;
use crate::interfaces::{
    CacheHandle, CacheProvider, Transport, TransportFactory, TransportHandle,
};

/// Transport that records requests instead of sending them.
pub struct MockTransport {
    requests: Mutex<Vec<HttpRequest>>,
    default_response: Mutex<HttpResponse>,
    /// Responses keyed by URL prefix, checked before the default.
    routes: Mutex<Vec<(String, HttpResponse)>>,
    fail_with: Mutex<Option<SearchConnectionError>>,
}

impl MockTransport {
    /// A mock answering `200 {}` to everything.
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(HttpResponse::new(200, "{}")),
            routes: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    /// Replace the default response.
    pub fn respond_with(&self, response: HttpResponse) {
        *self.default_response.lock().unwrap() = response;
    }

    /// Answer requests whose URL starts with `prefix` with `response`.
    pub fn route(&self, prefix: impl Into<String>, response: HttpResponse) {
        self.routes.lock().unwrap().push((prefix.into(), response));
    }

    /// Fail every subsequent request with `error`.
    pub fn fail_with(&self, error: SearchConnectionError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let routed = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone());
        let if_none_match = request.header(IF_NONE_MATCH).map(str::to_string);
        self.requests.lock().unwrap().push(request);

        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        let response = routed.unwrap_or_else(|| self.default_response.lock().unwrap().clone());
        let unchanged = matches!(
            (if_none_match.as_deref(), response.etag()),
            (Some(expected), Some(current)) if expected == current
        );
        if unchanged {
            return Ok(HttpResponse::new(NOT_MODIFIED, Vec::new()));
        }
        Ok(response)
    }
}

/// Factory handing out mock transports.
pub struct MockTransportFactory {
    shared: Option<Arc<MockTransport>>,
    per_index: Mutex<HashMap<String, Arc<MockTransport>>>,
    failing: HashSet<String>,
    created: Mutex<Vec<String>>,
}

impl MockTransportFactory {
    /// A factory creating one fresh mock per index.
    pub fn new() -> Self {
        Self {
            shared: None,
            per_index: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            created: Mutex::new(Vec::new()),
        }
    }

    /// A factory handing the same mock to every index.
    pub fn with_transport(transport: Arc<MockTransport>) -> Self {
        Self {
            shared: Some(transport),
            ..Self::new()
        }
    }

    /// Fail creation for the named index.
    pub fn fail_for(mut self, index: impl Into<String>) -> Self {
        self.failing.insert(index.into());
        self
    }

    /// The mock created for `index`, when not using a shared mock.
    pub fn transport_for(&self, index: &str) -> Option<Arc<MockTransport>> {
        self.per_index.lock().unwrap().get(index).cloned()
    }

    /// Index names a transport was created for, in call order.
    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

impl Default for MockTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&self, target: &IndexTarget) -> Result<TransportHandle> {
        if self.failing.contains(&target.name) {
            return Err(SearchConnectionError::transport_construction(
                &target.name,
                "mock transport failure",
            ));
        }
        self.created.lock().unwrap().push(target.name.clone());

        let transport = match &self.shared {
            Some(shared) => shared.clone(),
            None => self
                .per_index
                .lock()
                .unwrap()
                .entry(target.name.clone())
                .or_insert_with(|| Arc::new(MockTransport::new()))
                .clone(),
        };
        let handle: TransportHandle = transport;
        Ok(handle)
    }
}

/// Cache provider handing one shared in-memory cache to every index.
pub struct MockCacheProvider {
    cache: CacheHandle,
    failing: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl MockCacheProvider {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(InMemoryResponseCache::new()),
            failing: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Fail cache creation for the named index.
    pub fn fail_for(mut self, index: impl Into<String>) -> Self {
        self.failing.insert(index.into());
        self
    }

    /// The cache handed out to every index.
    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    /// Index names a cache was requested for, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheProvider for MockCacheProvider {
    fn create(&self, target: &IndexTarget) -> Result<CacheHandle> {
        self.requested.lock().unwrap().push(target.name.clone());
        if self.failing.contains(&target.name) {
            return Err(SearchConnectionError::internal("mock cache failure"));
        }
        Ok(self.cache.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_matching_etag_answers_not_modified() {
        let transport = MockTransport::new();
        transport.respond_with(HttpResponse::new(200, "{}").with_header("ETag", "\"v1\""));

        let fresh = transport.send(HttpRequest::get("http://s/a")).await.unwrap();
        assert_eq!(fresh.status, 200);

        let revalidated = transport
            .send(HttpRequest::get("http://s/a").with_header(IF_NONE_MATCH, "\"v1\""))
            .await
            .unwrap();
        assert_eq!(revalidated.status, NOT_MODIFIED);

        let stale = transport
            .send(HttpRequest::get("http://s/a").with_header(IF_NONE_MATCH, "\"v0\""))
            .await
            .unwrap();
        assert_eq!(stale.status, 200);
    }

    #[test]
    fn test_cache_provider_failure() {
        let provider = MockCacheProvider::new().fail_for("b");
        assert!(provider.create(&IndexTarget::new("a", "http://s/a")).is_ok());
        assert!(provider.create(&IndexTarget::new("b", "http://s/b")).is_err());
        assert_eq!(provider.requested(), vec!["a", "b"]);
    }
}
