//! Connections to a single search core.
//!
//! A [`Connection`] is pure wiring: the target, the shared transport settings,
//! a transport handle and an optional cache handle. Building one performs no
//! I/O. Requests go out only when [`Connection::query`] or
//! [`Connection::post`] is awaited.

use std::fmt;
use std::time::Duration;

use search_connector_shared::{
    HttpRequest, HttpResponse, IndexTarget, RequestMethod, TransportConfig, FORM_CONTENT_TYPE,
    IF_NONE_MATCH, NOT_MODIFIED,
};
use tracing::{debug, instrument, trace};

use crate::errors::{Result, SearchConnectionError};
use crate::interfaces::{CacheHandle, CacheProvider, TransportFactory, TransportHandle};
use crate::utils::{cache_key, encode_params, index_cache_prefixes, with_query};

/// A configured connection to one search core.
#[derive(Clone)]
pub struct Connection {
    target: IndexTarget,
    config: TransportConfig,
    transport: TransportHandle,
    cache: Option<CacheHandle>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("target", &self.target)
            .field("config", &self.config)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

/// Build the connection for one index.
///
/// The transport always comes from `transport_factory`. A cache is requested
/// from `cache_provider` only when `cache_enabled` is true; otherwise the
/// connection has no cache at all. A positive `timeout_millis` becomes the
/// per-request timeout; zero, negative or `None` keeps the transport default.
///
/// # Returns
///
/// * `Ok(Connection)` - The wired connection
/// * `Err(SearchConnectionError::TransportConstruction)` - If the factory or
///   the provider fails, attributed to `target.name`
pub fn build_connection(
    target: IndexTarget,
    method: RequestMethod,
    cache_enabled: bool,
    timeout_millis: Option<i64>,
    transport_factory: &dyn TransportFactory,
    cache_provider: &dyn CacheProvider,
) -> Result<Connection> {
    let config = TransportConfig::new(method, timeout_millis, cache_enabled);
    Connection::wire(target, config, transport_factory, cache_provider)
}

impl Connection {
    /// Build a connection from an already resolved [`TransportConfig`].
    pub fn wire(
        target: IndexTarget,
        config: TransportConfig,
        transport_factory: &dyn TransportFactory,
        cache_provider: &dyn CacheProvider,
    ) -> Result<Self> {
        let transport = transport_factory
            .create(&target)
            .map_err(|e| attribute(&target, e))?;

        let cache = if config.cache_enabled {
            Some(
                cache_provider
                    .create(&target)
                    .map_err(|e| attribute(&target, e))?,
            )
        } else {
            None
        };

        debug!(
            index = %target.name,
            url = %target.url,
            method = %config.method,
            timeout_millis = ?config.timeout_millis,
            cache = cache.is_some(),
            "Built search connection"
        );

        Ok(Self {
            target,
            config,
            transport,
            cache,
        })
    }

    /// Create a connection from handles directly.
    pub fn from_parts(
        target: IndexTarget,
        config: TransportConfig,
        transport: TransportHandle,
        cache: Option<CacheHandle>,
    ) -> Self {
        Self {
            target,
            config,
            transport,
            cache,
        }
    }

    pub fn target(&self) -> &IndexTarget {
        &self.target
    }

    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn url(&self) -> &str {
        &self.target.url
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn method(&self) -> RequestMethod {
        self.config.method
    }

    /// The timeout override, or `None` for the transport default.
    pub fn timeout(&self) -> Option<Duration> {
        self.config.timeout()
    }

    pub fn transport(&self) -> &TransportHandle {
        &self.transport
    }

    /// The cache handle. `None` when caching is disabled.
    pub fn cache(&self) -> Option<&CacheHandle> {
        self.cache.as_ref()
    }

    /// Shape a query request without sending it.
    ///
    /// GET puts the encoded parameters in the query string. POST sends them
    /// as a form-encoded body to the bare endpoint.
    pub fn prepare_query(&self, path: &str, params: &[(String, String)]) -> HttpRequest {
        let endpoint = self.target.endpoint(path);
        let encoded = encode_params(params);
        let request = match self.config.method {
            RequestMethod::Get => HttpRequest::get(with_query(&endpoint, &encoded)),
            RequestMethod::Post => {
                HttpRequest::post(endpoint, FORM_CONTENT_TYPE, encoded.into_bytes())
            }
        };
        request.with_timeout(self.timeout())
    }

    /// Submit a query, going through the cache when there is one.
    ///
    /// A cached response is never served blindly: its entity tag is sent as
    /// `If-None-Match` and the cached body is reused only on `304`. Responses
    /// without an entity tag are not cached.
    ///
    /// # Returns
    ///
    /// * `Ok(HttpResponse)` - A 2xx response, possibly revalidated from the cache
    /// * `Err(SearchConnectionError::RequestError)` - If the transport fails or
    ///   the status is not 2xx
    #[instrument(skip(self, params), fields(index = %self.target.name, method = %self.config.method))]
    pub async fn query(&self, path: &str, params: &[(String, String)]) -> Result<HttpResponse> {
        let Some(cache) = &self.cache else {
            let response = self.transport.send(self.prepare_query(path, params)).await?;
            return ensure_success(response);
        };

        let key = cache_key(
            self.config.method,
            &self.target.endpoint(path),
            &encode_params(params),
        );
        let cached = cache.get(&key);
        let had_cached = cached.is_some();

        let mut request = self.prepare_query(path, params);
        if let Some(etag) = cached.as_ref().and_then(HttpResponse::etag) {
            request = request.with_header(IF_NONE_MATCH, etag);
        }

        let response = self.transport.send(request).await?;
        if response.status == NOT_MODIFIED {
            if let Some(hit) = cached {
                trace!(key = %key, "Cached response revalidated");
                return Ok(hit);
            }
        }

        let response = ensure_success(response)?;
        if response.etag().is_some() {
            cache.put(&key, response.clone());
        } else if had_cached {
            cache.remove(&key);
        }

        Ok(response)
    }

    /// Send a write (update, delete, commit). Always POST, never cached.
    ///
    /// Cached queries against this index are dropped once the write has been
    /// sent, whatever its status.
    #[instrument(skip(self, body), fields(index = %self.target.name))]
    pub async fn post(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<HttpResponse> {
        let request = HttpRequest::post(self.target.endpoint(path), content_type, body)
            .with_timeout(self.timeout());
        let response = self.transport.send(request).await;
        self.invalidate_cached_queries();
        ensure_success(response?)
    }

    /// Drop every cached query against this index.
    pub fn invalidate_cached_queries(&self) {
        if let Some(cache) = &self.cache {
            let removed: usize = index_cache_prefixes(&self.target.url)
                .iter()
                .map(|prefix| cache.remove_prefix(prefix))
                .sum();
            if removed > 0 {
                debug!(index = %self.target.name, removed, "Invalidated cached queries");
            }
        }
    }
}

fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(SearchConnectionError::status(response.status, response.text()))
    }
}

/// Attribute a collaborator failure to the index it happened for.
fn attribute(target: &IndexTarget, err: SearchConnectionError) -> SearchConnectionError {
    match err {
        e @ SearchConnectionError::TransportConstruction { .. } => e,
        other => SearchConnectionError::transport_construction(&target.name, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::SharedCacheProvider;
    use crate::mock::{MockTransport, MockTransportFactory};
    use std::sync::Arc;

    fn target() -> IndexTarget {
        IndexTarget::under("http://localhost:8983/solr", "web")
    }

    fn params() -> Vec<(String, String)> {
        vec![
            ("q".to_string(), "title:rust".to_string()),
            ("rows".to_string(), "10".to_string()),
        ]
    }

    #[test]
    fn test_get_query_shape() {
        let factory = MockTransportFactory::new();
        let conn = build_connection(
            target(),
            RequestMethod::Get,
            false,
            None,
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap();

        let request = conn.prepare_query("select", &params());
        assert_eq!(request.method, RequestMethod::Get);
        assert_eq!(
            request.url,
            "http://localhost:8983/solr/web/select?q=title%3Arust&rows=10"
        );
        assert!(request.body.is_none());
        assert_eq!(request.timeout, None);
    }

    #[test]
    fn test_post_query_shape() {
        let factory = MockTransportFactory::new();
        let conn = build_connection(
            target(),
            RequestMethod::Post,
            false,
            Some(1500),
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap();

        let request = conn.prepare_query("select", &params());
        assert_eq!(request.method, RequestMethod::Post);
        assert_eq!(request.url, "http://localhost:8983/solr/web/select");
        assert_eq!(request.header("Content-Type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            request.body.as_deref(),
            Some(&b"q=title%3Arust&rows=10"[..])
        );
        assert_eq!(request.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_cache_absent_when_disabled() {
        let factory = MockTransportFactory::new();
        let conn = build_connection(
            target(),
            RequestMethod::Get,
            false,
            None,
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap();
        assert!(conn.cache().is_none());
    }

    #[test]
    fn test_cache_from_provider_when_enabled() {
        let factory = MockTransportFactory::new();
        let provider = SharedCacheProvider::in_memory();
        let conn = build_connection(target(), RequestMethod::Get, true, None, &factory, &provider)
            .unwrap();
        assert!(Arc::ptr_eq(conn.cache().unwrap(), provider.cache()));
    }

    #[test]
    fn test_non_positive_timeout_uses_default() {
        let factory = MockTransportFactory::new();
        let provider = SharedCacheProvider::in_memory();
        for timeout in [Some(0), Some(-5), None] {
            let conn =
                build_connection(target(), RequestMethod::Get, false, timeout, &factory, &provider)
                    .unwrap();
            assert_eq!(conn.timeout(), None);
        }
    }

    #[test]
    fn test_factory_failure_names_index() {
        let factory = MockTransportFactory::new().fail_for("web");
        let err = build_connection(
            target(),
            RequestMethod::Get,
            false,
            None,
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap_err();
        assert_eq!(err.index(), Some("web"));
    }

    #[test]
    fn test_construction_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let factory = MockTransportFactory::with_transport(transport.clone());
        build_connection(
            target(),
            RequestMethod::Post,
            true,
            Some(100),
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap();
        assert!(transport.requests().is_empty());
    }

    fn cached_connection(transport: &Arc<MockTransport>, method: RequestMethod) -> Connection {
        let factory = MockTransportFactory::with_transport(transport.clone());
        build_connection(
            target(),
            method,
            true,
            None,
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_query_revalidates_cached_response() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(
            HttpResponse::new(200, "{\"response\":{}}").with_header("ETag", "\"v1\""),
        );
        let conn = cached_connection(&transport, RequestMethod::Post);

        let first = conn.query("select", &params()).await.unwrap();
        let second = conn.query("select", &params()).await.unwrap();

        assert_eq!(first, second);
        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].method, RequestMethod::Post);
        assert_eq!(sent[0].header(IF_NONE_MATCH), None);
        assert_eq!(sent[1].header(IF_NONE_MATCH), Some("\"v1\""));
    }

    #[tokio::test]
    async fn test_changed_etag_replaces_cached_response() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(HttpResponse::new(200, "old").with_header("ETag", "\"v1\""));
        let conn = cached_connection(&transport, RequestMethod::Get);
        conn.query("select", &params()).await.unwrap();

        transport.respond_with(HttpResponse::new(200, "new").with_header("ETag", "\"v2\""));
        assert_eq!(conn.query("select", &params()).await.unwrap().text(), "new");

        let third = conn.query("select", &params()).await.unwrap();
        assert_eq!(third.text(), "new");
        assert_eq!(transport.requests()[2].header(IF_NONE_MATCH), Some("\"v2\""));
    }

    #[tokio::test]
    async fn test_response_without_etag_not_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(HttpResponse::new(200, "{}"));
        let provider = SharedCacheProvider::in_memory();
        let factory = MockTransportFactory::with_transport(transport.clone());
        let conn = build_connection(target(), RequestMethod::Get, true, None, &factory, &provider)
            .unwrap();

        conn.query("select", &params()).await.unwrap();
        conn.query("select", &params()).await.unwrap();

        let key = cache_key(
            RequestMethod::Get,
            "http://localhost:8983/solr/web/select",
            &encode_params(&params()),
        );
        assert!(provider.cache().get(&key).is_none());
        assert!(transport
            .requests()
            .iter()
            .all(|r| r.header(IF_NONE_MATCH).is_none()));
    }

    #[tokio::test]
    async fn test_write_invalidates_cached_queries() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(
            HttpResponse::new(200, r#"{"response":{"numFound":0}}"#).with_header("ETag", "\"0\""),
        );
        let conn = cached_connection(&transport, RequestMethod::Get);
        assert!(conn.query("select", &params()).await.unwrap().text().contains("\"numFound\":0"));

        conn.post("update", "application/json", b"[{\"id\":\"1\"}]".to_vec())
            .await
            .unwrap();

        // The server still reports the old tag: only an uncached request sees the new body.
        transport.respond_with(
            HttpResponse::new(200, r#"{"response":{"numFound":1}}"#).with_header("ETag", "\"0\""),
        );
        let after = conn.query("select", &params()).await.unwrap();
        assert!(after.text().contains("\"numFound\":1"));

        let sent = transport.requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].header(IF_NONE_MATCH), None);
    }

    #[tokio::test]
    async fn test_write_leaves_other_indexes_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(HttpResponse::new(200, "{}").with_header("ETag", "\"1\""));
        let factory = MockTransportFactory::with_transport(transport.clone());
        let provider = SharedCacheProvider::in_memory();
        let web = build_connection(target(), RequestMethod::Get, true, None, &factory, &provider)
            .unwrap();
        let master = build_connection(
            IndexTarget::under("http://localhost:8983/solr", "web_master"),
            RequestMethod::Get,
            true,
            None,
            &factory,
            &provider,
        )
        .unwrap();

        master.query("select", &params()).await.unwrap();
        web.post("update", "application/json", b"[]".to_vec())
            .await
            .unwrap();

        let key = cache_key(
            RequestMethod::Get,
            "http://localhost:8983/solr/web_master/select",
            &encode_params(&params()),
        );
        assert!(provider.cache().get(&key).is_some());
    }

    #[tokio::test]
    async fn test_query_without_cache_always_sends() {
        let transport = Arc::new(MockTransport::new());
        let factory = MockTransportFactory::with_transport(transport.clone());
        let conn = build_connection(
            target(),
            RequestMethod::Get,
            false,
            None,
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap();

        conn.query("select", &params()).await.unwrap();
        conn.query("select", &params()).await.unwrap();
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_error_status_not_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(HttpResponse::new(500, "boom").with_header("ETag", "\"e\""));
        let factory = MockTransportFactory::with_transport(transport.clone());
        let provider = SharedCacheProvider::in_memory();
        let conn = build_connection(target(), RequestMethod::Get, true, None, &factory, &provider)
            .unwrap();

        let err = conn.query("select", &params()).await.unwrap_err();
        assert!(matches!(
            err,
            SearchConnectionError::RequestError {
                status: Some(500),
                ..
            }
        ));

        transport.respond_with(HttpResponse::new(200, "ok"));
        let ok = conn.query("select", &params()).await.unwrap();
        assert_eq!(ok.text(), "ok");
        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].header(IF_NONE_MATCH), None);
    }

    #[tokio::test]
    async fn test_post_write() {
        let transport = Arc::new(MockTransport::new());
        let factory = MockTransportFactory::with_transport(transport.clone());
        let conn = build_connection(
            target(),
            RequestMethod::Get,
            true,
            None,
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap();

        conn.post("update", "application/json", b"[]".to_vec())
            .await
            .unwrap();
        let sent = transport.requests();
        assert_eq!(sent[0].method, RequestMethod::Post);
        assert_eq!(sent[0].url, "http://localhost:8983/solr/web/update");
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
    }
}
