//! Transport backed by `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use search_connector_shared::{HttpRequest, HttpResponse, IndexTarget, RequestMethod};
use tracing::{debug, info};

use crate::errors::{Result, SearchConnectionError};
use crate::interfaces::{Transport, TransportFactory, TransportHandle};

/// Client-wide options for the reqwest transport.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Timeout applied when a request carries no override.
    pub default_timeout: Option<Duration>,
    /// Bypass any system proxy.
    pub disable_proxy: bool,
}

/// Sends requests through a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
        };

        debug!(method = %request.method, url = %request.url, "Sending search request");

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Creates one pooled client up front and shares it with every index.
pub struct ReqwestTransportFactory {
    transport: Arc<ReqwestTransport>,
}

impl ReqwestTransportFactory {
    /// Build the shared client.
    ///
    /// # Returns
    ///
    /// * `Ok(ReqwestTransportFactory)` - A factory holding the pooled client
    /// * `Err(SearchConnectionError::ConfigurationError)` - If the client cannot be built
    pub fn new(options: TransportOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.default_timeout {
            builder = builder.timeout(timeout);
        }
        if options.disable_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|e| {
            SearchConnectionError::configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        info!(
            default_timeout = ?options.default_timeout,
            disable_proxy = options.disable_proxy,
            "Created HTTP transport"
        );

        Ok(Self::from_client(client))
    }

    /// Share an existing client.
    pub fn from_client(client: Client) -> Self {
        Self {
            transport: Arc::new(ReqwestTransport::new(client)),
        }
    }
}

impl TransportFactory for ReqwestTransportFactory {
    fn create(&self, _target: &IndexTarget) -> Result<TransportHandle> {
        let transport: TransportHandle = self.transport.clone();
        Ok(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_shares_one_transport() {
        let factory = ReqwestTransportFactory::new(TransportOptions {
            default_timeout: Some(Duration::from_secs(5)),
            disable_proxy: true,
        })
        .unwrap();
        let a = factory.create(&IndexTarget::new("a", "http://s/a")).unwrap();
        let b = factory.create(&IndexTarget::new("b", "http://s/b")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let factory = ReqwestTransportFactory::new(TransportOptions {
            default_timeout: Some(Duration::from_millis(500)),
            disable_proxy: true,
        })
        .unwrap();
        let transport = factory.create(&IndexTarget::new("a", "http://127.0.0.1:9/a")).unwrap();

        let err = transport
            .send(HttpRequest::get("http://127.0.0.1:9/a/select"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchConnectionError::RequestError { status: None, .. }));
    }
}
