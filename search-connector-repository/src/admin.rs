//! Core administration client.
//!
//! Talks to the service address itself rather than to a core, and is used to
//! check that every configured core actually exists on the server.

use std::collections::HashMap;

use search_connector_shared::{IndexTarget, RequestMethod, TransportConfig};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::connection::Connection;
use crate::errors::Result;
use crate::interfaces::{CacheProvider, TransportFactory};

/// Target name the core admin is created under.
pub const CORE_ADMIN_TARGET: &str = "_core_admin";

/// Path of the cores admin handler, relative to the service address.
pub const CORES_ADMIN_PATH: &str = "admin/cores";

/// Status of one core as reported by the admin handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStatus {
    pub core: String,
    /// The server knows the core.
    pub present: bool,
    pub instance_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: HashMap<String, StatusEntry>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    name: Option<String>,
    #[serde(rename = "instanceDir")]
    instance_dir: Option<String>,
}

/// Admin connection bound to the bare service address.
#[derive(Debug, Clone)]
pub struct CoreAdmin {
    connection: Connection,
}

impl CoreAdmin {
    /// Wire the admin connection.
    ///
    /// Always uses GET and never caches. The timeout follows `config`.
    pub fn build(
        service_address: &str,
        config: TransportConfig,
        transport_factory: &dyn TransportFactory,
        cache_provider: &dyn CacheProvider,
    ) -> Result<Self> {
        let config = TransportConfig {
            method: RequestMethod::Get,
            cache_enabled: false,
            ..config
        };
        let target = IndexTarget::new(CORE_ADMIN_TARGET, service_address.trim_end_matches('/'));
        let connection = Connection::wire(target, config, transport_factory, cache_provider)?;
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Ask the server for the status of `core`.
    ///
    /// # Returns
    ///
    /// * `Ok(CoreStatus)` - `present` is false when the server does not know the core
    /// * `Err(SearchConnectionError::RequestError)` - If the request fails
    /// * `Err(SearchConnectionError::ParseError)` - If the body is not a status response
    #[instrument(skip(self))]
    pub async fn core_status(&self, core: &str) -> Result<CoreStatus> {
        let params = vec![
            ("action".to_string(), "STATUS".to_string()),
            ("core".to_string(), core.to_string()),
            ("wt".to_string(), "json".to_string()),
        ];
        let response = self.connection.query(CORES_ADMIN_PATH, &params).await?;
        let status = parse_status(core, &response.body)?;
        debug!(core, present = status.present, "Fetched core status");
        Ok(status)
    }
}

/// Parse a cores admin STATUS body for `core`.
pub fn parse_status(core: &str, body: &[u8]) -> Result<CoreStatus> {
    let mut parsed: StatusResponse = serde_json::from_slice(body)?;
    let entry = parsed.status.remove(core);
    let present = entry.as_ref().is_some_and(|e| e.name.is_some());
    Ok(CoreStatus {
        core: core.to_string(),
        present,
        instance_dir: entry.and_then(|e| e.instance_dir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchConnectionError;
    use crate::http::SharedCacheProvider;
    use crate::mock::{MockTransport, MockTransportFactory};
    use search_connector_shared::HttpResponse;
    use std::sync::Arc;

    const PRESENT: &str = r#"{"responseHeader":{"status":0},"status":{"web":{"name":"web","instanceDir":"/var/solr/web"}}}"#;
    const MISSING: &str = r#"{"responseHeader":{"status":0},"status":{"web":{}}}"#;

    #[test]
    fn test_parse_present() {
        let status = parse_status("web", PRESENT.as_bytes()).unwrap();
        assert!(status.present);
        assert_eq!(status.instance_dir.as_deref(), Some("/var/solr/web"));
    }

    #[test]
    fn test_parse_missing() {
        assert!(!parse_status("web", MISSING.as_bytes()).unwrap().present);
        assert!(!parse_status("other", PRESENT.as_bytes()).unwrap().present);
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_status("web", b"<html>").unwrap_err();
        assert!(matches!(err, SearchConnectionError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_core_status_request() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(HttpResponse::new(200, PRESENT));
        let factory = MockTransportFactory::with_transport(transport.clone());
        let config = TransportConfig::new(RequestMethod::Post, Some(250), false);
        let admin = CoreAdmin::build(
            "http://localhost:8983/solr/",
            config,
            &factory,
            &SharedCacheProvider::in_memory(),
        )
        .unwrap();

        assert_eq!(admin.connection().method(), RequestMethod::Get);
        assert!(admin.core_status("web").await.unwrap().present);

        let sent = transport.requests();
        assert_eq!(
            sent[0].url,
            "http://localhost:8983/solr/admin/cores?action=STATUS&core=web&wt=json"
        );
        assert_eq!(sent[0].timeout, Some(std::time::Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn test_core_status_is_never_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(HttpResponse::new(200, MISSING).with_header("ETag", "\"1\""));
        let factory = MockTransportFactory::with_transport(transport.clone());
        let provider = SharedCacheProvider::in_memory();
        let config = TransportConfig::new(RequestMethod::Get, None, true);
        let admin =
            CoreAdmin::build("http://localhost:8983/solr", config, &factory, &provider).unwrap();

        assert!(admin.connection().cache().is_none());
        assert!(!admin.core_status("web").await.unwrap().present);

        transport.respond_with(HttpResponse::new(200, PRESENT));
        assert!(admin.core_status("web").await.unwrap().present);
        assert_eq!(transport.requests().len(), 2);
    }
}
