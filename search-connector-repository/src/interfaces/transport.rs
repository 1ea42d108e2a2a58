//! Transport trait definitions.

use std::sync::Arc;

use async_trait::async_trait;
use search_connector_shared::{HttpRequest, HttpResponse, IndexTarget};

use crate::errors::Result;

/// Issues HTTP requests on behalf of a connection.
///
/// Connection pooling, proxying and TLS are the implementation's concern; a
/// connection only hands it fully shaped requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response, whatever its status.
    ///
    /// Errors are reserved for requests that produced no response at all
    /// (connect failures, timeouts).
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Shared handle to a transport.
pub type TransportHandle = Arc<dyn Transport>;

/// Produces the transport for each index.
///
/// Called once per index during initialization. A failure aborts the whole
/// initialization.
pub trait TransportFactory: Send + Sync {
    fn create(&self, target: &IndexTarget) -> Result<TransportHandle>;
}
