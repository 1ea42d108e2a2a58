//! A named search index and the URL it is served from.

use serde::{Deserialize, Serialize};

/// One configured search index ("core") and its base URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IndexTarget {
    /// Index name, unique within a registry.
    pub name: String,
    /// Base URL of the index, e.g. `http://localhost:8983/solr/web_index`.
    pub url: String,
}

impl IndexTarget {
    /// Create a target from an explicit name and URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Create a target whose URL is `<service_address>/<name>`.
    ///
    /// Trailing slashes on `service_address` are dropped first so the join
    /// never produces `//`.
    ///
    /// # Example
    ///
    /// ```
    /// use search_connector_shared::IndexTarget;
    ///
    /// let target = IndexTarget::under("http://localhost:8983/solr/", "web_index");
    /// assert_eq!(target.url, "http://localhost:8983/solr/web_index");
    /// ```
    pub fn under(service_address: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let url = format!("{}/{}", service_address.trim_end_matches('/'), name);
        Self { name, url }
    }

    /// Join a request path onto the target URL.
    ///
    /// An empty path yields the target URL itself.
    pub fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.url.clone()
        } else {
            format!("{}/{}", self.url.trim_end_matches('/'), path)
        }
    }
}
