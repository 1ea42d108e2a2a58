//! Utility functions for the search connector repository.

use std::collections::BTreeSet;

use search_connector_shared::RequestMethod;
use url::form_urlencoded;

use crate::errors::{Result, SearchConnectionError};

/// Form-encode query parameters, preserving their order.
///
/// # Example
///
/// ```
/// use search_connector_repository::utils::encode_params;
///
/// let params = vec![("q".to_string(), "title:rust & go".to_string())];
/// assert_eq!(encode_params(&params), "q=title%3Arust+%26+go");
/// ```
pub fn encode_params(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

/// Append encoded parameters to a URL as its query string.
pub fn with_query(url: &str, encoded: &str) -> String {
    if encoded.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, encoded)
}

/// Cache key for a query: the method, the endpoint and the encoded parameters.
///
/// The method is part of the key so GET and POST responses never alias.
pub fn cache_key(method: RequestMethod, endpoint: &str, encoded: &str) -> String {
    format!("{} {}?{}", method, endpoint, encoded)
}

/// Key prefixes covering every cached query against the index at `url`.
///
/// # Example
///
/// ```
/// use search_connector_repository::utils::{cache_key, index_cache_prefixes};
/// use search_connector_shared::RequestMethod;
///
/// let key = cache_key(RequestMethod::Get, "http://s/web/select", "q=a");
/// assert!(index_cache_prefixes("http://s/web").iter().any(|p| key.starts_with(p.as_str())));
/// assert!(!index_cache_prefixes("http://s/we").iter().any(|p| key.starts_with(p.as_str())));
/// ```
pub fn index_cache_prefixes(url: &str) -> Vec<String> {
    let url = url.trim_end_matches('/');
    [RequestMethod::Get, RequestMethod::Post]
        .into_iter()
        .flat_map(|method| ['/', '?'].map(|sep| format!("{} {}{}", method, url, sep)))
        .collect()
}

/// Parse a comma-separated list of index names.
///
/// Entries are trimmed and de-duplicated, and empty entries are skipped.
pub fn parse_index_names(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate an index name.
///
/// Names end up as a URL path segment, so they must be non-empty and free of
/// whitespace and `/`.
pub fn validate_index_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SearchConnectionError::configuration(
            "Index name cannot be empty",
        ));
    }
    if name.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(SearchConnectionError::configuration(format!(
            "Index name '{}' contains whitespace or '/'",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("http://s/core/select", ""), "http://s/core/select");
        assert_eq!(with_query("http://s/core/select", "q=a"), "http://s/core/select?q=a");
        assert_eq!(with_query("http://s/core/select?wt=json", "q=a"), "http://s/core/select?wt=json&q=a");
    }

    #[test]
    fn test_cache_key_includes_method() {
        let get = cache_key(RequestMethod::Get, "http://s/core/select", "q=a");
        let post = cache_key(RequestMethod::Post, "http://s/core/select", "q=a");
        assert_eq!(get, "GET http://s/core/select?q=a");
        assert_ne!(get, post);
    }

    #[test]
    fn test_parse_index_names() {
        let names = parse_index_names(" web, master ,,web,core ");
        let names: Vec<_> = names.into_iter().collect();
        assert_eq!(names, vec!["core", "master", "web"]);
        assert!(parse_index_names("").is_empty());
    }

    #[test]
    fn test_validate_index_name() {
        assert!(validate_index_name("sitecore_web_index").is_ok());
        assert!(validate_index_name("").is_err());
        assert!(validate_index_name("bad name").is_err());
        assert!(validate_index_name("a/b").is_err());
    }
}
