//! HTTP method used to submit queries to a search core.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The HTTP method a connection uses for query submissions.
///
/// `Get` sends parameters in the query string. `Post` sends them as a
/// form-encoded body, which avoids URL length limits on large queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestMethod {
    /// Parameters in the query string. This is the default.
    #[default]
    Get,
    /// Parameters in a form-encoded request body.
    Post,
}

impl RequestMethod {
    /// Parse a method preference.
    ///
    /// Only a case-insensitive `"post"` (surrounding whitespace ignored) selects
    /// `Post`. Everything else, including `None` and the empty string, is `Get`.
    ///
    /// # Example
    ///
    /// ```
    /// use search_connector_shared::RequestMethod;
    ///
    /// assert_eq!(RequestMethod::from_setting(Some("POST")), RequestMethod::Post);
    /// assert_eq!(RequestMethod::from_setting(Some("put")), RequestMethod::Get);
    /// assert_eq!(RequestMethod::from_setting(None), RequestMethod::Get);
    /// ```
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("post") => Self::Post,
            _ => Self::Get,
        }
    }

    /// The method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
