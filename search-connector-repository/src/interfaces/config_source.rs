//! Configuration source trait definition.

use tracing::warn;

use crate::errors::{Result, SearchConnectionError};

/// Supplies named settings.
///
/// Only `get_string` is required. The typed getters parse its value, so an
/// implementation backed by plain strings (environment, key/value files) gets
/// consistent parsing for free. Implementations must be safe to call
/// repeatedly; no caching is expected.
pub trait ConfigSource: Send + Sync {
    /// Raw string value of a setting, or `None` if it is not set.
    fn get_string(&self, name: &str) -> Option<String>;

    /// Boolean value of a setting.
    ///
    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0` in any case. Absent
    /// or empty values yield `default`; unrecognized values are logged and
    /// also yield `default`.
    fn get_bool(&self, name: &str, default: bool) -> bool {
        let Some(raw) = self.get_string(name) else {
            return default;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => default,
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" => false,
            other => {
                warn!(setting = name, value = other, default, "Unrecognized boolean setting, using default");
                default
            }
        }
    }

    /// Integer value of a setting.
    ///
    /// Absent or empty values yield `default`. A value that is present but not
    /// an integer is a `ConfigurationError`.
    fn get_int(&self, name: &str, default: i64) -> Result<i64> {
        let Some(raw) = self.get_string(name) else {
            return Ok(default);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(default);
        }
        trimmed.parse::<i64>().map_err(|e| {
            SearchConnectionError::configuration(format!(
                "{} must be an integer, got '{}': {}",
                name, trimmed, e
            ))
        })
    }
}
