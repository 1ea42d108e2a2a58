//! Error types for the search connector repository.
//!
//! This module provides a unified error type for connection setup and the
//! requests made through those connections.

mod search_connection_error;

pub use search_connection_error::{Result, SearchConnectionError};
