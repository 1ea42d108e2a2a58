//! This module defines the core data structures used across the search connector.

pub mod http;
pub mod index_target;
pub mod request_method;
pub mod transport_config;
