//! # Search Connector Shared
//!
//! This crate defines the plain data types shared across the search connector
//! crates: index targets, the transport configuration and the HTTP request and
//! response shapes handed to a transport.

pub mod types;

pub use types::http::{
    HttpRequest, HttpResponse, ETAG, FORM_CONTENT_TYPE, IF_NONE_MATCH, NOT_MODIFIED,
};
pub use types::index_target::IndexTarget;
pub use types::request_method::RequestMethod;
pub use types::transport_config::TransportConfig;
