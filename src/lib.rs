//! Schema Registry Proxy Library
//!
//! Transparent HTTP proxy in front of a schema registry. Requests carrying
//! `format=serialized` get protobuf schemas back as base64-encoded,
//! serialized `FileDescriptorProto`s instead of source text.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod schema;
pub mod transport;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::{HttpServer, Pipeline};
pub use transport::{TransportConfig, Upstream, UpstreamError};
