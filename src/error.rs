//! Request-scoped error taxonomy.
//!
//! Every variant terminates the current request with a `500 Internal Server Error`
//! whose plain-text body names the failing stage. Nothing here is retried.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::schema::CompileError;
use crate::transport::UpstreamError;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// `format` query parameter with a value other than `serialized`.
    #[error("Unknown format: {0}")]
    UnsupportedFormat(String),

    #[error("Error creating proxy request")]
    RequestConstruction(#[source] axum::http::Error),

    #[error("Error sending proxy request")]
    UpstreamUnavailable(#[source] UpstreamError),

    #[error("Error reading proxy response")]
    BodyRead(#[source] axum::Error),

    #[error("Error unmarshalling proxy response")]
    BodyDecode(#[source] serde_json::Error),

    #[error("Error encoding schema: {0}")]
    SchemaEncode(#[from] CompileError),

    #[error("Error marshalling proxy response")]
    BodyEncode(#[source] serde_json::Error),
}

impl ProxyError {
    /// Short label for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            ProxyError::UnsupportedFormat(_) => "format",
            ProxyError::RequestConstruction(_) => "request",
            ProxyError::UpstreamUnavailable(_) => "upstream",
            ProxyError::BodyRead(_) => "read",
            ProxyError::BodyDecode(_) => "decode",
            ProxyError::SchemaEncode(_) => "compile",
            ProxyError::BodyEncode(_) => "encode",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self),
        )
            .into_response()
    }
}
