//! Outbound transport to the schema registry.
//!
//! # Responsibilities
//! - Perform exactly one request/response round trip per call
//! - Hold the upstream scheme and authority requests are rewritten against
//!
//! # Design Decisions
//! - The transport is built once at startup and shared read-only
//! - `Upstream` is a trait so tests can inject a fake registry
//! - No retries and no redirect following

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::uri::{Authority, InvalidUri, Scheme};
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::RegistryOrigin;

/// Failure of a single round trip (connect, TLS, protocol, ...).
#[derive(Debug, Error)]
#[error(transparent)]
pub struct UpstreamError(Box<dyn std::error::Error + Send + Sync>);

impl UpstreamError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// One HTTP round trip against the registry.
pub trait Upstream: Send + Sync {
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>>;
}

/// [`Upstream`] backed by a pooled hyper client speaking HTTP or HTTPS.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl HttpUpstream {
    /// Build a client from an explicit rustls configuration.
    pub fn with_tls_config(tls: rustls::ClientConfig) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        Self::from_connector(connector)
    }

    fn from_connector(connector: HttpsConnector<HttpConnector>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }
}

impl Upstream for HttpUpstream {
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
        Box::pin(async move {
            let response = self.client.request(request).await.map_err(UpstreamError::new)?;
            Ok(response.map(Body::new))
        })
    }
}

/// Upstream origin plus the transport used to reach it.
#[derive(Clone)]
pub struct TransportConfig {
    pub scheme: Scheme,
    pub authority: Authority,
    pub upstream: Arc<dyn Upstream>,
}

impl TransportConfig {
    pub fn new(origin: &RegistryOrigin, upstream: Arc<dyn Upstream>) -> Result<Self, InvalidUri> {
        Ok(Self {
            scheme: origin.scheme.parse()?,
            authority: origin.authority.parse()?,
            upstream,
        })
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("scheme", &self.scheme)
            .field("authority", &self.authority)
            .finish_non_exhaustive()
    }
}
