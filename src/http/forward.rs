//! Request forwarding.
//!
//! Builds the outbound request from the inbound parts and performs exactly one
//! round trip through the injected transport. The body is streamed, never
//! buffered.

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, Response, Uri};

use crate::error::ProxyError;
use crate::transport::TransportConfig;

/// Forward one request to `target` and return the raw upstream response.
///
/// Every inbound header is copied, repeated headers keep all their values in
/// order. `Host` is left to the transport so it matches the rewritten target.
pub async fn forward(
    transport: &TransportConfig,
    method: Method,
    target: Uri,
    headers: &HeaderMap,
    body: Body,
) -> Result<Response<Body>, ProxyError> {
    let mut request = Request::builder()
        .method(method)
        .uri(target)
        .body(body)
        .map_err(ProxyError::RequestConstruction)?;

    let outbound = request.headers_mut();
    for (name, value) in headers.iter() {
        if name != header::HOST {
            outbound.append(name.clone(), value.clone());
        }
    }

    transport
        .upstream
        .round_trip(request)
        .await
        .map_err(ProxyError::UpstreamUnavailable)
}
