//! Response handling and transformation.
//!
//! # Responsibilities
//! - Copy upstream status and headers onto the client response
//! - Drop headers that describe the upstream body framing
//!
//! # Design Decisions
//! - `Content-Length` is never copied: a rewritten body has a different length
//! - `Transfer-Encoding` belongs to the upstream connection, the server
//!   connection chooses its own framing

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Response, StatusCode};

fn is_framing(name: &HeaderName) -> bool {
    name == header::CONTENT_LENGTH || name == header::TRANSFER_ENCODING
}

/// Copy `upstream` headers, minus body framing, preserving repeated values.
pub fn copy_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if !is_framing(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Assemble the client response from the upstream status and copied headers.
pub fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
