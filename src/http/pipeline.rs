//! Transformation pipeline.
//!
//! Per request:
//! ```text
//! RECEIVED
//!   → FormatTrigger::evaluate (unsupported format fails here, upstream untouched)
//!   → rewrite_target
//!   → forward (one round trip)
//!   → not triggered: stream upstream body through       (PASSTHROUGH)
//!   → triggered: buffer, decode, classify
//!        → eligible: compile schema, re-encode envelope  (REWRITTEN)
//!        → not eligible: original bytes, untouched       (UNCHANGED)
//! ```
//!
//! The triggered path builds the whole body before the response exists, so a
//! body-processing failure still yields a clean 500 instead of the upstream
//! status.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use serde_json::{Map, Value};

use crate::error::ProxyError;
use crate::http::forward::forward;
use crate::http::request::{rewrite_target, FormatTrigger};
use crate::http::response::{build_response, copy_headers};
use crate::observability::metrics;
use crate::schema::classifier::SCHEMA_FIELD;
use crate::schema::{classify, encode_schema, Classification, SchemaCompiler};
use crate::transport::TransportConfig;

/// What happened to the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No trigger; body streamed as-is.
    Passthrough,
    /// Schema replaced by its compiled descriptor.
    Rewritten,
    /// Triggered, but the envelope was not eligible.
    Unchanged,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passthrough => "passthrough",
            Outcome::Rewritten => "rewritten",
            Outcome::Unchanged => "unchanged",
        }
    }
}

/// Shared, read-only request pipeline.
pub struct Pipeline {
    transport: TransportConfig,
    compiler: Arc<dyn SchemaCompiler>,
}

impl Pipeline {
    pub fn new(transport: TransportConfig, compiler: Arc<dyn SchemaCompiler>) -> Self {
        Self { transport, compiler }
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Run one inbound request through the pipeline.
    pub async fn handle(&self, request: Request<Body>) -> Result<(Response<Body>, Outcome), ProxyError> {
        let (parts, body) = request.into_parts();

        let trigger = FormatTrigger::evaluate(&parts.uri)?;
        let target = rewrite_target(&parts.uri, trigger.query.as_deref(), &self.transport)?;

        tracing::debug!(
            method = %parts.method,
            target = %target,
            serialized = trigger.serialized,
            "Forwarding request"
        );

        let upstream = forward(&self.transport, parts.method, target, &parts.headers, body).await?;
        let (upstream, upstream_body) = upstream.into_parts();
        let headers = copy_headers(&upstream.headers);

        if !trigger.serialized {
            return Ok((build_response(upstream.status, headers, upstream_body), Outcome::Passthrough));
        }

        let buffered = axum::body::to_bytes(upstream_body, usize::MAX)
            .await
            .map_err(ProxyError::BodyRead)?;
        let (body, outcome) = transform_body(buffered, self.compiler.clone()).await?;

        Ok((build_response(upstream.status, headers, Body::from(body)), outcome))
    }
}

/// Replace the `schema` field of a protobuf envelope with its compiled descriptor.
///
/// Bodies that are not eligible come back as the very same bytes.
pub async fn transform_body(body: Bytes, compiler: Arc<dyn SchemaCompiler>) -> Result<(Bytes, Outcome), ProxyError> {
    let mut envelope: Map<String, Value> = serde_json::from_slice(&body).map_err(ProxyError::BodyDecode)?;

    let source = match classify(&envelope) {
        Classification::Eligible(source) => source.to_owned(),
        Classification::NotEligible => return Ok((body, Outcome::Unchanged)),
    };

    let encoded = encode_schema(compiler, source).await;
    metrics::record_compilation(encoded.is_ok());
    let encoded = encoded?;
    envelope.insert(SCHEMA_FIELD.to_string(), Value::String(encoded));

    let rewritten = serde_json::to_vec(&envelope).map_err(ProxyError::BodyEncode)?;
    tracing::info!(
        original_bytes = body.len(),
        rewritten_bytes = rewritten.len(),
        "Replaced protobuf schema with serialized descriptor"
    );
    Ok((Bytes::from(rewritten), Outcome::Rewritten))
}
