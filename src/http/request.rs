//! Request inspection and target rewriting.
//!
//! # Responsibilities
//! - Evaluate the reserved `format` query parameter
//! - Strip `format` from the query before forwarding
//! - Rewrite the target URI against the registry origin
//!
//! # Design Decisions
//! - Query pairs other than `format` are forwarded byte-for-byte, in order
//! - The first `format` pair decides; every `format` pair is removed

use axum::http::uri::PathAndQuery;
use axum::http::Uri;
use url::form_urlencoded;

use crate::error::ProxyError;
use crate::transport::TransportConfig;

/// Reserved query parameter.
pub const FORMAT_PARAM: &str = "format";

/// The only accepted `format` value.
pub const SERIALIZED: &str = "serialized";

/// Result of evaluating the `format` parameter on an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTrigger {
    /// `format=serialized` was present.
    pub serialized: bool,
    /// Query string to forward, `None` when nothing is left.
    pub query: Option<String>,
}

impl FormatTrigger {
    /// Inspect the query of `uri`.
    ///
    /// Fails with [`ProxyError::UnsupportedFormat`] for any value other than
    /// `serialized`; the request must not be forwarded in that case.
    pub fn evaluate(uri: &Uri) -> Result<Self, ProxyError> {
        let Some(query) = uri.query() else {
            return Ok(Self { serialized: false, query: None });
        };

        let mut format = None;
        let mut kept = Vec::new();
        for pair in query.split('&') {
            match form_urlencoded::parse(pair.as_bytes()).next() {
                Some((key, value)) if key == FORMAT_PARAM => {
                    format.get_or_insert_with(|| value.into_owned());
                }
                Some(_) => kept.push(pair),
                None => {}
            }
        }

        let Some(format) = format else {
            return Ok(Self { serialized: false, query: Some(query.to_string()) });
        };
        if format != SERIALIZED {
            return Err(ProxyError::UnsupportedFormat(format));
        }

        Ok(Self {
            serialized: true,
            query: (!kept.is_empty()).then(|| kept.join("&")),
        })
    }
}

/// Point `uri` at the registry, keeping its path and replacing its query.
pub fn rewrite_target(uri: &Uri, query: Option<&str>, transport: &TransportConfig) -> Result<Uri, ProxyError> {
    let path = uri.path();
    let path_and_query = match query {
        Some(q) => format!("{}?{}", path, q),
        None => path.to_string(),
    };

    Uri::builder()
        .scheme(transport.scheme.clone())
        .authority(transport.authority.clone())
        .path_and_query(path_and_query.parse::<PathAndQuery>().map_err(|e| ProxyError::RequestConstruction(e.into()))?)
        .build()
        .map_err(ProxyError::RequestConstruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::registry_origin;
    use crate::transport::{Upstream, UpstreamError};
    use axum::body::Body;
    use axum::http::{Request, Response};
    use futures_util::future::BoxFuture;
    use std::sync::Arc;

    struct Unreachable;

    impl Upstream for Unreachable {
        fn round_trip(&self, _: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
            Box::pin(async { Err(UpstreamError::new("unreachable")) })
        }
    }

    fn evaluate(uri: &str) -> Result<FormatTrigger, ProxyError> {
        FormatTrigger::evaluate(&uri.parse().unwrap())
    }

    #[test]
    fn test_no_query() {
        let trigger = evaluate("/subjects").unwrap();
        assert!(!trigger.serialized);
        assert_eq!(trigger.query, None);
    }

    #[test]
    fn test_query_without_format_is_untouched() {
        let trigger = evaluate("/subjects?deleted=true&subjectPrefix=a%2Fb").unwrap();
        assert!(!trigger.serialized);
        assert_eq!(trigger.query.as_deref(), Some("deleted=true&subjectPrefix=a%2Fb"));
    }

    #[test]
    fn test_serialized_is_stripped() {
        let trigger = evaluate("/subjects/x/versions/1?format=serialized").unwrap();
        assert!(trigger.serialized);
        assert_eq!(trigger.query, None);

        let trigger = evaluate("/schemas/ids/7?fetchMaxId=false&format=serialized&subject=x").unwrap();
        assert!(trigger.serialized);
        assert_eq!(trigger.query.as_deref(), Some("fetchMaxId=false&subject=x"));
    }

    #[test]
    fn test_first_format_decides() {
        let trigger = evaluate("/x?format=serialized&format=xml").unwrap();
        assert!(trigger.serialized);
        assert_eq!(trigger.query, None);
    }

    #[test]
    fn test_unsupported_format() {
        match evaluate("/x?format=xml") {
            Err(ProxyError::UnsupportedFormat(value)) => assert_eq!(value, "xml"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(evaluate("/x?format="), Err(ProxyError::UnsupportedFormat(v)) if v.is_empty()));
        assert!(matches!(evaluate("/x?format"), Err(ProxyError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_encoded_format_value() {
        assert!(evaluate("/x?format=serial%69zed").unwrap().serialized);
        assert!(matches!(evaluate("/x?format=a+b"), Err(ProxyError::UnsupportedFormat(v)) if v == "a b"));
    }

    #[test]
    fn test_rewrite_target() {
        let origin = registry_origin("https://registry.internal:8443/ignored/path").unwrap();
        let transport = TransportConfig::new(&origin, Arc::new(Unreachable)).unwrap();

        let uri: Uri = "http://proxy:8080/subjects/x/versions/1?format=serialized".parse().unwrap();
        let target = rewrite_target(&uri, None, &transport).unwrap();
        assert_eq!(target.to_string(), "https://registry.internal:8443/subjects/x/versions/1");

        let target = rewrite_target(&uri, Some("a=1&b=2"), &transport).unwrap();
        assert_eq!(target.to_string(), "https://registry.internal:8443/subjects/x/versions/1?a=1&b=2");
    }
}
