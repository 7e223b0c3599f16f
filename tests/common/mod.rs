//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri};
use futures_util::future::BoxFuture;
use schema_registry_proxy::config::registry_origin;
use schema_registry_proxy::http::{AppState, HttpServer, Pipeline};
use schema_registry_proxy::schema::ProtoxCompiler;
use schema_registry_proxy::{TransportConfig, Upstream, UpstreamError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the fake registry saw.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// In-process registry returning a canned response and recording every call.
#[derive(Clone)]
#[allow(dead_code)]
pub struct FakeUpstream {
    status: StatusCode,
    headers: Vec<(&'static str, &'static str)>,
    body: Option<&'static str>,
    pub calls: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl FakeUpstream {
    pub fn json(body: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            headers: vec![("content-type", "application/vnd.schemaregistry.v1+json")],
            body: Some(body),
            calls: Arc::default(),
        }
    }

    /// Every round trip fails as if the registry were down.
    pub fn unreachable() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: None,
            calls: Arc::default(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

impl Upstream for FakeUpstream {
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.map_err(UpstreamError::new)?;
            self.calls.lock().unwrap().push(Recorded {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body: body.to_vec(),
            });

            let Some(payload) = self.body else {
                return Err(UpstreamError::new("connection refused"));
            };

            let mut response = Response::new(Body::from(payload));
            *response.status_mut() = self.status;
            for (name, value) in &self.headers {
                response.headers_mut().append(*name, HeaderValue::from_static(*value));
            }
            Ok(response)
        })
    }
}

/// Router wired to `upstream` and a real protobuf compiler.
#[allow(dead_code)]
pub fn proxy_router(upstream: FakeUpstream) -> axum::Router {
    let origin = registry_origin("https://registry.internal:8443").unwrap();
    let transport = TransportConfig::new(&origin, Arc::new(upstream)).unwrap();
    let pipeline = Pipeline::new(transport, Arc::new(ProtoxCompiler::default()));
    HttpServer::build_router(AppState { pipeline: Arc::new(pipeline) })
}

/// Start a raw TCP registry that answers every request with `body`.
///
/// Returns the bound address and a log of received request heads.
#[allow(dead_code)]
pub async fn start_mock_registry(body: &'static str) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let heads = Arc::new(Mutex::new(Vec::new()));
    let log = heads.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                let mut head: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                log.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/vnd.schemaregistry.v1+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, heads)
}
