//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing)
//! - Serve plain HTTP or HTTPS with graceful shutdown
//! - Record per-request metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::ProxyError;
use crate::http::pipeline::Pipeline;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;

/// Time in-flight requests get to finish on HTTPS shutdown.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// HTTP server for the schema registry proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around a ready pipeline.
    pub fn new(pipeline: Pipeline) -> Self {
        let state = AppState { pipeline: Arc::new(pipeline) };
        Self { router: Self::build_router(state) }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting plain HTTP connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS, binding `addr`.
    pub async fn run_tls(self, addr: SocketAddr, tls: RustlsConfig) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    match state.pipeline.handle(request).await {
        Ok((response, outcome)) => {
            metrics::record_request(&method, response.status().as_u16(), outcome.as_str(), start_time);
            response
        }
        Err(e) => {
            match &e {
                ProxyError::UnsupportedFormat(_) => {
                    tracing::warn!(method = %method, path = %path, error = %e, "Rejected request")
                }
                _ => tracing::error!(
                    method = %method,
                    path = %path,
                    stage = e.stage(),
                    error = ?e,
                    "Request failed"
                ),
            }
            let response = e.into_response();
            metrics::record_request(&method, response.status().as_u16(), "error", start_time);
            response
        }
    }
}
