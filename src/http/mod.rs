//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → pipeline.rs (orchestrates one request)
//!         → request.rs (format trigger, query filtering, target rewrite)
//!         → forward.rs (one upstream round trip)
//!         → response.rs (status/header propagation)
//!         → schema subsystem (only for format=serialized)
//!     → Send to client
//! ```

pub mod forward;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use pipeline::{Outcome, Pipeline};
pub use server::{AppState, HttpServer};
