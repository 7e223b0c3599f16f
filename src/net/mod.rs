//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → tls.rs (upstream trust roots, optional client identity)
//!     → transport::HttpUpstream
//!
//! Incoming TCP connection
//!     → tls.rs (optional listener certificate)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional and handled transparently
//! - One crypto provider is installed for the whole process

pub mod tls;
