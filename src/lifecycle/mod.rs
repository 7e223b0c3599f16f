//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build transport → Bind listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

pub mod signals;
