//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, registry origin)
//!     → ProxyConfig (validated, immutable)
//!     → consumed once at startup to build the transport and listener
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields except `registry` have usable defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ObservabilityConfig, ProxyConfig, SchemaConfig, TlsConfig};
pub use validation::{registry_origin, RegistryOrigin, ValidationError};
