//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(log_level: &str) -> String {
    format!("schema_registry_proxy={log_level},tower_http={log_level}")
}

/// Initialize the global tracing subscriber.
pub fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_filter("debug");
        assert_eq!(filter, "schema_registry_proxy=debug,tower_http=debug");
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
