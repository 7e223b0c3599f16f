//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the schema registry proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Port the proxy listens on.
    pub port: u16,

    /// Interface the proxy binds to.
    pub bind_host: String,

    /// Upstream schema registry URL. Only its scheme and authority are used.
    pub registry: String,

    /// TLS settings for both the listener and the upstream connection.
    pub tls: TlsConfig,

    /// Schema compilation settings.
    pub schema: SchemaConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_host: "0.0.0.0".to_string(),
            registry: "http://localhost:8081".to_string(),
            tls: TlsConfig::default(),
            schema: SchemaConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Listener bind address (e.g., "0.0.0.0:8080").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// TLS configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Master switch; every other field is ignored when false.
    pub enabled: bool,

    /// Path to private key file (PEM).
    pub key: Option<PathBuf>,

    /// Path to certificate file (PEM).
    pub cert: Option<PathBuf>,

    /// Path to the CA bundle (PEM) trusted for upstream connections.
    pub ca: Option<PathBuf>,

    /// Present `cert`/`key` as the client identity to the upstream.
    pub client_auth: bool,
}

impl TlsConfig {
    /// Certificate/key pair, when TLS is enabled and both are set.
    pub fn identity(&self) -> Option<(&PathBuf, &PathBuf)> {
        if !self.enabled {
            return None;
        }
        self.cert.as_ref().zip(self.key.as_ref())
    }

    /// CA bundle path, when TLS is enabled.
    pub fn ca_bundle(&self) -> Option<&PathBuf> {
        self.ca.as_ref().filter(|_| self.enabled)
    }
}

/// Schema compilation configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Directory in which per-request scratch directories are created.
    /// Defaults to the system temp directory.
    pub scratch_dir: Option<PathBuf>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
