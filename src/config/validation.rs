//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Resolve the registry URL into the upstream scheme and authority
//! - Check that TLS material is configured consistently
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::{Position, Url};

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `registry` is not an absolute URL.
    RegistryUrl(String),
    /// `registry` uses a scheme other than http/https.
    RegistryScheme(String),
    /// `registry` has no host.
    RegistryHost,
    /// `port` is zero.
    Port,
    /// Only one half of the certificate/key pair is set.
    IncompleteIdentity,
    /// `client_auth` requested without a certificate/key pair.
    ClientAuthWithoutIdentity,
    /// `metrics_address` is not a socket address.
    MetricsAddress(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::RegistryUrl(e) => write!(f, "cannot parse registry url: {}", e),
            ValidationError::RegistryScheme(s) => write!(f, "unsupported registry scheme: {}", s),
            ValidationError::RegistryHost => write!(f, "registry url has no host"),
            ValidationError::Port => write!(f, "port must be non-zero"),
            ValidationError::IncompleteIdentity => write!(f, "tls.cert and tls.key must be set together"),
            ValidationError::ClientAuthWithoutIdentity => {
                write!(f, "tls.client_auth requires tls.cert and tls.key")
            }
            ValidationError::MetricsAddress(a) => write!(f, "invalid metrics address: {}", a),
        }
    }
}

/// Upstream origin extracted from the registry URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOrigin {
    pub scheme: String,
    /// Host plus explicit port, IPv6 hosts bracketed.
    pub authority: String,
}

/// Parse the registry URL down to the scheme and authority requests are rewritten against.
pub fn registry_origin(registry: &str) -> Result<RegistryOrigin, ValidationError> {
    let url = Url::parse(registry).map_err(|e| ValidationError::RegistryUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::RegistryScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::RegistryHost);
    }

    Ok(RegistryOrigin {
        scheme: url.scheme().to_string(),
        authority: url[Position::BeforeHost..Position::AfterPort].to_string(),
    })
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = registry_origin(&config.registry) {
        errors.push(e);
    }

    if config.port == 0 {
        errors.push(ValidationError::Port);
    }

    let tls = &config.tls;
    if tls.enabled {
        if tls.cert.is_some() != tls.key.is_some() {
            errors.push(ValidationError::IncompleteIdentity);
        } else if tls.client_auth && tls.identity().is_none() {
            errors.push(ValidationError::ClientAuthWithoutIdentity);
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_origin() {
        let origin = registry_origin("https://registry.internal:8443/apis/ccompat/v7").unwrap();
        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.authority, "registry.internal:8443");

        let origin = registry_origin("http://[::1]:8081").unwrap();
        assert_eq!(origin.authority, "[::1]:8081");

        let origin = registry_origin("http://registry").unwrap();
        assert_eq!(origin.authority, "registry");
    }

    #[test]
    fn test_registry_origin_rejects() {
        assert!(matches!(registry_origin("not a url"), Err(ValidationError::RegistryUrl(_))));
        assert!(matches!(
            registry_origin("ftp://registry.internal"),
            Err(ValidationError::RegistryScheme(s)) if s == "ftp"
        ));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.registry = "::".to_string();
        config.port = 0;
        config.tls.enabled = true;
        config.tls.cert = Some("server.crt".into());
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Port));
        assert!(errors.contains(&ValidationError::IncompleteIdentity));
    }

    #[test]
    fn test_client_auth_requires_identity() {
        let mut config = ProxyConfig::default();
        config.tls.enabled = true;
        config.tls.client_auth = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::ClientAuthWithoutIdentity]
        );
    }
}
