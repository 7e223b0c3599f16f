//! TLS configuration and certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use axum_server::tls_rustls::RustlsConfig;
use hyper_rustls::ConfigBuilderExt;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::RootCertStore;
use thiserror::Error;

use crate::config::TlsConfig;
use crate::transport::HttpUpstream;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no private key found in {0:?}")]
    MissingKey(PathBuf),

    #[error("no usable certificate found in {0:?}")]
    NoCertificates(PathBuf),

    #[error("failed to install rustls crypto provider")]
    CryptoProvider,

    #[error(transparent)]
    Rustls(#[from] rustls::Error),
}

/// Install the process-wide rustls crypto provider exactly once.
pub fn install_crypto_provider() -> Result<(), TlsError> {
    static RUSTLS_INIT: OnceLock<Result<(), ()>> = OnceLock::new();
    let init = RUSTLS_INIT.get_or_init(|| {
        if rustls::crypto::CryptoProvider::get_default().is_some() {
            return Ok(());
        }
        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .map_err(|_| ())
    });
    (*init).map_err(|_| TlsError::CryptoProvider)
}

/// Build the outbound transport described by the TLS section.
///
/// With a CA bundle configured, only that bundle is trusted; otherwise the
/// platform store is used. Either way the client identity is presented when
/// `client_auth` is set.
pub fn build_upstream(tls: &TlsConfig) -> Result<HttpUpstream, TlsError> {
    install_crypto_provider()?;

    let builder = match tls.ca_bundle() {
        Some(ca_path) => rustls::ClientConfig::builder().with_root_certificates(load_roots(ca_path)?),
        None => rustls::ClientConfig::builder().with_native_roots().unwrap_or_else(|e| {
            // Plain-HTTP registries still work without any trust roots.
            tracing::warn!(error = %e, "No platform root certificates, HTTPS upstreams will be rejected");
            rustls::ClientConfig::builder().with_root_certificates(RootCertStore::empty())
        }),
    };

    let config = match tls.identity().filter(|_| tls.client_auth) {
        Some((cert, key)) => {
            let config = builder.with_client_auth_cert(load_certs(cert)?, load_key(key)?)?;
            tracing::info!(cert = ?cert, "Presenting client certificate to upstream");
            config
        }
        None => builder.with_no_client_auth(),
    };

    Ok(HttpUpstream::with_tls_config(config))
}

fn load_roots(ca_path: &Path) -> Result<RootCertStore, TlsError> {
    let mut roots = RootCertStore::empty();
    // Unparsable entries are skipped, like a PEM pool append.
    let (added, ignored) = roots.add_parsable_certificates(load_certs(ca_path)?);
    if added == 0 {
        return Err(TlsError::NoCertificates(ca_path.to_path_buf()));
    }
    tracing::info!(ca = ?ca_path, added, ignored, "Loaded upstream CA bundle");
    Ok(roots)
}

/// Load listener TLS configuration from certificate and key files.
pub fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    install_crypto_provider()?;

    let certs = load_certs(cert_path)?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_path_buf()));
    }
    let key = load_key(key_path)?;

    let mut config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(RustlsConfig::from_config(std::sync::Arc::new(config)))
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path).map(BufReader::new).map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::MissingKey(path.to_path_buf()))
}
