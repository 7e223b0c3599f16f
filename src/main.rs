//! Schema Registry Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                 SCHEMA REGISTRY PROXY                 │
//!                    │                                                       │
//!   Client Request   │  ┌─────────┐   ┌──────────┐   ┌───────────┐           │
//!   ─────────────────┼─▶│  http   │──▶│ pipeline │──▶│  forward  │───────────┼──▶ Registry
//!                    │  │ server  │   │ (format) │   │ transport │           │
//!                    │  └─────────┘   └────┬─────┘   └───────────┘           │
//!                    │                     │ format=serialized               │
//!                    │                     ▼                                 │
//!   Client Response  │               ┌──────────┐   ┌───────────┐           │
//!   ◀────────────────┼───────────────│classifier│──▶│ compiler  │           │
//!                    │               └──────────┘   │  (protox) │           │
//!                    │                              └───────────┘           │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use schema_registry_proxy::config::{load_config, registry_origin};
use schema_registry_proxy::http::{HttpServer, Pipeline};
use schema_registry_proxy::schema::ProtoxCompiler;
use schema_registry_proxy::transport::TransportConfig;
use schema_registry_proxy::{net, observability};

#[derive(Parser)]
#[command(name = "schema-registry-proxy")]
#[command(about = "Schema registry proxy that can serve protobuf schemas as serialized descriptors", long_about = None)]
struct Cli {
    /// Path to the config file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("schema-registry-proxy: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;

    observability::logging::init_logging(&config.observability.log_level);
    tracing::info!("schema-registry-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let origin = registry_origin(&config.registry).map_err(|e| e.to_string())?;
    tracing::info!(
        config = ?cli.config,
        registry_scheme = %origin.scheme,
        registry_authority = %origin.authority,
        tls_enabled = config.tls.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        observability::metrics::init_metrics(addr)?;
    }

    let upstream = net::tls::build_upstream(&config.tls)?;
    let transport = TransportConfig::new(&origin, Arc::new(upstream))?;

    let compiler = match &config.schema.scratch_dir {
        Some(dir) => ProtoxCompiler::new(dir),
        None => ProtoxCompiler::default(),
    };
    tracing::info!(scratch_root = ?compiler.scratch_root(), "Schema compiler ready");

    let server = HttpServer::new(Pipeline::new(transport, Arc::new(compiler)));
    let bind_address = config.bind_address();

    match config.tls.identity() {
        Some((cert, key)) => {
            let tls = net::tls::load_tls_config(cert, key)?;
            let addr: SocketAddr = bind_address.parse()?;
            server.run_tls(addr, tls).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener).await?;
        }
    }

    Ok(())
}
