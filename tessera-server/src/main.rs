//! Tessera server binary
//!
//! Loads configuration, initializes tracing, seeds the in-memory backend
//! with the platform catalog, and serves the REST API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tessera_config::{ConfigLoader, TesseraConfig};
use tessera_interfaces::AuditSink;
use tessera_rest_api::{create_rest_app, AppConfig, AppContext};
use tessera_storage::{seed_catalog, InMemoryBackend};
use tessera_web::TracingAuditSink;

#[derive(Parser, Debug)]
#[command(name = "tessera", about = "Tessera multi-tenant platform server", version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_tracing(config: &TesseraConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.env_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new()
        .load(cli.config.as_deref())
        .context("loading configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config);

    let backend = InMemoryBackend::new();
    seed_catalog(&backend).await.context("seeding catalog")?;

    let audit: Arc<dyn AuditSink> = Arc::new(TracingAuditSink);
    let context = AppContext::new(Arc::new(backend), audit);
    let app = create_rest_app(
        context,
        AppConfig {
            api_prefix: config.server.api_prefix.clone(),
            ..AppConfig::default()
        },
    );

    let address = config.server.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "tessera server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
