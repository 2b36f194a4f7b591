//! Geoplay Feed - Binary Entrypoint
//! Boots the Axum server: globe WebSocket feed, cross-origin artwork proxy,
//! static frontend assets, and Prometheus metrics.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geoplay_feed::api::{self, AppState};
use geoplay_feed::metrics::Metrics;
use geoplay_feed::pipeline::config::FeedConfig;
use geoplay_feed::pipeline::fetch::HttpFetcher;

/// Command-line arguments for geoplay-feed
#[derive(Parser, Debug)]
#[command(name = "geoplay-feed")]
#[command(about = "Geocoded play-event aggregation and streaming server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7001", env = "GEOPLAY_PORT")]
    port: u16,

    /// Environment name substituted into source URL templates
    #[arg(short, long, default_value = "prod", env = "GEOPLAY_ENV")]
    environment: String,

    /// Poll interval override in milliseconds
    #[arg(long, env = "GEOPLAY_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Source configuration file (TOML); falls back to config/sources.toml
    #[arg(short, long)]
    sources: Option<PathBuf>,

    /// Directory of frontend assets served at the root
    #[arg(long, default_value = "public", env = "GEOPLAY_STATIC_DIR")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoplay_feed=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.sources {
        Some(p) => FeedConfig::load_from(p),
        None => FeedConfig::load_default(),
    }
    .context("loading source config")?;

    if let Some(ms) = args.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    config.substitute_env(&args.environment);
    config.validate().context("validating source config")?;

    let metrics = Metrics::init(config.poll_interval_ms);

    info!(
        port = args.port,
        sources = config.sources.len(),
        poll_interval_ms = config.poll_interval_ms,
        environment = %args.environment,
        "starting geoplay feed"
    );

    let client = reqwest::Client::new();
    let state = AppState {
        fetcher: Arc::new(HttpFetcher::with_client(client.clone())),
        config: Arc::new(config),
        proxy_client: client,
    };

    let app = api::create_router(state, &args.static_dir).merge(metrics.router());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
