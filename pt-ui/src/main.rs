//! pt-ui (Poem Turing test) - web page for judging poems
//!
//! Shows a random poem from `real_poems/` or `fake_poems/`, asks the visitor
//! to rate it and guess whether a human or an AI wrote it, and appends the
//! judgment to `results.csv`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pt_common::config::{load_toml_config, CliOverrides, ServiceConfig};
use pt_ui::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for pt-ui
#[derive(Parser, Debug)]
#[command(name = "pt-ui")]
#[command(about = "Poem Turing test: rate poems and guess human or AI")]
#[command(version)]
struct Args {
    /// Folder containing real_poems/, fake_poems/ and logo/
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// TOML config file (default: <config dir>/poem-turing/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config =
        load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("pt_ui={level},pt_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pt-ui (Poem Turing test) v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOverrides {
        root_folder: args.root_folder,
        port: args.port,
        bind: args.bind,
    };
    let config = ServiceConfig::resolve(&cli, &toml_config).context("Invalid configuration")?;

    info!("Root folder: {}", config.root_folder.display());
    info!("Results log: {}", config.results_path.display());
    info!(
        "Poems: {} human, {} AI",
        config.human_poem_count, config.ai_poem_count
    );
    if !config.logo_path().exists() {
        warn!("Logo not found at {}", config.logo_path().display());
    }

    let state = AppState::from_config(&config);
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
