//! Barangay Server: application entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use barangay_auth::ensure_superadmin;
use barangay_db::DbManager;
use barangay_server::{AppState, ServerConfig, router};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Onboarding and role-scoped access control for barangay records
#[derive(Parser)]
#[command(name = "barangay-server", version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address override (e.g. 127.0.0.1:8080)
    #[arg(short, long)]
    listen: Option<String>,

    /// Print the effective configuration (secrets masked) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "barangay=info,tower_http=info",
        1 => "barangay=debug,tower_http=debug",
        _ => "barangay=trace,tower_http=trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref() {
        if !path.is_file() {
            anyhow::bail!("config file does not exist: {}", path.display());
        }
    }

    let mut config =
        ServerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    init_tracing(cli.verbose)?;
    tracing::info!("Starting barangay server");

    let db = DbManager::connect(&config.database)
        .await
        .context("failed to connect to SurrealDB")?;
    barangay_db::run_migrations(db.client())
        .await
        .context("failed to apply migrations")?;

    let state = AppState::new(db.client().clone(), &config.auth, &config.invitations);

    if let Some(bootstrap) = &config.bootstrap {
        let superadmin = ensure_superadmin(
            &state.services.identity,
            &state.services.principals,
            bootstrap,
        )
        .await
        .context("failed to bootstrap superadmin")?;
        tracing::info!(principal_id = %superadmin.id, "Superadmin ready");
    }

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Barangay server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
