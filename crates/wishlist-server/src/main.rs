//! wishlist-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus
//! `WISHLIST_*` environment variables, opens the SQLite store, and serves the
//! wishlist API over HTTP until Ctrl+C or SIGTERM.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wishlist_server::{ServerConfig, app, shutdown_signal};
use wishlist_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Wishlist voting server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)?;
  let store_path = server_cfg.store_path();

  let store = SqliteStore::open_with(&store_path, server_cfg.pool_config())
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  let router = app(store.clone(), &server_cfg);
  let address = server_cfg.address();

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, router)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shutting down");
  store.close();
  Ok(())
}

