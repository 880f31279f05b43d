//! Wishlist HTTP server: configuration and application assembly.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store
//! and serves [`app`]. Everything here is kept out of `main` so it can be
//! exercised in tests without binding a socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::{
  Router,
  http::{Method, header},
};
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  services::ServeDir,
  trace::TraceLayer,
};
use wishlist_api::api_router;
use wishlist_core::store::WishStore;
use wishlist_store_sqlite::PoolConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WISHLIST_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  pub store_path:              PathBuf,
  pub pool_size:               usize,
  pub pool_acquire_timeout_ms: u64,
  pub busy_timeout_ms:         u64,
  /// Directory served for any path outside `/api`.
  pub static_dir:              Option<PathBuf>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let pool = PoolConfig::default();
    Self {
      host:                    "0.0.0.0".to_string(),
      port:                    8080,
      store_path:              PathBuf::from("wishlist.db"),
      pool_size:               pool.size,
      pool_acquire_timeout_ms: millis(pool.acquire_timeout),
      busy_timeout_ms:         millis(pool.busy_timeout),
      static_dir:              None,
    }
  }
}

fn millis(d: Duration) -> u64 { u64::try_from(d.as_millis()).unwrap_or(u64::MAX) }

impl ServerConfig {
  /// Load from the TOML file at `path` (optional) and the process
  /// environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with_env(path, config::Environment::with_prefix("WISHLIST"))
  }

  fn load_with_env(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env.try_parsing(true))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn pool_config(&self) -> PoolConfig {
    PoolConfig {
      size:            self.pool_size,
      acquire_timeout: Duration::from_millis(self.pool_acquire_timeout_ms),
      busy_timeout:    Duration::from_millis(self.busy_timeout_ms),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ─────────────────────────────────────────────────────────────

/// Assemble the full application: the JSON API under `/api`, the optional
/// static site as fallback, request tracing and permissive CORS.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: WishStore + 'static,
{
  let mut router = Router::new().nest("/api", api_router(store));
  if let Some(dir) = &config.static_dir {
    router = router.fallback_service(ServeDir::new(dir));
  }

  router
    .layer(TraceLayer::new_for_http())
    .layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([
          Method::GET,
          Method::POST,
          Method::PUT,
          Method::DELETE,
          Method::OPTIONS,
        ]),
    )
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(err) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %err, "unable to install Ctrl+C handler");
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(err) => {
        tracing::error!(error = %err, "unable to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}
