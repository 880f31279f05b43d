//! Connection pooling on top of [`deadpool_sqlite`].
//!
//! Each pooled connection lives on a blocking thread; work is shipped to it
//! with [`Pool::interact`]. Callers wait up to `acquire_timeout` for a free
//! connection and then fail with [`Error::PoolTimeout`].

use std::{path::Path, time::Duration};

use deadpool_sqlite::{Object, PoolError, Runtime, Timeouts};

use crate::{Error, Result, schema::SCHEMA};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Sizing and timeouts for the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
  /// Maximum number of open connections.
  pub size:            usize,
  /// How long a caller waits for a free connection.
  pub acquire_timeout: Duration,
  /// How long SQLite itself retries when another connection holds the lock.
  pub busy_timeout:    Duration,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      size:            10,
      acquire_timeout: Duration::from_secs(5),
      busy_timeout:    Duration::from_secs(5),
    }
  }
}

// ─── Pool ────────────────────────────────────────────────────────────────────

/// Clones share the same connections.
#[derive(Clone)]
pub(crate) struct Pool {
  inner:  deadpool_sqlite::Pool,
  config: PoolConfig,
}

impl Pool {
  /// Build a pool over the database file at `path` and apply the schema.
  pub async fn open(path: &Path, config: PoolConfig) -> Result<Self> {
    if config.size == 0 {
      return Err(Error::Configuration("pool size must be at least 1".into()));
    }

    let mut cfg = deadpool_sqlite::Config::new(path);
    cfg.pool = Some(deadpool_sqlite::PoolConfig {
      max_size: config.size,
      timeouts: Timeouts {
        wait: Some(config.acquire_timeout),
        ..Timeouts::default()
      },
      ..deadpool_sqlite::PoolConfig::default()
    });
    let inner = cfg
      .create_pool(Runtime::Tokio1)
      .map_err(|e| Error::Configuration(e.to_string()))?;

    let pool = Self { inner, config };
    pool
      .interact(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    tracing::info!(path = %path.display(), size = config.size, "opened sqlite pool");
    Ok(pool)
  }

  /// A single in-memory connection; separate in-memory connections would
  /// each see their own empty database.
  pub async fn open_in_memory(config: PoolConfig) -> Result<Self> {
    Self::open(Path::new(":memory:"), PoolConfig { size: 1, ..config }).await
  }

  /// Check out a connection, waiting at most `acquire_timeout`.
  pub async fn get(&self) -> Result<Object> {
    self.inner.get().await.map_err(|e| match e {
      PoolError::Timeout(_) => Error::PoolTimeout(self.config.acquire_timeout),
      PoolError::Closed => Error::PoolClosed,
      PoolError::Backend(e) => Error::Database(e),
      other => Error::Pool(other.to_string()),
    })
  }

  /// Run `f` on a pooled connection. The busy timeout is applied before
  /// every call so connections created lazily by the pool carry it too.
  pub async fn interact<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let busy_timeout = self.config.busy_timeout;
    let conn = self.get().await?;
    conn
      .interact(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        f(conn)
      })
      .await
      .map_err(|e| Error::Pool(e.to_string()))?
  }

  /// Refuse new checkouts and drop idle connections. Connections still
  /// checked out are dropped when they come back.
  pub fn close(&self) {
    self.inner.close();
    tracing::info!("closed sqlite pool");
  }
}
