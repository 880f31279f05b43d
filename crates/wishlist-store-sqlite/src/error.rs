//! Error type for `wishlist-store-sqlite`.

use std::time::Duration;

use thiserror::Error;
use wishlist_core::{Classify, ErrorKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] wishlist_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// A stored row could not be turned back into a domain value.
  #[error("row decode error: {0}")]
  Decode(String),

  /// Every pooled connection stayed checked out for the whole wait.
  #[error("no database connection available after {0:?}")]
  PoolTimeout(Duration),

  #[error("connection pool is closed")]
  PoolClosed,

  /// Any other failure to hand out or run on a pooled connection.
  #[error("connection pool error: {0}")]
  Pool(String),

  #[error("invalid store configuration: {0}")]
  Configuration(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::PoolTimeout(_) | Error::PoolClosed => ErrorKind::Unavailable,
      Error::Database(_) | Error::Decode(_) | Error::Pool(_) | Error::Configuration(_) => {
        ErrorKind::Store
      }
    }
  }
}
