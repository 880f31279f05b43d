//! Error types for `wishlist-core`.

use thiserror::Error;

use crate::wish::{StageKind, WishId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid wish: {0}")]
  Validation(String),

  #[error("no {stage} wish with id {id}")]
  WishNotFound { id: WishId, stage: StageKind },

  #[error("wish {id} cannot move from {from} to {to}")]
  InvalidTransition {
    id:   WishId,
    from: StageKind,
    to:   StageKind,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse error categories that callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed or missing input; the operation was not attempted.
  Validation,
  /// The referenced wish is not in the stage the operation expects.
  NotFound,
  /// No store connection became available in time, or the store is
  /// shutting down. Safe to retry.
  Unavailable,
  /// Any other store failure. The transaction was rolled back in full.
  Store,
}

/// Implemented by every error a [`crate::store::WishStore`] can return, so
/// that higher layers can map failures without knowing the backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Validation(_) => ErrorKind::Validation,
      Error::WishNotFound { .. } => ErrorKind::NotFound,
      Error::InvalidTransition { .. } => ErrorKind::Store,
    }
  }
}
