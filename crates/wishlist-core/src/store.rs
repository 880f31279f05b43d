//! The `WishStore` trait: the wish lifecycle manager.
//!
//! The trait is implemented by storage backends (e.g. `wishlist-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  error::Classify,
  lifecycle::{Snapshot, WeeklyOutcome},
  wish::{NewWish, Wish, WishId},
};

/// Abstraction over a wishlist store backend.
///
/// Every operation is all-or-nothing: a wish id is present in exactly one
/// stage after any operation completes, and a failed operation leaves no
/// partial state behind. Implementations hold no in-memory mutable state of
/// their own.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait WishStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Pending wishes ────────────────────────────────────────────────────

  /// Persist a new pending wish with zero votes. The id and timestamp are
  /// assigned by the store.
  fn add_wish(
    &self,
    input: NewWish,
  ) -> impl Future<Output = Result<Wish, Self::Error>> + Send + '_;

  /// Add one vote to a pending wish and return the new total.
  ///
  /// Fails with a not-found error if no pending wish has `id`.
  fn vote_wish(
    &self,
    id: WishId,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Remove a pending wish. Returns `false` if there was nothing to remove.
  fn delete_wish(
    &self,
    id: WishId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Transitions ───────────────────────────────────────────────────────

  /// Move a pending wish to implementing and return it.
  fn move_to_implementing(
    &self,
    id: WishId,
  ) -> impl Future<Output = Result<Wish, Self::Error>> + Send + '_;

  /// Move an implementing wish to completed, recording `url`, and return it.
  fn complete_wish(
    &self,
    id: WishId,
    url: Option<String>,
  ) -> impl Future<Output = Result<Wish, Self::Error>> + Send + '_;

  /// Run the weekly promotion policy as of `now`.
  fn weekly_check_at(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<WeeklyOutcome, Self::Error>> + Send + '_;

  /// Run the weekly promotion policy as of the current time.
  fn weekly_check(
    &self,
  ) -> impl Future<Output = Result<WeeklyOutcome, Self::Error>> + Send + '_ {
    self.weekly_check_at(Utc::now())
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All three stages plus the last weekly check time.
  fn get_all_data(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;
}
