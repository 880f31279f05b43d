//! [`SqliteStore`]: the SQLite implementation of [`WishStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior};

use wishlist_core::{
  lifecycle::{Snapshot, SystemConfig, WeeklyOutcome},
  store::WishStore,
  wish::{NewWish, StageKind, Wish, WishId},
};

use crate::{
  encode::{
    COMPLETED_COLUMNS, IMPLEMENTING_COLUMNS, PENDING_COLUMNS, RawWish, decode_epoch_ms,
    decode_issued_id, encode_dt, encode_epoch_ms, now,
  },
  pool::{Pool, PoolConfig},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A wishlist store backed by a pool of connections to one SQLite file.
///
/// Clones share the pool.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) pool: Pool,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with an explicit pool configuration.
  pub async fn open_with(path: impl AsRef<Path>, config: PoolConfig) -> Result<Self> {
    let pool = Pool::open(path.as_ref(), config).await?;
    Ok(Self { pool })
  }

  /// Open a single-connection in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let pool = Pool::open_in_memory(PoolConfig::default()).await?;
    Ok(Self { pool })
  }

  /// Stop handing out connections. Further calls on any clone fail with
  /// [`Error::PoolClosed`].
  pub fn close(&self) { self.pool.close() }

  /// Read the stored configuration record.
  pub async fn system_config(&self) -> Result<SystemConfig> {
    self
      .pool
      .interact(|conn| {
        let tx = conn.transaction()?;
        let (check_ms, issued) = read_config(&tx)?;
        tx.commit()?;
        config_from_raw(check_ms, issued)
      })
      .await
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────
//
// These run on the connection thread, inside a transaction opened by the
// caller. Returning early drops the transaction, which rolls it back, so rows
// are decoded before the caller commits.

fn read_config(tx: &Transaction<'_>) -> rusqlite::Result<(i64, i64)> {
  tx.query_row(
    "SELECT last_weekly_check, last_issued_id FROM system_config WHERE id = 1",
    [],
    |row| Ok((row.get(0)?, row.get(1)?)),
  )
}

fn config_from_raw(check_ms: i64, issued: i64) -> Result<SystemConfig> {
  Ok(SystemConfig {
    last_weekly_check: decode_epoch_ms(check_ms)?,
    last_issued_id:    decode_issued_id(issued),
  })
}

fn fetch_one(
  tx: &Transaction<'_>,
  table: &str,
  columns: &str,
  id: i64,
) -> rusqlite::Result<Option<RawWish>> {
  tx.query_row(
    &format!("SELECT {columns} FROM {table} WHERE id = ?1"),
    rusqlite::params![id],
    RawWish::from_row,
  )
  .optional()
}

fn fetch_all(
  tx: &Transaction<'_>,
  table: &str,
  columns: &str,
  order_by: &str,
  kind: StageKind,
) -> Result<Vec<Wish>> {
  let mut stmt = tx.prepare(&format!("SELECT {columns} FROM {table} ORDER BY {order_by}"))?;
  let rows = stmt
    .query_map([], RawWish::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  rows.into_iter().map(|raw| raw.into_wish(kind)).collect()
}

/// Insert into `implementing_wishes`, delete from `wishes`, and return the
/// moved wish.
fn move_row_to_implementing(
  tx: &Transaction<'_>,
  raw: RawWish,
  moved_at: DateTime<Utc>,
) -> Result<Wish> {
  tx.execute(
    "INSERT INTO implementing_wishes (id, text, votes, timestamp, moved_to_implementing_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![raw.id, raw.text, raw.votes, raw.timestamp, encode_dt(moved_at)],
  )?;
  tx.execute("DELETE FROM wishes WHERE id = ?1", rusqlite::params![raw.id])?;
  Ok(raw.into_wish(StageKind::Pending)?.start_implementing(moved_at)?)
}

fn not_found(id: WishId, stage: StageKind) -> Error {
  wishlist_core::Error::WishNotFound { id, stage }.into()
}

// ─── WishStore impl ──────────────────────────────────────────────────────────

impl WishStore for SqliteStore {
  type Error = Error;

  // ── Pending wishes ────────────────────────────────────────────────────────

  async fn add_wish(&self, input: NewWish) -> Result<Wish> {
    let created_at = now();

    let wish = self
      .pool
      .interact(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (_, issued) = read_config(&tx)?;
        let id = WishId::allocate(decode_issued_id(issued), created_at);

        tx.execute(
          "INSERT INTO wishes (id, text, votes, timestamp) VALUES (?1, ?2, 0, ?3)",
          rusqlite::params![id.0, input.text(), encode_dt(created_at)],
        )?;
        tx.execute(
          "UPDATE system_config SET last_issued_id = ?1 WHERE id = 1",
          rusqlite::params![id.0],
        )?;
        tx.commit()?;
        Ok(input.into_wish(id, created_at))
      })
      .await?;

    tracing::debug!(wish_id = %wish.id, "added wish");
    Ok(wish)
  }

  async fn vote_wish(&self, id: WishId) -> Result<u32> {
    let votes: Option<i64> = self
      .pool
      .interact(move |conn| {
        Ok(
          conn
            .query_row(
              "UPDATE wishes SET votes = votes + 1 WHERE id = ?1 RETURNING votes",
              rusqlite::params![id.0],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let votes = votes.ok_or_else(|| not_found(id, StageKind::Pending))?;
    u32::try_from(votes).map_err(|_| Error::Decode(format!("wish {id} has {votes} votes")))
  }

  async fn delete_wish(&self, id: WishId) -> Result<bool> {
    let removed = self
      .pool
      .interact(move |conn| {
        Ok(conn.execute("DELETE FROM wishes WHERE id = ?1", rusqlite::params![id.0])?)
      })
      .await?;

    if removed > 0 {
      tracing::info!(wish_id = %id, "deleted pending wish");
    }
    Ok(removed > 0)
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  async fn move_to_implementing(&self, id: WishId) -> Result<Wish> {
    let moved_at = now();

    let wish = self
      .pool
      .interact(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let raw = fetch_one(&tx, "wishes", PENDING_COLUMNS, id.0)?
          .ok_or_else(|| not_found(id, StageKind::Pending))?;
        let wish = move_row_to_implementing(&tx, raw, moved_at)?;
        tx.commit()?;
        Ok(wish)
      })
      .await?;

    tracing::info!(wish_id = %wish.id, votes = wish.votes, "moved wish to implementing");
    Ok(wish)
  }

  async fn complete_wish(&self, id: WishId, url: Option<String>) -> Result<Wish> {
    let url = url.filter(|u| !u.trim().is_empty());
    let completed_at = now();

    let wish = self
      .pool
      .interact(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let raw = fetch_one(&tx, "implementing_wishes", IMPLEMENTING_COLUMNS, id.0)?
          .ok_or_else(|| not_found(id, StageKind::Implementing))?;
        tx.execute(
          "INSERT INTO implemented_wishes
             (id, text, votes, timestamp, url, completed_at, moved_to_implementing_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            raw.id,
            raw.text,
            raw.votes,
            raw.timestamp,
            url,
            encode_dt(completed_at),
            raw.moved_to_implementing_at,
          ],
        )?;
        tx.execute(
          "DELETE FROM implementing_wishes WHERE id = ?1",
          rusqlite::params![raw.id],
        )?;
        let wish = raw.into_wish(StageKind::Implementing)?.complete(url, completed_at)?;
        tx.commit()?;
        Ok(wish)
      })
      .await?;

    tracing::info!(wish_id = %wish.id, "completed wish");
    Ok(wish)
  }

  async fn weekly_check_at(&self, now: DateTime<Utc>) -> Result<WeeklyOutcome> {
    // Stored times carry milliseconds; the returned wish must match them.
    let now = now.trunc_subsecs(3);

    let outcome = self
      .pool
      .interact(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (check_ms, issued) = read_config(&tx)?;
        let config = config_from_raw(check_ms, issued)?;

        if !config.weekly_check_due(now) {
          return Ok(WeeklyOutcome::NotDue { next_due_at: config.next_weekly_check() });
        }

        let top = tx
          .query_row(
            &format!(
              "SELECT {PENDING_COLUMNS} FROM wishes
               WHERE votes > 0
               ORDER BY votes DESC, timestamp ASC, id ASC
               LIMIT 1"
            ),
            [],
            RawWish::from_row,
          )
          .optional()?;

        let outcome = match top {
          Some(raw) => WeeklyOutcome::Promoted(move_row_to_implementing(&tx, raw, now)?),
          None => WeeklyOutcome::NoCandidate,
        };
        tx.execute(
          "UPDATE system_config SET last_weekly_check = ?1 WHERE id = 1",
          rusqlite::params![encode_epoch_ms(Some(now))],
        )?;
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    match &outcome {
      WeeklyOutcome::NotDue { next_due_at } => {
        tracing::debug!(%next_due_at, "weekly check not due");
      }
      WeeklyOutcome::NoCandidate => tracing::info!("weekly check found no voted wish"),
      WeeklyOutcome::Promoted(wish) => {
        tracing::info!(wish_id = %wish.id, votes = wish.votes, "weekly check promoted wish");
      }
    }
    Ok(outcome)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_all_data(&self) -> Result<Snapshot> {
    self
      .pool
      .interact(|conn| {
        // One deferred transaction so all four reads see the same state.
        let tx = conn.transaction()?;
        let wishes = fetch_all(
          &tx,
          "wishes",
          PENDING_COLUMNS,
          "votes DESC, timestamp DESC, id DESC",
          StageKind::Pending,
        )?;
        let implementing_wishes = fetch_all(
          &tx,
          "implementing_wishes",
          IMPLEMENTING_COLUMNS,
          "timestamp DESC, id DESC",
          StageKind::Implementing,
        )?;
        let implemented_wishes = fetch_all(
          &tx,
          "implemented_wishes",
          COMPLETED_COLUMNS,
          "completed_at DESC, id DESC",
          StageKind::Completed,
        )?;
        let (check_ms, _) = read_config(&tx)?;
        tx.commit()?;

        Ok(Snapshot {
          wishes,
          implementing_wishes,
          implemented_wishes,
          last_weekly_check: decode_epoch_ms(check_ms)?,
        })
      })
      .await
  }
}
