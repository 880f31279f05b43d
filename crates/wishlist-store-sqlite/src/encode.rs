//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Wish timestamps are stored as fixed-width RFC 3339 strings with
//! millisecond precision and a `Z` suffix, so string order is time order.
//! The config record stores epoch milliseconds, with `0` meaning unset.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use wishlist_core::wish::{Stage, StageKind, Wish, WishId};

use crate::{Error, Result};

// ─── Clock ───────────────────────────────────────────────────────────────────

/// The current time, truncated to what the store can represent.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Epoch milliseconds ──────────────────────────────────────────────────────

pub fn encode_epoch_ms(dt: Option<DateTime<Utc>>) -> i64 {
  dt.map_or(0, |t| t.timestamp_millis())
}

pub fn decode_epoch_ms(ms: i64) -> Result<Option<DateTime<Utc>>> {
  match ms {
    0 => Ok(None),
    ms => DateTime::from_timestamp_millis(ms)
      .map(Some)
      .ok_or_else(|| Error::Decode(format!("epoch ms out of range: {ms}"))),
  }
}

pub fn decode_issued_id(raw: i64) -> Option<WishId> {
  (raw > 0).then_some(WishId(raw))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every wish query; each stage table is projected to
/// the same seven columns so one row mapper serves all three.
pub const PENDING_COLUMNS: &str =
  "id, text, votes, timestamp, NULL, NULL, NULL";
pub const IMPLEMENTING_COLUMNS: &str =
  "id, text, votes, timestamp, moved_to_implementing_at, NULL, NULL";
pub const COMPLETED_COLUMNS: &str =
  "id, text, votes, timestamp, moved_to_implementing_at, url, completed_at";

/// Raw values read directly from a row of one of the stage tables.
pub struct RawWish {
  pub id:                       i64,
  pub text:                     String,
  pub votes:                    i64,
  pub timestamp:                String,
  pub moved_to_implementing_at: Option<String>,
  pub url:                      Option<String>,
  pub completed_at:             Option<String>,
}

impl RawWish {
  /// Row mapper for queries selecting one of the `*_COLUMNS` lists.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawWish {
      id:                       row.get(0)?,
      text:                     row.get(1)?,
      votes:                    row.get(2)?,
      timestamp:                row.get(3)?,
      moved_to_implementing_at: row.get(4)?,
      url:                      row.get(5)?,
      completed_at:             row.get(6)?,
    })
  }

  pub fn into_wish(self, kind: StageKind) -> Result<Wish> {
    let id = WishId(self.id);
    let votes = u32::try_from(self.votes)
      .map_err(|_| Error::Decode(format!("wish {id} has invalid vote count {}", self.votes)))?;
    let timestamp = decode_dt(&self.timestamp)?;

    let moved_at = self
      .moved_to_implementing_at
      .as_deref()
      .map(decode_dt)
      .transpose()?;

    let stage = match kind {
      StageKind::Pending => Stage::Pending,
      StageKind::Implementing => Stage::Implementing {
        moved_to_implementing_at: moved_at.ok_or_else(|| {
          Error::Decode(format!("implementing wish {id} has no promotion time"))
        })?,
      },
      StageKind::Completed => {
        let completed_at = self.completed_at.as_deref().ok_or_else(|| {
          Error::Decode(format!("completed wish {id} has no completion time"))
        })?;
        Stage::Completed {
          moved_to_implementing_at: moved_at,
          url:                      self.url,
          completed_at:             decode_dt(completed_at)?,
        }
      }
    };

    Ok(Wish { id, text: self.text, votes, timestamp, stage })
  }
}
