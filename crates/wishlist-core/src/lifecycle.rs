//! System configuration, the weekly promotion policy, and the read model.
//!
//! The weekly check promotes the most-voted pending wish at most once per
//! seven days. The policy decision lives here; the store applies it inside a
//! single transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wish::{Wish, WishId};

/// Minimum time between two weekly evaluations, in milliseconds.
pub const WEEKLY_INTERVAL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

// ─── System configuration ────────────────────────────────────────────────────

/// The single-row configuration record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemConfig {
  /// When the weekly check last ran to completion; `None` if never.
  pub last_weekly_check: Option<DateTime<Utc>>,
  /// The highest wish id handed out so far.
  pub last_issued_id:    Option<WishId>,
}

impl SystemConfig {
  /// `lastWeeklyCheck` as epoch milliseconds, `0` meaning never.
  pub fn last_weekly_check_ms(&self) -> i64 {
    self.last_weekly_check.map_or(0, |t| t.timestamp_millis())
  }

  /// A check is due once strictly more than seven days have passed.
  pub fn weekly_check_due(&self, now: DateTime<Utc>) -> bool {
    now.timestamp_millis() - self.last_weekly_check_ms() > WEEKLY_INTERVAL_MS
  }

  /// The earliest instant at which [`Self::weekly_check_due`] turns true.
  pub fn next_weekly_check(&self) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(self.last_weekly_check_ms() + WEEKLY_INTERVAL_MS + 1)
      .unwrap_or(DateTime::<Utc>::MAX_UTC)
  }
}

// ─── Weekly outcome ──────────────────────────────────────────────────────────

/// Result of one weekly evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeeklyOutcome {
  /// Less than a week since the last check; nothing was touched.
  NotDue { next_due_at: DateTime<Utc> },
  /// The check ran but no pending wish had any votes. The check time was
  /// still recorded.
  NoCandidate,
  /// The top-voted pending wish was moved to implementing.
  Promoted(Wish),
}

impl WeeklyOutcome {
  pub fn moved_wish(&self) -> Option<&Wish> {
    match self {
      Self::Promoted(w) => Some(w),
      _ => None,
    }
  }

  pub fn into_moved_wish(self) -> Option<Wish> {
    match self {
      Self::Promoted(w) => Some(w),
      _ => None,
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Everything the frontend renders, read in one consistent pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
  /// Pending wishes, most votes first, newest first among equals.
  pub wishes:              Vec<Wish>,
  /// Implementing wishes, newest first.
  pub implementing_wishes: Vec<Wish>,
  /// Completed wishes, most recently completed first.
  pub implemented_wishes:  Vec<Wish>,
  #[serde(with = "epoch_millis")]
  pub last_weekly_check:   Option<DateTime<Utc>>,
}

/// `Option<DateTime<Utc>>` as epoch milliseconds with `0` for `None`.
mod epoch_millis {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.map_or(0, |t| t.timestamp_millis()))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    match i64::deserialize(deserializer)? {
      0 => Ok(None),
      ms => DateTime::from_timestamp_millis(ms)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}"))),
    }
  }
}
