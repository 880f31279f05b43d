//! Wish types: the unit of the wishlist.
//!
//! A wish is created pending, may be promoted to implementing, and may then
//! be completed. The base fields (`id`, `text`, `votes`, `timestamp`) are
//! carried unchanged across every transition; each stage adds its own
//! timestamps.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// A time-derived wish identifier, unique across all stages and never
/// reissued.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WishId(pub i64);

impl WishId {
  /// Allocate the id for a wish created at `now`.
  ///
  /// Normally the creation time in epoch milliseconds; bumped past
  /// `last_issued` when two wishes land in the same millisecond or the clock
  /// steps backwards.
  pub fn allocate(last_issued: Option<WishId>, now: DateTime<Utc>) -> WishId {
    let candidate = now.timestamp_millis();
    match last_issued {
      Some(WishId(last)) if candidate <= last => WishId(last + 1),
      _ => WishId(candidate),
    }
  }
}

impl fmt::Display for WishId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Stage ───────────────────────────────────────────────────────────────────

/// Which lifecycle table a wish lives in, without stage-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
  Pending,
  Implementing,
  Completed,
}

impl fmt::Display for StageKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      StageKind::Pending => "pending",
      StageKind::Implementing => "in-progress",
      StageKind::Completed => "completed",
    })
  }
}

/// The lifecycle stage of a wish together with the fields that stage adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
  tag = "stage",
  rename_all = "snake_case",
  rename_all_fields = "camelCase"
)]
pub enum Stage {
  Pending,
  Implementing {
    moved_to_implementing_at: DateTime<Utc>,
  },
  Completed {
    /// Absent for rows recorded before promotion times were tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    moved_to_implementing_at: Option<DateTime<Utc>>,
    /// Where the implementation can be found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url:                      Option<String>,
    completed_at:             DateTime<Utc>,
  },
}

impl Stage {
  pub fn kind(&self) -> StageKind {
    match self {
      Stage::Pending => StageKind::Pending,
      Stage::Implementing { .. } => StageKind::Implementing,
      Stage::Completed { .. } => StageKind::Completed,
    }
  }
}

// ─── Wish ────────────────────────────────────────────────────────────────────

/// A wish in one of the three lifecycle stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
  pub id:        WishId,
  pub text:      String,
  /// Only ever incremented, and only while pending.
  pub votes:     u32,
  /// Creation time; never changes.
  pub timestamp: DateTime<Utc>,
  #[serde(flatten)]
  pub stage:     Stage,
}

impl Wish {
  /// Pending → implementing.
  pub fn start_implementing(self, at: DateTime<Utc>) -> Result<Wish> {
    let Wish { id, text, votes, timestamp, stage } = self;
    match stage {
      Stage::Pending => Ok(Wish {
        id,
        text,
        votes,
        timestamp,
        stage: Stage::Implementing { moved_to_implementing_at: at },
      }),
      other => Err(Error::InvalidTransition {
        id,
        from: other.kind(),
        to: StageKind::Implementing,
      }),
    }
  }

  /// Implementing → completed. The promotion time is carried forward.
  pub fn complete(self, url: Option<String>, at: DateTime<Utc>) -> Result<Wish> {
    let Wish { id, text, votes, timestamp, stage } = self;
    match stage {
      Stage::Implementing { moved_to_implementing_at } => Ok(Wish {
        id,
        text,
        votes,
        timestamp,
        stage: Stage::Completed {
          moved_to_implementing_at: Some(moved_to_implementing_at),
          url,
          completed_at: at,
        },
      }),
      other => Err(Error::InvalidTransition {
        id,
        from: other.kind(),
        to: StageKind::Completed,
      }),
    }
  }
}

// ─── NewWish ─────────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::WishStore::add_wish`].
/// The id, vote count and timestamp are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWish {
  text: String,
}

impl NewWish {
  /// Rejects empty or whitespace-only text. Surrounding whitespace is
  /// trimmed; duplicates of existing wishes are allowed.
  pub fn new(text: impl Into<String>) -> Result<Self> {
    let text = text.into();
    let trimmed = text.trim();
    if trimmed.is_empty() {
      return Err(Error::Validation("wish text must not be empty".into()));
    }
    Ok(Self { text: trimmed.to_owned() })
  }

  pub fn text(&self) -> &str { &self.text }

  /// Materialise the pending wish the store is about to insert.
  pub fn into_wish(self, id: WishId, at: DateTime<Utc>) -> Wish {
    Wish {
      id,
      text: self.text,
      votes: 0,
      timestamp: at,
      stage: Stage::Pending,
    }
  }
}
