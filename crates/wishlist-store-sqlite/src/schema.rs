//! SQL schema for the wishlist SQLite store.
//!
//! Executed once when the pool opens its first connection. Future
//! migrations will be gated on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` / `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One table per lifecycle stage. A wish id lives in exactly one of the
-- three; moves between them happen inside a single transaction.
CREATE TABLE IF NOT EXISTS wishes (
    id         INTEGER PRIMARY KEY,
    text       TEXT    NOT NULL,
    votes      INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
    timestamp  TEXT    NOT NULL   -- RFC 3339 UTC, millisecond precision
);

CREATE TABLE IF NOT EXISTS implementing_wishes (
    id                        INTEGER PRIMARY KEY,
    text                      TEXT    NOT NULL,
    votes                     INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
    timestamp                 TEXT    NOT NULL,
    moved_to_implementing_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS implemented_wishes (
    id                        INTEGER PRIMARY KEY,
    text                      TEXT    NOT NULL,
    votes                     INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
    timestamp                 TEXT    NOT NULL,
    url                       TEXT,
    completed_at              TEXT    NOT NULL,
    moved_to_implementing_at  TEXT
);

-- Single-row configuration record.
CREATE TABLE IF NOT EXISTS system_config (
    id                 INTEGER PRIMARY KEY CHECK (id = 1),
    last_weekly_check  INTEGER NOT NULL DEFAULT 0,   -- epoch ms; 0 = never
    last_issued_id     INTEGER NOT NULL DEFAULT 0    -- 0 = none issued yet
);

INSERT OR IGNORE INTO system_config (id) VALUES (1);

CREATE INDEX IF NOT EXISTS wishes_rank_idx
    ON wishes(votes DESC, timestamp);
CREATE INDEX IF NOT EXISTS implementing_timestamp_idx
    ON implementing_wishes(timestamp);
CREATE INDEX IF NOT EXISTS implemented_completed_idx
    ON implemented_wishes(completed_at);

PRAGMA user_version = 1;
";
