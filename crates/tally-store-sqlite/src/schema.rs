//! SQL schema for the tally SQLite store.
//!
//! Executed by `ensure_schema()`; never as a side effect of opening a
//! connection. Future migrations will be gated on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `date` and `captured_at` are ISO 8601 text, so lexicographic ordering is
/// chronological ordering. The same convention holds in the Postgres backend,
/// which keeps the two dialects interchangeable at the SQL level.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,   -- case-normalised display name
    created_at  TEXT NOT NULL           -- ISO 8601 UTC
);

-- Snapshots are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS snapshots (
    snapshot_id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id  INTEGER NOT NULL REFERENCES subjects(subject_id),
    category    TEXT NOT NULL,
    date        TEXT NOT NULL,          -- YYYY-MM-DD, UTC capture day
    level       INTEGER NOT NULL,
    experience  INTEGER NOT NULL,
    rank        INTEGER,                -- NULL = unranked
    captured_at TEXT NOT NULL           -- RFC 3339 UTC
);

-- One row per (subject, category, day); re-collection same-day is a no-op.
CREATE UNIQUE INDEX IF NOT EXISTS snapshots_key_idx
    ON snapshots(subject_id, category, date);

CREATE INDEX IF NOT EXISTS snapshots_subject_idx ON snapshots(subject_id);

-- Markers such as the seed-completion flag.
CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

PRAGMA user_version = 1;
";
