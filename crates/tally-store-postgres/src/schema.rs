//! SQL schema for the tally Postgres store.
//!
//! Mirrors the SQLite schema column-for-column; sqlx prepares one statement
//! at a time, so the DDL is a statement list rather than one batch string.

/// Idempotent schema DDL, executed in order by `ensure_schema()`.
pub const SCHEMA: &[&str] = &[
  "CREATE TABLE IF NOT EXISTS subjects (
     subject_id  BIGSERIAL PRIMARY KEY,
     name        TEXT NOT NULL UNIQUE,
     created_at  TEXT NOT NULL
   )",
  // Append-only; no UPDATE or DELETE is ever issued against this table.
  "CREATE TABLE IF NOT EXISTS snapshots (
     snapshot_id BIGSERIAL PRIMARY KEY,
     subject_id  BIGINT NOT NULL REFERENCES subjects(subject_id),
     category    TEXT NOT NULL,
     date        TEXT NOT NULL,
     level       BIGINT NOT NULL,
     experience  BIGINT NOT NULL,
     rank        BIGINT,
     captured_at TEXT NOT NULL
   )",
  "CREATE UNIQUE INDEX IF NOT EXISTS snapshots_key_idx
     ON snapshots(subject_id, category, date)",
  "CREATE INDEX IF NOT EXISTS snapshots_subject_idx ON snapshots(subject_id)",
  "CREATE TABLE IF NOT EXISTS meta (
     key   TEXT PRIMARY KEY,
     value TEXT NOT NULL
   )",
];
