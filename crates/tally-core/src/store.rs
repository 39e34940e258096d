//! The `SnapshotStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`tally-store-sqlite`,
//! `tally-store-postgres`). Higher layers (the collector, the migration
//! path, any dashboard) depend on this abstraction, not on any concrete
//! backend, and never branch on which one is active.

use std::future::Future;

use chrono::NaiveDate;

use crate::snapshot::Snapshot;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Optional date bounds for [`SnapshotStore::history`]. Both ends inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryRange {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a tally snapshot store backend.
///
/// Writes are append-only and idempotent: a second write for the same
/// (subject, category, date) key is silently absorbed, never an error and
/// never an overwrite. Reads for unknown subjects return empty results.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema lifecycle ──────────────────────────────────────────────────

  /// Create tables and indexes if absent. Idempotent; must be called once
  /// per process before any other method. A failure here is fatal to the
  /// caller: nothing can proceed without a writable schema.
  fn ensure_schema(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// `true` if the store holds no snapshot rows. Used together with the
  /// seed marker to decide whether a deployment is freshly provisioned.
  fn is_empty(
    &self,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Read a marker value (e.g. the seed-completion marker).
  fn get_meta<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Write a marker value, replacing any previous one.
  fn put_meta<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a snapshot, creating its subject in the same transaction if
  /// needed. Keyed on (subject, category, date) with insert-or-ignore
  /// semantics: returns `true` if a new row was written, `false` if the key
  /// already existed (the row keeps its original values).
  fn upsert_snapshot<'a>(
    &'a self,
    snapshot: &'a Snapshot,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The row with the maximum date (capture timestamp as tiebreak), or
  /// `None` if the pair has no history.
  fn latest_snapshot<'a>(
    &'a self,
    subject: &'a str,
    category: &'a str,
  ) -> impl Future<Output = Result<Option<Snapshot>, Self::Error>> + Send + 'a;

  /// All rows for the pair within `range`, ascending by date (capture
  /// timestamp as tiebreak). Recomputed on every call.
  fn history<'a>(
    &'a self,
    subject: &'a str,
    category: &'a str,
    range: &'a HistoryRange,
  ) -> impl Future<Output = Result<Vec<Snapshot>, Self::Error>> + Send + 'a;

  /// Known subject names, sorted.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Latest experience minus earliest-recorded experience for the pair,
  /// saturating at zero. Zero when the pair has fewer than two data points.
  fn xp_gained_since_first<'a>(
    &'a self,
    subject: &'a str,
    category: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Every snapshot row in the store, ordered by subject, then date. Feeds
  /// the replay path (seeding a fresh deployment, backend migration).
  fn all_snapshots(
    &self,
  ) -> impl Future<Output = Result<Vec<Snapshot>, Self::Error>> + Send + '_;
}
