//! Deployment bootstrap: schema creation and the one-time seed load.
//!
//! `ensure_ready` is an explicit step, not a side effect of opening a
//! connection, so tests can call it directly and assert on its effect.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tally_core::SnapshotStore;
use tally_store_sqlite::SqliteStore;
use tracing::{debug, info, warn};

use crate::replay::{ReplayStats, replay};

/// Marker recording that the seed dataset was loaded once. Its presence
/// stops a store that has been emptied out-of-band from being reseeded.
pub const SEED_MARKER: &str = "seed_loaded";

/// Embedded-backend fast path: if the database file does not exist on disk
/// at all, the seed file itself becomes the initial database.
pub fn copy_seed_if_missing(db_path: &Path, seed_path: &Path) -> Result<()> {
  if db_path.exists() || !seed_path.exists() {
    return Ok(());
  }

  if let Some(parent) = db_path.parent() {
    if !parent.as_os_str().is_empty() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    }
  }
  std::fs::copy(seed_path, db_path).with_context(|| {
    format!(
      "copying seed {} to {}",
      seed_path.display(),
      db_path.display()
    )
  })?;

  info!(
    seed = %seed_path.display(),
    db = %db_path.display(),
    "initialised embedded database from seed file"
  );
  Ok(())
}

/// Make `store` ready for reads and writes.
///
/// Schema creation failures are fatal: nothing can proceed without a
/// writable schema. Seed-load failures are not: a fresh deployment with a
/// missing or corrupt seed starts with an empty history instead of failing.
pub async fn ensure_ready<S: SnapshotStore>(
  store: &S,
  seed_path: &Path,
) -> Result<()> {
  store.ensure_schema().await.context("creating schema")?;

  let fresh = store
    .is_empty()
    .await
    .context("checking for existing snapshots")?
    && store
      .get_meta(SEED_MARKER)
      .await
      .context("reading seed marker")?
      .is_none();
  if !fresh {
    return Ok(());
  }

  if !seed_path.exists() {
    debug!(seed = %seed_path.display(), "no seed dataset; starting empty");
    return Ok(());
  }

  match load_seed(store, seed_path).await {
    Ok(stats) => {
      store
        .put_meta(SEED_MARKER, &Utc::now().to_rfc3339())
        .await
        .context("recording seed marker")?;
      info!(rows = stats.written, "seed dataset loaded");
    }
    Err(error) => {
      warn!(
        seed = %seed_path.display(),
        %error,
        "seed load failed; continuing with empty store"
      );
    }
  }

  Ok(())
}

async fn load_seed<S: SnapshotStore>(
  store: &S,
  seed_path: &Path,
) -> Result<ReplayStats> {
  let seed = SqliteStore::open(seed_path)
    .await
    .context("opening seed dataset")?;
  replay(&seed, store).await
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use tally_core::{HistoryRange, Snapshot, SnapshotStore};
  use tally_store_sqlite::SqliteStore;

  use super::*;

  fn snap(subject: &str, category: &str, day: u32, xp: u64) -> Snapshot {
    let date = NaiveDate::from_ymd_opt(2023, 6, day).unwrap();
    Snapshot {
      subject: subject.into(),
      category: category.into(),
      date,
      level: 70,
      experience: xp,
      rank: None,
      captured_at: date.and_hms_opt(4, 15, 0).unwrap().and_utc(),
    }
  }

  /// Build a seed database file with 3 rows across 2 subjects.
  async fn write_seed(path: &Path) {
    let seed = SqliteStore::open(path).await.unwrap();
    seed.ensure_schema().await.unwrap();
    seed.upsert_snapshot(&snap("a", "Overall", 1, 100)).await.unwrap();
    seed.upsert_snapshot(&snap("a", "Overall", 2, 200)).await.unwrap();
    seed.upsert_snapshot(&snap("b", "Magic", 1, 50)).await.unwrap();
  }

  #[tokio::test]
  async fn seeds_fresh_store_preserving_rows() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("seed.sqlite3");
    write_seed(&seed_path).await;

    let dest = SqliteStore::open_in_memory().await.unwrap();
    ensure_ready(&dest, &seed_path).await.unwrap();

    let rows = dest.all_snapshots().await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(dest.list_subjects().await.unwrap(), vec!["a", "b"]);

    // Timestamps come from the seed, not from "now".
    let first = dest.latest_snapshot("b", "Magic").await.unwrap().unwrap();
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    assert_eq!(
      first.captured_at,
      NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(4, 15, 0)
        .unwrap()
        .and_utc()
    );

    assert!(dest.get_meta(SEED_MARKER).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn ensure_ready_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("seed.sqlite3");
    write_seed(&seed_path).await;

    let dest = SqliteStore::open_in_memory().await.unwrap();
    ensure_ready(&dest, &seed_path).await.unwrap();
    ensure_ready(&dest, &seed_path).await.unwrap();

    assert_eq!(dest.all_snapshots().await.unwrap().len(), 3);
  }

  #[tokio::test]
  async fn seed_marker_suppresses_reseeding() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("seed.sqlite3");
    write_seed(&seed_path).await;

    let dest = SqliteStore::open_in_memory().await.unwrap();
    dest.ensure_schema().await.unwrap();
    dest.put_meta(SEED_MARKER, "2023-01-01").await.unwrap();

    ensure_ready(&dest, &seed_path).await.unwrap();
    assert!(dest.is_empty().await.unwrap());
  }

  #[tokio::test]
  async fn missing_seed_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let dest = SqliteStore::open_in_memory().await.unwrap();

    ensure_ready(&dest, &dir.path().join("no-such-seed.sqlite3"))
      .await
      .unwrap();

    assert!(dest.is_empty().await.unwrap());
    assert!(dest.get_meta(SEED_MARKER).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn corrupt_seed_is_nonfatal() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("seed.sqlite3");
    std::fs::write(&seed_path, "not a database").unwrap();

    let dest = SqliteStore::open_in_memory().await.unwrap();
    ensure_ready(&dest, &seed_path).await.unwrap();

    assert!(dest.is_empty().await.unwrap());
  }

  #[tokio::test]
  async fn copies_seed_file_when_database_missing() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("seed.sqlite3");
    write_seed(&seed_path).await;
    let db_path = dir.path().join("data").join("hiscores.db");

    copy_seed_if_missing(&db_path, &seed_path).unwrap();

    let store = SqliteStore::open(&db_path).await.unwrap();
    let rows = store
      .history("a", "Overall", &HistoryRange::default())
      .await
      .unwrap();
    assert_eq!(rows.len(), 2);
  }

  #[tokio::test]
  async fn existing_database_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("seed.sqlite3");
    write_seed(&seed_path).await;

    let db_path = dir.path().join("hiscores.db");
    let existing = SqliteStore::open(&db_path).await.unwrap();
    existing.ensure_schema().await.unwrap();
    existing.upsert_snapshot(&snap("c", "Overall", 9, 999)).await.unwrap();
    drop(existing);

    copy_seed_if_missing(&db_path, &seed_path).unwrap();

    let store = SqliteStore::open(&db_path).await.unwrap();
    assert_eq!(store.list_subjects().await.unwrap(), vec!["c"]);
  }
}
