//! Generic store-to-store snapshot replay.
//!
//! Both the seed bootstrap and the backend migration are the same
//! operation: read every row from one store, write each into another
//! through the idempotent insert path, preserving original dates and
//! capture timestamps. Reruns are safe: rows that already exist at the
//! destination are absorbed, not duplicated.

use anyhow::{Context, Result};
use tally_core::SnapshotStore;

/// Outcome of one replay pass.
#[derive(Debug, Clone, Copy)]
pub struct ReplayStats {
  /// Rows read from the source.
  pub inspected: usize,
  /// Rows that did not yet exist at the destination.
  pub written:   usize,
}

pub async fn replay<S, D>(source: &S, dest: &D) -> Result<ReplayStats>
where
  S: SnapshotStore,
  D: SnapshotStore,
{
  let rows = source
    .all_snapshots()
    .await
    .context("reading source snapshots")?;

  let mut written = 0usize;
  for row in &rows {
    if dest
      .upsert_snapshot(row)
      .await
      .context("writing snapshot to destination")?
    {
      written += 1;
    }
  }

  Ok(ReplayStats { inspected: rows.len(), written })
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use tally_core::{Snapshot, SnapshotStore};
  use tally_store_sqlite::SqliteStore;

  use super::*;

  async fn store() -> SqliteStore {
    let s = SqliteStore::open_in_memory().await.unwrap();
    s.ensure_schema().await.unwrap();
    s
  }

  fn snap(subject: &str, day: u32, xp: u64) -> Snapshot {
    let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
    Snapshot {
      subject: subject.into(),
      category: "Overall".into(),
      date,
      level: 50,
      experience: xp,
      rank: Some(100),
      captured_at: date.and_hms_opt(3, 30, 0).unwrap().and_utc(),
    }
  }

  #[tokio::test]
  async fn replay_copies_everything_once() {
    let source = store().await;
    let dest = store().await;
    for day in 1..=3 {
      source.upsert_snapshot(&snap("a", day, day as u64 * 100)).await.unwrap();
    }
    source.upsert_snapshot(&snap("b", 1, 50)).await.unwrap();

    let stats = replay(&source, &dest).await.unwrap();
    assert_eq!(stats.inspected, 4);
    assert_eq!(stats.written, 4);
    assert_eq!(dest.all_snapshots().await.unwrap().len(), 4);
  }

  #[tokio::test]
  async fn replay_is_idempotent() {
    let source = store().await;
    let dest = store().await;
    for day in 1..=3 {
      source.upsert_snapshot(&snap("a", day, day as u64 * 100)).await.unwrap();
    }

    let first = replay(&source, &dest).await.unwrap();
    assert_eq!(first.written, 3);

    let second = replay(&source, &dest).await.unwrap();
    assert_eq!(second.inspected, 3);
    assert_eq!(second.written, 0);
    assert_eq!(dest.all_snapshots().await.unwrap().len(), 3);
  }

  #[tokio::test]
  async fn replay_preserves_dates_and_timestamps() {
    let source = store().await;
    let dest = store().await;
    let original = snap("a", 7, 1234);
    source.upsert_snapshot(&original).await.unwrap();

    replay(&source, &dest).await.unwrap();

    let copied = dest
      .latest_snapshot("a", "Overall")
      .await
      .unwrap()
      .expect("row replayed");
    assert_eq!(copied.date, original.date);
    assert_eq!(copied.captured_at, original.captured_at);
    assert_eq!(copied.experience, original.experience);
  }
}
