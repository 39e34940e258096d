//! [`SqliteStore`] — the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tally_core::{
  snapshot::Snapshot,
  store::{HistoryRange, SnapshotStore},
  subject::normalize_name,
};

use crate::{
  Error, Result,
  encode::{
    RawSnapshot, decode_xp, encode_date, encode_dt, encode_rank, encode_xp,
  },
  schema::SCHEMA,
};

const SNAPSHOT_COLS: &str =
  "s.name, n.category, n.date, n.level, n.experience, n.rank, n.captured_at";

fn raw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSnapshot> {
  Ok(RawSnapshot {
    subject:     row.get(0)?,
    category:    row.get(1)?,
    date:        row.get(2)?,
    level:       row.get(3)?,
    experience:  row.get(4)?,
    rank:        row.get(5)?,
    captured_at: row.get(6)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tally snapshot store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Opening a
/// store does not touch the schema; callers run [`SnapshotStore::ensure_schema`]
/// explicitly before the first read or write.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteStore {
  type Error = Error;

  // ── Schema lifecycle ──────────────────────────────────────────────────────

  async fn ensure_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn is_empty(&self) -> Result<bool> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count == 0)
  }

  async fn get_meta(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM meta WHERE key = ?1",
              rusqlite::params![key],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn put_meta(&self, key: &str, value: &str) -> Result<()> {
    let key = key.to_owned();
    let value = value.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO meta (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_snapshot(&self, snapshot: &Snapshot) -> Result<bool> {
    let subject     = normalize_name(&snapshot.subject);
    let category    = snapshot.category.clone();
    let date        = encode_date(snapshot.date);
    let level       = i64::from(snapshot.level);
    let experience  = encode_xp(snapshot.experience)?;
    let rank        = snapshot.rank.map(encode_rank).transpose()?;
    let captured_at = encode_dt(snapshot.captured_at);

    let written = self
      .conn
      .call(move |conn| {
        // Subject creation and snapshot insert are one transaction, so a
        // snapshot can never reference a subject that failed to persist.
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT OR IGNORE INTO subjects (name, created_at) VALUES (?1, ?2)",
          rusqlite::params![subject, captured_at],
        )?;

        let subject_id: i64 = tx.query_row(
          "SELECT subject_id FROM subjects WHERE name = ?1",
          rusqlite::params![subject],
          |r| r.get(0),
        )?;

        let written = tx.execute(
          "INSERT OR IGNORE INTO snapshots
             (subject_id, category, date, level, experience, rank, captured_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            subject_id,
            category,
            date,
            level,
            experience,
            rank,
            captured_at,
          ],
        )? > 0;

        tx.commit()?;
        Ok(written)
      })
      .await?;

    Ok(written)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn latest_snapshot(
    &self,
    subject: &str,
    category: &str,
  ) -> Result<Option<Snapshot>> {
    let subject = normalize_name(subject);
    let category = category.to_owned();

    let raw: Option<RawSnapshot> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SNAPSHOT_COLS}
                 FROM snapshots n
                 JOIN subjects s ON s.subject_id = n.subject_id
                 WHERE s.name = ?1 AND n.category = ?2
                 ORDER BY n.date DESC, n.captured_at DESC
                 LIMIT 1"
              ),
              rusqlite::params![subject, category],
              raw_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSnapshot::into_snapshot).transpose()
  }

  async fn history(
    &self,
    subject: &str,
    category: &str,
    range: &HistoryRange,
  ) -> Result<Vec<Snapshot>> {
    let subject = normalize_name(subject);
    let category = category.to_owned();
    let from = range.from.map(encode_date);
    let to = range.to.map(encode_date);

    let raws: Vec<RawSnapshot> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SNAPSHOT_COLS}
           FROM snapshots n
           JOIN subjects s ON s.subject_id = n.subject_id
           WHERE s.name = ?1 AND n.category = ?2
             AND (?3 IS NULL OR n.date >= ?3)
             AND (?4 IS NULL OR n.date <= ?4)
           ORDER BY n.date ASC, n.captured_at ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![subject, category, from, to],
            raw_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSnapshot::into_snapshot).collect()
  }

  async fn list_subjects(&self) -> Result<Vec<String>> {
    let names: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT name FROM subjects ORDER BY name")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn xp_gained_since_first(
    &self,
    subject: &str,
    category: &str,
  ) -> Result<u64> {
    let subject = normalize_name(subject);
    let category = category.to_owned();

    let (first, last): (Option<i64>, Option<i64>) = self
      .conn
      .call(move |conn| {
        let bounds = |order: &str| -> rusqlite::Result<Option<i64>> {
          conn
            .query_row(
              &format!(
                "SELECT n.experience
                 FROM snapshots n
                 JOIN subjects s ON s.subject_id = n.subject_id
                 WHERE s.name = ?1 AND n.category = ?2
                 ORDER BY n.date {order}, n.captured_at {order}
                 LIMIT 1"
              ),
              rusqlite::params![subject, category],
              |r| r.get(0),
            )
            .optional()
        };
        Ok((bounds("ASC")?, bounds("DESC")?))
      })
      .await?;

    match (first, last) {
      (Some(first), Some(last)) => {
        Ok(decode_xp(last)?.saturating_sub(decode_xp(first)?))
      }
      _ => Ok(0),
    }
  }

  async fn all_snapshots(&self) -> Result<Vec<Snapshot>> {
    let raws: Vec<RawSnapshot> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SNAPSHOT_COLS}
           FROM snapshots n
           JOIN subjects s ON s.subject_id = n.subject_id
           ORDER BY s.name, n.date, n.captured_at"
        ))?;
        let rows = stmt
          .query_map([], raw_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSnapshot::into_snapshot).collect()
  }
}
