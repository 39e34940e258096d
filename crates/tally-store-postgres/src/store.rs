//! [`PgStore`] — the PostgreSQL implementation of [`SnapshotStore`].

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
  Row as _,
  postgres::{PgPool, PgPoolOptions, PgRow},
};
use tally_core::{
  snapshot::Snapshot,
  store::{HistoryRange, SnapshotStore},
  subject::normalize_name,
};

use crate::{Error, Result, schema::SCHEMA};

const SNAPSHOT_COLS: &str =
  "s.name, n.category, n.date, n.level, n.experience, n.rank, n.captured_at";

// ─── Codecs ──────────────────────────────────────────────────────────────────

fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn to_i64(value: u64, what: &str) -> Result<i64> {
  i64::try_from(value).map_err(|_| Error::OutOfRange(format!("{what} {value}")))
}

fn to_u64(raw: i64, what: &str) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::OutOfRange(format!("{what} {raw}")))
}

fn row_to_snapshot(row: &PgRow) -> Result<Snapshot> {
  let date: String = row.try_get("date")?;
  let captured_at: String = row.try_get("captured_at")?;
  let level: i64 = row.try_get("level")?;
  let experience: i64 = row.try_get("experience")?;
  let rank: Option<i64> = row.try_get("rank")?;

  Ok(Snapshot {
    subject:     row.try_get("name")?,
    category:    row.try_get("category")?,
    date:        decode_date(&date)?,
    level:       u32::try_from(level)
      .map_err(|_| Error::OutOfRange(format!("level {level}")))?,
    experience:  to_u64(experience, "experience")?,
    rank:        rank.map(|r| to_u64(r, "rank")).transpose()?,
    captured_at: decode_dt(&captured_at)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tally snapshot store backed by a PostgreSQL server.
///
/// Cloning is cheap — the inner pool is reference-counted. Connecting does
/// not touch the schema; callers run [`SnapshotStore::ensure_schema`]
/// explicitly before the first read or write.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  /// Connect to `database_url`. The dataset is small and the process is a
  /// short-lived batch, so the pool stays modest.
  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(5)
      .acquire_timeout(Duration::from_secs(5))
      .connect(database_url)
      .await?;
    Ok(Self { pool })
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for PgStore {
  type Error = Error;

  // ── Schema lifecycle ──────────────────────────────────────────────────────

  async fn ensure_schema(&self) -> Result<()> {
    for statement in SCHEMA {
      sqlx::query(statement).execute(&self.pool).await?;
    }
    Ok(())
  }

  async fn is_empty(&self) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snapshots")
      .fetch_one(&self.pool)
      .await?;
    Ok(count == 0)
  }

  async fn get_meta(&self, key: &str) -> Result<Option<String>> {
    let value: Option<String> =
      sqlx::query_scalar("SELECT value FROM meta WHERE key = $1")
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
    Ok(value)
  }

  async fn put_meta(&self, key: &str, value: &str) -> Result<()> {
    sqlx::query(
      "INSERT INTO meta (key, value) VALUES ($1, $2)
       ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
    )
    .bind(key)
    .bind(value)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_snapshot(&self, snapshot: &Snapshot) -> Result<bool> {
    let subject     = normalize_name(&snapshot.subject);
    let date        = encode_date(snapshot.date);
    let level       = i64::from(snapshot.level);
    let experience  = to_i64(snapshot.experience, "experience")?;
    let rank        = snapshot
      .rank
      .map(|r| to_i64(r, "rank"))
      .transpose()?;
    let captured_at = encode_dt(snapshot.captured_at);

    // Subject creation and snapshot insert are one transaction, so a
    // snapshot can never reference a subject that failed to persist.
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      "INSERT INTO subjects (name, created_at) VALUES ($1, $2)
       ON CONFLICT (name) DO NOTHING",
    )
    .bind(&subject)
    .bind(&captured_at)
    .execute(&mut *tx)
    .await?;

    let subject_id: i64 =
      sqlx::query_scalar("SELECT subject_id FROM subjects WHERE name = $1")
        .bind(&subject)
        .fetch_one(&mut *tx)
        .await?;

    let result = sqlx::query(
      "INSERT INTO snapshots
         (subject_id, category, date, level, experience, rank, captured_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7)
       ON CONFLICT (subject_id, category, date) DO NOTHING",
    )
    .bind(subject_id)
    .bind(&snapshot.category)
    .bind(&date)
    .bind(level)
    .bind(experience)
    .bind(rank)
    .bind(&captured_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn latest_snapshot(
    &self,
    subject: &str,
    category: &str,
  ) -> Result<Option<Snapshot>> {
    let row = sqlx::query(&format!(
      "SELECT {SNAPSHOT_COLS}
       FROM snapshots n
       JOIN subjects s ON s.subject_id = n.subject_id
       WHERE s.name = $1 AND n.category = $2
       ORDER BY n.date DESC, n.captured_at DESC
       LIMIT 1"
    ))
    .bind(normalize_name(subject))
    .bind(category)
    .fetch_optional(&self.pool)
    .await?;

    row.as_ref().map(row_to_snapshot).transpose()
  }

  async fn history(
    &self,
    subject: &str,
    category: &str,
    range: &HistoryRange,
  ) -> Result<Vec<Snapshot>> {
    let rows = sqlx::query(&format!(
      "SELECT {SNAPSHOT_COLS}
       FROM snapshots n
       JOIN subjects s ON s.subject_id = n.subject_id
       WHERE s.name = $1 AND n.category = $2
         AND ($3::text IS NULL OR n.date >= $3)
         AND ($4::text IS NULL OR n.date <= $4)
       ORDER BY n.date ASC, n.captured_at ASC"
    ))
    .bind(normalize_name(subject))
    .bind(category)
    .bind(range.from.map(encode_date))
    .bind(range.to.map(encode_date))
    .fetch_all(&self.pool)
    .await?;

    rows.iter().map(row_to_snapshot).collect()
  }

  async fn list_subjects(&self) -> Result<Vec<String>> {
    let names: Vec<String> =
      sqlx::query_scalar("SELECT name FROM subjects ORDER BY name")
        .fetch_all(&self.pool)
        .await?;
    Ok(names)
  }

  async fn xp_gained_since_first(
    &self,
    subject: &str,
    category: &str,
  ) -> Result<u64> {
    let subject = normalize_name(subject);

    let sql = |order: &str| {
      format!(
        "SELECT n.experience
         FROM snapshots n
         JOIN subjects s ON s.subject_id = n.subject_id
         WHERE s.name = $1 AND n.category = $2
         ORDER BY n.date {order}, n.captured_at {order}
         LIMIT 1"
      )
    };

    let first_sql = sql("ASC");
    let first: Option<i64> = sqlx::query_scalar(&first_sql)
      .bind(&subject)
      .bind(category)
      .fetch_optional(&self.pool)
      .await?;

    let last_sql = sql("DESC");
    let last: Option<i64> = sqlx::query_scalar(&last_sql)
      .bind(&subject)
      .bind(category)
      .fetch_optional(&self.pool)
      .await?;

    match (first, last) {
      (Some(first), Some(last)) => Ok(
        to_u64(last, "experience")?
          .saturating_sub(to_u64(first, "experience")?),
      ),
      _ => Ok(0),
    }
  }

  async fn all_snapshots(&self) -> Result<Vec<Snapshot>> {
    let rows = sqlx::query(&format!(
      "SELECT {SNAPSHOT_COLS}
       FROM snapshots n
       JOIN subjects s ON s.subject_id = n.subject_id
       ORDER BY s.name, n.date, n.captured_at"
    ))
    .fetch_all(&self.pool)
    .await?;

    rows.iter().map(row_to_snapshot).collect()
  }
}
