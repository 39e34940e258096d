//! Encoding and decoding helpers between domain types and the plain-text /
//! integer representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339 strings, and all
//! counters as `INTEGER` (i64). `rank = NULL` means unranked.

use chrono::{DateTime, NaiveDate, Utc};
use tally_core::Snapshot;

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counters ────────────────────────────────────────────────────────────────

pub fn encode_xp(xp: u64) -> Result<i64> {
  i64::try_from(xp).map_err(|_| Error::OutOfRange(format!("experience {xp}")))
}

pub fn decode_xp(raw: i64) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::OutOfRange(format!("experience {raw}")))
}

pub fn decode_level(raw: i64) -> Result<u32> {
  u32::try_from(raw).map_err(|_| Error::OutOfRange(format!("level {raw}")))
}

pub fn encode_rank(rank: u64) -> Result<i64> {
  i64::try_from(rank).map_err(|_| Error::OutOfRange(format!("rank {rank}")))
}

pub fn decode_rank(raw: i64) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::OutOfRange(format!("rank {raw}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw column values read from a `snapshots` row joined with `subjects`.
pub struct RawSnapshot {
  pub subject:     String,
  pub category:    String,
  pub date:        String,
  pub level:       i64,
  pub experience:  i64,
  pub rank:        Option<i64>,
  pub captured_at: String,
}

impl RawSnapshot {
  pub fn into_snapshot(self) -> Result<Snapshot> {
    Ok(Snapshot {
      subject:     self.subject,
      category:    self.category,
      date:        decode_date(&self.date)?,
      level:       decode_level(self.level)?,
      experience:  decode_xp(self.experience)?,
      rank:        self.rank.map(decode_rank).transpose()?,
      captured_at: decode_dt(&self.captured_at)?,
    })
  }
}
