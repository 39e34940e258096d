//! Snapshot — one immutable (subject, category, date) measurement.
//!
//! A snapshot is never updated or deleted. Re-collecting the same subject on
//! the same calendar day is absorbed by the store's uniqueness constraint,
//! not rejected as an error.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time measurement of one category (skill) for one subject.
///
/// `rank` is `None` when the subject is below the leaderboard cutoff for the
/// category ("unranked"). Consumers must never conflate that with rank zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  /// Case-normalised subject name (see [`crate::subject::normalize_name`]).
  pub subject:     String,
  /// Category (skill) name, e.g. `"Overall"` or `"Slayer"`.
  pub category:    String,
  /// UTC calendar day of capture; part of the uniqueness key.
  pub date:        NaiveDate,
  pub level:       u32,
  pub experience:  u64,
  pub rank:        Option<u64>,
  /// Full-precision capture instant; orders same-day rows in queries.
  pub captured_at: DateTime<Utc>,
}
