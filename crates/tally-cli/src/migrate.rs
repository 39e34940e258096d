//! One-shot migration of the embedded store into the networked backend.
//!
//! Rerunnable by construction: the destination write path ignores rows
//! whose (subject, category, date) key already exists, so a second run
//! writes zero rows. The source is never mutated.

use anyhow::{Context, Result, bail};
use tally_core::SnapshotStore;
use tally_store_postgres::PgStore;
use tally_store_sqlite::SqliteStore;
use tracing::info;

use crate::{
  config::{Backend, Settings},
  replay::replay,
};

pub async fn run(settings: &Settings) -> Result<()> {
  let Backend::Postgres(url) = settings.backend() else {
    bail!("migration needs a networked destination; set TALLY_DATABASE_URL");
  };

  let sqlite_path = &settings.sqlite_path;
  if !sqlite_path.exists() {
    bail!("embedded database not found: {}", sqlite_path.display());
  }

  let source = SqliteStore::open(sqlite_path)
    .await
    .with_context(|| format!("opening {}", sqlite_path.display()))?;

  let dest = PgStore::connect(&url)
    .await
    .context("connecting to the destination backend")?;
  dest
    .ensure_schema()
    .await
    .context("creating destination schema")?;

  let stats = replay(&source, &dest).await?;

  info!(
    inspected = stats.inspected,
    written = stats.written,
    "migration complete"
  );
  println!(
    "Inspected {} rows in {}; wrote {} new rows to the destination.",
    stats.inspected,
    sqlite_path.display(),
    stats.written
  );
  Ok(())
}
