//! The collection run: fetch current stats, store today's snapshots.

use anyhow::{Context, Result};
use chrono::Utc;
use tally_core::{Snapshot, SnapshotStore};
use tally_hiscores::{GameMode, StatsSource};
use tracing::{info, warn};

/// Fetch every configured player and store one snapshot per skill, dated
/// today (UTC).
///
/// A run is a best-effort batch: a player whose fetch fails (offline API,
/// unknown name, timeout) is logged and skipped, and the run carries on.
/// Storage errors abort the run.
pub async fn run<S, F>(
  store: &S,
  source: &F,
  players: &[String],
  mode: GameMode,
) -> Result<()>
where
  S: SnapshotStore,
  F: StatsSource,
{
  let mut failed = 0usize;

  for player in players {
    let samples = match source.fetch(player, mode).await {
      Ok(samples) => samples,
      Err(error) => {
        failed += 1;
        warn!(player = %player, %error, "fetch failed; skipping this run");
        continue;
      }
    };

    let captured_at = Utc::now();
    let date = captured_at.date_naive();
    let mut written = 0usize;

    for sample in &samples {
      let snapshot = Snapshot {
        subject:     player.clone(),
        category:    sample.skill.to_owned(),
        date,
        level:       sample.level,
        experience:  sample.experience,
        rank:        sample.rank,
        captured_at,
      };
      // Duplicate keys are the expected steady state of a same-day re-run.
      if store
        .upsert_snapshot(&snapshot)
        .await
        .context("storing snapshot")?
      {
        written += 1;
      }
    }

    if let Some(overall) = samples.first() {
      info!(
        player = %player,
        mode = mode.as_str(),
        written,
        skills = samples.len(),
        total_level = overall.level,
        total_xp = overall.experience,
        "collected"
      );
    }
  }

  if failed > 0 {
    warn!(failed, total = players.len(), "some players could not be fetched");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use tally_hiscores::{Error as FetchError, SkillSample};
  use tally_store_sqlite::SqliteStore;

  use super::*;

  /// Stats source that fails for one specific player name.
  struct Stub;

  impl StatsSource for Stub {
    async fn fetch(
      &self,
      player: &str,
      _mode: GameMode,
    ) -> tally_hiscores::Result<Vec<SkillSample>> {
      if player == "broken" {
        return Err(FetchError::PlayerNotFound(player.to_owned()));
      }
      Ok(vec![
        SkillSample {
          skill:      "Overall",
          rank:       Some(120_000),
          level:      1200,
          experience: 5_000_000,
        },
        SkillSample { skill: "Attack", rank: None, level: 70, experience: 750_000 },
      ])
    }
  }

  async fn store() -> SqliteStore {
    let s = SqliteStore::open_in_memory().await.unwrap();
    s.ensure_schema().await.unwrap();
    s
  }

  #[tokio::test]
  async fn one_failing_player_does_not_poison_the_batch() {
    let s = store().await;
    let players: Vec<String> =
      ["alpha", "broken", "gamma"].map(String::from).into();

    run(&s, &Stub, &players, GameMode::Regular).await.unwrap();

    assert_eq!(s.list_subjects().await.unwrap(), vec!["alpha", "gamma"]);
    // Two skills each for the two players that fetched.
    assert_eq!(s.all_snapshots().await.unwrap().len(), 4);
  }

  #[tokio::test]
  async fn rerun_same_day_writes_nothing_new() {
    let s = store().await;
    let players = vec!["alpha".to_owned()];

    run(&s, &Stub, &players, GameMode::Regular).await.unwrap();
    run(&s, &Stub, &players, GameMode::Regular).await.unwrap();

    assert_eq!(s.all_snapshots().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn unranked_skill_is_stored_without_rank() {
    let s = store().await;
    run(&s, &Stub, &["alpha".to_owned()], GameMode::Regular)
      .await
      .unwrap();

    let attack = s.latest_snapshot("alpha", "Attack").await.unwrap().unwrap();
    assert_eq!(attack.rank, None);
    assert_eq!(attack.level, 70);
  }
}
