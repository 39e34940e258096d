//! Async HTTP client for the hiscores `index_lite.ws` endpoints.

use std::{future::Future, str::FromStr, time::Duration};

use reqwest::{Client, StatusCode};

use crate::{
  error::{Error, Result},
  parse::{SkillSample, parse_stats},
};

/// Per-request timeout. A hung endpoint skips the subject for this run
/// rather than stalling the whole batch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Game modes ──────────────────────────────────────────────────────────────

/// The leaderboard variant to query. Each mode has its own endpoint; the
/// mode affects only which URL is fetched, never how results are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
  #[default]
  Regular,
  Ironman,
  HardcoreIronman,
  UltimateIronman,
  Deadman,
  Seasonal,
}

impl GameMode {
  pub const ALL: [GameMode; 6] = [
    GameMode::Regular,
    GameMode::Ironman,
    GameMode::HardcoreIronman,
    GameMode::UltimateIronman,
    GameMode::Deadman,
    GameMode::Seasonal,
  ];

  pub fn endpoint(self) -> &'static str {
    match self {
      GameMode::Regular => {
        "https://secure.runescape.com/m=hiscore_oldschool/index_lite.ws"
      }
      GameMode::Ironman => {
        "https://secure.runescape.com/m=hiscore_oldschool_ironman/index_lite.ws"
      }
      GameMode::HardcoreIronman => {
        "https://secure.runescape.com/m=hiscore_oldschool_hardcore_ironman/index_lite.ws"
      }
      GameMode::UltimateIronman => {
        "https://secure.runescape.com/m=hiscore_oldschool_ultimate/index_lite.ws"
      }
      GameMode::Deadman => {
        "https://secure.runescape.com/m=hiscore_oldschool_deadman/index_lite.ws"
      }
      GameMode::Seasonal => {
        "https://secure.runescape.com/m=hiscore_oldschool_seasonal/index_lite.ws"
      }
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      GameMode::Regular => "regular",
      GameMode::Ironman => "ironman",
      GameMode::HardcoreIronman => "hardcore_ironman",
      GameMode::UltimateIronman => "ultimate_ironman",
      GameMode::Deadman => "deadman",
      GameMode::Seasonal => "seasonal",
    }
  }
}

impl FromStr for GameMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    GameMode::ALL
      .into_iter()
      .find(|m| m.as_str() == s)
      .ok_or_else(|| Error::UnknownMode(s.to_owned()))
  }
}

// ─── Fetch seam ──────────────────────────────────────────────────────────────

/// Source of current stats for a player. The collector depends on this
/// seam rather than on [`HiscoresClient`] directly, so batch behaviour can
/// be tested without the network.
pub trait StatsSource: Send + Sync {
  fn fetch<'a>(
    &'a self,
    player: &'a str,
    mode: GameMode,
  ) -> impl Future<Output = Result<Vec<SkillSample>>> + Send + 'a;
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the public hiscores API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HiscoresClient {
  client: Client,
}

impl HiscoresClient {
  pub fn new() -> Result<Self> {
    let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
    Ok(Self { client })
  }
}

impl StatsSource for HiscoresClient {
  async fn fetch(&self, player: &str, mode: GameMode) -> Result<Vec<SkillSample>> {
    let resp = self
      .client
      .get(mode.endpoint())
      .query(&[("player", player)])
      .send()
      .await?;

    match resp.status() {
      StatusCode::NOT_FOUND => {
        return Err(Error::PlayerNotFound(player.to_owned()));
      }
      status if !status.is_success() => {
        return Err(Error::Status { player: player.to_owned(), status: status.as_u16() });
      }
      _ => {}
    }

    parse_stats(&resp.text().await?)
  }
}
