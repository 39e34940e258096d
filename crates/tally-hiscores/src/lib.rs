//! OSRS hiscores client and wire-format codec for tally.
//!
//! The hiscores `index_lite.ws` endpoints return plain text: one
//! comma-separated `rank,level,xp` line per skill, followed by activity
//! lines that this crate parses past and ignores. Parsing is pure and
//! synchronous; only [`HiscoresClient`] touches the network.
//!
//! # Quick start
//!
//! ```no_run
//! use tally_hiscores::{GameMode, HiscoresClient, StatsSource};
//!
//! # async fn demo() -> tally_hiscores::Result<()> {
//! let client = HiscoresClient::new()?;
//! let stats = client.fetch("tibble49", GameMode::Regular).await?;
//! println!("{} skills", stats.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod parse;

pub mod error;

pub use client::{GameMode, HiscoresClient, StatsSource};
pub use error::{Error, Result};
pub use parse::{SKILLS, SkillSample, parse_stats};
