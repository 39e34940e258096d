//! Parser for the `index_lite.ws` response body.
//!
//! Pipeline:
//!   raw &str
//!     └─ one line per skill, `rank,level,xp`
//!          └─ parse_field()  → -1 means "absent"
//!               └─ SkillSample per line, activity tail ignored

use crate::error::{Error, Result};

/// Skill names in wire order. The endpoint identifies skills by line
/// position only; this table supplies the names.
pub const SKILLS: [&str; 25] = [
  "Overall",
  "Attack",
  "Defence",
  "Strength",
  "Hitpoints",
  "Ranged",
  "Prayer",
  "Magic",
  "Cooking",
  "Woodcutting",
  "Fletching",
  "Fishing",
  "Firemaking",
  "Crafting",
  "Smithing",
  "Mining",
  "Herblore",
  "Agility",
  "Thieving",
  "Slayer",
  "Farming",
  "Runecraft",
  "Hunter",
  "Construction",
  "Sailing",
];

/// One skill's current standing as reported by the hiscores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSample {
  pub skill:      &'static str,
  /// `None` when the player is below the leaderboard cutoff for the skill.
  pub rank:       Option<u64>,
  pub level:      u32,
  pub experience: u64,
}

/// Parse a full `index_lite` body into one sample per skill line.
///
/// The wire format reports `-1` for values the leaderboard does not track
/// for this player: an absent rank decodes to `None`, an absent level to 1,
/// absent experience to 0. Lines past the skill table are activity scores,
/// which have a different shape and no counterpart in the snapshot schema;
/// they are ignored.
pub fn parse_stats(body: &str) -> Result<Vec<SkillSample>> {
  let mut samples = Vec::with_capacity(SKILLS.len());

  for (index, line) in body.lines().enumerate() {
    let Some(&skill) = SKILLS.get(index) else {
      break; // activity tail
    };
    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    let mut fields = line.split(',');
    let rank = parse_field(fields.next(), index, line)?;
    let level = parse_field(fields.next(), index, line)?;
    let experience = parse_field(fields.next(), index, line)?.unwrap_or(0);

    samples.push(SkillSample {
      skill,
      rank: rank.map(|r| r as u64),
      level: level.map(|l| l as u32).unwrap_or(1),
      experience: experience as u64,
    });
  }

  if samples.is_empty() {
    return Err(Error::MalformedLine { index: 0, line: body.chars().take(80).collect() });
  }

  Ok(samples)
}

/// Decode one numeric field; `-1` (and a missing trailing field) mean
/// "absent". Anything non-numeric is a malformed line.
fn parse_field(
  field: Option<&str>,
  index: usize,
  line: &str,
) -> Result<Option<i64>> {
  let Some(field) = field else {
    return Ok(None);
  };
  let value: i64 = field.trim().parse().map_err(|_| Error::MalformedLine {
    index,
    line: line.to_owned(),
  })?;
  Ok((value >= 0).then_some(value))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
