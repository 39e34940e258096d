//! Subject identity helpers.
//!
//! A subject is identified by its case-normalised display name. Subject rows
//! are created lazily by the store alongside the first snapshot write; there
//! is no separate creation step that can fail independently.

/// Normalise a subject name for storage and lookup.
///
/// The leaderboard treats names case-insensitively, so every write and read
/// path must go through this before touching the store.
pub fn normalize_name(name: &str) -> String { name.trim().to_lowercase() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_name("  Tibble49 "), "tibble49");
    assert_eq!(normalize_name("XESPIS"), "xespis");
  }

  #[test]
  fn normalize_is_idempotent() {
    let once = normalize_name("Some Player");
    assert_eq!(normalize_name(&once), once);
  }
}
