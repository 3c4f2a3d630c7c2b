//! Entity extraction over normalised text: players, teams, season tokens and
//! rolling windows.

use std::sync::LazyLock;

use hoop_core::plan::{PlanEntities, RollingWindow};
use regex::Regex;

const KNOWN_PLAYERS: &[&str] = &[
  "nikola jokic",
  "stephen curry",
  "damian lillard",
  "lebron james",
  "kevin durant",
  "tyrese haliburton",
  "domantas sabonis",
];

const KNOWN_TEAMS: &[&str] = &[
  "boston celtics",
  "denver nuggets",
  "los angeles lakers",
  "golden state warriors",
  "milwaukee bucks",
  "phoenix suns",
];

static SEASON_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\b(?:19|20)\d{2}-\d{2}\b").expect("season token pattern")
});

static LAST_N_GAMES: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\blast\s+(\d{1,2})\s+games?\b").expect("last-n-games pattern")
});

static LAST_N: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\blast\s+(\d{1,2})\b").expect("last-n pattern"));

/// Players and teams are contiguous substrings of the question; seasons are
/// deduplicated in order of first appearance.
pub fn extract_entities(normalized: &str) -> PlanEntities {
  let known = |vocabulary: &[&str]| -> Vec<String> {
    vocabulary
      .iter()
      .filter(|name| normalized.contains(*name))
      .map(|name| (*name).to_owned())
      .collect()
  };

  let mut seasons: Vec<String> = Vec::new();
  for token in SEASON_TOKEN.find_iter(normalized) {
    if !seasons.iter().any(|s| s == token.as_str()) {
      seasons.push(token.as_str().to_owned());
    }
  }

  PlanEntities {
    players: known(KNOWN_PLAYERS),
    teams: known(KNOWN_TEAMS),
    seasons,
  }
}

/// "last N games" wins over the looser "last N". A zero count is treated as
/// absent rather than an error.
pub fn extract_window(normalized: &str) -> Option<RollingWindow> {
  [&*LAST_N_GAMES, &*LAST_N].into_iter().find_map(|pattern| {
    let n: u32 = pattern.captures(normalized)?.get(1)?.as_str().parse().ok()?;
    (n > 0).then(|| RollingWindow::last_n_games(n))
  })
}
