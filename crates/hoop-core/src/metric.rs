//! Metric definitions and the registry the planner resolves aliases against.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  plan::{MetricSelection, QueryIntent},
};

/// Which kind of entity a metric can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityScope {
  Player,
  Team,
}

/// A static catalog entry for one canonical metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
  pub id:                    String,
  /// Lowercase, normalised phrases. Multi-word aliases match as substrings,
  /// single words match whole tokens.
  pub aliases:               Vec<String>,
  pub allowed_intents:       Vec<QueryIntent>,
  pub allowed_entity_scopes: Vec<EntityScope>,
  /// Endpoint ids this metric needs data from.
  pub required_sources:      Vec<String>,
  pub formula:               Option<String>,
}

impl MetricDefinition {
  pub fn allows(&self, intent: QueryIntent) -> bool {
    self.allowed_intents.contains(&intent)
  }

  pub fn has_alias(&self, alias: &str) -> bool {
    self.aliases.iter().any(|a| a == alias)
  }
}

/// Why a metric selection is incompatible with an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricMismatch {
  Unknown(String),
  NotAllowed { metric: String, intent: QueryIntent },
}

/// Read-only lookup over an ordered list of [`MetricDefinition`]s.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
  metrics: Vec<MetricDefinition>,
}

impl MetricRegistry {
  /// Build a registry, rejecting duplicate ids.
  pub fn new(metrics: Vec<MetricDefinition>) -> Result<Self> {
    for (i, m) in metrics.iter().enumerate() {
      if metrics[..i].iter().any(|other| other.id == m.id) {
        return Err(Error::DuplicateMetric(m.id.clone()));
      }
    }
    Ok(Self { metrics })
  }

  /// The core box-score metrics: assists, rebounds, points and team
  /// defensive rating.
  pub fn core_boxscore() -> Self {
    const PLAYER_INTENTS: [QueryIntent; 3] = [
      QueryIntent::LeagueLeaders,
      QueryIntent::PlayerTrend,
      QueryIntent::PlayerCompare,
    ];
    let player_metric = |id: &str, aliases: &[&str]| MetricDefinition {
      id:                    id.to_owned(),
      aliases:               aliases.iter().map(|a| (*a).to_owned()).collect(),
      allowed_intents:       PLAYER_INTENTS.to_vec(),
      allowed_entity_scopes: vec![EntityScope::Player],
      required_sources:      vec![
        "leagueleaders".into(),
        "playergamelog".into(),
        "playercareerstats".into(),
        "leaguedashplayerstats".into(),
      ],
      formula:               None,
    };

    Self {
      metrics: vec![
        player_metric("ast", &["assist", "assists", "dime", "dimes", "apg"]),
        player_metric("reb", &["rebound", "rebounds", "rpg", "boards"]),
        player_metric("pts", &["point", "points", "ppg", "scoring"]),
        MetricDefinition {
          id:                    "drtg".into(),
          aliases:               vec![
            "defensive rating".into(),
            "def rating".into(),
            "drtg".into(),
          ],
          allowed_intents:       vec![QueryIntent::TeamRanking],
          allowed_entity_scopes: vec![EntityScope::Team],
          required_sources:      vec!["leaguedashteamstats".into()],
          formula:               Some(
            "100 * defensive_points_allowed / defensive_possessions".into(),
          ),
        },
      ],
    }
  }

  pub fn list(&self) -> &[MetricDefinition] { &self.metrics }

  pub fn get(&self, id: &str) -> Option<&MetricDefinition> {
    self.metrics.iter().find(|m| m.id == id)
  }

  /// True if any registered metric lists `term` among its aliases.
  pub fn is_registered_alias(&self, term: &str) -> bool {
    self.metrics.iter().any(|m| m.has_alias(term))
  }

  /// Every selected metric must exist and allow `intent`. Returns the first
  /// mismatch in selection order.
  pub fn check_metrics_for_intent(
    &self,
    intent: QueryIntent,
    metrics: &[MetricSelection],
  ) -> Result<(), MetricMismatch> {
    for selection in metrics {
      let definition = self
        .get(&selection.id)
        .ok_or_else(|| MetricMismatch::Unknown(selection.id.clone()))?;
      if !definition.allows(intent) {
        return Err(MetricMismatch::NotAllowed {
          metric: selection.id.clone(),
          intent,
        });
      }
    }
    Ok(())
  }
}

impl Default for MetricRegistry {
  fn default() -> Self { Self::core_boxscore() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ast_is_allowed_for_league_leaders() {
    let registry = MetricRegistry::core_boxscore();
    let result = registry.check_metrics_for_intent(
      QueryIntent::LeagueLeaders,
      &[MetricSelection::new("ast", 0.9)],
    );
    assert_eq!(result, Ok(()));
  }

  #[test]
  fn drtg_is_rejected_for_player_compare() {
    let registry = MetricRegistry::core_boxscore();
    let result = registry.check_metrics_for_intent(
      QueryIntent::PlayerCompare,
      &[MetricSelection::new("drtg", 0.9)],
    );
    assert_eq!(
      result,
      Err(MetricMismatch::NotAllowed {
        metric: "drtg".into(),
        intent: QueryIntent::PlayerCompare,
      })
    );
  }

  #[test]
  fn unknown_metric_is_reported() {
    let registry = MetricRegistry::core_boxscore();
    let result = registry
      .check_metrics_for_intent(QueryIntent::PlayerTrend, &[MetricSelection::new("stl", 0.85)]);
    assert_eq!(result, Err(MetricMismatch::Unknown("stl".into())));
  }

  #[test]
  fn duplicate_ids_are_rejected() {
    let mut metrics = MetricRegistry::core_boxscore().list().to_vec();
    metrics.push(metrics[0].clone());
    assert!(matches!(
      MetricRegistry::new(metrics),
      Err(Error::DuplicateMetric(id)) if id == "ast"
    ));
  }

  #[test]
  fn alias_lookup_covers_multi_word_aliases() {
    let registry = MetricRegistry::core_boxscore();
    assert!(registry.is_registered_alias("def rating"));
    assert!(registry.is_registered_alias("boards"));
    assert!(!registry.is_registered_alias("steals"));
  }
}
