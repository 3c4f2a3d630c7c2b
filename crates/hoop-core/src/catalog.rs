//! The endpoint catalog: static descriptions of the upstream data sources the
//! query engine may read from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  Error, Result,
  metric::MetricRegistry,
  plan::{QueryIntent, QueryPlan},
};

/// How often an upstream source's values change. Drives the cache TTL.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VolatilityTier {
  High,
  Medium,
  Low,
}

impl VolatilityTier {
  pub fn ttl_minutes(self) -> u32 {
    match self {
      Self::High => 15,
      Self::Medium => 180,
      Self::Low => 1440,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCatalogEntry {
  pub endpoint_id:       String,
  pub path:              String,
  /// Disjoint from `optional_params`.
  pub required_params:   Vec<String>,
  pub optional_params:   Vec<String>,
  pub volatility_tier:   VolatilityTier,
  pub parser_version:    String,
  pub supported_intents: Vec<QueryIntent>,
}

impl EndpointCatalogEntry {
  pub fn ttl_minutes(&self) -> u32 { self.volatility_tier.ttl_minutes() }

  pub fn supports(&self, intent: QueryIntent) -> bool {
    self.supported_intents.contains(&intent)
  }
}

/// Read-only lookup over the endpoint catalog.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
  entries: Vec<EndpointCatalogEntry>,
}

impl EndpointCatalog {
  /// Build a catalog, checking it with [`EndpointCatalog::validate`].
  pub fn new(entries: Vec<EndpointCatalogEntry>) -> Result<Self> {
    let catalog = Self { entries };
    catalog.validate()?;
    Ok(catalog)
  }

  pub fn list(&self) -> &[EndpointCatalogEntry] { &self.entries }

  pub fn get(&self, endpoint_id: &str) -> Option<&EndpointCatalogEntry> {
    self.entries.iter().find(|e| e.endpoint_id == endpoint_id)
  }

  /// Endpoint ids must be unique and no parameter may be both required and
  /// optional.
  pub fn validate(&self) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in &self.entries {
      if !seen.insert(entry.endpoint_id.as_str()) {
        return Err(Error::DuplicateEndpoint(entry.endpoint_id.clone()));
      }
      if let Some(param) = entry
        .optional_params
        .iter()
        .find(|p| entry.required_params.contains(p))
      {
        return Err(Error::OverlappingParams {
          endpoint_id: entry.endpoint_id.clone(),
          param:       param.clone(),
        });
      }
    }
    Ok(())
  }

  /// Catalog entries backing a plan: every source required by one of the
  /// plan's metrics that also supports the plan's intent. Deduplicated, in
  /// metric order.
  pub fn sources_for_plan(
    &self,
    registry: &MetricRegistry,
    plan: &QueryPlan,
  ) -> Vec<&EndpointCatalogEntry> {
    let mut out: Vec<&EndpointCatalogEntry> = Vec::new();
    for selection in &plan.metrics {
      let Some(metric) = registry.get(&selection.id) else { continue };
      for source in &metric.required_sources {
        let Some(entry) = self.get(source) else { continue };
        if entry.supports(plan.intent)
          && !out.iter().any(|e| e.endpoint_id == entry.endpoint_id)
        {
          out.push(entry);
        }
      }
    }
    out
  }

  /// The stats.nba.com endpoints the query engine reads from.
  pub fn nba_stats() -> Self {
    use QueryIntent::*;
    use VolatilityTier::*;

    const LEAGUE_DASH_COMMON: [&str; 17] = [
      "DateFrom",
      "DateTo",
      "GameSegment",
      "LastNGames",
      "Location",
      "MeasureType",
      "Month",
      "OpponentTeamID",
      "Outcome",
      "PaceAdjust",
      "PerMode",
      "Period",
      "PlusMinus",
      "Rank",
      "SeasonSegment",
      "VsConference",
      "VsDivision",
    ];

    let with_common = |extra: &[&'static str]| {
      let mut params: Vec<&'static str> =
        LEAGUE_DASH_COMMON.iter().chain(extra).copied().collect();
      params.sort_unstable();
      params
    };

    Self {
      entries: vec![
        entry(
          "leagueleaders",
          &["LeagueID", "PerMode", "Scope", "Season", "SeasonType", "StatCategory"],
          &["ActiveFlag"],
          High,
          &[LeagueLeaders],
        ),
        entry(
          "playerprofilev2",
          &["PerMode", "PlayerID"],
          &["LeagueID"],
          Low,
          &[LeagueLeaders],
        ),
        entry(
          "playergamelog",
          &["PlayerID", "Season", "SeasonType"],
          &["DateFrom", "DateTo", "LeagueID"],
          High,
          &[PlayerTrend, LeagueLeaders],
        ),
        entry(
          "boxscoretraditionalv2",
          &["EndPeriod", "EndRange", "GameID", "RangeType", "StartPeriod", "StartRange"],
          &[],
          Medium,
          &[PlayerTrend],
        ),
        entry(
          "playercareerstats",
          &["PerMode", "PlayerID"],
          &["LeagueID"],
          Low,
          &[PlayerCompare],
        ),
        entry(
          "leaguedashplayerstats",
          &with_common(&[
            "GameScope",
            "PlayerExperience",
            "PlayerPosition",
            "Season",
            "SeasonType",
            "StarterBench",
          ]),
          &[
            "College",
            "Conference",
            "Country",
            "Division",
            "DraftPick",
            "DraftYear",
            "Height",
            "LeagueID",
            "PORound",
            "ShotClockRange",
            "TeamID",
            "TwoWay",
            "Weight",
          ],
          High,
          &[PlayerCompare, LeagueLeaders],
        ),
        entry(
          "leaguedashteamstats",
          &with_common(&["Season", "SeasonType"]),
          &[
            "Conference",
            "Division",
            "GameScope",
            "LeagueID",
            "PORound",
            "PlayerExperience",
            "PlayerPosition",
            "ShotClockRange",
            "StarterBench",
            "TeamID",
            "TwoWay",
          ],
          High,
          &[TeamRanking],
        ),
        entry(
          "teamdashboardbygeneralsplits",
          &with_common(&["Season", "SeasonType", "TeamID"]),
          &["LeagueID", "PORound", "ShotClockRange"],
          Medium,
          &[TeamRanking],
        ),
      ],
    }
  }
}

impl Default for EndpointCatalog {
  fn default() -> Self { Self::nba_stats() }
}

fn entry(
  endpoint_id: &str,
  required: &[&str],
  optional: &[&str],
  volatility_tier: VolatilityTier,
  intents: &[QueryIntent],
) -> EndpointCatalogEntry {
  let owned = |xs: &[&str]| xs.iter().map(|s| (*s).to_owned()).collect();
  EndpointCatalogEntry {
    endpoint_id: endpoint_id.to_owned(),
    path: format!("/stats/{endpoint_id}"),
    required_params: owned(required),
    optional_params: owned(optional),
    volatility_tier,
    parser_version: "v1".to_owned(),
    supported_intents: intents.to_vec(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::plan::{MetricSelection, PlanEntities, PlanFilters};

  #[test]
  fn built_in_catalog_is_valid() {
    let catalog = EndpointCatalog::nba_stats();
    assert!(catalog.validate().is_ok());
    assert_eq!(catalog.list().len(), 8);
  }

  #[test]
  fn known_endpoint_metadata() {
    let catalog = EndpointCatalog::nba_stats();
    let entry = catalog.get("leagueleaders").unwrap();
    assert_eq!(entry.path, "/stats/leagueleaders");
    assert_eq!(entry.parser_version, "v1");
    assert!(entry.supports(QueryIntent::LeagueLeaders));
    assert_eq!(
      entry.required_params,
      ["LeagueID", "PerMode", "Scope", "Season", "SeasonType", "StatCategory"]
    );
    assert_eq!(entry.optional_params, ["ActiveFlag"]);
    assert!(catalog.get("not-real-endpoint").is_none());
  }

  #[test]
  fn league_dash_endpoints_carry_full_param_sets() {
    let catalog = EndpointCatalog::nba_stats();
    let players = catalog.get("leaguedashplayerstats").unwrap();
    assert!(players.required_params.iter().any(|p| p == "MeasureType"));
    assert!(players.required_params.iter().any(|p| p == "SeasonType"));
    assert!(players.optional_params.iter().any(|p| p == "TeamID"));

    let teams = catalog.get("leaguedashteamstats").unwrap();
    assert!(teams.required_params.iter().any(|p| p == "OpponentTeamID"));
    assert!(teams.optional_params.iter().any(|p| p == "GameScope"));
  }

  #[test]
  fn tiers_map_to_ttl_minutes() {
    assert_eq!(VolatilityTier::High.ttl_minutes(), 15);
    assert_eq!(VolatilityTier::Medium.ttl_minutes(), 180);
    assert_eq!(VolatilityTier::Low.ttl_minutes(), 1440);
  }

  #[test]
  fn overlapping_params_are_rejected() {
    let bad = entry("x", &["Season"], &["Season"], VolatilityTier::Low, &[]);
    assert!(matches!(
      EndpointCatalog::new(vec![bad]),
      Err(Error::OverlappingParams { param, .. }) if param == "Season"
    ));
  }

  #[test]
  fn duplicate_endpoints_are_rejected() {
    let a = entry("x", &[], &[], VolatilityTier::Low, &[]);
    assert!(matches!(
      EndpointCatalog::new(vec![a.clone(), a]),
      Err(Error::DuplicateEndpoint(id)) if id == "x"
    ));
  }

  #[test]
  fn plan_sources_follow_metric_and_intent() {
    let catalog = EndpointCatalog::nba_stats();
    let registry = MetricRegistry::core_boxscore();
    let plan = QueryPlan {
      intent:     QueryIntent::PlayerTrend,
      entities:   PlanEntities::default(),
      metrics:    vec![MetricSelection::new("reb", 0.85)],
      filters:    PlanFilters::default(),
      confidence: 0.8,
      reasons:    vec![],
    };
    let ids: Vec<&str> = catalog
      .sources_for_plan(&registry, &plan)
      .into_iter()
      .map(|e| e.endpoint_id.as_str())
      .collect();
    // leagueleaders is required by `reb` but does not serve trends.
    assert_eq!(ids, ["playergamelog"]);
  }

  #[test]
  fn comparison_plans_cite_career_and_dashboard_sources() {
    let catalog = EndpointCatalog::nba_stats();
    let registry = MetricRegistry::core_boxscore();
    let plan = QueryPlan {
      intent:     QueryIntent::PlayerCompare,
      entities:   PlanEntities::default(),
      metrics:    vec![MetricSelection::new("pts", 0.55)],
      filters:    PlanFilters::default(),
      confidence: 0.6,
      reasons:    vec![],
    };
    let ids: Vec<&str> = catalog
      .sources_for_plan(&registry, &plan)
      .into_iter()
      .map(|e| e.endpoint_id.as_str())
      .collect();
    assert_eq!(ids, ["playercareerstats", "leaguedashplayerstats"]);
  }
}
