//! Structural validation of query plans.

use std::{collections::HashSet, sync::LazyLock};

use hoop_core::{
  metric::{MetricMismatch, MetricRegistry},
  plan::{QueryIntent, QueryPlan},
};
use regex::Regex;

use crate::error::PlanViolation;

static SEASON_FORMAT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("season format pattern"));

/// Check a plan's invariants in a fixed order and report the first one it
/// breaks. Applies to every plan, including hand-built ones.
pub fn validate_plan(
  registry: &MetricRegistry,
  plan: &QueryPlan,
) -> Result<(), PlanViolation> {
  if !(0.0..=1.0).contains(&plan.confidence) {
    return Err(PlanViolation::ConfidenceOutOfRange(plan.confidence));
  }

  if plan.intent == QueryIntent::Unsupported && plan.confidence >= 0.5 {
    return Err(PlanViolation::UnsupportedConfidenceTooHigh(plan.confidence));
  }

  if plan.intent.is_supported() && plan.metrics.is_empty() {
    return Err(PlanViolation::MissingMetrics(plan.intent));
  }

  if plan.intent == QueryIntent::PlayerCompare {
    let distinct: HashSet<&str> =
      plan.entities.players.iter().map(String::as_str).collect();
    if distinct.len() < 2 {
      return Err(PlanViolation::ComparisonNeedsTwoPlayers(distinct.len()));
    }
  }

  if let Some(season) = &plan.filters.season
    && !SEASON_FORMAT.is_match(season)
  {
    return Err(PlanViolation::InvalidSeason(season.clone()));
  }

  if let Some(window) = plan.filters.window
    && window.n < 1
  {
    return Err(PlanViolation::InvalidWindow(window.n));
  }

  if plan.intent.is_supported() {
    registry
      .check_metrics_for_intent(plan.intent, &plan.metrics)
      .map_err(|mismatch| match mismatch {
        MetricMismatch::Unknown(id) => PlanViolation::UnknownMetric(id),
        MetricMismatch::NotAllowed { metric, intent } => {
          PlanViolation::MetricNotAllowed { metric, intent }
        }
      })?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use hoop_core::plan::{MetricSelection, PlanEntities, PlanFilters, RollingWindow};

  use super::*;

  fn plan(intent: QueryIntent, metric: Option<&str>, confidence: f64) -> QueryPlan {
    QueryPlan {
      intent,
      entities: PlanEntities::default(),
      metrics: metric.map(|m| MetricSelection::new(m, 0.8)).into_iter().collect(),
      filters: PlanFilters::default(),
      confidence,
      reasons: vec!["test".into()],
    }
  }

  fn check(plan: &QueryPlan) -> Result<(), PlanViolation> {
    validate_plan(&MetricRegistry::core_boxscore(), plan)
  }

  #[test]
  fn accepts_a_consistent_plan() {
    let mut p = plan(QueryIntent::LeagueLeaders, Some("ast"), 0.8);
    p.filters.season = Some("2023-24".into());
    assert_eq!(check(&p), Ok(()));
    assert_eq!(check(&plan(QueryIntent::Unsupported, None, 0.3)), Ok(()));
  }

  #[test]
  fn rejects_confidence_out_of_range() {
    assert_eq!(
      check(&plan(QueryIntent::LeagueLeaders, Some("ast"), 1.2)),
      Err(PlanViolation::ConfidenceOutOfRange(1.2))
    );
    assert!(matches!(
      check(&plan(QueryIntent::LeagueLeaders, Some("ast"), f64::NAN)),
      Err(PlanViolation::ConfidenceOutOfRange(_))
    ));
  }

  #[test]
  fn rejects_confident_unsupported_plan() {
    assert_eq!(
      check(&plan(QueryIntent::Unsupported, None, 0.8)),
      Err(PlanViolation::UnsupportedConfidenceTooHigh(0.8))
    );
  }

  #[test]
  fn rejects_supported_plan_without_metrics() {
    assert_eq!(
      check(&plan(QueryIntent::LeagueLeaders, None, 0.7)),
      Err(PlanViolation::MissingMetrics(QueryIntent::LeagueLeaders))
    );
  }

  #[test]
  fn rejects_comparison_of_one_player() {
    let mut p = plan(QueryIntent::PlayerCompare, Some("pts"), 0.8);
    p.entities.players = vec!["stephen curry".into(), "stephen curry".into()];
    assert_eq!(check(&p), Err(PlanViolation::ComparisonNeedsTwoPlayers(1)));
  }

  #[test]
  fn rejects_malformed_season() {
    let mut p = plan(QueryIntent::LeagueLeaders, Some("ast"), 0.8);
    p.filters.season = Some("2023".into());
    assert_eq!(check(&p), Err(PlanViolation::InvalidSeason("2023".into())));
    assert!(check(&p).unwrap_err().to_string().contains("Season filter"));
  }

  #[test]
  fn rejects_zero_window() {
    let mut p = plan(QueryIntent::PlayerTrend, Some("reb"), 0.8);
    p.entities.players = vec!["nikola jokic".into()];
    p.filters.window = Some(RollingWindow::last_n_games(0));
    assert_eq!(check(&p), Err(PlanViolation::InvalidWindow(0)));
  }

  #[test]
  fn rejects_metric_outside_its_intents() {
    assert_eq!(
      check(&plan(QueryIntent::TeamRanking, Some("ast"), 0.8)),
      Err(PlanViolation::MetricNotAllowed {
        metric: "ast".into(),
        intent: QueryIntent::TeamRanking,
      })
    );
    assert_eq!(
      check(&plan(QueryIntent::LeagueLeaders, Some("stl"), 0.8)),
      Err(PlanViolation::UnknownMetric("stl".into()))
    );
  }
}
