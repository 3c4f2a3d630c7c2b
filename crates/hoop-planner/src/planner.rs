//! [`Planner`] assembles the final plan from resolver, extractor and
//! classifier output.

use hoop_core::{
  metric::MetricRegistry,
  plan::{MetricSelection, PlanFilters, QueryIntent, QueryPlan},
};

use crate::{
  entities::{extract_entities, extract_window},
  error::{InvariantViolation, PlanViolation},
  intent::{Signals, UNSUPPORTED_CONFIDENCE, classify_intent},
  normalize::normalize_question,
  resolve::resolve_metrics,
  validate::validate_plan,
};

/// Confidence of a metric applied because the question named none.
pub const DEFAULT_METRIC_CONFIDENCE: f64 = 0.55;
/// Plans relying on a defaulted metric never score above this.
pub const DEFAULTED_PLAN_CONFIDENCE_CAP: f64 = 0.6;

fn default_metric(intent: QueryIntent) -> Option<&'static str> {
  match intent {
    QueryIntent::LeagueLeaders
    | QueryIntent::PlayerTrend
    | QueryIntent::PlayerCompare => Some("pts"),
    QueryIntent::TeamRanking => Some("drtg"),
    QueryIntent::Unsupported => None,
  }
}

/// A question after normalisation together with its validated plan.
#[derive(Debug, Clone)]
pub struct PlannedQuery {
  pub normalized_question: String,
  pub plan:                QueryPlan,
}

/// Turns questions into plans against a fixed metric registry.
#[derive(Debug, Clone, Default)]
pub struct Planner {
  registry: MetricRegistry,
}

impl Planner {
  pub fn new(registry: MetricRegistry) -> Self { Self { registry } }

  pub fn registry(&self) -> &MetricRegistry { &self.registry }

  /// Build a structurally complete plan for already-normalised text. Never
  /// fails; questions without enough signal become `unsupported`.
  pub fn build_plan(&self, normalized: &str) -> QueryPlan {
    let entities = extract_entities(normalized);
    let resolution = resolve_metrics(&self.registry, normalized);
    let window = extract_window(normalized);
    let season = entities.seasons.first().cloned();

    let mut reasons = resolution.reasons;
    if let Some(w) = window {
      reasons.push(format!("Parsed rolling window: last {} games.", w.n));
    }
    if let Some(s) = &season {
      reasons.push(format!("Parsed season filter: {s}."));
    }

    let picked = classify_intent(&Signals {
      normalized,
      entities: &entities,
      metric_count: resolution.metrics.len(),
      window,
    });
    reasons.push(picked.reason.to_owned());

    let mut intent = picked.intent;
    let mut confidence = picked.confidence;
    let mut metrics = resolution.metrics;

    if metrics.is_empty()
      && let Some(default_id) = default_metric(intent)
    {
      if resolution.unresolved_terms.is_empty() {
        reasons.push(format!(
          "No explicit metric found. Applied default metric '{default_id}' for intent '{intent}'."
        ));
        metrics.push(MetricSelection::new(default_id, DEFAULT_METRIC_CONFIDENCE));
        confidence = confidence.min(DEFAULTED_PLAN_CONFIDENCE_CAP);
      } else {
        // Recognisable but unregistered stat vocabulary means the question
        // asks for a capability we do not have.
        reasons.push(format!(
          "Unsupported metric cues detected ({}). Falling back to unsupported intent.",
          resolution.unresolved_terms.join(", ")
        ));
        intent = QueryIntent::Unsupported;
        confidence = UNSUPPORTED_CONFIDENCE;
      }
    }

    QueryPlan {
      intent,
      entities,
      metrics,
      filters: PlanFilters { season, window },
      confidence,
      reasons,
    }
  }

  pub fn validate_plan(&self, plan: &QueryPlan) -> Result<(), PlanViolation> {
    validate_plan(&self.registry, plan)
  }

  /// Normalise, plan and validate a raw question. A validation failure here
  /// means the planner produced an inconsistent plan.
  pub fn plan(&self, message: &str) -> Result<PlannedQuery, InvariantViolation> {
    let normalized_question = normalize_question(message);
    let plan = self.build_plan(&normalized_question);

    if let Err(violation) = self.validate_plan(&plan) {
      tracing::error!(
        intent = %plan.intent,
        question = %normalized_question,
        %violation,
        "planner produced an invalid plan"
      );
      return Err(InvariantViolation {
        intent: plan.intent,
        normalized_question,
        violation,
      });
    }

    Ok(PlannedQuery { normalized_question, plan })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plan_for(question: &str) -> QueryPlan {
    Planner::default().build_plan(&normalize_question(question))
  }

  fn has_metric(plan: &QueryPlan, id: &str) -> bool {
    plan.metrics.iter().any(|m| m.id == id)
  }

  fn assert_valid(plan: &QueryPlan) {
    assert_eq!(Planner::default().validate_plan(plan), Ok(()));
  }

  #[test]
  fn assist_leaders_for_a_season() {
    let plan = plan_for("Who averaged the most assists in 2023-24?");
    assert_eq!(plan.intent, QueryIntent::LeagueLeaders);
    assert!(has_metric(&plan, "ast"));
    assert_eq!(plan.filters.season.as_deref(), Some("2023-24"));
    assert!(plan.confidence >= 0.5);
    assert_eq!(
      plan.reasons,
      [
        "Matched metric 'ast' from aliases.",
        "Parsed season filter: 2023-24.",
        "Intent matched: leader signal + metric match.",
      ]
    );
    assert_valid(&plan);
  }

  #[test]
  fn comparison_defaults_to_points() {
    let plan = plan_for("Compare Stephen Curry vs Damian Lillard this season");
    assert_eq!(plan.intent, QueryIntent::PlayerCompare);
    assert!(plan.entities.players.len() >= 2);
    assert_eq!(plan.metrics, [MetricSelection::new("pts", DEFAULT_METRIC_CONFIDENCE)]);
    assert!(plan.confidence <= DEFAULTED_PLAN_CONFIDENCE_CAP);
    assert!(
      plan
        .reasons
        .last()
        .is_some_and(|r| r.contains("Applied default metric 'pts'"))
    );
    assert_valid(&plan);
  }

  #[test]
  fn rebound_trend_over_a_window() {
    let plan = plan_for("Show Nikola Jokic rebounds over his last 10 games");
    assert_eq!(plan.intent, QueryIntent::PlayerTrend);
    assert_eq!(
      plan.filters.window,
      Some(hoop_core::plan::RollingWindow::last_n_games(10))
    );
    assert!(has_metric(&plan, "reb"));
    assert_eq!(plan.confidence, 0.8);
    assert_valid(&plan);
  }

  #[test]
  fn unregistered_cue_downgrades_to_unsupported() {
    let plan = plan_for("Show Stephen Curry trend for steals this season");
    assert_eq!(plan.intent, QueryIntent::Unsupported);
    assert!(plan.metrics.is_empty());
    assert_eq!(plan.confidence, UNSUPPORTED_CONFIDENCE);
    assert!(
      plan
        .reasons
        .iter()
        .any(|r| r.contains("Unsupported metric cues detected (steals)"))
    );
    assert_valid(&plan);
  }

  #[test]
  fn unknown_question_is_unsupported() {
    let plan = plan_for("Who wins the championship this year?");
    assert_eq!(plan.intent, QueryIntent::Unsupported);
    assert!(plan.confidence < 0.5);
    assert_valid(&plan);
  }

  #[test]
  fn team_defensive_rating_ranking() {
    let plan = plan_for("Which teams have the best defensive rating this season?");
    assert_eq!(plan.intent, QueryIntent::TeamRanking);
    assert!(has_metric(&plan, "drtg"));
    assert_eq!(plan.confidence, 0.8);
    assert_valid(&plan);
  }

  #[test]
  fn team_ranking_defaults_to_defensive_rating() {
    let plan = plan_for("Rank the Boston Celtics");
    assert_eq!(plan.intent, QueryIntent::TeamRanking);
    assert_eq!(plan.metrics, [MetricSelection::new("drtg", DEFAULT_METRIC_CONFIDENCE)]);
    assert_eq!(plan.confidence, DEFAULTED_PLAN_CONFIDENCE_CAP);
    assert_valid(&plan);
  }

  #[test]
  fn planning_is_deterministic() {
    let q = "Compare LeBron James versus Kevin Durant points last 5";
    assert_eq!(plan_for(q), plan_for(q));
  }

  #[test]
  fn plan_normalizes_and_validates() {
    let planned = Planner::default()
      .plan("  Who averaged the MOST assists in 2023-24?? ")
      .unwrap();
    assert_eq!(
      planned.normalized_question,
      "who averaged the most assists in 2023-24"
    );
    assert_eq!(planned.plan.intent, QueryIntent::LeagueLeaders);
  }

  #[test]
  fn invalid_plan_surfaces_as_invariant_violation() {
    // A registry whose points metric cannot serve comparisons makes the
    // default-metric path produce a plan the validator rejects.
    let mut metrics = MetricRegistry::core_boxscore().list().to_vec();
    for m in &mut metrics {
      if m.id == "pts" {
        m.allowed_intents.retain(|i| *i != QueryIntent::PlayerCompare);
      }
    }
    let planner = Planner::new(MetricRegistry::new(metrics).unwrap());

    let err = planner
      .plan("Compare Stephen Curry vs Damian Lillard")
      .unwrap_err();
    assert_eq!(err.intent, QueryIntent::PlayerCompare);
    assert_eq!(
      err.violation,
      PlanViolation::MetricNotAllowed {
        metric: "pts".into(),
        intent: QueryIntent::PlayerCompare,
      }
    );
  }
}
