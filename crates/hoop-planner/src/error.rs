//! Error types for `hoop-planner`.
//!
//! Questions the planner cannot answer are not errors; they produce an
//! `unsupported` plan. The types here describe plans that break structural
//! invariants, which means the planner itself is defective.

use hoop_core::plan::QueryIntent;
use thiserror::Error;

/// The first structural invariant a plan breaks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanViolation {
  #[error("QueryPlan confidence must be between 0 and 1 (got {0}).")]
  ConfidenceOutOfRange(f64),

  #[error("Unsupported QueryPlan confidence must be lower than 0.5 (got {0}).")]
  UnsupportedConfidenceTooHigh(f64),

  #[error("Supported QueryPlan intents require at least one metric ({0}).")]
  MissingMetrics(QueryIntent),

  #[error("player_compare intent requires at least two players (got {0}).")]
  ComparisonNeedsTwoPlayers(usize),

  #[error("Season filter must match format 'YYYY-YY' (got {0:?}).")]
  InvalidSeason(String),

  #[error("Window filter must use a positive integer game count (got {0}).")]
  InvalidWindow(u32),

  #[error("Unknown metric id '{0}'.")]
  UnknownMetric(String),

  #[error("Metric '{metric}' is not allowed for intent '{intent}'.")]
  MetricNotAllowed { metric: String, intent: QueryIntent },
}

/// The planner produced a plan that fails validation.
///
/// Distinct from an unsupported question: callers should surface this as an
/// internal error, never repair the plan.
#[derive(Debug, Clone, Error)]
#[error("planner produced an inconsistent {intent} plan: {violation}")]
pub struct InvariantViolation {
  pub intent:              QueryIntent,
  pub normalized_question: String,
  #[source]
  pub violation:           PlanViolation,
}
