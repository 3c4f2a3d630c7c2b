//! The query plan: the structured artifact the planner derives from a
//! natural-language question.
//!
//! A plan is built fresh for every question and never mutated after it has
//! been validated. Downstream layers read it; they do not repair it.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

// ─── Intent ──────────────────────────────────────────────────────────────────

/// The closed set of question categories the planner understands.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryIntent {
  /// League-wide leaderboard for a metric.
  LeagueLeaders,
  /// A single player's metric over time or over a rolling window.
  PlayerTrend,
  /// Side-by-side comparison of two or more players.
  PlayerCompare,
  /// Teams ranked by a team-scoped metric.
  TeamRanking,
  /// Nothing matched with enough signal.
  Unsupported,
}

impl QueryIntent {
  pub fn is_supported(self) -> bool { self != Self::Unsupported }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// Named entities recognised in the question. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntities {
  pub players: Vec<String>,
  pub teams:   Vec<String>,
  /// Season tokens such as `2023-24`, in order of first appearance.
  pub seasons: Vec<String>,
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// A canonical metric chosen for the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSelection {
  pub id:         String,
  /// In `[0, 1]`.
  pub confidence: f64,
}

impl MetricSelection {
  pub fn new(id: impl Into<String>, confidence: f64) -> Self {
    Self { id: id.into(), confidence }
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
  LastNGames,
}

/// A rolling window such as "last 10 games".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingWindow {
  #[serde(rename = "type")]
  pub kind: WindowKind,
  pub n:    u32,
}

impl RollingWindow {
  pub fn last_n_games(n: u32) -> Self {
    Self { kind: WindowKind::LastNGames, n }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFilters {
  /// `YYYY-YY`.
  pub season: Option<String>,
  pub window: Option<RollingWindow>,
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
  pub intent:     QueryIntent,
  pub entities:   PlanEntities,
  pub metrics:    Vec<MetricSelection>,
  pub filters:    PlanFilters,
  /// Plan-level score in `[0, 1]`.
  pub confidence: f64,
  /// Human-readable derivation steps, in the order they were taken.
  pub reasons:    Vec<String>,
}
