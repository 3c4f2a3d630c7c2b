//! Intent classification as an ordered decision table.
//!
//! Rules are evaluated top to bottom and the first match wins, so a question
//! that satisfies several rules always resolves to the earliest one.

use hoop_core::plan::{PlanEntities, QueryIntent, RollingWindow};

use crate::normalize::{contains_any, contains_term};

const COMPARE_KEYWORDS: &[&str] = &["compare", "vs", "versus"];
const LEADER_KEYWORDS: &[&str] = &["leader", "leaders", "most", "highest", "top"];
const TREND_KEYWORDS: &[&str] = &["trend", "trending"];
const TEAM_RANKING_KEYWORDS: &[&str] = &["rank", "ranking", "best", "worst"];
const TEAM_TERMS: &[&str] = &["team", "teams"];
const DEFENSIVE_CUES: &[&str] = &["defensive rating", "drtg"];

pub const MATCHED_CONFIDENCE: f64 = 0.8;
pub const TREND_WITHOUT_WINDOW_CONFIDENCE: f64 = 0.6;
pub const UNSUPPORTED_CONFIDENCE: f64 = 0.3;

/// Everything the classifier looks at.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
  pub normalized:   &'a str,
  pub entities:     &'a PlanEntities,
  pub metric_count: usize,
  pub window:       Option<RollingWindow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentMatch {
  pub intent:     QueryIntent,
  pub confidence: f64,
  pub reason:     &'static str,
}

struct IntentRule {
  intent:     QueryIntent,
  applies:    fn(&Signals<'_>) -> bool,
  confidence: fn(&Signals<'_>) -> f64,
  reason:     &'static str,
}

const RULES: &[IntentRule] = &[
  IntentRule {
    intent:     QueryIntent::PlayerCompare,
    applies:    is_comparison,
    confidence: matched,
    reason:     "Intent matched: compare signal + at least two players.",
  },
  IntentRule {
    intent:     QueryIntent::LeagueLeaders,
    applies:    is_leaderboard,
    confidence: matched,
    reason:     "Intent matched: leader signal + metric match.",
  },
  IntentRule {
    intent:     QueryIntent::PlayerTrend,
    applies:    is_player_trend,
    confidence: trend_confidence,
    reason:     "Intent matched: player + trend/last-N signal.",
  },
  IntentRule {
    intent:     QueryIntent::TeamRanking,
    applies:    is_team_ranking,
    confidence: matched,
    reason:     "Intent matched: team signal + ranking/defensive metric signal.",
  },
];

const FALLBACK: IntentMatch = IntentMatch {
  intent:     QueryIntent::Unsupported,
  confidence: UNSUPPORTED_CONFIDENCE,
  reason:     "No high-confidence intent match. Marking query as unsupported.",
};

pub fn classify_intent(signals: &Signals<'_>) -> IntentMatch {
  RULES
    .iter()
    .find(|rule| (rule.applies)(signals))
    .map(|rule| IntentMatch {
      intent:     rule.intent,
      confidence: (rule.confidence)(signals),
      reason:     rule.reason,
    })
    .unwrap_or(FALLBACK)
}

// ─── Predicates ──────────────────────────────────────────────────────────────

fn is_comparison(s: &Signals<'_>) -> bool {
  contains_any(s.normalized, COMPARE_KEYWORDS) && s.entities.players.len() >= 2
}

fn is_leaderboard(s: &Signals<'_>) -> bool {
  contains_any(s.normalized, LEADER_KEYWORDS) && s.metric_count > 0
}

fn is_player_trend(s: &Signals<'_>) -> bool {
  (contains_any(s.normalized, TREND_KEYWORDS) || s.window.is_some())
    && !s.entities.players.is_empty()
}

fn is_team_ranking(s: &Signals<'_>) -> bool {
  let team_signal =
    !s.entities.teams.is_empty() || contains_any(s.normalized, TEAM_TERMS);
  let ranking_signal = contains_any(s.normalized, TEAM_RANKING_KEYWORDS)
    || DEFENSIVE_CUES.iter().any(|cue| contains_term(s.normalized, cue));
  team_signal && ranking_signal
}

fn matched(_: &Signals<'_>) -> f64 { MATCHED_CONFIDENCE }

fn trend_confidence(s: &Signals<'_>) -> f64 {
  if s.window.is_some() {
    MATCHED_CONFIDENCE
  } else {
    TREND_WITHOUT_WINDOW_CONFIDENCE
  }
}
