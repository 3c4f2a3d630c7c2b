//! Turning a validated plan into the user-facing parts of a chat response:
//! answer text, citations, follow-up suggestions and the plan summary shown
//! on the trace page.
//!
//! No statistics are fetched here. The answer describes what the plan will
//! retrieve.

use hoop_core::{
  catalog::{EndpointCatalog, EndpointCatalogEntry},
  metric::MetricRegistry,
  plan::{QueryIntent, QueryPlan},
};
use serde::Serialize;

pub const UNSUPPORTED_ANSWER: &str = "This query is not grounded in the supported \
   question types yet. Try player comparisons, assist leaders, or recent player game-log \
   questions.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
  pub source: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
}

/// `"nikola jokic"` → `"Nikola Jokic"`.
fn display_name(name: &str) -> String {
  name
    .split(' ')
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn metric_list(plan: &QueryPlan) -> String {
  plan
    .metrics
    .iter()
    .map(|m| m.id.to_uppercase())
    .collect::<Vec<_>>()
    .join(", ")
}

fn scope(plan: &QueryPlan) -> String {
  match (&plan.filters.season, &plan.filters.window) {
    (Some(season), Some(window)) => format!("the last {} games of {season}", window.n),
    (Some(season), None) => season.clone(),
    (None, Some(window)) => format!("the last {} games", window.n),
    (None, None) => "the current season".to_owned(),
  }
}

/// One-paragraph answer for `plan`.
pub fn answer_text(plan: &QueryPlan) -> String {
  let metrics = metric_list(plan);
  let scope = scope(plan);
  match plan.intent {
    QueryIntent::LeagueLeaders => {
      format!("League leaders in {metrics} for {scope} are ready to rank.")
    }
    QueryIntent::PlayerTrend => {
      let player = plan
        .entities
        .players
        .first()
        .map(|p| display_name(p))
        .unwrap_or_else(|| "The requested player".to_owned());
      format!("{player} {metrics} trend over {scope} is ready for expansion.")
    }
    QueryIntent::PlayerCompare => {
      let players = plan
        .entities
        .players
        .iter()
        .map(|p| display_name(p))
        .collect::<Vec<_>>()
        .join(" vs ");
      format!("Comparison of {players} on {metrics} for {scope} is ready.")
    }
    QueryIntent::TeamRanking => {
      format!("Teams ranked by {metrics} for {scope} are ready.")
    }
    QueryIntent::Unsupported => UNSUPPORTED_ANSWER.to_owned(),
  }
}

fn citation_detail(entry: &EndpointCatalogEntry, plan: &QueryPlan) -> Option<String> {
  let mut parts = Vec::new();
  if let Some(season) = &plan.filters.season {
    parts.push(format!("Season {season}"));
  }
  if let Some(window) = &plan.filters.window
    && entry.endpoint_id.contains("gamelog")
  {
    parts.push(format!("last {} games", window.n));
  }
  if !plan.metrics.is_empty() {
    parts.push(format!("metrics {}", metric_list(plan)));
  }
  (!parts.is_empty()).then(|| parts.join(", "))
}

/// The catalog endpoints backing `plan`, as citations.
pub fn citations(
  catalog: &EndpointCatalog,
  registry: &MetricRegistry,
  plan: &QueryPlan,
) -> Vec<Citation> {
  catalog
    .sources_for_plan(registry, plan)
    .into_iter()
    .map(|entry| Citation {
      source: format!("NBA stats endpoint: {}", entry.endpoint_id),
      detail: citation_detail(entry, plan),
    })
    .collect()
}

pub fn followups(intent: QueryIntent) -> Vec<String> {
  let items: &[&str] = match intent {
    QueryIntent::LeagueLeaders => &[
      "Break that down by month",
      "Show the top 5 leaders",
      "Compare with the previous season",
    ],
    QueryIntent::PlayerTrend => &[
      "Compare with another player",
      "Show game-by-game values",
      "Extend the window to the last 20 games",
    ],
    QueryIntent::PlayerCompare => &[
      "Limit to playoff games",
      "Show a season-by-season table",
      "Add another metric",
    ],
    QueryIntent::TeamRanking => &[
      "Show the top 10 teams",
      "Split by home and away",
      "Compare with last season",
    ],
    QueryIntent::Unsupported => &[
      "Compare two players by season",
      "Ask for assist leaders by season",
      "Ask for last N games rebounds",
    ],
  };
  items.iter().map(|s| (*s).to_owned()).collect()
}

/// Human-readable planning steps, shown with the trace.
pub fn plan_summary(plan: &QueryPlan) -> Vec<String> {
  let mut steps = vec!["Normalize question and classify intent.".to_owned()];

  if !plan.intent.is_supported() {
    steps.push("No supported question type matched.".to_owned());
    steps.push("Return explicit unsupported response with guidance.".to_owned());
    return steps;
  }

  if !plan.entities.players.is_empty() {
    let players = plan
      .entities
      .players
      .iter()
      .map(|p| display_name(p))
      .collect::<Vec<_>>()
      .join(", ");
    steps.push(format!("Resolve player identity: {players}."));
  }
  if !plan.entities.teams.is_empty() {
    let teams = plan
      .entities
      .teams
      .iter()
      .map(|t| display_name(t))
      .collect::<Vec<_>>()
      .join(", ");
    steps.push(format!("Resolve team identity: {teams}."));
  }
  steps.push(format!("Select metrics {}.", metric_list(plan)));
  if let Some(season) = &plan.filters.season {
    steps.push(format!("Resolve season scope {season}."));
  }
  if let Some(window) = &plan.filters.window {
    steps.push(format!("Apply last-{}-games filter.", window.n));
  }
  steps.push(
    match plan.intent {
      QueryIntent::LeagueLeaders => "Rank league leaders by the selected metric.",
      QueryIntent::PlayerTrend => "Aggregate the metric per game and summarize the trend.",
      QueryIntent::PlayerCompare => "Compute side-by-side comparison fields.",
      QueryIntent::TeamRanking => "Rank teams by the selected metric.",
      QueryIntent::Unsupported => "Return explicit unsupported response with guidance.",
    }
    .to_owned(),
  );
  steps.push("Return result with provenance.".to_owned());
  steps
}

#[cfg(test)]
mod tests {
  use hoop_core::plan::{
    MetricSelection, PlanEntities, PlanFilters, RollingWindow,
  };

  use super::*;

  fn plan(intent: QueryIntent) -> QueryPlan {
    QueryPlan {
      intent,
      entities: PlanEntities::default(),
      metrics: vec![MetricSelection::new("ast", 0.85)],
      filters: PlanFilters::default(),
      confidence: 0.8,
      reasons: Vec::new(),
    }
  }

  #[test]
  fn display_name_capitalizes_each_word() {
    assert_eq!(display_name("nikola jokic"), "Nikola Jokic");
    assert_eq!(display_name("los angeles lakers"), "Los Angeles Lakers");
  }

  #[test]
  fn leaders_answer_mentions_metric_and_season() {
    let mut p = plan(QueryIntent::LeagueLeaders);
    p.filters.season = Some("2023-24".to_owned());
    assert_eq!(
      answer_text(&p),
      "League leaders in AST for 2023-24 are ready to rank."
    );
  }

  #[test]
  fn compare_answer_joins_players() {
    let mut p = plan(QueryIntent::PlayerCompare);
    p.entities.players = vec!["stephen curry".to_owned(), "damian lillard".to_owned()];
    assert!(answer_text(&p).contains("Stephen Curry vs Damian Lillard"));
  }

  #[test]
  fn citations_follow_metric_sources() {
    let mut p = plan(QueryIntent::PlayerTrend);
    p.metrics = vec![MetricSelection::new("reb", 0.85)];
    p.entities.players = vec!["nikola jokic".to_owned()];
    p.filters.window = Some(RollingWindow::last_n_games(10));

    let cites = citations(
      &EndpointCatalog::nba_stats(),
      &MetricRegistry::core_boxscore(),
      &p,
    );
    assert_eq!(cites, vec![Citation {
      source: "NBA stats endpoint: playergamelog".to_owned(),
      detail: Some("last 10 games, metrics REB".to_owned()),
    }]);
  }

  #[test]
  fn unsupported_plan_has_no_citations() {
    let mut p = plan(QueryIntent::Unsupported);
    p.metrics.clear();
    let cites = citations(
      &EndpointCatalog::nba_stats(),
      &MetricRegistry::core_boxscore(),
      &p,
    );
    assert!(cites.is_empty());
    assert_eq!(answer_text(&p), UNSUPPORTED_ANSWER);
    assert_eq!(plan_summary(&p).len(), 3);
  }

  #[test]
  fn summary_lists_filters_in_order() {
    let mut p = plan(QueryIntent::PlayerTrend);
    p.entities.players = vec!["nikola jokic".to_owned()];
    p.filters.window = Some(RollingWindow::last_n_games(10));
    let steps = plan_summary(&p);
    assert_eq!(steps[1], "Resolve player identity: Nikola Jokic.");
    assert_eq!(steps[2], "Select metrics AST.");
    assert_eq!(steps[3], "Apply last-10-games filter.");
  }

  #[test]
  fn every_intent_has_three_followups() {
    for intent in [
      QueryIntent::LeagueLeaders,
      QueryIntent::PlayerTrend,
      QueryIntent::PlayerCompare,
      QueryIntent::TeamRanking,
      QueryIntent::Unsupported,
    ] {
      assert_eq!(followups(intent).len(), 3);
    }
  }
}
