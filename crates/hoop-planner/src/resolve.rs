//! Metric resolution: alias matching against the registry plus detection of
//! stat vocabulary the registry does not cover.

use hoop_core::{metric::MetricRegistry, plan::MetricSelection};

use crate::normalize::contains_term;

/// Confidence assigned to a metric matched through one of its aliases.
pub const RESOLVED_METRIC_CONFIDENCE: f64 = 0.85;

/// Metric-adjacent vocabulary. A cue that appears in the question without
/// being a registered alias marks the question as asking for a metric the
/// registry cannot serve.
const METRIC_CUES: &[&str] = &[
  "assist",
  "assists",
  "dime",
  "dimes",
  "apg",
  "rebound",
  "rebounds",
  "boards",
  "point",
  "points",
  "ppg",
  "scoring",
  "defensive rating",
  "def rating",
  "drtg",
  "deflections",
  "steals",
  "blocks",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricResolution {
  /// Matched metrics in registry order, each at most once.
  pub metrics:          Vec<MetricSelection>,
  /// Cue terms present in the question but not registered as any alias.
  pub unresolved_terms: Vec<String>,
  pub reasons:          Vec<String>,
}

/// Never fails: a question with no metric vocabulary yields empty results.
pub fn resolve_metrics(registry: &MetricRegistry, normalized: &str) -> MetricResolution {
  let mut resolution = MetricResolution::default();

  for metric in registry.list() {
    if metric.aliases.iter().any(|alias| contains_term(normalized, alias)) {
      resolution
        .metrics
        .push(MetricSelection::new(metric.id.clone(), RESOLVED_METRIC_CONFIDENCE));
      resolution
        .reasons
        .push(format!("Matched metric '{}' from aliases.", metric.id));
    }
  }

  for cue in METRIC_CUES {
    if contains_term(normalized, cue)
      && !registry.is_registered_alias(cue)
      && !resolution.unresolved_terms.iter().any(|t| t == cue)
    {
      resolution.unresolved_terms.push((*cue).to_owned());
    }
  }

  resolution
}
