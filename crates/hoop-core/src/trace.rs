//! Per-query provenance: which upstream sources (or cache entries) a query
//! trace touched.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Where the data behind a trace came from.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FreshnessMode {
  /// The nightly batch pipeline.
  #[default]
  Nightly,
  /// A provisional live fetch.
  ProvisionalLive,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CacheStatus {
  Hit,
  Miss,
  StaleHit,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceStatus {
  Ok,
  Timeout,
  RateLimited,
  Error,
}

/// One upstream-or-cache interaction attributed to a query trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSourceCall {
  pub endpoint_id:    String,
  pub cache_status:   CacheStatus,
  /// Milliseconds; `u32` so every value survives an SQLite `INTEGER`.
  pub latency_ms:     u32,
  pub stale:          bool,
  pub is_provisional: bool,
  pub parser_version: String,
  pub source_status:  SourceStatus,
}

/// A trace's complete provenance, always under a single freshness mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSources {
  #[serde(rename = "dataFreshnessMode")]
  pub freshness_mode: FreshnessMode,
  pub source_calls:   Vec<TraceSourceCall>,
}

impl TraceSources {
  pub fn cache_hits(&self) -> usize {
    self
      .source_calls
      .iter()
      .filter(|c| matches!(c.cache_status, CacheStatus::Hit | CacheStatus::StaleHit))
      .count()
  }

  pub fn cache_misses(&self) -> usize {
    self
      .source_calls
      .iter()
      .filter(|c| c.cache_status == CacheStatus::Miss)
      .count()
  }
}
