//! Nightly ingestion run records.
//!
//! A run is created in [`NightlyRunStatus::Running`] and transitions exactly
//! once to a terminal status. Several runs may exist for one slate date; the
//! most recently started one is authoritative.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::time::to_stored_precision;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NightlyRunStatus {
  Running,
  Completed,
  Failed,
  Partial,
}

impl NightlyRunStatus {
  pub fn is_terminal(self) -> bool { self != Self::Running }
}

/// The terminal states a running run may move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
  Completed,
  Failed,
  Partial,
}

impl From<RunOutcome> for NightlyRunStatus {
  fn from(outcome: RunOutcome) -> Self {
    match outcome {
      RunOutcome::Completed => Self::Completed,
      RunOutcome::Failed => Self::Failed,
      RunOutcome::Partial => Self::Partial,
    }
  }
}

/// What decided that the slate was ready to finalize.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinalizeReason {
  /// Every game on the slate reported final.
  GameCompleteAware,
  /// The ingestion cutoff passed before all games were final.
  CutoffFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightlyRunRecord {
  pub run_id:        String,
  pub slate_date:    NaiveDate,
  pub started_at:    DateTime<Utc>,
  pub completed_at:  Option<DateTime<Utc>>,
  pub status:        NightlyRunStatus,
  pub finalized_by:  Option<FinalizeReason>,
  pub error_summary: Option<String>,
}

/// Input to [`crate::store::DataStore::start_nightly_run`].
#[derive(Debug, Clone)]
pub struct NewNightlyRun {
  pub run_id:     String,
  pub slate_date: NaiveDate,
  pub started_at: DateTime<Utc>,
}

impl NewNightlyRun {
  /// The record as it exists right after the run starts.
  pub fn into_record(self) -> NightlyRunRecord {
    NightlyRunRecord {
      run_id:        self.run_id,
      slate_date:    self.slate_date,
      started_at:    to_stored_precision(self.started_at),
      completed_at:  None,
      status:        NightlyRunStatus::Running,
      finalized_by:  None,
      error_summary: None,
    }
  }
}

/// Input to [`crate::store::DataStore::complete_nightly_run`].
#[derive(Debug, Clone)]
pub struct NightlyRunCompletion {
  pub run_id:        String,
  pub completed_at:  DateTime<Utc>,
  pub outcome:       RunOutcome,
  pub finalized_by:  FinalizeReason,
  pub error_summary: Option<String>,
}

impl NightlyRunCompletion {
  /// Apply this completion to a running record.
  pub fn apply(self, record: NightlyRunRecord) -> NightlyRunRecord {
    NightlyRunRecord {
      completed_at: Some(to_stored_precision(self.completed_at)),
      status: self.outcome.into(),
      finalized_by: Some(self.finalized_by),
      error_summary: self.error_summary,
      ..record
    }
  }
}
