//! The `DataStore` trait.
//!
//! Implemented by the backends in `hoop-store` (SQLite and in-memory). Callers
//! depend on this abstraction and observe the same contract whichever backend
//! was selected at construction time.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  cache::{NewRawCacheRecord, RawEndpointCacheRecord},
  run::{NewNightlyRun, NightlyRunCompletion, NightlyRunRecord},
  trace::{FreshnessMode, TraceSourceCall, TraceSources},
};

/// Storage for raw endpoint cache records, nightly runs and trace
/// provenance.
///
/// Lookups of records that do not exist return `None`; only storage faults
/// (serialization, constraint violations) are errors.
pub trait DataStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Raw endpoint cache ────────────────────────────────────────────────

  /// Insert or overwrite the record for `input.cache_key`. The checksum is
  /// computed from the payload unless the caller supplied one. Every field
  /// is last-writer-wins.
  fn put_raw_cache(
    &self,
    input: NewRawCacheRecord,
  ) -> impl Future<Output = Result<RawEndpointCacheRecord, Self::Error>> + Send + '_;

  fn get_raw_cache<'a>(
    &'a self,
    cache_key: &'a str,
  ) -> impl Future<Output = Result<Option<RawEndpointCacheRecord>, Self::Error>>
  + Send
  + 'a;

  // ── Nightly runs ──────────────────────────────────────────────────────

  /// Record a new run in the `running` state. Fails if the run id exists.
  fn start_nightly_run(
    &self,
    input: NewNightlyRun,
  ) -> impl Future<Output = Result<NightlyRunRecord, Self::Error>> + Send + '_;

  /// Move a running run to its terminal state. Returns `None` if the run id
  /// is unknown and fails if the run already reached a terminal state.
  ///
  /// Concurrent completions of the same run are not ordered by the store.
  fn complete_nightly_run(
    &self,
    input: NightlyRunCompletion,
  ) -> impl Future<Output = Result<Option<NightlyRunRecord>, Self::Error>> + Send + '_;

  fn get_nightly_run<'a>(
    &'a self,
    run_id: &'a str,
  ) -> impl Future<Output = Result<Option<NightlyRunRecord>, Self::Error>> + Send + 'a;

  /// The most recently started run for `slate_date`.
  fn latest_nightly_run_for_slate(
    &self,
    slate_date: NaiveDate,
  ) -> impl Future<Output = Result<Option<NightlyRunRecord>, Self::Error>> + Send + '_;

  // ── Trace provenance ──────────────────────────────────────────────────

  /// Atomically replace every source call recorded for `trace_id`. Readers
  /// see either the previous set or the new one, never a mix.
  fn replace_trace_source_calls<'a>(
    &'a self,
    trace_id: &'a str,
    freshness_mode: FreshnessMode,
    calls: Vec<TraceSourceCall>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The calls recorded for `trace_id`, in insertion order, or `None` if the
  /// trace has no calls. Replacing with an empty list clears the trace.
  fn get_trace_source_calls<'a>(
    &'a self,
    trace_id: &'a str,
  ) -> impl Future<Output = Result<Option<TraceSources>, Self::Error>> + Send + 'a;
}
