//! [`MemoryStore`]: a process-local [`DataStore`] with the same contract as
//! the SQLite backend.
//!
//! Used when no database file is configured or the file cannot be opened.
//! Everything is lost when the process exits.

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use hoop_core::{
  cache::{NewRawCacheRecord, RawEndpointCacheRecord},
  run::{NewNightlyRun, NightlyRunCompletion, NightlyRunRecord},
  store::DataStore,
  trace::{FreshnessMode, TraceSourceCall, TraceSources},
};
use tokio::sync::RwLock;

use crate::{Error, Result};

#[derive(Default)]
struct Inner {
  raw_cache: HashMap<String, RawEndpointCacheRecord>,
  /// Run records keyed by id, paired with their insertion sequence.
  runs:      HashMap<String, (u64, NightlyRunRecord)>,
  next_seq:  u64,
  traces:    HashMap<String, TraceSources>,
}

/// An in-memory data store. Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl DataStore for MemoryStore {
  type Error = Error;

  async fn put_raw_cache(&self, input: NewRawCacheRecord) -> Result<RawEndpointCacheRecord> {
    let record = input.into_record();

    self
      .inner
      .write()
      .await
      .raw_cache
      .insert(record.cache_key.clone(), record.clone());

    tracing::debug!(cache_key = %record.cache_key, endpoint = %record.endpoint_id, "cached raw endpoint payload");
    Ok(record)
  }

  async fn get_raw_cache(&self, cache_key: &str) -> Result<Option<RawEndpointCacheRecord>> {
    Ok(self.inner.read().await.raw_cache.get(cache_key).cloned())
  }

  async fn start_nightly_run(&self, input: NewNightlyRun) -> Result<NightlyRunRecord> {
    let record = input.into_record();

    let mut inner = self.inner.write().await;
    if inner.runs.contains_key(&record.run_id) {
      return Err(Error::NightlyRunExists(record.run_id));
    }
    let seq = inner.next_seq;
    inner.next_seq += 1;
    inner.runs.insert(record.run_id.clone(), (seq, record.clone()));

    tracing::debug!(run_id = %record.run_id, slate = %record.slate_date, "nightly run started");
    Ok(record)
  }

  async fn complete_nightly_run(
    &self,
    input: NightlyRunCompletion,
  ) -> Result<Option<NightlyRunRecord>> {
    let mut inner = self.inner.write().await;
    let Some((_, current)) = inner.runs.get_mut(&input.run_id) else {
      return Ok(None);
    };
    if current.status.is_terminal() {
      return Err(Error::NightlyRunFinalized(input.run_id));
    }

    let updated = input.apply(current.clone());
    *current = updated.clone();

    tracing::debug!(run_id = %updated.run_id, status = updated.status.as_ref(), "nightly run finalized");
    Ok(Some(updated))
  }

  async fn get_nightly_run(&self, run_id: &str) -> Result<Option<NightlyRunRecord>> {
    Ok(
      self
        .inner
        .read()
        .await
        .runs
        .get(run_id)
        .map(|(_, record)| record.clone()),
    )
  }

  async fn latest_nightly_run_for_slate(
    &self,
    slate_date: NaiveDate,
  ) -> Result<Option<NightlyRunRecord>> {
    let inner = self.inner.read().await;
    let latest = inner
      .runs
      .values()
      .filter(|(_, record)| record.slate_date == slate_date)
      .max_by_key(|(seq, record)| (record.started_at, *seq))
      .map(|(_, record)| record.clone());
    Ok(latest)
  }

  async fn replace_trace_source_calls(
    &self,
    trace_id: &str,
    freshness_mode: FreshnessMode,
    calls: Vec<TraceSourceCall>,
  ) -> Result<()> {
    let count = calls.len();
    let mut inner = self.inner.write().await;
    if calls.is_empty() {
      inner.traces.remove(trace_id);
    } else {
      inner.traces.insert(trace_id.to_owned(), TraceSources {
        freshness_mode,
        source_calls: calls,
      });
    }

    tracing::debug!(trace_id, mode = freshness_mode.as_ref(), count, "replaced trace source calls");
    Ok(())
  }

  async fn get_trace_source_calls(&self, trace_id: &str) -> Result<Option<TraceSources>> {
    Ok(self.inner.read().await.traces.get(trace_id).cloned())
  }
}
