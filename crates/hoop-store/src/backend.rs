//! Backend selection.
//!
//! [`Store`] is what the rest of the system holds. It is chosen once at
//! startup: SQLite when a path is configured and opens cleanly, memory
//! otherwise.

use std::path::PathBuf;

use chrono::NaiveDate;
use hoop_core::{
  cache::{NewRawCacheRecord, RawEndpointCacheRecord},
  run::{NewNightlyRun, NightlyRunCompletion, NightlyRunRecord},
  store::DataStore,
  trace::{FreshnessMode, TraceSourceCall, TraceSources},
};
use serde::Deserialize;

use crate::{Error, MemoryStore, Result, SqliteStore};

/// Where the store should live.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
  /// SQLite database file. `None` selects the in-memory backend.
  #[serde(default)]
  pub path: Option<PathBuf>,
}

impl StoreConfig {
  pub fn sqlite(path: impl Into<PathBuf>) -> Self { Self { path: Some(path.into()) } }

  pub fn in_memory() -> Self { Self { path: None } }
}

#[derive(Clone)]
pub enum Store {
  Sqlite(SqliteStore),
  Memory(MemoryStore),
}

impl Store {
  /// Open the configured backend.
  ///
  /// Failure to open SQLite is not fatal: the error is logged and the
  /// in-memory backend is used instead.
  pub async fn open(config: StoreConfig) -> Self {
    let Some(path) = config.path else {
      tracing::info!("no store path configured, using in-memory store");
      return Self::Memory(MemoryStore::new());
    };

    match Self::open_sqlite(&path).await {
      Ok(store) => {
        tracing::info!(path = %path.display(), "opened sqlite store");
        Self::Sqlite(store)
      }
      Err(e) => {
        tracing::warn!(
          path = %path.display(),
          error = %e,
          "failed to open sqlite store, falling back to in-memory store"
        );
        Self::Memory(MemoryStore::new())
      }
    }
  }

  async fn open_sqlite(path: &std::path::Path) -> Result<SqliteStore> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    SqliteStore::open(path).await
  }

  /// The name of the active backend, `"sqlite"` or `"memory"`.
  pub fn backend(&self) -> &'static str {
    match self {
      Self::Sqlite(_) => "sqlite",
      Self::Memory(_) => "memory",
    }
  }
}

impl DataStore for Store {
  type Error = Error;

  async fn put_raw_cache(&self, input: NewRawCacheRecord) -> Result<RawEndpointCacheRecord> {
    match self {
      Self::Sqlite(s) => s.put_raw_cache(input).await,
      Self::Memory(s) => s.put_raw_cache(input).await,
    }
  }

  async fn get_raw_cache(&self, cache_key: &str) -> Result<Option<RawEndpointCacheRecord>> {
    match self {
      Self::Sqlite(s) => s.get_raw_cache(cache_key).await,
      Self::Memory(s) => s.get_raw_cache(cache_key).await,
    }
  }

  async fn start_nightly_run(&self, input: NewNightlyRun) -> Result<NightlyRunRecord> {
    match self {
      Self::Sqlite(s) => s.start_nightly_run(input).await,
      Self::Memory(s) => s.start_nightly_run(input).await,
    }
  }

  async fn complete_nightly_run(
    &self,
    input: NightlyRunCompletion,
  ) -> Result<Option<NightlyRunRecord>> {
    match self {
      Self::Sqlite(s) => s.complete_nightly_run(input).await,
      Self::Memory(s) => s.complete_nightly_run(input).await,
    }
  }

  async fn get_nightly_run(&self, run_id: &str) -> Result<Option<NightlyRunRecord>> {
    match self {
      Self::Sqlite(s) => s.get_nightly_run(run_id).await,
      Self::Memory(s) => s.get_nightly_run(run_id).await,
    }
  }

  async fn latest_nightly_run_for_slate(
    &self,
    slate_date: NaiveDate,
  ) -> Result<Option<NightlyRunRecord>> {
    match self {
      Self::Sqlite(s) => s.latest_nightly_run_for_slate(slate_date).await,
      Self::Memory(s) => s.latest_nightly_run_for_slate(slate_date).await,
    }
  }

  async fn replace_trace_source_calls(
    &self,
    trace_id: &str,
    freshness_mode: FreshnessMode,
    calls: Vec<TraceSourceCall>,
  ) -> Result<()> {
    match self {
      Self::Sqlite(s) => s.replace_trace_source_calls(trace_id, freshness_mode, calls).await,
      Self::Memory(s) => s.replace_trace_source_calls(trace_id, freshness_mode, calls).await,
    }
  }

  async fn get_trace_source_calls(&self, trace_id: &str) -> Result<Option<TraceSources>> {
    match self {
      Self::Sqlite(s) => s.get_trace_source_calls(trace_id).await,
      Self::Memory(s) => s.get_trace_source_calls(trace_id).await,
    }
  }
}
