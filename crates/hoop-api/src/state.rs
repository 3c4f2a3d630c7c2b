//! Shared handler state and the per-instance trace log.

use std::{
  collections::{HashMap, VecDeque},
  sync::Arc,
};

use chrono::{DateTime, Utc};
use hoop_core::{catalog::EndpointCatalog, plan::QueryPlan};
use hoop_planner::Planner;
use tokio::sync::RwLock;

/// Everything recorded about a planned question, keyed by trace id.
#[derive(Debug, Clone)]
pub struct TraceEntry {
  pub trace_id:            String,
  pub normalized_question: String,
  pub plan:                QueryPlan,
  pub plan_summary:        Vec<String>,
  pub created_at:          DateTime<Utc>,
}

/// Traces kept per API instance before the oldest are evicted.
pub const DEFAULT_TRACE_CAPACITY: usize = 10_000;

#[derive(Default)]
struct TraceLogInner {
  entries: HashMap<String, TraceEntry>,
  /// Trace ids, oldest first.
  order:   VecDeque<String>,
}

/// Traces created by this API instance. Not persisted; source-call
/// provenance lives in the data store.
///
/// Bounded: once `capacity` traces are held, inserting a new one evicts the
/// oldest.
#[derive(Clone)]
pub struct TraceLog {
  inner:    Arc<RwLock<TraceLogInner>>,
  capacity: usize,
}

impl Default for TraceLog {
  fn default() -> Self { Self::with_capacity(DEFAULT_TRACE_CAPACITY) }
}

impl TraceLog {
  pub fn new() -> Self { Self::default() }

  /// A log holding at most `capacity` traces (at least one).
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      inner:    Arc::new(RwLock::new(TraceLogInner::default())),
      capacity: capacity.max(1),
    }
  }

  pub async fn insert(&self, entry: TraceEntry) {
    let mut inner = self.inner.write().await;
    let trace_id = entry.trace_id.clone();
    if inner.entries.insert(trace_id.clone(), entry).is_none() {
      inner.order.push_back(trace_id);
    }
    while inner.order.len() > self.capacity {
      if let Some(oldest) = inner.order.pop_front() {
        inner.entries.remove(&oldest);
        tracing::debug!(trace_id = %oldest, "evicted trace from log");
      }
    }
  }

  pub async fn get(&self, trace_id: &str) -> Option<TraceEntry> {
    self.inner.read().await.entries.get(trace_id).cloned()
  }

  pub async fn contains(&self, trace_id: &str) -> bool {
    self.inner.read().await.entries.contains_key(trace_id)
  }

  pub async fn len(&self) -> usize { self.inner.read().await.entries.len() }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

/// State shared by every handler.
pub struct AppState<S> {
  pub store:   Arc<S>,
  /// Reported by `/health`, e.g. `"sqlite"` or `"memory"`.
  pub backend: &'static str,
  pub planner: Arc<Planner>,
  pub catalog: Arc<EndpointCatalog>,
  pub traces:  TraceLog,
}

impl<S> AppState<S> {
  /// State with the built-in metric registry and endpoint catalog.
  pub fn new(store: Arc<S>, backend: &'static str) -> Self {
    Self {
      store,
      backend,
      planner: Arc::new(Planner::default()),
      catalog: Arc::new(EndpointCatalog::nba_stats()),
      traces: TraceLog::new(),
    }
  }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      backend: self.backend,
      planner: Arc::clone(&self.planner),
      catalog: Arc::clone(&self.catalog),
      traces:  self.traces.clone(),
    }
  }
}
