//! Handlers for `/query-trace` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/query-trace/{trace_id}` | Plan plus recorded provenance; 404 if unknown |
//! | `PUT`  | `/query-trace/{trace_id}/sources` | Body: `{"dataFreshnessMode": ..., "sourceCalls": [...]}` |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
};
use hoop_core::{
  plan::QueryPlan,
  store::DataStore,
  trace::{FreshnessMode, TraceSourceCall, TraceSources},
};
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
  pub hits:   usize,
  pub misses: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTraceResponse {
  pub trace_id:            String,
  pub normalized_question: String,
  pub query_plan:          QueryPlan,
  pub plan_summary:        Vec<String>,
  pub data_freshness_mode: FreshnessMode,
  pub source_calls:        Vec<TraceSourceCall>,
  pub cache:               CacheSummary,
}

fn trace_id_param(raw: &str) -> Result<&str, ApiError> {
  let trace_id = raw.trim();
  if trace_id.is_empty() {
    return Err(ApiError::BadRequest("traceId is required.".to_owned()));
  }
  Ok(trace_id)
}

fn trace_not_found() -> ApiError { ApiError::NotFound("Trace not found.".to_owned()) }

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /query-trace/{trace_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<QueryTraceResponse>, ApiError>
where
  S: DataStore + 'static,
{
  let trace_id = trace_id_param(&raw_id)?;
  let entry = state
    .traces
    .get(trace_id)
    .await
    .ok_or_else(trace_not_found)?;

  let sources = state
    .store
    .get_trace_source_calls(trace_id)
    .await
    .map_err(ApiError::store)?
    .unwrap_or_default();

  let cache = CacheSummary {
    hits:   sources.cache_hits(),
    misses: sources.cache_misses(),
  };

  Ok(Json(QueryTraceResponse {
    trace_id: entry.trace_id,
    normalized_question: entry.normalized_question,
    query_plan: entry.plan,
    plan_summary: entry.plan_summary,
    data_freshness_mode: sources.freshness_mode,
    source_calls: sources.source_calls,
    cache,
  }))
}

// ─── Record sources ──────────────────────────────────────────────────────────

/// `PUT /query-trace/{trace_id}/sources`
///
/// Replaces every recorded source call for the trace. An empty list clears
/// the provenance.
pub async fn put_sources<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  body: Result<Json<TraceSources>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
  S: DataStore + 'static,
{
  let trace_id = trace_id_param(&raw_id)?;
  let Json(sources) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  if !state.traces.contains(trace_id).await {
    return Err(trace_not_found());
  }

  state
    .store
    .replace_trace_source_calls(trace_id, sources.freshness_mode, sources.source_calls)
    .await
    .map_err(ApiError::store)?;

  Ok(StatusCode::NO_CONTENT)
}
