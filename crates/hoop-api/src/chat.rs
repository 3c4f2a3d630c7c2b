//! `POST /chat/query`: plan a natural-language question and answer it.
//!
//! Body: `{"sessionId": "...", "message": "...", "clientTs"?: "..."}`.

use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;
use hoop_core::store::DataStore;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
  answer::{self, Citation},
  error::ApiError,
  state::{AppState, TraceEntry},
};

// ─── Request ─────────────────────────────────────────────────────────────────

/// A validated chat request. Strings are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatQueryRequest {
  pub session_id: String,
  pub message:    String,
  pub client_ts:  Option<String>,
}

fn required_string(body: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
  body
    .get(key)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

/// Parse and validate a raw request body. Each failing field has its own
/// message.
pub fn parse_request(body: &[u8]) -> Result<ChatQueryRequest, ApiError> {
  let value: Value = serde_json::from_slice(body)
    .map_err(|_| ApiError::BadRequest("Invalid JSON body.".to_owned()))?;

  let Value::Object(body) = value else {
    return Err(ApiError::BadRequest(
      "Request body must be a JSON object.".to_owned(),
    ));
  };

  let session_id = required_string(&body, "sessionId")
    .ok_or_else(|| ApiError::BadRequest("sessionId is required.".to_owned()))?;
  let message = required_string(&body, "message")
    .ok_or_else(|| ApiError::BadRequest("message is required.".to_owned()))?;

  let client_ts = match body.get("clientTs") {
    None => None,
    Some(Value::String(ts)) => Some(ts.clone()),
    Some(_) => {
      return Err(ApiError::BadRequest(
        "clientTs must be a string when provided.".to_owned(),
      ));
    }
  };

  Ok(ChatQueryRequest { session_id, message, client_ts })
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatQueryStatus {
  Ok,
  Unsupported,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQueryResponse {
  pub status:    ChatQueryStatus,
  pub answer:    String,
  pub citations: Vec<Citation>,
  pub trace_id:  String,
  pub followups: Vec<String>,
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /chat/query`
pub async fn query<S>(
  State(state): State<AppState<S>>,
  body: Bytes,
) -> Result<Json<ChatQueryResponse>, ApiError>
where
  S: DataStore + 'static,
{
  let request = parse_request(&body)?;
  let planned = state.planner.plan(&request.message)?;
  let plan = planned.plan;

  let trace_id = Uuid::new_v4().to_string();
  let status = if plan.intent.is_supported() {
    ChatQueryStatus::Ok
  } else {
    ChatQueryStatus::Unsupported
  };

  let response = ChatQueryResponse {
    status,
    answer: answer::answer_text(&plan),
    citations: answer::citations(&state.catalog, state.planner.registry(), &plan),
    trace_id: trace_id.clone(),
    followups: answer::followups(plan.intent),
  };

  tracing::debug!(
    session_id = %request.session_id,
    trace_id = %trace_id,
    intent = %plan.intent,
    confidence = plan.confidence,
    "planned chat query"
  );

  state
    .traces
    .insert(TraceEntry {
      trace_id,
      normalized_question: planned.normalized_question,
      plan_summary: answer::plan_summary(&plan),
      plan,
      created_at: Utc::now(),
    })
    .await;

  Ok(Json(response))
}
