//! JSON HTTP API for Hoop Hub.
//!
//! Exposes an axum [`Router`] backed by any [`hoop_core::store::DataStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", hoop_api::api_router(AppState::new(store, "sqlite")))
//! ```

pub mod answer;
pub mod chat;
pub mod error;
pub mod health;
pub mod state;
pub mod trace;

use axum::{
  Router,
  routing::{get, post, put},
};
use hoop_core::store::DataStore;

pub use error::ApiError;
pub use state::{AppState, TraceEntry, TraceLog};

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: DataStore + 'static,
{
  Router::new()
    .route("/health", get(health::handler::<S>))
    .route("/chat/query", post(chat::query::<S>))
    .route("/query-trace/{trace_id}", get(trace::get_one::<S>))
    .route("/query-trace/{trace_id}/sources", put(trace::put_sources::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
  };
  use hoop_store::MemoryStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  fn make_state() -> AppState<MemoryStore> {
    AppState::new(Arc::new(MemoryStore::new()), "memory")
  }

  async fn send(
    state: AppState<MemoryStore>,
    method: &str,
    uri: &str,
    body: Option<&str>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let req = builder
      .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
      .unwrap();
    api_router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn ask(state: &AppState<MemoryStore>, message: &str) -> Value {
    let body = json!({ "sessionId": "session-1", "message": message }).to_string();
    let resp = send(state.clone(), "POST", "/chat/query", Some(&body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    json_body(resp).await
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_service_and_backend() {
    let resp = send(make_state(), "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "hoop-hub");
    assert_eq!(body["store"], "memory");
    let ts = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
  }

  // ── Chat ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chat_rejects_invalid_json() {
    let resp = send(make_state(), "POST", "/chat/query", Some("{oops")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "Invalid JSON body.");
  }

  #[tokio::test]
  async fn chat_rejects_missing_session() {
    let resp = send(
      make_state(),
      "POST",
      "/chat/query",
      Some(r#"{"message":"Who leads the league in assists?"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "sessionId is required.");
  }

  #[tokio::test]
  async fn chat_answers_league_leaders_question() {
    let state = make_state();
    let body = ask(&state, "Who averaged the most assists in 2023-24?").await;

    assert_eq!(body["status"], "ok");
    assert!(body["traceId"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["followups"].as_array().unwrap().len(), 3);

    let sources: Vec<&str> = body["citations"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["source"].as_str().unwrap())
      .collect();
    assert_eq!(sources, [
      "NBA stats endpoint: leagueleaders",
      "NBA stats endpoint: playergamelog",
      "NBA stats endpoint: leaguedashplayerstats",
    ]);
  }

  #[tokio::test]
  async fn chat_comparison_cites_player_sources() {
    let state = make_state();
    let body = ask(&state, "Compare Stephen Curry vs Damian Lillard this season").await;

    assert_eq!(body["status"], "ok");
    let sources: Vec<&str> = body["citations"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["source"].as_str().unwrap())
      .collect();
    assert_eq!(sources, [
      "NBA stats endpoint: playercareerstats",
      "NBA stats endpoint: leaguedashplayerstats",
    ]);
  }

  #[tokio::test]
  async fn chat_reports_unsupported_question() {
    let state = make_state();
    let body = ask(&state, "Who wins the championship this year?").await;

    assert_eq!(body["status"], "unsupported");
    assert_eq!(body["citations"], json!([]));
    assert_eq!(body["answer"], answer::UNSUPPORTED_ANSWER);
  }

  // ── Query trace ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn trace_blank_id_is_bad_request() {
    let resp = send(make_state(), "GET", "/query-trace/%20%20", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "traceId is required.");
  }

  #[tokio::test]
  async fn trace_unknown_id_is_not_found() {
    let resp = send(make_state(), "GET", "/query-trace/missing-trace-id", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"], "Trace not found.");
  }

  #[tokio::test]
  async fn trace_defaults_to_nightly_without_sources() {
    let state = make_state();
    let chat = ask(&state, "Who averaged the most assists in 2023-24?").await;
    let trace_id = chat["traceId"].as_str().unwrap();

    let resp = send(state, "GET", &format!("/query-trace/{trace_id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["traceId"], trace_id);
    assert_eq!(body["normalizedQuestion"], "who averaged the most assists in 2023-24");
    assert_eq!(body["queryPlan"]["intent"], "league_leaders");
    assert_eq!(body["dataFreshnessMode"], "nightly");
    assert_eq!(body["sourceCalls"], json!([]));
    assert_eq!(body["cache"], json!({ "hits": 0, "misses": 0 }));
    assert!(!body["planSummary"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn trace_reflects_recorded_sources() {
    let state = make_state();
    let chat = ask(&state, "Who averaged the most assists in 2023-24?").await;
    let trace_id = chat["traceId"].as_str().unwrap().to_owned();

    let sources = json!({
      "dataFreshnessMode": "provisional_live",
      "sourceCalls": [
        {
          "endpointId": "leagueleaders",
          "cacheStatus": "hit",
          "latencyMs": 12,
          "stale": false,
          "isProvisional": true,
          "parserVersion": "v1",
          "sourceStatus": "ok"
        },
        {
          "endpointId": "playergamelog",
          "cacheStatus": "miss",
          "latencyMs": 340,
          "stale": false,
          "isProvisional": true,
          "parserVersion": "v1",
          "sourceStatus": "timeout"
        }
      ]
    })
    .to_string();
    let resp = send(
      state.clone(),
      "PUT",
      &format!("/query-trace/{trace_id}/sources"),
      Some(&sources),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(state, "GET", &format!("/query-trace/{trace_id}"), None).await;
    let body = json_body(resp).await;
    assert_eq!(body["dataFreshnessMode"], "provisional_live");
    assert_eq!(body["sourceCalls"].as_array().unwrap().len(), 2);
    assert_eq!(body["sourceCalls"][0]["endpointId"], "leagueleaders");
    assert_eq!(body["cache"], json!({ "hits": 1, "misses": 1 }));
  }

  #[tokio::test]
  async fn recording_sources_for_unknown_trace_is_not_found() {
    let body = json!({ "dataFreshnessMode": "nightly", "sourceCalls": [] }).to_string();
    let resp = send(
      make_state(),
      "PUT",
      "/query-trace/missing-trace-id/sources",
      Some(&body),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn recording_sources_rejects_latency_beyond_u32() {
    let state = make_state();
    let chat = ask(&state, "Who averaged the most assists in 2023-24?").await;
    let trace_id = chat["traceId"].as_str().unwrap().to_owned();

    let body = json!({
      "dataFreshnessMode": "nightly",
      "sourceCalls": [{
        "endpointId": "leagueleaders",
        "cacheStatus": "miss",
        "latencyMs": u64::from(u32::MAX) + 1,
        "stale": false,
        "isProvisional": false,
        "parserVersion": "v1",
        "sourceStatus": "ok"
      }]
    })
    .to_string();
    let resp = send(
      state,
      "PUT",
      &format!("/query-trace/{trace_id}/sources"),
      Some(&body),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn recording_sources_rejects_malformed_body() {
    let state = make_state();
    let chat = ask(&state, "Who averaged the most assists in 2023-24?").await;
    let trace_id = chat["traceId"].as_str().unwrap().to_owned();

    let resp = send(
      state,
      "PUT",
      &format!("/query-trace/{trace_id}/sources"),
      Some(r#"{"dataFreshnessMode":"sometimes","sourceCalls":[]}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
