//! `GET /health`

use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "hoop-hub";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
  pub status:    &'static str,
  pub service:   &'static str,
  pub store:     &'static str,
  pub timestamp: String,
}

pub async fn handler<S>(State(state): State<AppState<S>>) -> Json<HealthResponse> {
  Json(HealthResponse {
    status:    "ok",
    service:   SERVICE_NAME,
    store:     state.backend,
    timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
  })
}
