//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 UTC strings with fixed microsecond precision, so
//! lexical order matches chronological order. Calendar dates are
//! `YYYY-MM-DD`. Enums are stored by their snake_case discriminant.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use hoop_core::{
  cache::RawEndpointCacheRecord,
  parse_discriminant,
  run::NightlyRunRecord,
  trace::{FreshnessMode, TraceSourceCall, TraceSources},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Integers ────────────────────────────────────────────────────────────────

pub fn encode_latency(ms: u32) -> i64 { i64::from(ms) }

pub fn decode_latency(v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::Decode(format!("latency out of range: {v}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `raw_endpoint_cache` row.
pub struct RawCacheRow {
  pub cache_key:      String,
  pub endpoint_id:    String,
  pub params_json:    String,
  pub payload_json:   String,
  pub fetched_at:     String,
  pub expires_at:     String,
  pub snapshot_date:  String,
  pub parser_version: String,
  pub checksum:       String,
  pub is_provisional: bool,
}

impl RawCacheRow {
  pub const COLUMNS: &'static str = "cache_key, endpoint_id, params_json, payload_json, \
     fetched_at, expires_at, snapshot_date, parser_version, checksum, is_provisional";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      cache_key:      row.get(0)?,
      endpoint_id:    row.get(1)?,
      params_json:    row.get(2)?,
      payload_json:   row.get(3)?,
      fetched_at:     row.get(4)?,
      expires_at:     row.get(5)?,
      snapshot_date:  row.get(6)?,
      parser_version: row.get(7)?,
      checksum:       row.get(8)?,
      is_provisional: row.get(9)?,
    })
  }

  pub fn into_record(self) -> Result<RawEndpointCacheRecord> {
    Ok(RawEndpointCacheRecord {
      cache_key:      self.cache_key,
      endpoint_id:    self.endpoint_id,
      params_json:    self.params_json,
      payload_json:   self.payload_json,
      fetched_at:     decode_dt(&self.fetched_at)?,
      expires_at:     decode_dt(&self.expires_at)?,
      snapshot_date:  decode_date(&self.snapshot_date)?,
      parser_version: self.parser_version,
      checksum:       self.checksum,
      is_provisional: self.is_provisional,
    })
  }
}

/// Raw strings read directly from a `nightly_runs` row.
pub struct RawNightlyRun {
  pub run_id:        String,
  pub slate_date:    String,
  pub started_at:    String,
  pub completed_at:  Option<String>,
  pub status:        String,
  pub finalized_by:  Option<String>,
  pub error_summary: Option<String>,
}

impl RawNightlyRun {
  pub const COLUMNS: &'static str =
    "run_id, slate_date, started_at, completed_at, status, finalized_by, error_summary";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:        row.get(0)?,
      slate_date:    row.get(1)?,
      started_at:    row.get(2)?,
      completed_at:  row.get(3)?,
      status:        row.get(4)?,
      finalized_by:  row.get(5)?,
      error_summary: row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<NightlyRunRecord> {
    Ok(NightlyRunRecord {
      run_id:        self.run_id,
      slate_date:    decode_date(&self.slate_date)?,
      started_at:    decode_dt(&self.started_at)?,
      completed_at:  self.completed_at.as_deref().map(decode_dt).transpose()?,
      status:        parse_discriminant("nightly run status", &self.status)?,
      finalized_by:  self
        .finalized_by
        .as_deref()
        .map(|s| parse_discriminant("finalize reason", s))
        .transpose()?,
      error_summary: self.error_summary,
    })
  }
}

/// Raw values read directly from a `query_trace_source_calls` row.
pub struct RawSourceCall {
  pub endpoint_id:         String,
  pub cache_status:        String,
  pub latency_ms:          i64,
  pub stale:               bool,
  pub is_provisional:      bool,
  pub parser_version:      String,
  pub source_status:       String,
  pub data_freshness_mode: String,
}

impl RawSourceCall {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      endpoint_id:         row.get(0)?,
      cache_status:        row.get(1)?,
      latency_ms:          row.get(2)?,
      stale:               row.get(3)?,
      is_provisional:      row.get(4)?,
      parser_version:      row.get(5)?,
      source_status:       row.get(6)?,
      data_freshness_mode: row.get(7)?,
    })
  }

  fn into_call(self) -> Result<TraceSourceCall> {
    Ok(TraceSourceCall {
      endpoint_id:    self.endpoint_id,
      cache_status:   parse_discriminant("cache status", &self.cache_status)?,
      latency_ms:     decode_latency(self.latency_ms)?,
      stale:          self.stale,
      is_provisional: self.is_provisional,
      parser_version: self.parser_version,
      source_status:  parse_discriminant("source status", &self.source_status)?,
    })
  }
}

/// Fold a trace's rows (already in insertion order) into one bundle. All rows
/// of a trace share a freshness mode because they are written together.
pub fn into_trace_sources(rows: Vec<RawSourceCall>) -> Result<Option<TraceSources>> {
  let Some(first) = rows.first() else { return Ok(None) };
  let freshness_mode: FreshnessMode =
    parse_discriminant("freshness mode", &first.data_freshness_mode)?;
  let source_calls = rows
    .into_iter()
    .map(RawSourceCall::into_call)
    .collect::<Result<_>>()?;
  Ok(Some(TraceSources { freshness_mode, source_calls }))
}
