//! Content-addressed cache keys, payload checksums and raw endpoint cache
//! records.
//!
//! The key format and the checksum algorithm are stable: changing either
//! invalidates every cached payload, so doing so requires bumping the parser
//! version.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{catalog::EndpointCatalogEntry, time::to_stored_precision, trace::CacheStatus};

/// Namespace tag prefixed to every raw endpoint cache key.
pub const CACHE_KEY_NAMESPACE: &str = "nba";

// ─── Canonical JSON ──────────────────────────────────────────────────────────

/// Recursively sort object keys; arrays keep their order.
pub fn canonicalize(value: &Value) -> Value {
  match value {
    Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
    Value::Object(map) => {
      let mut entries: Vec<_> = map.iter().collect();
      entries.sort_by(|(a, _), (b, _)| a.cmp(b));

      let mut out = serde_json::Map::with_capacity(map.len());
      for (k, v) in entries {
        out.insert(k.clone(), canonicalize(v));
      }
      Value::Object(out)
    }
    other => other.clone(),
  }
}

/// Canonical compact JSON text: structurally equal values always produce the
/// same string regardless of key insertion order.
pub fn stable_stringify(value: &Value) -> String { canonicalize(value).to_string() }

fn sha256_hex(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// Lowercase hex SHA-256 of the exact payload text stored.
pub fn payload_checksum(payload_json: &str) -> String {
  sha256_hex(payload_json.as_bytes())
}

// ─── Cache key ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CacheKeyInput<'a> {
  pub endpoint_id:    &'a str,
  pub params:         &'a Value,
  pub parser_version: &'a str,
  pub snapshot_date:  NaiveDate,
}

/// `nba:{endpoint_id}:{parser_version}:{snapshot_date}:{sha256(params)}`
pub fn raw_endpoint_cache_key(input: &CacheKeyInput<'_>) -> String {
  let params_hash = sha256_hex(stable_stringify(input.params).as_bytes());
  format!(
    "{CACHE_KEY_NAMESPACE}:{}:{}:{}:{params_hash}",
    input.endpoint_id,
    input.parser_version,
    input.snapshot_date.format("%Y-%m-%d"),
  )
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One cached upstream response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEndpointCacheRecord {
  pub cache_key:      String,
  pub endpoint_id:    String,
  pub params_json:    String,
  pub payload_json:   String,
  pub fetched_at:     DateTime<Utc>,
  pub expires_at:     DateTime<Utc>,
  pub snapshot_date:  NaiveDate,
  pub parser_version: String,
  /// [`payload_checksum`] of `payload_json`.
  pub checksum:       String,
  pub is_provisional: bool,
}

impl RawEndpointCacheRecord {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }

  /// True if the stored checksum still describes the stored payload.
  pub fn checksum_matches(&self) -> bool {
    payload_checksum(&self.payload_json) == self.checksum
  }

  /// How a read of this record at `now` should be reported in provenance.
  pub fn cache_status(&self, now: DateTime<Utc>) -> CacheStatus {
    if self.is_expired(now) {
      CacheStatus::StaleHit
    } else {
      CacheStatus::Hit
    }
  }
}

/// Input to [`crate::store::DataStore::put_raw_cache`]. When `checksum` is
/// `None` the store computes it from `payload_json`.
#[derive(Debug, Clone)]
pub struct NewRawCacheRecord {
  pub cache_key:      String,
  pub endpoint_id:    String,
  pub params_json:    String,
  pub payload_json:   String,
  pub fetched_at:     DateTime<Utc>,
  pub expires_at:     DateTime<Utc>,
  pub snapshot_date:  NaiveDate,
  pub parser_version: String,
  pub checksum:       Option<String>,
  pub is_provisional: bool,
}

impl NewRawCacheRecord {
  /// Build a record for a fresh fetch of `entry`: the key, parser version
  /// and expiry (from the endpoint's volatility tier) are derived.
  pub fn for_endpoint(
    entry: &EndpointCatalogEntry,
    params: &Value,
    payload_json: String,
    fetched_at: DateTime<Utc>,
    snapshot_date: NaiveDate,
    is_provisional: bool,
  ) -> Self {
    let cache_key = raw_endpoint_cache_key(&CacheKeyInput {
      endpoint_id: &entry.endpoint_id,
      params,
      parser_version: &entry.parser_version,
      snapshot_date,
    });
    Self {
      cache_key,
      endpoint_id: entry.endpoint_id.clone(),
      params_json: stable_stringify(params),
      payload_json,
      fetched_at,
      expires_at: fetched_at + Duration::minutes(i64::from(entry.ttl_minutes())),
      snapshot_date,
      parser_version: entry.parser_version.clone(),
      checksum: None,
      is_provisional,
    }
  }

  /// Resolve the checksum (accepting a caller-supplied one), truncate the
  /// timestamps to stored precision and produce the record exactly as it
  /// will be stored.
  pub fn into_record(self) -> RawEndpointCacheRecord {
    let checksum = self
      .checksum
      .unwrap_or_else(|| payload_checksum(&self.payload_json));
    RawEndpointCacheRecord {
      cache_key: self.cache_key,
      endpoint_id: self.endpoint_id,
      params_json: self.params_json,
      payload_json: self.payload_json,
      fetched_at: to_stored_precision(self.fetched_at),
      expires_at: to_stored_precision(self.expires_at),
      snapshot_date: self.snapshot_date,
      parser_version: self.parser_version,
      checksum,
      is_provisional: self.is_provisional,
    }
  }
}
