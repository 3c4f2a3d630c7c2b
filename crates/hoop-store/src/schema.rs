//! SQL schema for the Hoop Hub SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

-- One row per cache key; re-fetches overwrite every column.
CREATE TABLE IF NOT EXISTS raw_endpoint_cache (
    cache_key      TEXT PRIMARY KEY,
    endpoint_id    TEXT NOT NULL,
    params_json    TEXT NOT NULL,
    payload_json   TEXT NOT NULL,
    fetched_at     TEXT NOT NULL,   -- RFC 3339 UTC, microsecond precision
    expires_at     TEXT NOT NULL,
    snapshot_date  TEXT NOT NULL,   -- YYYY-MM-DD
    parser_version TEXT NOT NULL,
    checksum       TEXT NOT NULL,   -- hex SHA-256 of payload_json
    is_provisional INTEGER NOT NULL CHECK (is_provisional IN (0, 1))
);

CREATE INDEX IF NOT EXISTS raw_endpoint_cache_endpoint_idx
    ON raw_endpoint_cache (endpoint_id, snapshot_date, expires_at);

CREATE TABLE IF NOT EXISTS nightly_runs (
    run_id        TEXT PRIMARY KEY,
    slate_date    TEXT NOT NULL,
    started_at    TEXT NOT NULL,
    completed_at  TEXT,
    status        TEXT NOT NULL
                  CHECK (status IN ('running', 'completed', 'failed', 'partial')),
    finalized_by  TEXT
                  CHECK (finalized_by IN ('game_complete_aware', 'cutoff_fallback')),
    error_summary TEXT
);

CREATE INDEX IF NOT EXISTS nightly_runs_slate_idx
    ON nightly_runs (slate_date, started_at);

-- Replaced wholesale per trace inside a single transaction.
CREATE TABLE IF NOT EXISTS query_trace_source_calls (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    trace_id            TEXT NOT NULL,
    endpoint_id         TEXT NOT NULL,
    cache_status        TEXT NOT NULL CHECK (cache_status IN ('hit', 'miss', 'stale_hit')),
    latency_ms          INTEGER NOT NULL,
    stale               INTEGER NOT NULL CHECK (stale IN (0, 1)),
    is_provisional      INTEGER NOT NULL CHECK (is_provisional IN (0, 1)),
    parser_version      TEXT NOT NULL,
    source_status       TEXT NOT NULL
                        CHECK (source_status IN ('ok', 'timeout', 'rate_limited', 'error')),
    data_freshness_mode TEXT NOT NULL
                        CHECK (data_freshness_mode IN ('nightly', 'provisional_live')),
    created_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS query_trace_source_calls_trace_idx
    ON query_trace_source_calls (trace_id, id);

PRAGMA user_version = 1;
";
