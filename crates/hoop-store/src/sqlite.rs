//! [`SqliteStore`]: the SQLite implementation of [`DataStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use hoop_core::{
  cache::{NewRawCacheRecord, RawEndpointCacheRecord},
  run::{NewNightlyRun, NightlyRunCompletion, NightlyRunRecord, NightlyRunStatus},
  store::DataStore,
  trace::{FreshnessMode, TraceSourceCall, TraceSources},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{
    RawCacheRow, RawNightlyRun, RawSourceCall, encode_date, encode_dt, encode_latency,
    into_trace_sources,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A data store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What `complete_nightly_run` found inside its transaction.
enum Completion {
  Missing,
  AlreadyFinal,
  Updated(RawNightlyRun),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_nightly_run(
    &self,
    sql: &'static str,
    key: String,
  ) -> Result<Option<NightlyRunRecord>> {
    let raw: Option<RawNightlyRun> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![key], RawNightlyRun::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNightlyRun::into_record).transpose()
  }
}

// ─── DataStore impl ──────────────────────────────────────────────────────────

impl DataStore for SqliteStore {
  type Error = Error;

  // ── Raw endpoint cache ────────────────────────────────────────────────────

  async fn put_raw_cache(&self, input: NewRawCacheRecord) -> Result<RawEndpointCacheRecord> {
    let record = input.into_record();

    let cache_key      = record.cache_key.clone();
    let endpoint_id    = record.endpoint_id.clone();
    let params_json    = record.params_json.clone();
    let payload_json   = record.payload_json.clone();
    let fetched_at     = encode_dt(record.fetched_at);
    let expires_at     = encode_dt(record.expires_at);
    let snapshot_date  = encode_date(record.snapshot_date);
    let parser_version = record.parser_version.clone();
    let checksum       = record.checksum.clone();
    let is_provisional = record.is_provisional;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO raw_endpoint_cache (
             cache_key, endpoint_id, params_json, payload_json, fetched_at,
             expires_at, snapshot_date, parser_version, checksum, is_provisional
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
           ON CONFLICT(cache_key) DO UPDATE SET
             endpoint_id    = excluded.endpoint_id,
             params_json    = excluded.params_json,
             payload_json   = excluded.payload_json,
             fetched_at     = excluded.fetched_at,
             expires_at     = excluded.expires_at,
             snapshot_date  = excluded.snapshot_date,
             parser_version = excluded.parser_version,
             checksum       = excluded.checksum,
             is_provisional = excluded.is_provisional",
          rusqlite::params![
            cache_key,
            endpoint_id,
            params_json,
            payload_json,
            fetched_at,
            expires_at,
            snapshot_date,
            parser_version,
            checksum,
            is_provisional,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(cache_key = %record.cache_key, endpoint = %record.endpoint_id, "cached raw endpoint payload");
    Ok(record)
  }

  async fn get_raw_cache(&self, cache_key: &str) -> Result<Option<RawEndpointCacheRecord>> {
    let key = cache_key.to_owned();

    let raw: Option<RawCacheRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM raw_endpoint_cache WHERE cache_key = ?1",
          RawCacheRow::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], RawCacheRow::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCacheRow::into_record).transpose()
  }

  // ── Nightly runs ──────────────────────────────────────────────────────────

  async fn start_nightly_run(&self, input: NewNightlyRun) -> Result<NightlyRunRecord> {
    let record = input.into_record();

    let run_id     = record.run_id.clone();
    let slate_date = encode_date(record.slate_date);
    let started_at = encode_dt(record.started_at);
    let status     = record.status.as_ref().to_owned();

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO nightly_runs (run_id, slate_date, started_at, status)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(run_id) DO NOTHING",
          rusqlite::params![run_id, slate_date, started_at, status],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::NightlyRunExists(record.run_id));
    }

    tracing::debug!(run_id = %record.run_id, slate = %record.slate_date, "nightly run started");
    Ok(record)
  }

  async fn complete_nightly_run(
    &self,
    input: NightlyRunCompletion,
  ) -> Result<Option<NightlyRunRecord>> {
    let run_id        = input.run_id.clone();
    let completed_at  = encode_dt(input.completed_at);
    let status        = NightlyRunStatus::from(input.outcome).as_ref().to_owned();
    let finalized_by  = input.finalized_by.as_ref().to_owned();
    let error_summary = input.error_summary;

    let completion = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM nightly_runs WHERE run_id = ?1",
            rusqlite::params![run_id],
            |r| r.get(0),
          )
          .optional()?;

        let completion = match current {
          None => Completion::Missing,
          Some(s) if s != NightlyRunStatus::Running.as_ref() => Completion::AlreadyFinal,
          Some(_) => {
            tx.execute(
              "UPDATE nightly_runs
               SET completed_at = ?2, status = ?3, finalized_by = ?4, error_summary = ?5
               WHERE run_id = ?1",
              rusqlite::params![run_id, completed_at, status, finalized_by, error_summary],
            )?;
            let sql = format!(
              "SELECT {} FROM nightly_runs WHERE run_id = ?1",
              RawNightlyRun::COLUMNS
            );
            Completion::Updated(tx.query_row(
              &sql,
              rusqlite::params![run_id],
              RawNightlyRun::from_row,
            )?)
          }
        };

        tx.commit()?;
        Ok(completion)
      })
      .await?;

    match completion {
      Completion::Missing => Ok(None),
      Completion::AlreadyFinal => Err(Error::NightlyRunFinalized(input.run_id)),
      Completion::Updated(raw) => {
        let record = raw.into_record()?;
        tracing::debug!(run_id = %record.run_id, status = record.status.as_ref(), "nightly run finalized");
        Ok(Some(record))
      }
    }
  }

  async fn get_nightly_run(&self, run_id: &str) -> Result<Option<NightlyRunRecord>> {
    self
      .query_nightly_run(
        "SELECT run_id, slate_date, started_at, completed_at, status, finalized_by, error_summary
         FROM nightly_runs WHERE run_id = ?1",
        run_id.to_owned(),
      )
      .await
  }

  async fn latest_nightly_run_for_slate(
    &self,
    slate_date: NaiveDate,
  ) -> Result<Option<NightlyRunRecord>> {
    self
      .query_nightly_run(
        "SELECT run_id, slate_date, started_at, completed_at, status, finalized_by, error_summary
         FROM nightly_runs WHERE slate_date = ?1
         ORDER BY started_at DESC, rowid DESC
         LIMIT 1",
        encode_date(slate_date),
      )
      .await
  }

  // ── Trace provenance ──────────────────────────────────────────────────────

  async fn replace_trace_source_calls(
    &self,
    trace_id: &str,
    freshness_mode: FreshnessMode,
    calls: Vec<TraceSourceCall>,
  ) -> Result<()> {
    let trace_id_owned = trace_id.to_owned();
    let mode           = freshness_mode.as_ref().to_owned();
    let created_at     = encode_dt(Utc::now());
    let count          = calls.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM query_trace_source_calls WHERE trace_id = ?1",
          rusqlite::params![trace_id_owned],
        )?;
        {
          let mut insert = tx.prepare(
            "INSERT INTO query_trace_source_calls (
               trace_id, endpoint_id, cache_status, latency_ms, stale,
               is_provisional, parser_version, source_status,
               data_freshness_mode, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          )?;
          for call in &calls {
            insert.execute(rusqlite::params![
              trace_id_owned,
              call.endpoint_id,
              call.cache_status.as_ref(),
              encode_latency(call.latency_ms),
              call.stale,
              call.is_provisional,
              call.parser_version,
              call.source_status.as_ref(),
              mode,
              created_at,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(trace_id, mode = freshness_mode.as_ref(), count, "replaced trace source calls");
    Ok(())
  }

  async fn get_trace_source_calls(&self, trace_id: &str) -> Result<Option<TraceSources>> {
    let trace_id = trace_id.to_owned();

    let rows: Vec<RawSourceCall> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT endpoint_id, cache_status, latency_ms, stale, is_provisional,
                  parser_version, source_status, data_freshness_mode
           FROM query_trace_source_calls
           WHERE trace_id = ?1
           ORDER BY id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![trace_id], RawSourceCall::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    into_trace_sources(rows)
  }
}
