//! Runtime server configuration, deserialised from `config.toml` layered
//! under `HOOP_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use hoop_store::StoreConfig;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "HOOP";
pub const DEFAULT_STORE_PATH: &str = ".data/hoop-hub.sqlite";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file. Defaults to [`DEFAULT_STORE_PATH`].
  #[serde(default)]
  pub store_path: Option<PathBuf>,
  /// Skip SQLite entirely and keep everything in memory.
  #[serde(default)]
  pub in_memory:  bool,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 3000 }

impl ServerConfig {
  /// Read `path` (optional) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Which store backend to open.
  pub fn store_config(&self) -> StoreConfig {
    if self.in_memory {
      return StoreConfig::in_memory();
    }
    let path = self
      .store_path
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    StoreConfig::sqlite(expand_tilde(&path))
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
