//! Error types for `hoop-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("endpoint {endpoint_id:?} lists {param:?} as both required and optional")]
  OverlappingParams { endpoint_id: String, param: String },

  #[error("duplicate endpoint id in catalog: {0:?}")]
  DuplicateEndpoint(String),

  #[error("duplicate metric id in registry: {0:?}")]
  DuplicateMetric(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parse a stored discriminant string (e.g. a `status` column) into one of
/// the strum-derived enums in this crate.
pub fn parse_discriminant<T: std::str::FromStr>(
  kind: &'static str,
  value: &str,
) -> Result<T> {
  value.parse().map_err(|_| Error::UnknownDiscriminant {
    kind,
    value: value.to_owned(),
  })
}
