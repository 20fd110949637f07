//! Error type for `cadastro-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cadastro_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("unknown supplier kind: {0:?}")]
  UnknownSupplierKind(String),

  #[error("company not found: {0}")]
  CompanyNotFound(uuid::Uuid),

  #[error("supplier not found: {0}")]
  SupplierNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
