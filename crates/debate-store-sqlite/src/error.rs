//! Error type for `debate-store-sqlite`.

use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule rejected the operation inside a transaction.
  #[error(transparent)]
  Core(#[from] debate_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("corrupt row: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for debate_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      other => debate_core::Error::Store(Box::new(other)),
    }
  }
}

/// True for `UNIQUE` and `PRIMARY KEY` constraint failures, which is how a
/// concurrent duplicate write shows up.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
        && (f.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
          || f.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
  )
}
